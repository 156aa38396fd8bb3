//! # STRATA Core
//!
//! Sparse-set Entity Component System (ECS):
//! - Entities are opaque ids with no data of their own
//! - Components of one type are packed in a dense pool
//! - Views iterate the entities that own every component of a tuple
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{Position, Velocity, World};
//!
//! let mut world = World::new();
//! for i in 0..4 {
//!     let entity = world.create();
//!     *world.assign::<Position>(entity)? = Position::new(i as f32, 0.0, 0.0);
//!     if i % 2 == 0 {
//!         *world.assign::<Velocity>(entity)? = Velocity::new(1.0, 0.0, 0.0);
//!     }
//! }
//!
//! let view = world.view::<(Position, Velocity)>();
//! assert_eq!(view.iter().count(), 2);
//! # Ok::<(), strata_core::EcsError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::WorldConfig;
pub use ecs::{
    Component, ComponentPool, Entity, EntitySet, EntitySetIter, ErasedPool, Position, Velocity,
    View, ViewComponents, ViewCursor, ViewIter, ViewQuery, World,
};
pub use error::{EcsError, EcsResult};
