//! # Entity Component System
//!
//! A sparse-set ECS: one densely packed pool per component type, queried
//! through views that intersect several pools.
//!
//! ## Design
//!
//! - Entities are plain ids, handed out monotonically and never reused
//! - Each component type lives in its own [`ComponentPool`]
//! - Pools are type-erased inside the [`World`] and recovered by downcast
//! - A [`View`] walks its smallest pool and probes the others

mod component;
mod entity;
mod pool;
mod view;
mod world;

pub use component::{Component, Position, Velocity};
pub use entity::{Entity, EntitySet, EntitySetIter};
pub use pool::{ComponentPool, ErasedPool};
pub use view::{View, ViewComponents, ViewCursor, ViewIter, ViewQuery};
pub use world::World;
