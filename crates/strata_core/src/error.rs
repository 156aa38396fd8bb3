//! # ECS Error Types
//!
//! All errors that can occur in the component database.
//!
//! These are contract violations by the caller, not transient failures.
//! Nothing here is worth retrying.

use thiserror::Error;

use crate::ecs::Entity;

/// Errors that can occur in the component database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The entity already owns a component of this type.
    #[error("entity {entity} already has component {component}")]
    DuplicateComponent {
        /// The entity the component was assigned to.
        entity: Entity,
        /// Type name of the component.
        component: &'static str,
    },

    /// The entity does not own a component of this type.
    #[error("entity {entity} has no component {component}")]
    MissingComponent {
        /// The entity that was queried.
        entity: Entity,
        /// Type name of the component.
        component: &'static str,
    },

    /// The null entity, or an entity this world never created or already destroyed.
    #[error("invalid entity: {0}")]
    InvalidEntity(Entity),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EcsError {
    /// Builds a [`EcsError::DuplicateComponent`] for component type `T`.
    #[must_use]
    pub fn duplicate<T: 'static>(entity: Entity) -> Self {
        Self::DuplicateComponent {
            entity,
            component: std::any::type_name::<T>(),
        }
    }

    /// Builds a [`EcsError::MissingComponent`] for component type `T`.
    #[must_use]
    pub fn missing<T: 'static>(entity: Entity) -> Self {
        Self::MissingComponent {
            entity,
            component: std::any::type_name::<T>(),
        }
    }
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
