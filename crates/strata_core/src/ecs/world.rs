//! # ECS World
//!
//! The central container for all entities and components.
//!
//! Pools are created lazily, one per component type, the first time the type
//! is assigned or viewed. Each world keeps its own `TypeId -> pool` registry,
//! so two worlds never share state.

use std::any::TypeId;
use std::collections::HashMap;

use super::component::Component;
use super::entity::{Entity, EntitySet, EntitySetIter};
use super::pool::{ComponentPool, ErasedPool};
use super::view::{View, ViewQuery};
use crate::config::WorldConfig;
use crate::error::{EcsError, EcsResult};

/// The ECS World - container for all game state.
///
/// # Example
///
/// ```rust
/// use strata_core::{Position, Velocity, World};
///
/// let mut world = World::new();
///
/// let entity = world.create();
/// *world.assign::<Position>(entity)? = Position::new(1.0, 2.0, 3.0);
/// world.assign::<Velocity>(entity)?;
///
/// assert!(world.has_all::<(Position, Velocity)>(entity));
///
/// world.destroy(entity)?;
/// assert!(!world.has::<Position>(entity));
/// # Ok::<(), strata_core::EcsError>(())
/// ```
pub struct World {
    /// One pool per component type, in registration order.
    pools: Vec<Box<dyn ErasedPool>>,
    /// Component type to index into `pools`.
    registry: HashMap<TypeId, usize>,
    /// Entities created and not yet destroyed.
    alive: EntitySet,
    /// Next id handed out by `create`.
    next_id: u64,
    /// Dense slots reserved in every new pool.
    pool_capacity: usize,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&WorldConfig::default())
    }

    /// Creates an empty world sized by `config`.
    #[must_use]
    pub fn with_config(config: &WorldConfig) -> Self {
        tracing::debug!(
            pool_capacity = config.pool_capacity,
            entity_capacity = config.entity_capacity,
            "creating world"
        );

        Self {
            pools: Vec::new(),
            registry: HashMap::new(),
            alive: EntitySet::with_capacity(config.entity_capacity),
            next_id: 1,
            pool_capacity: config.pool_capacity,
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates a new entity.
    ///
    /// Ids start at 1 and increase by one per call. They are never reused,
    /// not even after [`destroy`](Self::destroy).
    pub fn create(&mut self) -> Entity {
        let entity = Entity::from_raw(self.next_id);
        self.next_id += 1;
        self.alive.insert(entity);

        tracing::trace!(entity = entity.to_raw(), "created entity");
        entity
    }

    /// Destroys an entity and all its components.
    ///
    /// Every pool is probed, so this costs O(number of component types).
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidEntity`] if the entity is null, was never created
    /// by this world, or is already destroyed.
    pub fn destroy(&mut self, entity: Entity) -> EcsResult<()> {
        self.validate(entity)?;

        let mut removed = 0usize;
        for pool in &mut self.pools {
            if pool.remove_entity(entity) {
                removed += 1;
            }
        }
        self.alive.remove(entity);

        tracing::trace!(entity = entity.to_raw(), removed, "destroyed entity");
        Ok(())
    }

    /// Checks if an entity was created by this world and not destroyed.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.contains(entity)
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    /// Iterates over all alive entities in ascending id order.
    pub fn iter_alive(&self) -> EntitySetIter<'_> {
        self.alive.iter()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Assigns a default-constructed component to the given entity.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if the entity is not alive.
    /// - [`EcsError::DuplicateComponent`] if it already has a `T`.
    pub fn assign<T: Component + Default>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.validate(entity)?;
        self.assure::<T>().assign(entity)
    }

    /// Attaches `value` to the given entity.
    ///
    /// # Errors
    ///
    /// Same as [`assign`](Self::assign).
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) -> EcsResult<&mut T> {
        self.validate(entity)?;
        self.assure::<T>().insert(entity, value)
    }

    /// Removes a component from the given entity and returns it.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if the entity is not alive.
    /// - [`EcsError::MissingComponent`] if it has no `T`.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> EcsResult<T> {
        self.validate(entity)?;
        self.assure::<T>().remove(entity)
    }

    /// Checks if an entity has a `T` component.
    ///
    /// Never creates a pool. Returns `false` for dead or unknown entities.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.pool::<T>().is_some_and(|pool| pool.has(entity))
    }

    /// Checks if an entity has every component in `Q`.
    ///
    /// ```rust
    /// # use strata_core::{Position, Velocity, World};
    /// # let mut world = World::new();
    /// let entity = world.create();
    /// world.assign::<Position>(entity)?;
    /// assert!(world.has_all::<(Position,)>(entity));
    /// assert!(!world.has_all::<(Position, Velocity)>(entity));
    /// # Ok::<(), strata_core::EcsError>(())
    /// ```
    #[must_use]
    pub fn has_all<Q: ViewQuery>(&self, entity: Entity) -> bool {
        Q::owned_by(self, entity)
    }

    /// Gets a component of the given entity.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] if the entity is not alive.
    /// - [`EcsError::MissingComponent`] if it has no `T`.
    pub fn get<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        self.validate(entity)?;
        self.pool::<T>()
            .ok_or_else(|| EcsError::missing::<T>(entity))?
            .get(entity)
    }

    /// Gets a component of the given entity mutably.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.validate(entity)?;
        let index = self
            .registry
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or_else(|| EcsError::missing::<T>(entity))?;
        Self::downcast_pool_mut::<T>(self.pools.get_mut(index)).get_mut(entity)
    }

    // =========================================================================
    // Pools and views
    // =========================================================================

    /// Returns the pool for `T`, if one was created.
    #[must_use]
    pub fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        let index = *self.registry.get(&TypeId::of::<T>())?;
        self.pools[index].as_any().downcast_ref::<ComponentPool<T>>()
    }

    /// Returns the pool for `T`, creating it on first use.
    ///
    /// Not public: the pool does not know which entities are alive, so every
    /// structural change goes through a liveness check first.
    pub(crate) fn assure<T: Component>(&mut self) -> &mut ComponentPool<T> {
        let index = self.assure_index::<T>();
        Self::downcast_pool_mut::<T>(self.pools.get_mut(index))
    }

    /// Number of component pools created so far.
    #[inline]
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Builds a view over every entity that owns all components in `Q`.
    ///
    /// Missing pools are created, so viewing a type nobody assigned yet
    /// simply yields nothing.
    ///
    /// # Panics
    ///
    /// Panics if `Q` names the same component type twice.
    pub fn view<Q: ViewQuery>(&mut self) -> View<'_, Q> {
        View::new(Q::fetch(self))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn validate(&self, entity: Entity) -> EcsResult<()> {
        if self.alive.contains(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity(entity))
        }
    }

    /// Returns the pool index for `T`, registering a new pool on first use.
    pub(crate) fn assure_index<T: Component>(&mut self) -> usize {
        if let Some(&index) = self.registry.get(&TypeId::of::<T>()) {
            return index;
        }

        let index = self.pools.len();
        self.pools
            .push(Box::new(ComponentPool::<T>::with_capacity(self.pool_capacity)));
        self.registry.insert(TypeId::of::<T>(), index);

        tracing::debug!(
            component = std::any::type_name::<T>(),
            index,
            "registered component pool"
        );
        index
    }

    /// Borrows the pools at `indices` mutably and at the same time.
    ///
    /// # Panics
    ///
    /// Panics if an index repeats or is out of range.
    pub(crate) fn disjoint_pools_mut(
        &mut self,
        indices: &[usize],
    ) -> Vec<&mut Box<dyn ErasedPool>> {
        let mut slots: Vec<Option<&mut Box<dyn ErasedPool>>> =
            self.pools.iter_mut().map(Some).collect();

        let mut taken = Vec::with_capacity(indices.len());
        for &index in indices {
            match slots.get_mut(index).and_then(Option::take) {
                Some(pool) => taken.push(pool),
                None => panic!("component pool {index} requested twice in one view"),
            }
        }
        taken
    }

    /// Recovers the concrete pool behind a registry slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is missing or holds another component type. The
    /// registry maps each `TypeId` to the pool created for it, so neither can
    /// happen for an index returned by `assure_index::<T>`.
    pub(crate) fn downcast_pool_mut<T: Component>(
        pool: Option<&mut Box<dyn ErasedPool>>,
    ) -> &mut ComponentPool<T> {
        pool.and_then(|pool| pool.as_any_mut().downcast_mut::<ComponentPool<T>>())
            .expect("component pool registered under the wrong type")
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("alive", &self.alive.len())
            .field("next_id", &self.next_id)
            .field(
                "pools",
                &self
                    .pools
                    .iter()
                    .map(|pool| (pool.component_name(), pool.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
