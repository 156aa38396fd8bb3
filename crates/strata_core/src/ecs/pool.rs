//! # Component Pools
//!
//! Sparse-set storage for a single component type.
//!
//! ```text
//! components: [C0, C1, C2, C3]   <- dense, insertion order
//! entities:   [e7, e2, e9, e4]   <- parallel to components
//! lookup:     {e7: 0, e2: 1, e9: 2, e4: 3}
//! ```
//!
//! - Insert: append to both dense arrays, O(1) amortized
//! - Lookup: one hash probe, O(1)
//! - Remove: swap the last slot into the hole, O(1)
//! - Iteration: linear over contiguous memory

use std::any::Any;
use std::collections::HashMap;

use super::component::Component;
use super::entity::Entity;
use crate::error::{EcsError, EcsResult};

/// Dense storage for one component type.
///
/// Invariants:
/// - `components.len() == entities.len() == lookup.len()`
/// - `lookup[entities[i]] == i` for every dense index `i`
/// - an entity occupies at most one slot
///
/// # Example
///
/// ```rust
/// use strata_core::{ComponentPool, Entity, Position};
///
/// let mut pool: ComponentPool<Position> = ComponentPool::new();
/// let entity = Entity::from_raw(1);
/// *pool.assign(entity)? = Position::new(1.0, 2.0, 3.0);
/// assert_eq!(pool.get(entity)?.y, 2.0);
/// # Ok::<(), strata_core::EcsError>(())
/// ```
#[derive(Debug)]
pub struct ComponentPool<T: Component> {
    /// Component values, densely packed.
    components: Vec<T>,
    /// Owner of each dense slot.
    entities: Vec<Entity>,
    /// Entity to dense index.
    lookup: HashMap<Entity, usize>,
}

impl<T: Component> ComponentPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty pool with room for `capacity` components.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            components: Vec::with_capacity(capacity),
            entities: Vec::with_capacity(capacity),
            lookup: HashMap::with_capacity(capacity),
        }
    }

    /// Returns the number of components the pool can hold without reallocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.components.capacity()
    }

    /// Reserves room for at least `additional` more components.
    pub fn reserve(&mut self, additional: usize) {
        self.components.reserve(additional);
        self.entities.reserve(additional);
        self.lookup.reserve(additional);
    }

    /// Attaches a default-constructed component to `entity`.
    ///
    /// # Errors
    ///
    /// - [`EcsError::InvalidEntity`] for the null entity.
    /// - [`EcsError::DuplicateComponent`] if `entity` is already in the pool.
    ///   The stored value is left untouched.
    pub fn assign(&mut self, entity: Entity) -> EcsResult<&mut T>
    where
        T: Default,
    {
        self.insert(entity, T::default())
    }

    /// Attaches `value` to `entity`.
    ///
    /// # Errors
    ///
    /// Same as [`assign`](Self::assign).
    pub fn insert(&mut self, entity: Entity, value: T) -> EcsResult<&mut T> {
        if entity.is_null() {
            return Err(EcsError::InvalidEntity(entity));
        }
        if self.lookup.contains_key(&entity) {
            return Err(EcsError::duplicate::<T>(entity));
        }

        let index = self.components.len();
        self.lookup.insert(entity, index);
        self.entities.push(entity);
        self.components.push(value);

        Ok(&mut self.components[index])
    }

    /// Detaches and returns the component of `entity`.
    ///
    /// The last dense slot is moved into the freed one, so the dense order of
    /// the remaining entities changes (views driven by this pool see the
    /// moved entity earlier).
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if `entity` is not in the pool.
    pub fn remove(&mut self, entity: Entity) -> EcsResult<T> {
        let index = self
            .lookup
            .remove(&entity)
            .ok_or_else(|| EcsError::missing::<T>(entity))?;

        let last = self.entities.len() - 1;
        if index != last {
            let moved = self.entities[last];
            self.lookup.insert(moved, index);
        }

        self.entities.swap_remove(index);
        Ok(self.components.swap_remove(index))
    }

    /// Checks if `entity` has a component in this pool.
    #[inline]
    #[must_use]
    pub fn has(&self, entity: Entity) -> bool {
        self.lookup.contains_key(&entity)
    }

    /// Gets the component of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if `entity` is not in the pool.
    #[inline]
    pub fn get(&self, entity: Entity) -> EcsResult<&T> {
        match self.lookup.get(&entity) {
            Some(&index) => Ok(&self.components[index]),
            None => Err(EcsError::missing::<T>(entity)),
        }
    }

    /// Gets the component of `entity` mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if `entity` is not in the pool.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> EcsResult<&mut T> {
        match self.lookup.get(&entity) {
            Some(&index) => Ok(&mut self.components[index]),
            None => Err(EcsError::missing::<T>(entity)),
        }
    }

    /// Returns the number of components in the pool.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.entities.len()
    }

    /// Alias of [`size`](Self::size).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.size()
    }

    /// Checks if the pool is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Owners of the dense slots, in dense order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Returns a slice of all components, in dense order.
    ///
    /// Useful for batch processing.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Returns a mutable slice of all components, in dense order.
    ///
    /// Adding or removing entries is not possible through the slice, so the
    /// sparse-set invariants hold.
    #[inline]
    pub fn components_mut(&mut self) -> &mut [T] {
        &mut self.components
    }

    /// Iterates over `(entity, component)` pairs in dense order.
    #[inline]
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Entity, &T)> + ExactSizeIterator {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs in dense order.
    #[inline]
    pub fn iter_mut(
        &mut self,
    ) -> impl DoubleEndedIterator<Item = (Entity, &mut T)> + ExactSizeIterator {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }

    /// Drops every component. Keeps the allocated capacity.
    pub fn clear(&mut self) {
        self.components.clear();
        self.entities.clear();
        self.lookup.clear();
    }
}

impl<T: Component> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased view of a [`ComponentPool`].
///
/// The world stores every pool behind this trait and recovers the concrete
/// type with an `Any` downcast.
pub trait ErasedPool: Any {
    /// Upcasts to `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to `&mut dyn Any` for downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Checks if `entity` has a component in this pool.
    fn contains(&self, entity: Entity) -> bool;

    /// Drops the component of `entity`, if any. Returns `true` if one was removed.
    fn remove_entity(&mut self, entity: Entity) -> bool;

    /// Number of components in the pool.
    fn len(&self) -> usize;

    /// Checks if the pool is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type name of the stored component, for diagnostics.
    fn component_name(&self) -> &'static str;
}

impl<T: Component> ErasedPool for ComponentPool<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn contains(&self, entity: Entity) -> bool {
        self.has(entity)
    }

    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_ok()
    }

    fn len(&self) -> usize {
        self.size()
    }

    fn component_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::Position;

    fn entity(raw: u64) -> Entity {
        Entity::from_raw(raw)
    }

    /// Checks the sparse-set invariants.
    fn assert_consistent<T: Component>(pool: &ComponentPool<T>) {
        assert_eq!(pool.components.len(), pool.entities.len());
        assert_eq!(pool.lookup.len(), pool.entities.len());
        for (index, owner) in pool.entities.iter().enumerate() {
            assert_eq!(pool.lookup[owner], index);
        }
    }

    #[test]
    fn test_assign_defaults() {
        let mut pool: ComponentPool<Position> = ComponentPool::new();
        let value = pool.assign(entity(1)).unwrap();
        assert_eq!(*value, Position::default());
        assert!(pool.has(entity(1)));
        assert_eq!(pool.size(), 1);
        assert_consistent(&pool);
    }

    #[test]
    fn test_assign_duplicate() {
        let mut pool: ComponentPool<u32> = ComponentPool::new();
        *pool.assign(entity(1)).unwrap() = 5;

        let err = pool.assign(entity(1)).unwrap_err();
        assert_eq!(err, EcsError::duplicate::<u32>(entity(1)));
        assert_eq!(pool.size(), 1);
        assert_eq!(*pool.get(entity(1)).unwrap(), 5);
    }

    #[test]
    fn test_assign_null_entity() {
        let mut pool: ComponentPool<u32> = ComponentPool::new();
        assert_eq!(
            pool.assign(Entity::NULL).unwrap_err(),
            EcsError::InvalidEntity(Entity::NULL)
        );
        assert!(pool.is_empty());
    }

    #[test]
    fn test_get_missing() {
        let mut pool: ComponentPool<u32> = ComponentPool::new();
        assert_eq!(
            pool.get(entity(9)).unwrap_err(),
            EcsError::missing::<u32>(entity(9))
        );
        assert!(pool.get_mut(entity(9)).is_err());
    }

    #[test]
    fn test_swap_remove_keeps_others() {
        let mut pool: ComponentPool<u64> = ComponentPool::new();
        for raw in 1..=5 {
            pool.insert(entity(raw), raw * 10).unwrap();
        }

        assert_eq!(pool.remove(entity(2)).unwrap(), 20);
        assert_eq!(pool.size(), 4);
        assert!(!pool.has(entity(2)));
        assert_consistent(&pool);

        // The last entity took the freed slot.
        assert_eq!(pool.entities(), &[entity(1), entity(5), entity(3), entity(4)]);
        for raw in [1, 3, 4, 5] {
            assert_eq!(*pool.get(entity(raw)).unwrap(), raw * 10);
        }
    }

    #[test]
    fn test_remove_last_slot() {
        let mut pool: ComponentPool<u64> = ComponentPool::new();
        pool.insert(entity(1), 1).unwrap();
        pool.insert(entity(2), 2).unwrap();

        assert_eq!(pool.remove(entity(2)).unwrap(), 2);
        assert_eq!(pool.entities(), &[entity(1)]);
        assert_consistent(&pool);
    }

    #[test]
    fn test_remove_missing() {
        let mut pool: ComponentPool<u64> = ComponentPool::new();
        pool.insert(entity(1), 1).unwrap();
        assert_eq!(
            pool.remove(entity(3)).unwrap_err(),
            EcsError::missing::<u64>(entity(3))
        );
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_reuse_freed_slot() {
        let mut pool: ComponentPool<u64> = ComponentPool::new();
        pool.insert(entity(1), 11).unwrap();
        pool.remove(entity(1)).unwrap();
        assert!(pool.is_empty());
        assert!(pool.lookup.is_empty());

        pool.insert(entity(2), 22).unwrap();
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.entities(), &[entity(2)]);
        assert_eq!(pool.lookup.len(), 1);
        assert_eq!(pool.lookup[&entity(2)], 0);
        assert!(!pool.has(entity(1)));
    }

    #[test]
    fn test_iter_dense_order() {
        let mut pool: ComponentPool<u64> = ComponentPool::new();
        for raw in [3, 1, 2] {
            pool.insert(entity(raw), raw).unwrap();
        }

        for (_, value) in pool.iter_mut() {
            *value += 100;
        }

        let pairs: Vec<(u64, u64)> = pool.iter().map(|(e, v)| (e.to_raw(), *v)).collect();
        assert_eq!(pairs, vec![(3, 103), (1, 101), (2, 102)]);
        assert_eq!(pool.components(), &[103, 101, 102]);
    }

    #[test]
    fn test_erased_pool() {
        let mut pool: ComponentPool<Position> = ComponentPool::new();
        pool.assign(entity(4)).unwrap();

        let erased: &mut dyn ErasedPool = &mut pool;
        assert!(erased.contains(entity(4)));
        assert_eq!(erased.len(), 1);
        assert!(erased.component_name().ends_with("Position"));
        assert!(erased.remove_entity(entity(4)));
        assert!(!erased.remove_entity(entity(4)));
        assert!(erased.is_empty());
        assert!(erased.as_any().downcast_ref::<ComponentPool<Position>>().is_some());
    }

    #[test]
    fn test_clear() {
        let mut pool: ComponentPool<u8> = ComponentPool::with_capacity(16);
        pool.insert(entity(1), 1).unwrap();
        pool.insert(entity(2), 2).unwrap();
        pool.clear();
        assert!(pool.is_empty());
        assert!(!pool.has(entity(1)));
        assert_consistent(&pool);
    }
}
