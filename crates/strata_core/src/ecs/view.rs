//! # Multi-Component Views
//!
//! A view borrows N pools and walks the entities that own *all* of them,
//! intersecting on the fly instead of building the intersection up front.
//!
//! ```text
//! Position: [e1, e2, e3, e4, e5]      (5)
//! Velocity: [e3, e9, e1]              (3)  <- driver: smallest pool
//!
//! walk driver:  e3 -> in Position? yes -> yield
//!               e9 -> in Position? no  -> skip
//!               e1 -> in Position? yes -> yield
//! ```
//!
//! The driver is picked when iteration starts; ties go to the pool named
//! first. Each candidate costs one hash probe per remaining pool.
//!
//! ## Borrowing
//!
//! A [`View`] holds `&mut` borrows of its pools, so no entity can be
//! created, destroyed, assigned or removed while it is alive. Query and
//! mutation phases are serialized by the borrow checker.

use std::iter::FusedIterator;

use super::component::Component;
use super::entity::Entity;
use super::pool::{ComponentPool, ErasedPool};
use super::world::World;
use crate::error::{EcsError, EcsResult};

/// A set of component types that can be viewed together.
///
/// Implemented for tuples of one to eight component types, so an empty
/// view cannot be expressed. Use `(T,)` for a single type.
///
/// The methods are plumbing for [`View`]; call the methods on [`View`] and
/// [`World`] instead.
pub trait ViewQuery: 'static {
    /// Mutable borrows of every pool in the query.
    type Pools<'w>;
    /// Shared references to one entity's components.
    type Refs<'a>;
    /// Mutable references to one entity's components.
    type RefsMut<'a>;

    /// Number of component types in the query.
    const LEN: usize;

    /// Borrows every pool of the query from `world`, creating missing ones.
    ///
    /// # Panics
    ///
    /// Panics if the same component type appears twice.
    fn fetch(world: &mut World) -> Self::Pools<'_>;

    /// Index of the smallest pool. Ties go to the lowest index.
    fn driver(pools: &Self::Pools<'_>) -> usize;

    /// Dense entity list of the pool at `which`.
    fn entities<'a>(pools: &'a Self::Pools<'_>, which: usize) -> &'a [Entity];

    /// Smallest pool size.
    fn size(pools: &Self::Pools<'_>) -> usize;

    /// Checks if every pool except the one at `skip` contains `entity`.
    fn contains_except(pools: &Self::Pools<'_>, skip: usize, entity: Entity) -> bool;

    /// Checks if `entity` owns every component of the query in `world`.
    fn owned_by(world: &World, entity: Entity) -> bool;

    /// Shared references to the components of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] for the first pool lacking `entity`.
    fn get<'a>(pools: &'a Self::Pools<'_>, entity: Entity) -> EcsResult<Self::Refs<'a>>;

    /// Mutable references to the components of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] for the first pool lacking `entity`.
    fn get_mut<'a>(
        pools: &'a mut Self::Pools<'_>,
        entity: Entity,
    ) -> EcsResult<Self::RefsMut<'a>>;

    /// Shared references to the components of `entity` listed in `Self`,
    /// looked up in the pools of another query `V`.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] for the first type of `Self` that is
    /// not part of `V` or whose pool lacks `entity`.
    fn project<'a, V: ViewQuery>(
        pools: &'a V::Pools<'_>,
        entity: Entity,
    ) -> EcsResult<Self::Refs<'a>>;

    /// The pool for `T`, if `T` is part of the query.
    fn pool<'a, T: Component>(pools: &'a Self::Pools<'_>) -> Option<&'a ComponentPool<T>>;

    /// The pool for `T` mutably, if `T` is part of the query.
    fn pool_mut<'a, T: Component>(
        pools: &'a mut Self::Pools<'_>,
    ) -> Option<&'a mut ComponentPool<T>>;
}

macro_rules! impl_view_query {
    ($len:expr; $($name:ident),+) => {
        #[allow(non_snake_case, unused_assignments)]
        impl<$($name: Component),+> ViewQuery for ($($name,)+) {
            type Pools<'w> = ($(&'w mut ComponentPool<$name>,)+);
            type Refs<'a> = ($(&'a $name,)+);
            type RefsMut<'a> = ($(&'a mut $name,)+);

            const LEN: usize = $len;

            fn fetch(world: &mut World) -> Self::Pools<'_> {
                let indices = [$(world.assure_index::<$name>(),)+];
                let mut pools = world.disjoint_pools_mut(&indices).into_iter();
                ($(
                    World::downcast_pool_mut::<$name>(pools.next()),
                )+)
            }

            fn driver(pools: &Self::Pools<'_>) -> usize {
                let ($($name,)+) = pools;
                let mut index = 0;
                let mut driver = 0;
                let mut smallest = usize::MAX;
                $(
                    if $name.size() < smallest {
                        smallest = $name.size();
                        driver = index;
                    }
                    index += 1;
                )+
                driver
            }

            fn entities<'a>(pools: &'a Self::Pools<'_>, which: usize) -> &'a [Entity] {
                let ($($name,)+) = pools;
                let mut index = 0;
                $(
                    if index == which {
                        return $name.entities();
                    }
                    index += 1;
                )+
                &[]
            }

            fn size(pools: &Self::Pools<'_>) -> usize {
                let ($($name,)+) = pools;
                let mut size = usize::MAX;
                $(
                    size = size.min($name.size());
                )+
                size
            }

            fn contains_except(pools: &Self::Pools<'_>, skip: usize, entity: Entity) -> bool {
                let ($($name,)+) = pools;
                let mut index = 0;
                $(
                    if index != skip && !$name.has(entity) {
                        return false;
                    }
                    index += 1;
                )+
                true
            }

            fn owned_by(world: &World, entity: Entity) -> bool {
                $(world.has::<$name>(entity))&&+
            }

            fn get<'a>(pools: &'a Self::Pools<'_>, entity: Entity) -> EcsResult<Self::Refs<'a>> {
                let ($($name,)+) = pools;
                Ok(($($name.get(entity)?,)+))
            }

            fn get_mut<'a>(
                pools: &'a mut Self::Pools<'_>,
                entity: Entity,
            ) -> EcsResult<Self::RefsMut<'a>> {
                let ($($name,)+) = pools;
                Ok(($($name.get_mut(entity)?,)+))
            }

            fn project<'a, V: ViewQuery>(
                pools: &'a V::Pools<'_>,
                entity: Entity,
            ) -> EcsResult<Self::Refs<'a>> {
                Ok(($(
                    V::pool::<$name>(pools)
                        .ok_or_else(|| EcsError::missing::<$name>(entity))?
                        .get(entity)?,
                )+))
            }

            fn pool<'a, T: Component>(pools: &'a Self::Pools<'_>) -> Option<&'a ComponentPool<T>> {
                let ($($name,)+) = pools;
                $(
                    if let Some(pool) = $name.as_any().downcast_ref::<ComponentPool<T>>() {
                        return Some(pool);
                    }
                )+
                None
            }

            fn pool_mut<'a, T: Component>(
                pools: &'a mut Self::Pools<'_>,
            ) -> Option<&'a mut ComponentPool<T>> {
                let ($($name,)+) = pools;
                $(
                    if let Some(pool) = $name.as_any_mut().downcast_mut::<ComponentPool<T>>() {
                        return Some(pool);
                    }
                )+
                None
            }
        }
    };
}

impl_view_query!(1; A);
impl_view_query!(2; A, B);
impl_view_query!(3; A, B, C);
impl_view_query!(4; A, B, C, D);
impl_view_query!(5; A, B, C, D, E);
impl_view_query!(6; A, B, C, D, E, F);
impl_view_query!(7; A, B, C, D, E, F, G);
impl_view_query!(8; A, B, C, D, E, F, G, H);

/// Query over every entity that owns all components in `Q`.
///
/// Obtained from [`World::view`]. Owns no data.
///
/// # Example
///
/// ```rust
/// use strata_core::{Position, Velocity, World};
///
/// let mut world = World::new();
/// let a = world.create();
/// let b = world.create();
/// world.assign::<Position>(a)?;
/// world.assign::<Position>(b)?;
/// world.assign::<Velocity>(a)?.x = 2.0;
///
/// let mut view = world.view::<(Position, Velocity)>();
/// let mut cursor = view.cursor();
/// while let Some(entity) = cursor.next(&view) {
///     let (pos, vel) = view.fetch_mut(entity)?;
///     pos.advance(*vel, 0.5);
/// }
///
/// assert_eq!(view.iter().collect::<Vec<_>>(), vec![a]);
/// assert_eq!(view.get::<Position>(a)?.x, 1.0);
/// # Ok::<(), strata_core::EcsError>(())
/// ```
pub struct View<'w, Q: ViewQuery> {
    pools: Q::Pools<'w>,
}

impl<'w, Q: ViewQuery> View<'w, Q> {
    pub(crate) fn new(pools: Q::Pools<'w>) -> Self {
        Self { pools }
    }

    /// Estimates the number of entities the view iterates.
    ///
    /// **This is an upper bound, not an exact count.** It returns the size of
    /// the smallest pool in O(N) without intersecting anything. The entities
    /// actually yielded can be fewer: pools of sizes 5 and 3 report 3 even
    /// if only 2 entities own both components. Count with
    /// `view.iter().count()` when the exact number matters.
    #[must_use]
    pub fn size(&self) -> usize {
        Q::size(&self.pools)
    }

    /// Number of component types in the view.
    #[must_use]
    pub const fn arity(&self) -> usize {
        Q::LEN
    }

    /// Checks if `entity` owns every component of the view.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        Q::contains_except(&self.pools, usize::MAX, entity)
    }

    /// Iterates over the matching entities.
    ///
    /// Order follows the dense order of the smallest pool, filtered. It is
    /// not sorted by id and changes when that pool swap-removes.
    pub fn iter(&self) -> ViewIter<'_, 'w, Q> {
        ViewIter {
            view: self,
            cursor: self.cursor(),
        }
    }

    /// Iterates over the matching entities with shared references to their
    /// components.
    pub fn iter_components(&self) -> ViewComponents<'_, 'w, Q> {
        ViewComponents { inner: self.iter() }
    }

    /// Starts a detached iteration over the matching entities.
    ///
    /// The cursor does not borrow the view, so components can be mutated
    /// between steps with [`fetch_mut`](Self::fetch_mut) or
    /// [`get_mut`](Self::get_mut).
    #[must_use]
    pub fn cursor(&self) -> ViewCursor {
        let driver = Q::driver(&self.pools);
        ViewCursor {
            driver,
            front: 0,
            back: Q::entities(&self.pools, driver).len(),
        }
    }

    /// Gets the `T` component of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if `entity` lacks `T` or `T` is not
    /// part of the view.
    pub fn get<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        Q::pool::<T>(&self.pools)
            .ok_or_else(|| EcsError::missing::<T>(entity))?
            .get(entity)
    }

    /// Gets the `T` component of `entity` mutably.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        Q::pool_mut::<T>(&mut self.pools)
            .ok_or_else(|| EcsError::missing::<T>(entity))?
            .get_mut(entity)
    }

    /// Gets every component of `entity` as a tuple of references.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if `entity` lacks any of them.
    pub fn fetch(&self, entity: Entity) -> EcsResult<Q::Refs<'_>> {
        Q::get(&self.pools, entity)
    }

    /// Gets the components named by `S` as a tuple of references.
    ///
    /// `S` may list any subset of the view's types, in any order. Only
    /// shared access is offered; use [`get_mut`](Self::get_mut) or
    /// [`fetch_mut`](Self::fetch_mut) for writes.
    ///
    /// ```rust
    /// use strata_core::{Position, Velocity, World};
    ///
    /// let mut world = World::new();
    /// let entity = world.create();
    /// world.assign::<Position>(entity)?.x = 1.0;
    /// world.assign::<Velocity>(entity)?.x = 2.0;
    /// world.insert(entity, 7u32)?;
    ///
    /// let view = world.view::<(Position, Velocity, u32)>();
    /// let (count, pos) = view.get_all::<(u32, Position)>(entity)?;
    /// assert_eq!((*count, pos.x), (7, 1.0));
    /// # Ok::<(), strata_core::EcsError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if `entity` lacks one of them or a
    /// type of `S` is not part of the view.
    pub fn get_all<S: ViewQuery>(&self, entity: Entity) -> EcsResult<S::Refs<'_>> {
        S::project::<Q>(&self.pools, entity)
    }

    /// Gets every component of `entity` as a tuple of mutable references.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if `entity` lacks any of them.
    pub fn fetch_mut(&mut self, entity: Entity) -> EcsResult<Q::RefsMut<'_>> {
        Q::get_mut(&mut self.pools, entity)
    }

    /// The pool for `T`, if `T` is part of the view.
    #[must_use]
    pub fn pool<T: Component>(&self) -> Option<&ComponentPool<T>> {
        Q::pool::<T>(&self.pools)
    }
}

impl<'a, 'w, Q: ViewQuery> IntoIterator for &'a View<'w, Q> {
    type Item = Entity;
    type IntoIter = ViewIter<'a, 'w, Q>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iteration state over a [`View`] that does not hold a borrow of it.
///
/// Must be advanced with the view that created it.
#[derive(Clone, Copy, Debug)]
pub struct ViewCursor {
    /// Index of the driving pool within the view.
    driver: usize,
    /// Next dense index from the front.
    front: usize,
    /// One past the next dense index from the back.
    back: usize,
}

impl ViewCursor {
    /// Advances to the next matching entity.
    pub fn next<Q: ViewQuery>(&mut self, view: &View<'_, Q>) -> Option<Entity> {
        let entities = Q::entities(&view.pools, self.driver);
        while self.front < self.back {
            let entity = *entities.get(self.front)?;
            self.front += 1;
            if Q::contains_except(&view.pools, self.driver, entity) {
                return Some(entity);
            }
        }
        None
    }

    /// Steps back to the previous matching entity, from the end of the driver.
    pub fn next_back<Q: ViewQuery>(&mut self, view: &View<'_, Q>) -> Option<Entity> {
        let entities = Q::entities(&view.pools, self.driver);
        while self.front < self.back {
            self.back -= 1;
            let entity = *entities.get(self.back)?;
            if Q::contains_except(&view.pools, self.driver, entity) {
                return Some(entity);
            }
        }
        None
    }

    /// Number of driver entries not yet visited.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.back - self.front
    }
}

/// Iterator over the entities of a [`View`].
pub struct ViewIter<'a, 'w, Q: ViewQuery> {
    view: &'a View<'w, Q>,
    cursor: ViewCursor,
}

impl<Q: ViewQuery> Iterator for ViewIter<'_, '_, Q> {
    type Item = Entity;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next(self.view)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cursor.remaining()))
    }
}

impl<Q: ViewQuery> DoubleEndedIterator for ViewIter<'_, '_, Q> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.cursor.next_back(self.view)
    }
}

impl<Q: ViewQuery> FusedIterator for ViewIter<'_, '_, Q> {}

/// Iterator over the entities of a [`View`] and their components.
pub struct ViewComponents<'a, 'w, Q: ViewQuery> {
    inner: ViewIter<'a, 'w, Q>,
}

impl<'a, Q: ViewQuery> Iterator for ViewComponents<'a, '_, Q> {
    type Item = (Entity, Q::Refs<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        let view = self.inner.view;
        self.inner
            .find_map(move |entity| Q::get(&view.pools, entity).ok().map(|refs| (entity, refs)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
