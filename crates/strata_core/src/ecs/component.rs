//! # Component System
//!
//! Components are pure data containers with no behavior.
//! Any `'static` type can be stored; types that implement [`Default`] can
//! additionally be default-constructed in place with `assign`.

use bytemuck::{Pod, Zeroable};

/// Marker trait for ECS components.
///
/// Implemented for every `'static` type. Pools are keyed by the component's
/// `TypeId`, so no registration or explicit id is needed.
///
/// # Example
///
/// ```rust
/// use strata_core::World;
///
/// #[derive(Default)]
/// struct Health(u32);
///
/// let mut world = World::new();
/// let entity = world.create();
/// world.assign::<Health>(entity)?.0 = 100;
/// assert_eq!(world.get::<Health>(entity)?.0, 100);
/// # Ok::<(), strata_core::EcsError>(())
/// ```
pub trait Component: 'static {}

impl<T: 'static> Component for T {}

/// Position component for entities.
///
/// Represents a 3D position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Position {
    /// X coordinate in world space.
    pub x: f32,
    /// Y coordinate in world space.
    pub y: f32,
    /// Z coordinate in world space.
    pub z: f32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Moves the position along `velocity` for `delta_time` seconds.
    #[inline]
    pub fn advance(&mut self, velocity: Velocity, delta_time: f32) {
        self.x += velocity.x * delta_time;
        self.y += velocity.y * delta_time;
        self.z += velocity.z * delta_time;
    }
}

/// Velocity component for entities.
///
/// Represents movement speed in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Velocity {
    /// X velocity component.
    pub x: f32,
    /// Y velocity component.
    pub y: f32,
    /// Z velocity component.
    pub z: f32,
}

impl Velocity {
    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_advance() {
        let mut pos = Position::new(1.0, 1.0, 1.0);
        pos.advance(Velocity::new(2.0, 0.0, -1.0), 0.5);
        assert_eq!(pos, Position::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn test_component_layout() {
        // No padding between fields.
        assert_eq!(std::mem::size_of::<Position>(), 12);
        assert_eq!(std::mem::size_of::<Velocity>(), 12);

        let pos = Position::new(1.0, 2.0, 3.0);
        let bytes: &[u8] = bytemuck::bytes_of(&pos);
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytemuck::pod_read_unaligned::<Position>(bytes), pos);

        let dense = [pos, Position::default()];
        let pool_bytes: &[u8] = bytemuck::cast_slice(&dense);
        assert_eq!(pool_bytes.len(), 24);
    }
}
