use crate::world::World;
use crate::world_result::ComponentError;
use crate::world_result::EcsResult;
use std::cell::Ref;
use std::cell::RefMut;
use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Deref;
use std::ops::DerefMut;

/// Strictly monotonic per-world entity identifier. Never reused, so stale
/// handles stay safe to poke at.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct EntityId(pub(crate) u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }

    pub(crate) fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Cheap value handle: a world reference plus an id. Carries no ownership of
/// component data; all operations dispatch to the world's pools.
#[derive(Copy, Clone)]
pub struct Entity<'w> {
    pub(crate) world: &'w World,
    pub(crate) id: EntityId,
}

impl<'w> Entity<'w> {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn world(&self) -> &'w World {
        self.world
    }

    pub fn add<T: 'static>(&self, value: T) -> EcsResult {
        self.world.add_component(self.id, value)
    }

    pub fn get<T: 'static>(&self) -> EcsResult<ComponentRef<'w, T>> {
        self.world
            .get_component(self.id)
            .ok_or_else(|| ComponentError::Missing.into())
    }

    pub fn get_opt<T: 'static>(&self) -> Option<ComponentRef<'w, T>> {
        self.world.get_component(self.id)
    }

    /// Mutable access to the stored value. The guard keeps the pool borrowed
    /// for its whole lifetime; structural operations on the same kind while
    /// it is held will panic.
    pub fn get_mut<T: 'static>(&self) -> EcsResult<ComponentMut<'w, T>> {
        self.world
            .get_component_mut(self.id)
            .ok_or_else(|| ComponentError::Missing.into())
    }

    /// Insert-or-overwrite. For `Multiple` kinds this appends an instance.
    pub fn set<T: 'static>(&self, value: T) -> EcsResult {
        self.world.set_component(self.id, value)
    }

    /// Overwrite in place; the entity must already hold the kind.
    pub fn update<T: 'static>(&self, value: T) -> EcsResult {
        self.world.update_component(self.id, value)
    }

    /// Remove `Old` (which must be present), then add `New`.
    pub fn replace<Old: 'static, New: 'static>(&self, value: New) -> EcsResult {
        self.world.replace_component::<Old, New>(self.id, value)
    }

    /// Idempotent; for `Multiple` kinds all instances are released.
    pub fn remove<T: 'static>(&self) {
        self.world.remove_component::<T>(self.id)
    }

    pub fn has<T: 'static>(&self) -> bool {
        self.world.has_component::<T>(self.id)
    }

    /// Removes every component instance of this entity. The identifier is
    /// not reused; a later `add` through any handle with this id revives the
    /// entity.
    pub fn destroy(self) {
        self.world.destroy_entity(self.id)
    }
}

impl Display for Entity<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "entity {}", self.id)
    }
}

/// Shared borrow of a component value inside its pool.
pub struct ComponentRef<'w, T> {
    pub(crate) inner: Ref<'w, T>,
}

impl<T> Deref for ComponentRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

/// Exclusive borrow of a component value inside its pool.
pub struct ComponentMut<'w, T> {
    pub(crate) inner: RefMut<'w, T>,
}

impl<T> Deref for ComponentMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for ComponentMut<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}
