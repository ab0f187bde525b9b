use crate::component::StorageKind;
use crate::entity::EntityId;
use crate::internal::frame_storage::FrameStorage;
use crate::internal::multi_storage::MultiStorage;
use crate::internal::single_storage::SingleStorage;
use crate::internal::singleton_storage::SingletonStorage;
use crate::world_result::ComponentError;
use std::any::Any;

/// Type-erased face of a pool: the operations the world and the filter
/// engine need without knowing the component type.
pub(crate) trait AnyPool {
    fn storage_kind(&self) -> StorageKind;
    /// Live instance count (not entity count for `Multiple` kinds).
    fn live(&self) -> usize;
    fn contains(&self, entity: EntityId) -> bool;
    /// Entity-destruction path; leaves singleton values alone.
    fn remove(&mut self, entity: EntityId) -> usize;
    fn clear_all(&mut self) -> usize;
    /// Dense-order entity ids, one per stored instance, free slots skipped.
    fn collect_entities(&self, out: &mut Vec<EntityId>);
    /// Bumped by every structural mutation; filters assert it stays put
    /// while they iterate.
    fn version(&self) -> u64;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub(crate) fn specialize<T: 'static>(pool: &dyn AnyPool) -> &Pool<T> {
    pool.as_any()
        .downcast_ref::<Pool<T>>()
        .expect("framework BUG: pool specialization mismatch")
}

pub(crate) fn specialize_mut<T: 'static>(pool: &mut dyn AnyPool) -> &mut Pool<T> {
    pool.as_any_mut()
        .downcast_mut::<Pool<T>>()
        .expect("framework BUG: pool specialization mismatch")
}

pub(crate) struct Pool<T> {
    storage_kind: StorageKind,
    version: u64,
    storage: PoolStorage<T>,
}

enum PoolStorage<T> {
    Single(SingleStorage<T>),
    Multi(MultiStorage<T>),
    Singleton(SingletonStorage<T>),
    Frame(FrameStorage<T>),
}

impl<T: 'static> Pool<T> {
    pub(crate) fn new(storage_kind: StorageKind) -> Pool<T> {
        let storage = match storage_kind {
            StorageKind::Single => PoolStorage::Single(SingleStorage::new()),
            StorageKind::Multiple => PoolStorage::Multi(MultiStorage::new()),
            StorageKind::Singleton => PoolStorage::Singleton(SingletonStorage::new()),
            StorageKind::SingleFrame { multiple, .. } => {
                PoolStorage::Frame(FrameStorage::new(multiple))
            }
        };
        Pool {
            storage_kind,
            version: 0,
            storage,
        }
    }

    pub(crate) fn insert(&mut self, entity: EntityId, value: T) -> Result<(), ComponentError> {
        let result = match &mut self.storage {
            PoolStorage::Single(storage) => storage.insert(entity, value),
            PoolStorage::Multi(storage) => {
                storage.insert(entity, value);
                Ok(())
            }
            PoolStorage::Singleton(storage) => storage.insert(value),
            PoolStorage::Frame(storage) => storage.insert(entity, value),
        };
        if result.is_ok() {
            self.version += 1;
        }
        result
    }

    /// Value replacement is not a structural mutation; the version counter
    /// stays put and iterating filters keep going.
    pub(crate) fn overwrite(&mut self, entity: EntityId, value: T) -> Result<(), ComponentError> {
        match &mut self.storage {
            PoolStorage::Single(storage) => storage.overwrite(entity, value),
            PoolStorage::Multi(_) => Err(ComponentError::MultipleNotRemovable),
            PoolStorage::Singleton(storage) => storage.overwrite(value),
            PoolStorage::Frame(storage) => {
                if storage.is_multiple() {
                    Err(ComponentError::MultipleNotRemovable)
                } else {
                    storage.overwrite(entity, value)
                }
            }
        }
    }

    /// Returns true when a new instance was created.
    pub(crate) fn upsert(&mut self, entity: EntityId, value: T) -> Result<bool, ComponentError> {
        let created = match &mut self.storage {
            PoolStorage::Single(storage) => {
                if storage.contains(entity) {
                    storage.overwrite(entity, value)?;
                    false
                } else {
                    storage.insert(entity, value)?;
                    true
                }
            }
            PoolStorage::Multi(storage) => {
                storage.insert(entity, value);
                true
            }
            PoolStorage::Singleton(storage) => storage.upsert(value),
            PoolStorage::Frame(storage) => {
                if storage.is_multiple() || !storage.contains(entity) {
                    storage.insert(entity, value)?;
                    true
                } else {
                    storage.overwrite(entity, value)?;
                    false
                }
            }
        };
        if created {
            self.version += 1;
        }
        Ok(created)
    }

    pub(crate) fn get(&self, entity: EntityId) -> Option<&T> {
        match &self.storage {
            PoolStorage::Single(storage) => storage.get(entity),
            PoolStorage::Multi(storage) => storage.get(entity),
            PoolStorage::Singleton(storage) => storage.get(),
            PoolStorage::Frame(storage) => storage.get(entity),
        }
    }

    pub(crate) fn get_mut_value(&mut self, entity: EntityId) -> Option<&mut T> {
        match &mut self.storage {
            PoolStorage::Single(storage) => storage.get_mut(entity),
            PoolStorage::Multi(storage) => storage.get_mut(entity),
            PoolStorage::Singleton(storage) => storage.get_mut(),
            PoolStorage::Frame(storage) => storage.get_mut(entity),
        }
    }

    /// Explicit kind-addressed removal; unlike the destruction path this
    /// clears singleton values too.
    pub(crate) fn remove_typed(&mut self, entity: EntityId) -> usize {
        let removed = match &mut self.storage {
            PoolStorage::Single(storage) => storage.remove(entity),
            PoolStorage::Multi(storage) => storage.remove(entity),
            PoolStorage::Singleton(storage) => storage.clear(),
            PoolStorage::Frame(storage) => storage.remove(entity),
        };
        if removed > 0 {
            self.version += 1;
        }
        removed
    }
}

impl<T: 'static> AnyPool for Pool<T> {
    fn storage_kind(&self) -> StorageKind {
        self.storage_kind
    }

    fn live(&self) -> usize {
        match &self.storage {
            PoolStorage::Single(storage) => storage.live(),
            PoolStorage::Multi(storage) => storage.live(),
            PoolStorage::Singleton(storage) => usize::from(storage.is_set()),
            PoolStorage::Frame(storage) => storage.live(),
        }
    }

    fn contains(&self, entity: EntityId) -> bool {
        match &self.storage {
            PoolStorage::Single(storage) => storage.contains(entity),
            PoolStorage::Multi(storage) => storage.contains(entity),
            PoolStorage::Singleton(storage) => storage.is_set(),
            PoolStorage::Frame(storage) => storage.contains(entity),
        }
    }

    fn remove(&mut self, entity: EntityId) -> usize {
        if self.storage_kind.is_singleton() {
            return 0;
        }
        self.remove_typed(entity)
    }

    fn clear_all(&mut self) -> usize {
        let dropped = match &mut self.storage {
            PoolStorage::Single(storage) => storage.clear_all(),
            PoolStorage::Multi(storage) => storage.clear_all(),
            PoolStorage::Singleton(storage) => storage.clear(),
            PoolStorage::Frame(storage) => storage.clear_all(),
        };
        if dropped > 0 {
            self.version += 1;
        }
        dropped
    }

    fn collect_entities(&self, out: &mut Vec<EntityId>) {
        match &self.storage {
            PoolStorage::Single(storage) => storage.collect_entities(out),
            PoolStorage::Multi(storage) => storage.collect_entities(out),
            PoolStorage::Singleton(_) => {
                panic!("framework BUG: singleton pools are not iterable")
            }
            PoolStorage::Frame(storage) => storage.collect_entities(out),
        }
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
