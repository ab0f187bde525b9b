use crate::component::ComponentType;
use crate::component::StorageKind;
use crate::internal::pool::AnyPool;
use crate::internal::pool::Pool;
use std::any::type_name;
use std::any::TypeId;
use std::collections::HashMap;

/// Build-time manifest of component kinds.
///
/// Registration happens before world construction and fixes the dense type
/// index of every kind; `World::new` consumes the registry and allocates one
/// pool per record. Kinds cannot be added to a live world.
pub struct Registry {
    kinds: Vec<KindRecord>,
    by_type_id: HashMap<TypeId, ComponentType>,
}

pub(crate) struct KindRecord {
    pub(crate) name: &'static str,
    pub(crate) storage: StorageKind,
    new_pool: fn(StorageKind) -> Box<dyn AnyPool>,
}

impl KindRecord {
    pub(crate) fn instantiate(&self) -> Box<dyn AnyPool> {
        (self.new_pool)(self.storage)
    }
}

fn make_pool<T: 'static>(storage: StorageKind) -> Box<dyn AnyPool> {
    Box::new(Pool::<T>::new(storage))
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            kinds: vec![],
            by_type_id: HashMap::new(),
        }
    }

    pub fn register<T: 'static>(&mut self, storage: StorageKind) -> &mut Registry {
        let type_id = TypeId::of::<T>();
        assert!(
            !self.by_type_id.contains_key(&type_id),
            "attempt to register the same component kind twice: {}",
            type_name::<T>()
        );
        assert!(
            self.kinds.len() < u16::MAX as usize,
            "component kind limit exceeded"
        );
        let kind = ComponentType {
            index: self.kinds.len() as u16,
        };
        self.by_type_id.insert(type_id, kind);
        self.kinds.push(KindRecord {
            name: type_name::<T>(),
            storage,
            new_pool: make_pool::<T>,
        });
        self
    }

    pub fn single<T: 'static>(&mut self) -> &mut Registry {
        self.register::<T>(StorageKind::Single)
    }

    pub fn multiple<T: 'static>(&mut self) -> &mut Registry {
        self.register::<T>(StorageKind::Multiple)
    }

    pub fn singleton<T: 'static>(&mut self) -> &mut Registry {
        self.register::<T>(StorageKind::Singleton)
    }

    /// Checked, one-instance-per-entity single-frame kind. Use
    /// [`Registry::register`] directly for the multiple or unchecked
    /// variants.
    pub fn single_frame<T: 'static>(&mut self) -> &mut Registry {
        self.register::<T>(StorageKind::SingleFrame {
            multiple: false,
            check: true,
        })
    }

    pub fn kind_of<T: 'static>(&self) -> Option<ComponentType> {
        self.by_type_id.get(&TypeId::of::<T>()).copied()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kind_name(&self, kind: ComponentType) -> &'static str {
        self.record(kind).name
    }

    pub fn storage_of(&self, kind: ComponentType) -> StorageKind {
        self.record(kind).storage
    }

    pub(crate) fn record(&self, kind: ComponentType) -> &KindRecord {
        self.kinds
            .get(kind.index())
            .expect("framework BUG: component kind outside the registry")
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &KindRecord> {
        self.kinds.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn indices_follow_registration_order() {
        let mut registry = Registry::new();
        registry.single::<A>().multiple::<B>();
        assert_eq!(registry.kind_of::<A>(), Some(ComponentType { index: 0 }));
        assert_eq!(registry.kind_of::<B>(), Some(ComponentType { index: 1 }));
        assert_eq!(registry.kind_of::<u32>(), None);
        assert!(registry.storage_of(ComponentType { index: 1 }).is_multiple());
    }

    #[test]
    #[should_panic(expected = "attempt to register the same component kind twice")]
    fn duplicate_registration_panics() {
        let mut registry = Registry::new();
        registry.single::<A>().single::<A>();
    }
}
