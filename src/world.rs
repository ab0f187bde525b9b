use crate::component::ComponentType;
use crate::component::StorageKind;
use crate::entity::ComponentMut;
use crate::entity::ComponentRef;
use crate::entity::Entity;
use crate::entity::EntityId;
use crate::filter::FilterBuilder;
use crate::internal::kind_index::KindIndex;
use crate::internal::pool::specialize;
use crate::internal::pool::specialize_mut;
use crate::internal::pool::AnyPool;
use crate::internal::pool_table::PoolTable;
use crate::internal::single_frame::SingleFrameGuard;
use crate::registry::Registry;
use crate::utils::scratch::ScratchArena;
use crate::world_result::ComponentError;
use crate::world_result::EcsResult;
use log::debug;
use log::info;
use log::trace;
use std::any::type_name;
use std::cell::Cell;
use std::cell::Ref;
use std::cell::RefCell;
use std::cell::RefMut;

/// Owner of the entity-id counter, the per-kind pools and the kind-present
/// index. All operations take `&self`; mutation goes through per-pool
/// `RefCell`s, which is what lets handles and filters work off shared
/// references. Single-threaded by design.
pub struct World {
    registry: Registry,
    pools: PoolTable,
    next_entity: Cell<u64>,
    kind_index: RefCell<KindIndex>,
    single_frame: RefCell<SingleFrameGuard>,
    scratch: ScratchArena<EntityId>,
}

impl World {
    pub fn new(registry: Registry) -> World {
        let pools = PoolTable::build(&registry);
        info!("world created with {} component kinds", registry.len());
        World {
            kind_index: RefCell::new(KindIndex::new(registry.len())),
            single_frame: RefCell::new(SingleFrameGuard::new(registry.len())),
            scratch: ScratchArena::new(),
            next_entity: Cell::new(0),
            registry,
            pools,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn kind_of<T: 'static>(&self) -> ComponentType {
        match self.registry.kind_of::<T>() {
            Some(kind) => kind,
            None => panic!("component kind not registered: {}", type_name::<T>()),
        }
    }

    pub fn kind_name(&self, kind: ComponentType) -> &'static str {
        self.registry.kind_name(kind)
    }

    pub(crate) fn storage_of(&self, kind: ComponentType) -> StorageKind {
        self.registry.storage_of(kind)
    }

    pub fn new_entity(&self) -> Entity<'_> {
        let id = EntityId(self.next_entity.get());
        self.next_entity.set(id.0 + 1);
        trace!("entity {} created", id);
        Entity { world: self, id }
    }

    /// Rebinds an id to a handle. Handles to destroyed entities remain
    /// valid; operations through them simply see no components.
    pub fn entity(&self, id: EntityId) -> Entity<'_> {
        Entity { world: self, id }
    }

    /// Number of ids allocated so far.
    pub fn entity_count(&self) -> u64 {
        self.next_entity.get()
    }

    pub fn each_entity(&self, mut visitor: impl FnMut(Entity)) {
        for raw in 0..self.next_entity.get() {
            visitor(Entity {
                world: self,
                id: EntityId(raw),
            });
        }
    }

    pub fn component_exists<T: 'static>(&self) -> bool {
        self.kind_exists(self.kind_of::<T>())
    }

    pub fn kind_exists(&self, kind: ComponentType) -> bool {
        self.kind_index.borrow().exists(kind)
    }

    /// Removes every component from every entity. The id counter keeps
    /// advancing; identifiers are never reissued.
    pub fn delete_all(&self) {
        debug!("deleting all components");
        for cell in self.pools.iter() {
            cell.borrow_mut().clear_all();
        }
        self.kind_index.borrow_mut().reset();
    }

    pub fn clear_single_frame(&self) {
        for (kind, cell) in self.pools.iter_keyed() {
            if cell.borrow().storage_kind().is_single_frame() {
                self.clear_kind(kind);
            }
        }
    }

    pub fn new_filter(&self) -> FilterBuilder<'_> {
        FilterBuilder::new(self)
    }

    /// Reads a singleton value without going through an entity handle.
    pub fn singleton<T: 'static>(&self) -> Option<ComponentRef<'_, T>> {
        self.get_component(EntityId(0))
    }

    pub(crate) fn clear_kind(&self, kind: ComponentType) {
        let dropped = self.pool_cell(kind).borrow_mut().clear_all();
        if dropped > 0 {
            trace!(
                "cleared {} instances of {}",
                dropped,
                self.kind_name(kind)
            );
        }
        self.kind_index.borrow_mut().zero(kind);
    }

    fn pool_cell(&self, kind: ComponentType) -> &RefCell<Box<dyn AnyPool>> {
        self.pools.cell(kind)
    }

    fn check_single_frame(&self, kind: ComponentType) -> EcsResult {
        if self.registry.storage_of(kind).checked_single_frame()
            && !self.single_frame.borrow().permits(kind)
        {
            return Err(ComponentError::MissingCleanup.into());
        }
        Ok(())
    }

    pub(crate) fn arm_single_frame(&self, cleared: impl IntoIterator<Item = ComponentType>) {
        info!("single-frame cleanup check armed");
        self.single_frame.borrow_mut().arm(cleared);
    }

    pub(crate) fn add_component<T: 'static>(&self, id: EntityId, value: T) -> EcsResult {
        let kind = self.kind_of::<T>();
        self.check_single_frame(kind)?;
        {
            let mut pool = self.pool_cell(kind).borrow_mut();
            specialize_mut::<T>(pool.as_mut()).insert(id, value)?;
        }
        self.kind_index.borrow_mut().add(kind, 1);
        trace!("component {} added to entity {}", self.kind_name(kind), id);
        Ok(())
    }

    pub(crate) fn set_component<T: 'static>(&self, id: EntityId, value: T) -> EcsResult {
        let kind = self.kind_of::<T>();
        self.check_single_frame(kind)?;
        let created = {
            let mut pool = self.pool_cell(kind).borrow_mut();
            specialize_mut::<T>(pool.as_mut()).upsert(id, value)?
        };
        if created {
            self.kind_index.borrow_mut().add(kind, 1);
        }
        trace!("component {} set on entity {}", self.kind_name(kind), id);
        Ok(())
    }

    pub(crate) fn update_component<T: 'static>(&self, id: EntityId, value: T) -> EcsResult {
        let kind = self.kind_of::<T>();
        let mut pool = self.pool_cell(kind).borrow_mut();
        specialize_mut::<T>(pool.as_mut()).overwrite(id, value)?;
        Ok(())
    }

    pub(crate) fn replace_component<Old: 'static, New: 'static>(
        &self,
        id: EntityId,
        value: New,
    ) -> EcsResult {
        if !self.has_component::<Old>(id) {
            return Err(ComponentError::Missing.into());
        }
        self.remove_component::<Old>(id);
        self.add_component::<New>(id, value)
    }

    pub(crate) fn remove_component<T: 'static>(&self, id: EntityId) {
        let kind = self.kind_of::<T>();
        let removed = {
            let mut pool = self.pool_cell(kind).borrow_mut();
            specialize_mut::<T>(pool.as_mut()).remove_typed(id)
        };
        if removed > 0 {
            self.kind_index.borrow_mut().sub(kind, removed);
            trace!(
                "component {} removed from entity {}",
                self.kind_name(kind),
                id
            );
        }
    }

    pub(crate) fn destroy_entity(&self, id: EntityId) {
        trace!("destroying entity {}", id);
        for (kind, cell) in self.pools.iter_keyed() {
            let removed = cell.borrow_mut().remove(id);
            if removed > 0 {
                self.kind_index.borrow_mut().sub(kind, removed);
            }
        }
    }

    pub(crate) fn get_component<T: 'static>(&self, id: EntityId) -> Option<ComponentRef<'_, T>> {
        let kind = self.kind_of::<T>();
        let pool = self.pool_cell(kind).borrow();
        let pool = Ref::map(pool, |boxed| specialize::<T>(boxed.as_ref()));
        Ref::filter_map(pool, |pool| pool.get(id))
            .ok()
            .map(|inner| ComponentRef { inner })
    }

    pub(crate) fn get_component_mut<T: 'static>(
        &self,
        id: EntityId,
    ) -> Option<ComponentMut<'_, T>> {
        let kind = self.kind_of::<T>();
        let pool = self.pool_cell(kind).borrow_mut();
        let pool = RefMut::map(pool, |boxed| specialize_mut::<T>(boxed.as_mut()));
        RefMut::filter_map(pool, |pool| pool.get_mut_value(id))
            .ok()
            .map(|inner| ComponentMut { inner })
    }

    pub(crate) fn has_component<T: 'static>(&self, id: EntityId) -> bool {
        self.kind_contains(self.kind_of::<T>(), id)
    }

    pub(crate) fn kind_contains(&self, kind: ComponentType, id: EntityId) -> bool {
        self.pool_cell(kind).borrow().contains(id)
    }

    pub(crate) fn pool_live(&self, kind: ComponentType) -> usize {
        self.pool_cell(kind).borrow().live()
    }

    pub(crate) fn pool_version(&self, kind: ComponentType) -> u64 {
        self.pool_cell(kind).borrow().version()
    }

    pub(crate) fn collect_kind_entities(&self, kind: ComponentType, out: &mut Vec<EntityId>) {
        self.pool_cell(kind).borrow().collect_entities(out);
    }

    pub(crate) fn collect_all_entities(&self, out: &mut Vec<EntityId>) {
        for raw in 0..self.next_entity.get() {
            out.push(EntityId(raw));
        }
    }

    pub(crate) fn take_scratch(&self) -> Vec<EntityId> {
        self.scratch.take()
    }

    pub(crate) fn put_scratch(&self, buffer: Vec<EntityId>) {
        self.scratch.put(buffer);
    }
}
