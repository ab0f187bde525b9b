use crate::component::ComponentType;
use crate::internal::pool::AnyPool;
use crate::registry::Registry;
use log::info;
use std::cell::RefCell;

/// The world's pool table: one storage cell per registered kind, addressed
/// by the kind's dense index. Built once from the registry; the set of
/// pools never changes afterwards.
pub(crate) struct PoolTable {
    cells: Vec<RefCell<Box<dyn AnyPool>>>,
}

impl PoolTable {
    pub(crate) fn build(registry: &Registry) -> PoolTable {
        let mut cells = Vec::with_capacity(registry.len());
        for record in registry.records() {
            info!("initialize pool {} ({:?})", record.name, record.storage);
            cells.push(RefCell::new(record.instantiate()));
        }
        PoolTable { cells }
    }

    /// Every registered kind has a pool from construction on; anything else
    /// is a framework bug.
    pub(crate) fn cell(&self, kind: ComponentType) -> &RefCell<Box<dyn AnyPool>> {
        self.cells
            .get(kind.index())
            .expect("framework BUG: pool not initialized")
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &RefCell<Box<dyn AnyPool>>> {
        self.cells.iter()
    }

    pub(crate) fn iter_keyed(
        &self,
    ) -> impl Iterator<Item = (ComponentType, &RefCell<Box<dyn AnyPool>>)> {
        self.cells.iter().enumerate().map(|(index, cell)| {
            (
                ComponentType {
                    index: index as u16,
                },
                cell,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn cells_follow_registry_order() {
        let mut registry = Registry::new();
        registry.single::<A>().multiple::<B>();
        let table = PoolTable::build(&registry);

        let kinds: Vec<ComponentType> = table.iter_keyed().map(|(kind, _)| kind).collect();
        assert_eq!(
            kinds,
            vec![ComponentType { index: 0 }, ComponentType { index: 1 }]
        );
        assert!(table.cell(kinds[1]).borrow().storage_kind().is_multiple());
        assert!(!table.cell(kinds[0]).borrow().storage_kind().is_multiple());
    }
}
