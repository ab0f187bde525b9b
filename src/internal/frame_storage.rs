use crate::entity::EntityId;
use crate::internal::sparse::SparseArray;
use crate::internal::sparse::NIL;
use crate::world_result::ComponentError;

/// Storage for single-frame kinds.
///
/// Append-only: slots are never recycled individually. `remove` only unlinks
/// the entity's chain; the dense vector is reclaimed wholesale by
/// `clear_all`, which the frame loop is expected to reach every frame.
struct FrameNode<T> {
    entity: EntityId,
    value: T,
    next: u32,
    alive: bool,
}

pub(crate) struct FrameStorage<T> {
    nodes: Vec<FrameNode<T>>,
    heads: SparseArray,
    multiple: bool,
    live: usize,
}

impl<T> FrameStorage<T> {
    pub(crate) fn new(multiple: bool) -> FrameStorage<T> {
        FrameStorage {
            nodes: vec![],
            heads: SparseArray::new(),
            multiple,
            live: 0,
        }
    }

    pub(crate) fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub(crate) fn contains(&self, entity: EntityId) -> bool {
        self.heads.get(entity) != NIL
    }

    pub(crate) fn live(&self) -> usize {
        self.live
    }

    pub(crate) fn insert(&mut self, entity: EntityId, value: T) -> Result<(), ComponentError> {
        let head = self.heads.get(entity);
        if !self.multiple && head != NIL {
            return Err(ComponentError::AlreadyPresent);
        }
        self.nodes.push(FrameNode {
            entity,
            value,
            next: head,
            alive: true,
        });
        self.heads.set(entity, (self.nodes.len() - 1) as u32);
        self.live += 1;
        Ok(())
    }

    pub(crate) fn get(&self, entity: EntityId) -> Option<&T> {
        let head = self.heads.get(entity);
        if head == NIL {
            return None;
        }
        Some(&self.nodes[head as usize].value)
    }

    pub(crate) fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        let head = self.heads.get(entity);
        if head == NIL {
            return None;
        }
        Some(&mut self.nodes[head as usize].value)
    }

    pub(crate) fn overwrite(&mut self, entity: EntityId, value: T) -> Result<(), ComponentError> {
        match self.get_mut(entity) {
            Some(stored) => {
                *stored = value;
                Ok(())
            }
            None => Err(ComponentError::Missing),
        }
    }

    pub(crate) fn remove(&mut self, entity: EntityId) -> usize {
        let mut cursor = self.heads.get(entity);
        if cursor == NIL {
            return 0;
        }
        let mut removed = 0;
        while cursor != NIL {
            let node = &mut self.nodes[cursor as usize];
            debug_assert!(node.alive, "framework BUG: entity chain reached a dead node");
            node.alive = false;
            removed += 1;
            cursor = node.next;
        }
        self.heads.clear_entry(entity);
        self.live -= removed;
        removed
    }

    pub(crate) fn clear_all(&mut self) -> usize {
        let dropped = self.live;
        for node in &self.nodes {
            self.heads.clear_entry(node.entity);
        }
        self.nodes.clear();
        self.live = 0;
        dropped
    }

    pub(crate) fn collect_entities(&self, out: &mut Vec<EntityId>) {
        for node in &self.nodes {
            if node.alive {
                out.push(node.entity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_unlinks_without_reclaiming() {
        let mut storage: FrameStorage<u32> = FrameStorage::new(false);
        storage.insert(EntityId(0), 1).unwrap();
        storage.insert(EntityId(1), 2).unwrap();
        assert_eq!(storage.remove(EntityId(0)), 1);
        assert!(!storage.contains(EntityId(0)));
        assert_eq!(storage.nodes.len(), 2);
        assert_eq!(storage.live(), 1);

        let mut seen = vec![];
        storage.collect_entities(&mut seen);
        assert_eq!(seen, vec![EntityId(1)]);
    }

    #[test]
    fn clear_resets_dense_and_sparse_state() {
        let mut storage: FrameStorage<u32> = FrameStorage::new(true);
        storage.insert(EntityId(3), 1).unwrap();
        storage.insert(EntityId(3), 2).unwrap();
        storage.insert(EntityId(4), 3).unwrap();
        assert_eq!(storage.clear_all(), 3);
        assert!(!storage.contains(EntityId(3)));
        assert!(!storage.contains(EntityId(4)));
        assert_eq!(storage.nodes.len(), 0);

        storage.insert(EntityId(3), 9).unwrap();
        assert_eq!(storage.get(EntityId(3)), Some(&9));
    }

    #[test]
    fn non_multiple_mode_rejects_second_instance() {
        let mut storage: FrameStorage<u32> = FrameStorage::new(false);
        storage.insert(EntityId(0), 1).unwrap();
        assert_eq!(
            storage.insert(EntityId(0), 2),
            Err(ComponentError::AlreadyPresent)
        );
        storage.remove(EntityId(0));
        storage.insert(EntityId(0), 2).unwrap();
        assert_eq!(storage.get(EntityId(0)), Some(&2));
    }

    #[test]
    fn multiple_mode_chains_instances() {
        let mut storage: FrameStorage<u32> = FrameStorage::new(true);
        storage.insert(EntityId(0), 1).unwrap();
        storage.insert(EntityId(0), 2).unwrap();
        assert_eq!(storage.live(), 2);
        assert_eq!(storage.remove(EntityId(0)), 2);
        assert_eq!(storage.live(), 0);
    }
}
