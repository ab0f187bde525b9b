use crate::component::ComponentType;
use crate::entity::Entity;
use crate::entity::EntityId;
use crate::world::World;
use crate::world_result::EcsResult;
use crate::world_result::IllegalFilterError;
use std::fmt::Display;
use std::fmt::Formatter;
use tinyvec::tiny_vec;
use tinyvec::TinyVec;
use to_vec::ToVec;

type KindSet = TinyVec<[ComponentType; 8]>;
type SelectFn = Box<dyn Fn(Entity) -> bool>;

/// Chain-built filter configuration. Clauses accumulate; `build` validates
/// and freezes them into a [`Filter`].
pub struct FilterBuilder<'w> {
    world: &'w World,
    required: KindSet,
    any_groups: Vec<Vec<ComponentType>>,
    excluded: KindSet,
    selects: Vec<SelectFn>,
}

impl<'w> FilterBuilder<'w> {
    pub(crate) fn new(world: &'w World) -> FilterBuilder<'w> {
        FilterBuilder {
            world,
            required: tiny_vec!(),
            any_groups: vec![],
            excluded: tiny_vec!(),
            selects: vec![],
        }
    }

    /// Shorthand for a one-kind `all_of`.
    pub fn of<T: 'static>(mut self) -> Self {
        self.required.push(self.world.kind_of::<T>());
        self
    }

    /// Every kind in the set must be present. An empty set adds no
    /// constraint.
    pub fn all_of(mut self, kinds: &[ComponentType]) -> Self {
        self.required.extend(kinds.iter().copied());
        self
    }

    /// At least one kind in the set must be present. Multiple `any_of`
    /// clauses AND together; an empty set adds no constraint.
    pub fn any_of(mut self, kinds: &[ComponentType]) -> Self {
        match kinds {
            [] => {}
            [kind] => self.required.push(*kind),
            _ => self.any_groups.push(kinds.to_vec()),
        }
        self
    }

    pub fn exclude<T: 'static>(mut self) -> Self {
        self.excluded.push(self.world.kind_of::<T>());
        self
    }

    /// None of the kinds in the set may be present.
    pub fn exclude_all(mut self, kinds: &[ComponentType]) -> Self {
        self.excluded.extend(kinds.iter().copied());
        self
    }

    /// User predicate, evaluated after all membership clauses pass.
    pub fn select(mut self, predicate: impl Fn(Entity) -> bool + 'static) -> Self {
        self.selects.push(Box::new(predicate));
        self
    }

    pub fn build(self) -> EcsResult<Filter> {
        let FilterBuilder {
            world,
            mut required,
            any_groups,
            mut excluded,
            selects,
        } = self;
        sort_dedup(&mut required);
        sort_dedup(&mut excluded);

        let mut include_kinds: KindSet = required.iter().copied().collect();
        for group in &any_groups {
            include_kinds.extend(group.iter().copied());
        }
        sort_dedup(&mut include_kinds);

        let mut multiple_kinds = 0;
        for &kind in include_kinds.iter() {
            let storage = world.storage_of(kind);
            if storage.is_singleton() {
                return Err(IllegalFilterError::SingletonNotIterable.into());
            }
            if storage.is_multiple() {
                multiple_kinds += 1;
            }
        }
        if multiple_kinds > 1 {
            return Err(IllegalFilterError::TooManyMultipleKinds.into());
        }
        for &kind in excluded.iter() {
            if world.storage_of(kind).is_singleton() {
                return Err(IllegalFilterError::SingletonNotIterable.into());
            }
        }

        let multi_driver = required
            .iter()
            .copied()
            .find(|&kind| world.storage_of(kind).is_multiple());

        Ok(Filter {
            required,
            any_groups,
            excluded,
            selects,
            multi_driver,
        })
    }
}

/// Immutable predicate over entity component membership.
///
/// A filter holds no world reference; it borrows the world's pools for the
/// duration of each call, which lets system groups cache filters for the
/// lifetime of the group.
pub struct Filter {
    required: KindSet,
    any_groups: Vec<Vec<ComponentType>>,
    excluded: KindSet,
    selects: Vec<SelectFn>,
    /// The one permitted `Multiple` kind in the required set; forced to be
    /// the driver so iteration yields a visit per stored instance.
    multi_driver: Option<ComponentType>,
}

impl Filter {
    pub fn each(&self, world: &World, mut visitor: impl FnMut(Entity)) {
        self.drive(world, &mut |entity| {
            visitor(entity);
            true
        });
    }

    /// First match, or None.
    pub fn find_entity<'w>(&self, world: &'w World) -> Option<Entity<'w>> {
        let mut found = None;
        self.drive(world, &mut |entity| {
            found = Some(entity.id());
            false
        });
        found.map(|id| world.entity(id))
    }

    /// Number of visits — one per matched entity, or one per stored
    /// instance when the required set names a `Multiple` kind.
    pub fn count(&self, world: &World) -> usize {
        let mut count = 0;
        self.drive(world, &mut |_| {
            count += 1;
            true
        });
        count
    }

    fn drive(&self, world: &World, visitor: &mut dyn FnMut(Entity) -> bool) {
        let mut candidates = world.take_scratch();
        let mut watched: KindSet = tiny_vec!();
        self.collect_candidates(world, &mut candidates, &mut watched);
        let versions: TinyVec<[u64; 8]> = watched
            .iter()
            .map(|&kind| world.pool_version(kind))
            .collect();

        for &id in candidates.iter() {
            if !self.matches(world, id) {
                continue;
            }
            let keep_going = visitor(Entity { world, id });
            for (watched_kind, version) in watched.iter().zip(versions.iter()) {
                debug_assert_eq!(
                    world.pool_version(*watched_kind),
                    *version,
                    "component kind {} mutated while a filter was iterating it",
                    world.kind_name(*watched_kind)
                );
            }
            if !keep_going {
                break;
            }
        }
        world.put_scratch(candidates);
    }

    /// Snapshots the driver pool into `candidates`: the required `Multiple`
    /// kind if any, else the smallest required pool, else the union of the
    /// cheapest disjunction, else every allocated id.
    fn collect_candidates(
        &self,
        world: &World,
        candidates: &mut Vec<EntityId>,
        watched: &mut KindSet,
    ) {
        if let Some(driver) = self.multi_driver {
            world.collect_kind_entities(driver, candidates);
            watched.push(driver);
            return;
        }
        if !self.required.is_empty() {
            let driver = self
                .required
                .iter()
                .copied()
                .min_by_key(|&kind| world.pool_live(kind))
                .unwrap();
            world.collect_kind_entities(driver, candidates);
            watched.push(driver);
            return;
        }
        if !self.any_groups.is_empty() {
            let group = self
                .any_groups
                .iter()
                .min_by_key(|group| {
                    group
                        .iter()
                        .map(|&kind| world.pool_live(kind))
                        .sum::<usize>()
                })
                .unwrap();
            for &kind in group {
                world.collect_kind_entities(kind, candidates);
                watched.push(kind);
            }
            // an entity holding several kinds of the disjunction must still
            // be visited once
            candidates.sort_unstable();
            candidates.dedup();
            return;
        }
        world.collect_all_entities(candidates);
    }

    fn matches(&self, world: &World, id: EntityId) -> bool {
        for &kind in self.required.iter() {
            if !world.kind_contains(kind, id) {
                return false;
            }
        }
        for group in &self.any_groups {
            if !group.iter().any(|&kind| world.kind_contains(kind, id)) {
                return false;
            }
        }
        for &kind in self.excluded.iter() {
            if world.kind_contains(kind, id) {
                return false;
            }
        }
        // user predicates run last and only on entities that passed every
        // membership clause
        for select in &self.selects {
            if !select(Entity { world, id }) {
                return false;
            }
        }
        true
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "filter( all_of: [{}], any_of: {}, exclude: [{}], selects: {} )",
            self.required
                .iter()
                .map(|kind| format!("{}", kind))
                .to_vec()
                .join(", "),
            self.any_groups.len(),
            self.excluded
                .iter()
                .map(|kind| format!("{}", kind))
                .to_vec()
                .join(", "),
            self.selects.len(),
        )
    }
}

fn sort_dedup(kinds: &mut KindSet) {
    kinds.sort_unstable();
    let mut write = 0;
    for read in 0..kinds.len() {
        if write == 0 || kinds[read] != kinds[write - 1] {
            kinds[write] = kinds[read];
            write += 1;
        }
    }
    kinds.truncate(write);
}
