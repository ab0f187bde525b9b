use crate::component::ComponentType;
use crate::entity::Entity;
use crate::filter::Filter;
use crate::world::World;
use log::debug;
use log::warn;
use std::any::type_name;
use std::marker::PhantomData;

/// A unit of frame logic with lifecycle hooks. All hooks are optional;
/// a system exposing `filter` gets `process` called once per match before
/// its own `execute`.
#[allow(unused_variables)]
pub trait System: 'static {
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Called once, in declaration order, when the owning group initializes.
    fn init(&mut self, world: &World) {}

    /// Built once during group init; the group caches the result.
    fn filter(&self, world: &World) -> Option<Filter> {
        None
    }

    /// Called for every entity matched by the cached filter, before
    /// `execute`, every frame.
    fn process(&mut self, entity: Entity) {}

    /// Called once per frame after `process` runs for all matches.
    fn execute(&mut self, world: &World) {}

    /// Called once, in reverse declaration order, when the group tears down.
    fn teardown(&mut self, world: &World) {}

    /// Inactive systems are skipped entirely during `execute`.
    fn active(&self) -> bool {
        true
    }

    /// Implemented by bulk-remove systems so the single-frame checker can
    /// collect the kinds they clear.
    fn cleared_single_frame(&self, world: &World) -> Option<ComponentType> {
        None
    }
}

enum Member {
    System {
        system: Box<dyn System>,
        filter: Option<Filter>,
    },
    Group(SystemsGroup),
}

/// Ordered composition of systems and sub-groups. Drives time: one `init`,
/// `execute` once per frame, one `teardown`. Members run strictly in
/// declaration order; teardown reverses it.
pub struct SystemsGroup {
    name: String,
    active: bool,
    frames: u64,
    members: Vec<Member>,
}

impl SystemsGroup {
    pub fn new(name: impl Into<String>) -> SystemsGroup {
        SystemsGroup {
            name: name.into(),
            active: true,
            frames: 0,
            members: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add(mut self, system: impl System) -> SystemsGroup {
        self.members.push(Member::System {
            system: Box::new(system),
            filter: None,
        });
        self
    }

    pub fn add_group(mut self, group: SystemsGroup) -> SystemsGroup {
        self.members.push(Member::Group(group));
        self
    }

    /// Schedules a built-in system whose `execute` bulk-clears the
    /// single-frame kind `T` at this position in the group.
    pub fn remove_single_frame<T: 'static>(self) -> SystemsGroup {
        self.add(SingleFrameRemover::<T> { pd: PhantomData })
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Initializes members in declaration order, caching their filters,
    /// then arms the world's single-frame check. Call on the top-level
    /// group only; nested groups are reached through the recursion.
    pub fn init(&mut self, world: &World) {
        debug!("initializing systems group {}", self.name);
        self.init_members(world);
        let mut cleared = vec![];
        self.collect_cleared_kinds(world, &mut cleared);
        world.arm_single_frame(cleared);
    }

    fn init_members(&mut self, world: &World) {
        for member in &mut self.members {
            match member {
                Member::System { system, filter } => {
                    debug!("initializing system {}", system.name());
                    system.init(world);
                    *filter = system.filter(world);
                }
                Member::Group(group) => {
                    debug!("initializing systems group {}", group.name);
                    group.init_members(world);
                }
            }
        }
    }

    fn collect_cleared_kinds(&self, world: &World, out: &mut Vec<ComponentType>) {
        for member in &self.members {
            match member {
                Member::System { system, .. } => {
                    if let Some(kind) = system.cleared_single_frame(world) {
                        if !world.storage_of(kind).is_single_frame() {
                            warn!(
                                "bulk-remove system registered for non-single-frame kind {}",
                                world.kind_name(kind)
                            );
                        }
                        out.push(kind);
                    }
                }
                Member::Group(group) => group.collect_cleared_kinds(world, out),
            }
        }
    }

    /// One frame: per member in declaration order, iterate the cached
    /// filter calling `process`, then call `execute`. Inactive members are
    /// skipped.
    pub fn execute(&mut self, world: &World) {
        if !self.active {
            return;
        }
        self.frames += 1;
        log_mdc::insert("frame", self.frames.to_string());
        for member in &mut self.members {
            match member {
                Member::System { system, filter } => {
                    if !system.active() {
                        continue;
                    }
                    if let Some(filter) = filter {
                        filter.each(world, |entity| system.process(entity));
                    }
                    system.execute(world);
                }
                Member::Group(group) => group.execute(world),
            }
        }
    }

    /// Members in reverse declaration order, recursively.
    pub fn teardown(&mut self, world: &World) {
        debug!("tearing down systems group {}", self.name);
        for member in self.members.iter_mut().rev() {
            match member {
                Member::System { system, .. } => {
                    debug!("tearing down system {}", system.name());
                    system.teardown(world);
                }
                Member::Group(group) => group.teardown(world),
            }
        }
    }
}

/// Built-in bulk remover scheduled by
/// [`SystemsGroup::remove_single_frame`].
struct SingleFrameRemover<T: 'static> {
    pd: PhantomData<T>,
}

impl<T: 'static> System for SingleFrameRemover<T> {
    fn execute(&mut self, world: &World) {
        world.clear_kind(world.kind_of::<T>());
    }

    fn cleared_single_frame(&self, world: &World) -> Option<ComponentType> {
        Some(world.kind_of::<T>())
    }
}
