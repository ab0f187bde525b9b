use ctor::ctor;
use kinema::ComponentError;
use kinema::EcsError;
use kinema::Registry;
use kinema::StorageKind;
use kinema::SystemsGroup;
use kinema::World;

#[derive(Debug, PartialEq)]
struct Position {
    x: i32,
}

#[derive(Debug, PartialEq)]
struct DamageEvent {
    amount: i32,
}

#[derive(Debug, PartialEq)]
struct CollisionEvent {
    other: u64,
}

#[ctor]
fn init_logging() {
    let _ = log4rs::init_file("tests/log4rs.test.yaml", Default::default());
}

fn new_world() -> World {
    let mut registry = Registry::new();
    registry
        .single::<Position>()
        .single_frame::<DamageEvent>()
        .register::<CollisionEvent>(StorageKind::SingleFrame {
            multiple: true,
            check: true,
        });
    World::new(registry)
}

#[test]
fn unarmed_world_permits_single_frame_adds() {
    let world = new_world();
    world.new_entity().add(DamageEvent { amount: 1 }).unwrap();
    assert!(world.component_exists::<DamageEvent>());

    // manual embedding: the host clears frame kinds itself
    world.clear_single_frame();
    assert!(!world.component_exists::<DamageEvent>());
}

#[test]
fn checked_kind_without_remover_fails_after_init() {
    let world = new_world();
    let mut group = SystemsGroup::new("root");
    group.init(&world);

    assert_eq!(
        world.new_entity().add(DamageEvent { amount: 1 }),
        Err(EcsError::Component(ComponentError::MissingCleanup))
    );
    assert_eq!(
        world.new_entity().set(DamageEvent { amount: 1 }),
        Err(EcsError::Component(ComponentError::MissingCleanup))
    );
    assert!(!world.component_exists::<DamageEvent>());
}

#[test]
fn scheduled_remover_unlocks_the_kind_and_drains_it() {
    let world = new_world();
    let mut group = SystemsGroup::new("root")
        .remove_single_frame::<DamageEvent>()
        .remove_single_frame::<CollisionEvent>();
    group.init(&world);

    let entity = world.new_entity();
    entity.add(DamageEvent { amount: 5 }).unwrap();
    entity.add(CollisionEvent { other: 1 }).unwrap();
    entity.add(CollisionEvent { other: 2 }).unwrap();
    assert!(world.component_exists::<DamageEvent>());
    assert!(world.component_exists::<CollisionEvent>());

    group.execute(&world);
    assert!(!world.component_exists::<DamageEvent>());
    assert!(!world.component_exists::<CollisionEvent>());
    assert!(!entity.has::<DamageEvent>());
    assert!(!entity.has::<CollisionEvent>());
}

#[test]
fn remover_inside_a_nested_group_counts() {
    let world = new_world();
    let cleanup = SystemsGroup::new("cleanup")
        .remove_single_frame::<DamageEvent>()
        .remove_single_frame::<CollisionEvent>();
    let mut root = SystemsGroup::new("root").add_group(cleanup);
    root.init(&world);

    world.new_entity().add(DamageEvent { amount: 1 }).unwrap();
    root.execute(&world);
    assert!(!world.component_exists::<DamageEvent>());
}

#[test]
fn partial_cleanup_only_unlocks_the_cleared_kind() {
    let world = new_world();
    let mut group = SystemsGroup::new("root").remove_single_frame::<DamageEvent>();
    group.init(&world);

    world.new_entity().add(DamageEvent { amount: 1 }).unwrap();
    assert_eq!(
        world.new_entity().add(CollisionEvent { other: 7 }),
        Err(EcsError::Component(ComponentError::MissingCleanup))
    );
}

#[test]
fn unchecked_kinds_skip_the_cleanup_check() {
    #[derive(Debug)]
    struct Scratch {
        #[allow(dead_code)]
        value: i32,
    }

    let mut registry = Registry::new();
    registry.register::<Scratch>(StorageKind::SingleFrame {
        multiple: false,
        check: false,
    });
    let world = World::new(registry);

    let mut group = SystemsGroup::new("root");
    group.init(&world);

    world.new_entity().add(Scratch { value: 1 }).unwrap();
    assert!(world.component_exists::<Scratch>());
    world.clear_single_frame();
    assert!(!world.component_exists::<Scratch>());
}

#[test]
fn frame_kind_reappears_next_frame_after_drain() {
    let world = new_world();
    let mut group = SystemsGroup::new("root")
        .remove_single_frame::<DamageEvent>()
        .remove_single_frame::<CollisionEvent>();
    group.init(&world);

    for _ in 0..3 {
        let entity = world.new_entity();
        entity.add(DamageEvent { amount: 1 }).unwrap();
        assert_eq!(entity.get::<DamageEvent>().unwrap().amount, 1);
        group.execute(&world);
        assert!(!entity.has::<DamageEvent>());
    }
}

#[test]
fn single_frame_remove_before_drain_is_idempotent() {
    let world = new_world();
    let entity = world.new_entity();
    entity.add(DamageEvent { amount: 2 }).unwrap();
    entity.remove::<DamageEvent>();
    entity.remove::<DamageEvent>();
    assert!(!entity.has::<DamageEvent>());
    assert!(!world.component_exists::<DamageEvent>());

    // a fresh instance in the same frame is fine
    entity.add(DamageEvent { amount: 3 }).unwrap();
    assert_eq!(entity.get::<DamageEvent>().unwrap().amount, 3);
}
