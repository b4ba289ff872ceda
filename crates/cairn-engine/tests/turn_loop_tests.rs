//! Turn loop integration: systems queue ownership changes, the loop applies
//! them, and identical setups hash identically.

use std::any::Any;

use cairn_engine::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Scavenger;

impl Ai for Scavenger {
    fn label(&self) -> &str {
        "scavenger"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
struct Healing;

impl Consumable for Healing {
    fn label(&self) -> &str {
        "healing"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn goblin(capacity: usize) -> Entity {
    ActorBuilder::new('g', Rgb(63, 127, 63), "Goblin")
        .ai(Scavenger)
        .fighter(Fighter::new(10, 0, 3))
        .inventory(Inventory::new(capacity))
        .build()
        .unwrap()
}

fn potion() -> Entity {
    ItemBuilder::new('!', Rgb(127, 0, 255), "Health Potion")
        .consumable(Healing)
        .build()
        .unwrap()
}

// -- Systems ----------------------------------------------------------------

/// Living actors walk east until the map edge.
fn walk_east(world: &World, cmds: &mut CommandBuffer) {
    for (id, entity) in world.entities() {
        let Some(Owner::Map(map)) = entity.parent() else {
            continue;
        };
        let (x, y) = entity.position();
        let inside = world.map(map).is_some_and(|m| m.in_bounds(x + 1, y));
        if entity.is_alive() && inside {
            cmds.move_by(id, 1, 0, "walk east");
        }
    }
}

/// Living actors pick up one item from their tile.
fn pick_up(world: &World, cmds: &mut CommandBuffer) {
    for (id, entity) in world.entities() {
        let Some(parts) = entity.actor() else {
            continue;
        };
        let Some(Owner::Map(map)) = entity.parent() else {
            continue;
        };
        if !parts.is_alive() || parts.inventory().is_full() {
            continue;
        }
        let (x, y) = entity.position();
        let here = world.entities_at(map, x, y).unwrap_or_default();
        if let Some(item) = here
            .into_iter()
            .find(|e| world.get(*e).is_some_and(|r| r.item().is_some()))
        {
            cmds.place(item, x, y, Some(Owner::Inventory(id)), "pick up");
        }
    }
}

/// Full actors drop everything and die of exhaustion.
fn exhaust(world: &World, cmds: &mut CommandBuffer) {
    for (id, entity) in world.entities() {
        let Some(parts) = entity.actor() else {
            continue;
        };
        if !parts.is_alive() || !parts.inventory().is_full() {
            continue;
        }
        let Some(Owner::Map(map)) = entity.parent() else {
            continue;
        };
        let (x, y) = entity.position();
        let mut carried: Vec<EntityId> = parts.inventory().entities().copied().collect();
        carried.sort();
        for item in carried {
            cmds.place(item, x, y, Some(Owner::Map(map)), "drop");
        }
        cmds.kill(id, "exhausted");
    }
}

fn build_loop(goblins: &[(i32, i32)], potions: &[(i32, i32)]) -> TurnLoop {
    let mut world = World::new();
    let map = world.add_map(16, 8);
    for (x, y) in goblins {
        world.spawn(&goblin(2), Owner::Map(map), *x, *y).unwrap();
    }
    for (x, y) in potions {
        world.spawn(&potion(), Owner::Map(map), *x, *y).unwrap();
    }
    let mut turns = TurnLoop::new(world, TurnConfig::default());
    turns.add_system("walk_east", walk_east);
    turns.add_system_after("pick_up", &["walk_east"], pick_up);
    turns.add_system_after("exhaust", &["pick_up"], exhaust);
    turns
}

// -- Tests ------------------------------------------------------------------

#[test]
fn goblin_collects_items_along_its_row() {
    let mut turns = build_loop(&[(0, 3)], &[(2, 3), (5, 3), (9, 3)]);
    turns.run_turns(3);

    let world = turns.world();
    let (g, _) = world
        .entities()
        .into_iter()
        .find(|(_, e)| e.actor().is_some())
        .unwrap();
    let bag = world.members(Owner::Inventory(g)).unwrap();
    assert_eq!(bag.len(), 1);
    let picked = *bag.iter().next().unwrap();
    assert_eq!(world.gamemap(picked), world.gamemap(g));
    assert!(world.check_integrity().is_empty());
}

#[test]
fn full_goblin_drops_its_load_and_dies() {
    let mut turns = build_loop(&[(0, 1)], &[(1, 1), (2, 1)]);
    // Turns 2 and 3 pick up, turn 4 finds the bag full and drops it.
    turns.run_turns(4);

    let world = turns.world();
    let (g, goblin) = world
        .entities()
        .into_iter()
        .find(|(_, e)| e.actor().is_some())
        .unwrap();
    assert!(!goblin.is_alive());
    assert!(world.members(Owner::Inventory(g)).unwrap().is_empty());
    let map = world.gamemap(g).unwrap();
    // Two potions and the corpse.
    assert_eq!(world.members(Owner::Map(map)).unwrap().len(), 3);
    assert!(turns.last_diagnostics().violations.is_empty());

    // Dead goblins stay put.
    let pos = goblin.position();
    turns.run_turns(5);
    assert_eq!(turns.world().entity(g).unwrap().position(), pos);
}

#[test]
fn identical_setups_hash_identically() {
    let goblins = [(0, 0), (3, 2), (7, 5)];
    let potions = [(4, 0), (5, 2), (8, 5), (12, 5)];

    let mut a = build_loop(&goblins, &potions);
    let mut b = build_loop(&goblins, &potions);
    a.run_turns(20);
    b.run_turns(20);

    assert_eq!(a.state_hash().unwrap(), b.state_hash().unwrap());
    assert_eq!(
        a.world().ownership_report(),
        b.world().ownership_report()
    );
}

#[test]
fn turn_limit_caps_run_turns() {
    let mut world = World::new();
    world.add_map(4, 4);
    let config = TurnConfig {
        turn_limit: Some(3),
        ..Default::default()
    };
    let mut turns = TurnLoop::new(world, config);
    turns.add_system("walk_east", walk_east);
    turns.run_turns(100);
    assert_eq!(turns.turn_count(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn random_layouts_stay_consistent(
        goblins in prop::collection::vec((0..16i32, 0..8i32), 0..6),
        potions in prop::collection::vec((0..16i32, 0..8i32), 0..12),
        turns_to_run in 1..30u64,
    ) {
        let mut turns = build_loop(&goblins, &potions);
        turns.run_turns(turns_to_run);
        prop_assert!(turns.world().check_integrity().is_empty());
        prop_assert_eq!(turns.world().entity_count(), goblins.len() + potions.len());

        let mut again = build_loop(&goblins, &potions);
        again.run_turns(turns_to_run);
        prop_assert_eq!(turns.state_hash().unwrap(), again.state_hash().unwrap());
    }
}
