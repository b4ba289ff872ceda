//! Goblins wander a cave picking up potions.
//!
//! Run with: `RUST_LOG=cairn_entity=debug cargo run --example goblin_cave`

use std::any::Any;

use anyhow::Context;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use cairn_engine::prelude::*;

const WIDTH: i32 = 24;
const HEIGHT: i32 = 12;

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
struct Healing {
    amount: i32,
}

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

/// Step every living scavenger one tile toward the closest item on its map.
fn seek_items(world: &World, cmds: &mut CommandBuffer) {
    for (id, entity) in world.entities() {
        if !entity.is_alive() || entity.parent().and_then(Owner::map).is_none() {
            continue;
        }
        let Ok(map) = world.gamemap(id) else {
            continue;
        };
        let Ok(members) = world.members(Owner::Map(map)) else {
            continue;
        };
        let (x, y) = entity.position();
        let mut items: Vec<(i32, EntityId)> = members
            .iter()
            .filter_map(|item| {
                let record = world.get(*item)?;
                record.item()?;
                let (ix, iy) = record.position();
                Some(((ix - x).abs() + (iy - y).abs(), *item))
            })
            .collect();
        items.sort();
        if let Some((_, target)) = items.first() {
            if let Some((tx, ty)) = world.get(*target).map(Entity::position) {
                cmds.move_by(id, (tx - x).signum(), (ty - y).signum(), "seek item");
            }
        }
    }
}

/// Living scavengers pick up whatever lies on their tile, capacity allowing.
fn pick_up(world: &World, cmds: &mut CommandBuffer) {
    for (id, entity) in world.entities() {
        let Some(parts) = entity.actor() else {
            continue;
        };
        if !parts.is_alive() || parts.inventory().is_full() {
            continue;
        }
        let Some(Owner::Map(map)) = entity.parent() else {
            continue;
        };
        let (x, y) = entity.position();
        let Ok(here) = world.entities_at(map, x, y) else {
            continue;
        };
        if let Some(item) = here
            .into_iter()
            .find(|e| world.get(*e).is_some_and(|r| r.item().is_some()))
        {
            cmds.place(item, x, y, Some(Owner::Inventory(id)), "pick up");
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    init_tracing("warn");

    let goblin = ActorBuilder::new('g', Rgb(63, 127, 63), "Goblin")
        .ai(Scavenger)
        .fighter(Fighter::new(10, 0, 3))
        .inventory(Inventory::new(3))
        .build()
        .context("building goblin prototype")?;
    let potion = ItemBuilder::new('!', Rgb(127, 0, 255), "Health Potion")
        .consumable(Healing { amount: 4 })
        .build()
        .context("building potion prototype")?;

    let mut world = World::new();
    let cave = world.add_map(WIDTH, HEIGHT);
    let mut rng = Pcg64::seed_from_u64(0xCA1E);

    for _ in 0..3 {
        let (x, y) = (rng.gen_range(0..WIDTH), rng.gen_range(0..HEIGHT));
        goblin.spawn(&mut world, Owner::Map(cave), x, y)?;
    }
    for _ in 0..8 {
        let (x, y) = (rng.gen_range(0..WIDTH), rng.gen_range(0..HEIGHT));
        potion.spawn(&mut world, Owner::Map(cave), x, y)?;
    }

    let config = TurnConfig {
        turn_limit: Some(40),
        ..Default::default()
    };
    let mut turns = TurnLoop::new(world, config);
    turns.add_system("seek_items", seek_items);
    turns.add_system_after("pick_up", &["seek_items"], pick_up);
    turns.run_turns(u64::MAX);

    let world = turns.world();
    for (id, entity) in world.entities() {
        if let Some(parts) = entity.actor() {
            let healing: i32 = parts
                .inventory()
                .entities()
                .filter_map(|item| world.get(*item)?.item())
                .filter_map(|p| p.consumable().as_any().downcast_ref::<Healing>())
                .map(|h| h.amount)
                .sum();
            println!(
                "{} {id} at {:?} carries {} items ({healing} hp of healing)",
                entity.name(),
                entity.position(),
                parts.inventory().len(),
            );
        }
    }
    let left = world
        .members(Owner::Map(cave))?
        .iter()
        .filter(|e| world.get(**e).is_some_and(|r| r.item().is_some()))
        .count();
    println!("{left} potions left on the floor after {} turns", turns.turn_count());
    println!("state hash {}", turns.state_hash()?);
    Ok(())
}
