//! Cairn engine: the turn loop that drives a [`cairn_entity`] world.
//!
//! Systems read the world and queue ownership mutations into a
//! [`CommandBuffer`](cairn_entity::command::CommandBuffer); the
//! [`TurnLoop`](turn::TurnLoop) applies them in order and audits ownership
//! after every turn.
//!
//! # Quick Start
//!
//! ```
//! use cairn_engine::prelude::*;
//!
//! let mut world = World::new();
//! let cave = world.add_map(80, 45);
//! let rock = Entity::new(PositionedObject::new('*', Rgb::WHITE, "Rock"));
//! world.spawn(&rock, Owner::Map(cave), 3, 4).unwrap();
//!
//! let mut turns = TurnLoop::new(world, TurnConfig::default());
//! turns.add_system("idle", |_world, _cmds| {});
//! turns.run_turns(5);
//! assert_eq!(turns.turn_count(), 5);
//! assert!(turns.last_diagnostics().violations.is_empty());
//! ```

#![deny(unsafe_code)]

pub mod logging;
pub mod turn;

/// Re-export the entity crate for convenience.
pub use cairn_entity;

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use cairn_entity::prelude::*;

    pub use crate::logging::init_tracing;
    pub use crate::turn::{SystemFn, TurnConfig, TurnDiagnostics, TurnLoop};
}
