//! Turn loop for the entity world.
//!
//! Each [`TurnLoop::turn`]:
//!
//! 1. Runs every registered system in declaration order, each with a shared
//!    reference to the [`World`] and a mutable reference to the
//!    [`CommandBuffer`].
//! 2. Applies the command buffer (FIFO).
//! 3. Optionally audits ownership with [`World::check_integrity`].
//! 4. Advances the turn counter.
//!
//! System order is fixed and the buffer applies in insertion order, so the
//! same starting world and systems always produce the same
//! [`state_hash`](TurnLoop::state_hash).
//!
//! # Example
//!
//! ```
//! use cairn_engine::turn::{TurnConfig, TurnLoop};
//! use cairn_entity::prelude::*;
//!
//! let mut turns = TurnLoop::new(World::new(), TurnConfig::default());
//! turns.add_system("ai", |_world, _cmds| {
//!     // decide what to do here
//! });
//!
//! turns.run_turns(10);
//! assert_eq!(turns.turn_count(), 10);
//! ```

use std::time::{Duration, Instant};

use tracing::{error, info};

use cairn_entity::command::{ApplyReport, Command, CommandBuffer};
use cairn_entity::integrity::IntegrityViolation;
use cairn_entity::world::World;

// ---------------------------------------------------------------------------
// TurnConfig
// ---------------------------------------------------------------------------

/// Configuration for the turn loop.
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// Run [`World::check_integrity`] after every turn.
    pub verify_ownership: bool,
    /// Stop advancing once this many turns have run.
    pub turn_limit: Option<u64>,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            verify_ownership: true,
            turn_limit: None,
        }
    }
}

// ---------------------------------------------------------------------------
// TurnDiagnostics
// ---------------------------------------------------------------------------

/// What happened during the last turn.
#[derive(Debug, Clone, Default)]
pub struct TurnDiagnostics {
    /// Wall-clock time per system, in execution order.
    pub system_times: Vec<(String, Duration)>,
    pub total_time: Duration,
    pub command_apply_time: Duration,
    pub apply_report: ApplyReport,
    /// Empty unless `verify_ownership` is on and something is wrong.
    pub violations: Vec<IntegrityViolation>,
}

// ---------------------------------------------------------------------------
// SystemFn
// ---------------------------------------------------------------------------

/// A system reads the world and queues mutations.
pub type SystemFn = fn(&World, &mut CommandBuffer);

#[derive(Debug)]
struct RegisteredSystem {
    name: String,
    func: SystemFn,
}

// ---------------------------------------------------------------------------
// TurnLoop
// ---------------------------------------------------------------------------

/// Drives the world forward one turn at a time.
pub struct TurnLoop {
    world: World,
    command_buffer: CommandBuffer,
    systems: Vec<RegisteredSystem>,
    turn_counter: u64,
    config: TurnConfig,
    last_diagnostics: TurnDiagnostics,
}

impl TurnLoop {
    pub fn new(world: World, config: TurnConfig) -> Self {
        Self {
            world,
            command_buffer: CommandBuffer::new(),
            systems: Vec::new(),
            turn_counter: 0,
            config,
            last_diagnostics: TurnDiagnostics::default(),
        }
    }

    /// Register a system. Systems run in registration order.
    ///
    /// # Panics
    ///
    /// Panics if a system with the same name is already registered.
    pub fn add_system(&mut self, name: &str, func: SystemFn) {
        self.add_system_after(name, &[], func);
    }

    /// Register a system that must run after the systems named in `after`.
    ///
    /// Dependencies must already be registered, so registration order is a
    /// valid run order and no cycle can be declared.
    ///
    /// # Panics
    ///
    /// - If any system in `after` is not already registered.
    /// - If a system with this name already exists.
    pub fn add_system_after(&mut self, name: &str, after: &[&str], func: SystemFn) {
        for dep in after {
            assert!(
                self.systems.iter().any(|s| s.name == *dep),
                "system '{name}' declares dependency on '{dep}', but '{dep}' is not registered"
            );
        }

        assert!(
            !self.systems.iter().any(|s| s.name == name),
            "duplicate system name: {name:?}"
        );

        self.systems.push(RegisteredSystem {
            name: name.to_owned(),
            func,
        });
    }

    /// Whether `turn_limit` has been reached.
    pub fn is_finished(&self) -> bool {
        self.config
            .turn_limit
            .is_some_and(|limit| self.turn_counter >= limit)
    }

    /// Run one turn and return the processed commands, successful or not.
    ///
    /// Does nothing and returns an empty list once the turn limit is reached.
    pub fn turn(&mut self) -> Vec<Command> {
        if self.is_finished() {
            return Vec::new();
        }

        let turn_start = Instant::now();
        let mut system_times = Vec::with_capacity(self.systems.len());

        for system in &self.systems {
            let sys_start = Instant::now();
            (system.func)(&self.world, &mut self.command_buffer);
            system_times.push((system.name.clone(), sys_start.elapsed()));
        }

        let apply_start = Instant::now();
        let applied = self.command_buffer.apply(&mut self.world);
        let command_apply_time = apply_start.elapsed();

        let violations = if self.config.verify_ownership {
            self.world.check_integrity()
        } else {
            Vec::new()
        };
        for violation in &violations {
            error!(turn = self.turn_counter, %violation, "ownership integrity violated");
        }

        self.turn_counter += 1;

        self.last_diagnostics = TurnDiagnostics {
            system_times,
            total_time: turn_start.elapsed(),
            command_apply_time,
            apply_report: self.command_buffer.last_apply_report().clone(),
            violations,
        };

        applied
    }

    /// Run up to `count` turns, stopping early at the turn limit. Returns the
    /// total number of commands processed.
    pub fn run_turns(&mut self, count: u64) -> u64 {
        let mut total_commands = 0u64;
        for _ in 0..count {
            if self.is_finished() {
                info!(turn = self.turn_counter, "turn limit reached");
                break;
            }
            total_commands += self.turn().len() as u64;
        }
        total_commands
    }

    /// blake3 hex digest of the JSON ownership report plus the turn counter.
    ///
    /// # Errors
    ///
    /// Propagates JSON serialization failures.
    pub fn state_hash(&self) -> Result<String, serde_json::Error> {
        #[derive(serde::Serialize)]
        struct HashableState<'a> {
            turn_counter: u64,
            ownership: &'a cairn_entity::integrity::OwnershipReport,
        }

        let report = self.world.ownership_report();
        let json_bytes = serde_json::to_vec(&HashableState {
            turn_counter: self.turn_counter,
            ownership: &report,
        })?;
        Ok(blake3::hash(&json_bytes).to_hex().to_string())
    }

    // -- accessors ----------------------------------------------------------

    pub fn turn_count(&self) -> u64 {
        self.turn_counter
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, for setup and tests. Systems go through
    /// the command buffer.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// The names of all registered systems, in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn last_diagnostics(&self) -> &TurnDiagnostics {
        &self.last_diagnostics
    }

    pub fn config(&self) -> &TurnConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
