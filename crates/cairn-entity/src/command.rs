//! Deferred ownership mutations.
//!
//! Turn systems only get `&World`; they queue what they want to happen into
//! a [`CommandBuffer`], which is applied in FIFO order once every system has
//! run. Each command carries a free-text reason so failures in the log say
//! why the mutation was wanted.
//!
//! ```
//! use cairn_entity::prelude::*;
//!
//! let mut world = World::new();
//! let map = world.add_map(20, 20);
//! let rock = Entity::new(PositionedObject::new('*', Rgb::WHITE, "Rock"));
//!
//! let mut cmds = CommandBuffer::new();
//! cmds.spawn(rock, Owner::Map(map), 4, 5, "scatter rubble");
//! let applied = cmds.apply(&mut world);
//!
//! let rock_id = applied[0].spawned_entity.unwrap();
//! assert_eq!(world.entity(rock_id).unwrap().position(), (4, 5));
//! ```

use std::collections::HashMap;

use tracing::warn;

use crate::container::Owner;
use crate::entity::{Entity, EntityId};
use crate::world::World;
use crate::WorldError;

/// What mutation to perform.
#[derive(Debug, Clone)]
pub enum CommandKind {
    /// Deep-clone a prototype into `owner`.
    Spawn {
        prototype: Box<Entity>,
        owner: Owner,
        x: i32,
        y: i32,
    },
    /// Deep-clone the live target (with carried items) into `owner`.
    SpawnFrom { owner: Owner, x: i32, y: i32 },
    /// [`World::place`] the target.
    Place {
        x: i32,
        y: i32,
        owner: Option<Owner>,
    },
    /// [`World::move_by`] the target.
    Move { dx: i32, dy: i32 },
    /// Clear the target's AI.
    Kill,
    /// Remove the target from the world.
    Despawn,
}

impl CommandKind {
    fn needs_target(&self) -> bool {
        !matches!(self, CommandKind::Spawn { .. })
    }

    /// Commands that change who owns the target, or end it.
    fn relocates(&self) -> bool {
        matches!(
            self,
            CommandKind::Place { owner: Some(_), .. } | CommandKind::Despawn
        )
    }
}

/// One deferred mutation plus its bookkeeping.
#[derive(Debug, Clone)]
pub struct Command {
    /// The entity acted on. `None` for [`CommandKind::Spawn`].
    pub target: Option<EntityId>,
    pub kind: CommandKind,
    /// Why the command was issued.
    pub reason: String,
    /// Position within the buffer it was queued in.
    pub command_index: u32,
    /// For spawn commands: the entity created on apply.
    pub spawned_entity: Option<EntityId>,
    /// `false` until applied, and for commands that failed.
    pub applied_successfully: bool,
}

/// Summary of the last [`CommandBuffer::apply`] call.
///
/// `conflict_count` is the number of entities relocated or despawned by more
/// than one command in the same batch. The last one wins; conflicts are
/// warnings, not errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub conflict_count: usize,
    pub failed_count: usize,
    pub success_count: usize,
}

/// Collects commands and applies them in insertion order.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    next_index: u32,
    last_apply_report: ApplyReport,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a deep clone of `prototype` into `owner` at `(x, y)`.
    pub fn spawn(&mut self, prototype: Entity, owner: Owner, x: i32, y: i32, reason: &str) {
        self.push(
            None,
            CommandKind::Spawn {
                prototype: Box::new(prototype),
                owner,
                x,
                y,
            },
            reason,
        );
    }

    /// Queue a deep clone of the live entity `source`.
    pub fn spawn_from(&mut self, source: EntityId, owner: Owner, x: i32, y: i32, reason: &str) {
        self.push(Some(source), CommandKind::SpawnFrom { owner, x, y }, reason);
    }

    pub fn place(
        &mut self,
        target: EntityId,
        x: i32,
        y: i32,
        owner: Option<Owner>,
        reason: &str,
    ) {
        self.push(Some(target), CommandKind::Place { x, y, owner }, reason);
    }

    pub fn move_by(&mut self, target: EntityId, dx: i32, dy: i32, reason: &str) {
        self.push(Some(target), CommandKind::Move { dx, dy }, reason);
    }

    pub fn kill(&mut self, target: EntityId, reason: &str) {
        self.push(Some(target), CommandKind::Kill, reason);
    }

    pub fn despawn(&mut self, target: EntityId, reason: &str) {
        self.push(Some(target), CommandKind::Despawn, reason);
    }

    /// Push a pre-built command, reassigning its index.
    pub fn push_raw(&mut self, mut cmd: Command) {
        cmd.command_index = self.next_index;
        self.next_index += 1;
        self.commands.push(cmd);
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.next_index = 0;
    }

    /// Report from the last [`apply`](Self::apply). All zero before the
    /// first call.
    pub fn last_apply_report(&self) -> &ApplyReport {
        &self.last_apply_report
    }

    /// Apply every queued command to `world` in insertion order and return
    /// them, successful or not. The buffer is left empty.
    ///
    /// A failing command is logged and skipped; later commands still run.
    pub fn apply(&mut self, world: &mut World) -> Vec<Command> {
        let mut commands = std::mem::take(&mut self.commands);
        self.next_index = 0;

        let mut relocations: HashMap<EntityId, Vec<u32>> = HashMap::new();
        for cmd in &commands {
            if let (Some(target), true) = (cmd.target, cmd.kind.relocates()) {
                relocations.entry(target).or_default().push(cmd.command_index);
            }
        }
        let mut conflicts: Vec<(EntityId, Vec<u32>)> = relocations
            .into_iter()
            .filter(|(_, indices)| indices.len() > 1)
            .collect();
        conflicts.sort();
        for (entity, indices) in &conflicts {
            warn!(
                %entity,
                command_indices = ?indices,
                "{} commands relocate the same entity in one batch (last write wins)",
                indices.len()
            );
        }

        let mut report = ApplyReport {
            conflict_count: conflicts.len(),
            ..ApplyReport::default()
        };

        for cmd in &mut commands {
            match Self::apply_one(world, cmd) {
                Ok(spawned) => {
                    cmd.spawned_entity = spawned;
                    cmd.applied_successfully = true;
                    report.success_count += 1;
                }
                Err(e) => {
                    report.failed_count += 1;
                    warn!(
                        command_index = cmd.command_index,
                        target = ?cmd.target,
                        reason = %cmd.reason,
                        error = %e,
                        "command application failed"
                    );
                }
            }
        }

        self.last_apply_report = report;
        commands
    }

    fn apply_one(world: &mut World, cmd: &Command) -> Result<Option<EntityId>, WorldError> {
        let target = match (cmd.target, cmd.kind.needs_target()) {
            (Some(target), _) => Some(target),
            (None, false) => None,
            (None, true) => return Err(WorldError::MalformedCommand(cmd.command_index)),
        };
        let target_id = || target.ok_or(WorldError::MalformedCommand(cmd.command_index));

        match &cmd.kind {
            CommandKind::Spawn {
                prototype,
                owner,
                x,
                y,
            } => world.spawn(prototype, *owner, *x, *y).map(Some),
            CommandKind::SpawnFrom { owner, x, y } => {
                world.spawn_from(target_id()?, *owner, *x, *y).map(Some)
            }
            CommandKind::Place { x, y, owner } => {
                world.place(target_id()?, *x, *y, *owner).map(|()| None)
            }
            CommandKind::Move { dx, dy } => world.move_by(target_id()?, *dx, *dy).map(|()| None),
            CommandKind::Kill => world.kill(target_id()?).map(|_| None),
            CommandKind::Despawn => world.despawn(target_id()?).map(|_| None),
        }
    }

    fn push(&mut self, target: Option<EntityId>, kind: CommandKind, reason: &str) {
        let index = self.next_index;
        self.next_index += 1;
        self.commands.push(Command {
            target,
            kind,
            reason: reason.to_owned(),
            command_index: index,
            spawned_entity: None,
            applied_successfully: false,
        });
    }
}
