// Agent behaviors. Each AgentKind owns a strategy catalog, its side tables
// and three hooks: spawn, tick and destroy. Agents builds every catalog once
// and dispatches by kind.

pub mod player;
pub mod walker;

use glam::Vec2;
use log::debug;

use crate::animation::AnimationTable;
use crate::config::SimConfig;
use crate::ecs::{Agent, AgentKind, AnyComponent, Body, Entity, Mailbox, Message, SceneId, World, WorldEvent};
use crate::error::SimResult;
use crate::input::{Button, Buttons};
use crate::spawn::SpawnDirective;

pub use player::PlayerBehavior;
pub use walker::WalkerBehavior;

/// Read-only inputs shared by every agent during one tick.
pub struct TickEnv<'a> {
    pub animations: &'a AnimationTable,
    pub config: &'a SimConfig,
    pub buttons: &'a Buttons<Button>,
}

/// A combat hit pulled out of a mailbox.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    pub attacker: Entity,
    pub direction: Vec2,
}

/// Empty the entity's mailbox and return the last combat hit in it.
///
/// Every message is consumed, including ones the caller does not react to.
pub(crate) fn take_hit(world: &mut World, entity: Entity) -> Option<Hit> {
    let mail = world.get_mut::<Mailbox>(entity)?.drain();
    mail.into_iter().rev().find_map(|m| match m {
        Message::CombatHit { attacker, direction } => Some(Hit { attacker, direction }),
    })
}

pub(crate) fn apply_gravity(body: &mut Body, config: &SimConfig) {
    body.velocity.y = (body.velocity.y + config.gravity * config.fixed_dt).min(config.max_fall_speed);
}

/// Horizontal knockback sign: along the hit direction, or backwards from
/// `facing` when the hit came straight from above or below.
pub(crate) fn knockback_sign(direction: Vec2, facing_sign: f32) -> f32 {
    if direction.x != 0.0 { direction.x.signum() } else { -facing_sign }
}

/// Composition root for all agent kinds.
pub struct Agents {
    player: PlayerBehavior,
    walker: WalkerBehavior,
}

impl Agents {
    pub fn new() -> Self {
        Self {
            player: PlayerBehavior::new(),
            walker: WalkerBehavior::new(),
        }
    }

    pub fn player(&self) -> &PlayerBehavior {
        &self.player
    }

    pub fn walker(&self) -> &WalkerBehavior {
        &self.walker
    }

    /// Create the entity described by `directive` in `scene`.
    pub fn spawn(
        &mut self,
        world: &mut World,
        scene: SceneId,
        directive: &SpawnDirective,
        animations: &AnimationTable,
        config: &SimConfig,
    ) -> SimResult<Entity> {
        let entity = match directive.kind {
            AgentKind::Player => self.player.spawn(world, scene, directive, animations)?,
            AgentKind::Walker => self.walker.spawn(world, scene, directive, animations, config)?,
        };
        debug!("spawned {} {entity} at {}", directive.kind.name(), directive.position);
        Ok(entity)
    }

    /// Run every agent in `scene` once, in entity order. Returns the agents
    /// that asked to be removed; the caller destroys them after the pass.
    pub fn tick(&mut self, world: &mut World, scene: SceneId, env: &TickEnv<'_>) -> Vec<Entity> {
        let mut finished = Vec::new();
        for entity in world.entities_in_scene(scene) {
            let Some(&Agent(kind)) = world.get::<Agent>(entity) else {
                continue;
            };
            let done = match kind {
                AgentKind::Player => {
                    self.player.tick(world, entity, env);
                    false
                }
                AgentKind::Walker => self.walker.tick(world, entity, env),
            };
            if done {
                finished.push(entity);
            }
        }
        finished
    }

    /// React to store notifications. Removing an agent tag runs that kind's
    /// destroy hook.
    pub fn handle_event(&mut self, event: &WorldEvent) {
        if let WorldEvent::ComponentRemoving {
            entity,
            component: AnyComponent::Agent(Agent(kind)),
        } = event
        {
            match kind {
                AgentKind::Player => self.player.destroy(*entity),
                AgentKind::Walker => self.walker.destroy(*entity),
            }
        }
    }
}

impl Default for Agents {
    fn default() -> Self {
        Self::new()
    }
}
