use glam::Vec2;
use serde::Deserialize;

use super::{Hit, TickEnv, apply_gravity, knockback_sign, take_hit};
use crate::animation::{self, AnimationTable};
use crate::config::{SimConfig, WalkerTuning};
use crate::ecs::{
    Agent, AgentKind, Animation, Body, Entity, Facing, Hitbox, Hurtbox, Mailbox, Position, SceneId,
    Sprite, World, masks,
};
use crate::error::{SimError, SimResult, fail_fast};
use crate::fsm::{Fsm, State, StateId, Strategy, StrategyTable, Transition};
use crate::side_table::SideTable;
use crate::spawn::SpawnDirective;

const WALK: &str = "walker_walk";
const BODY_OFFSET: Vec2 = Vec2::new(1.0, 2.0);
const BODY_SIZE: Vec2 = Vec2::new(14.0, 14.0);

/// Walker-specific spawn payload. Every key is optional.
///
/// ```json
/// { "facing": "left", "speed": 25.0 }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WalkerPayload {
    pub facing: Facing,
    /// Overrides the configured patrol speed.
    pub speed: Option<f32>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vitals {
    pub health: i32,
    pub hurt_ticks: u32,
    pub speed: f32,
}

pub struct WalkerTables {
    pub fsm: SideTable<Fsm>,
    pub vitals: SideTable<Vitals>,
}

#[derive(Copy, Clone, Debug)]
pub struct WalkerStates {
    pub patrol: StateId,
    pub hurt: StateId,
}

pub struct WalkerCtx<'a> {
    pub entity: Entity,
    pub world: &'a mut World,
    pub env: &'a TickEnv<'a>,
    pub vitals: &'a mut Vitals,
    pub states: WalkerStates,
    pub hit: Option<Hit>,
    /// Set once health runs out; the entity is destroyed after the agent pass.
    pub despawn: bool,
}

impl WalkerCtx<'_> {
    fn tuning(&self) -> &WalkerTuning {
        &self.env.config.walker
    }
}

pub type WalkerStrategy = dyn for<'a> Strategy<WalkerCtx<'a>>;

struct Patrol;

impl State for Patrol {
    fn name(&self) -> &'static str {
        "patrol"
    }
}

impl<'a> Strategy<WalkerCtx<'a>> for Patrol {
    fn on_enter(&self, ctx: &mut WalkerCtx<'a>) {
        animation::play(ctx.world, ctx.entity, ctx.env.animations, WALK);
    }

    fn update(&self, ctx: &mut WalkerCtx<'a>) -> Transition {
        if ctx.hit.is_some() {
            return Transition::To(ctx.states.hurt);
        }

        let contacts = ctx.world.component::<Body>(ctx.entity).contacts;
        let mut facing = *ctx.world.component::<Facing>(ctx.entity);
        if (facing == Facing::Right && contacts.right) || (facing == Facing::Left && contacts.left) {
            facing = facing.flipped();
            *ctx.world.component_mut::<Facing>(ctx.entity) = facing;
        }

        ctx.world.component_mut::<Body>(ctx.entity).velocity.x = facing.sign() * ctx.vitals.speed;
        ctx.world.component_mut::<Sprite>(ctx.entity).flip_x = facing == Facing::Left;
        Transition::Stay
    }
}

struct Hurt;

impl State for Hurt {
    fn name(&self) -> &'static str {
        "hurt"
    }
}

impl<'a> Strategy<WalkerCtx<'a>> for Hurt {
    fn on_enter(&self, ctx: &mut WalkerCtx<'a>) {
        ctx.vitals.health -= 1;
        ctx.vitals.hurt_ticks = ctx.tuning().hurt_ticks.max(1);
        if ctx.vitals.health <= 0 {
            ctx.despawn = true;
        }

        let speed = ctx.tuning().knockback_speed;
        let facing = *ctx.world.component::<Facing>(ctx.entity);
        let direction = ctx.hit.take().map(|h| h.direction).unwrap_or(Vec2::ZERO);
        let body = ctx.world.component_mut::<Body>(ctx.entity);
        body.velocity.x = knockback_sign(direction, facing.sign()) * speed;
        body.velocity.y = -speed * 0.5;
        animation::start(ctx.world, ctx.entity, ctx.env.animations, "walker_hurt");
    }

    fn update(&self, ctx: &mut WalkerCtx<'a>) -> Transition {
        if ctx.vitals.hurt_ticks == 0 {
            return Transition::To(ctx.states.patrol);
        }
        Transition::Stay
    }
}

pub struct WalkerBehavior {
    table: StrategyTable<WalkerStrategy>,
    states: WalkerStates,
    tables: WalkerTables,
}

impl WalkerBehavior {
    pub fn new() -> Self {
        let mut table: StrategyTable<WalkerStrategy> = StrategyTable::new();
        table.register(Box::new(Patrol));
        table.register(Box::new(Hurt));
        let states = WalkerStates {
            patrol: fail_fast(table.resolve("patrol")),
            hurt: fail_fast(table.resolve("hurt")),
        };
        Self {
            table,
            states,
            tables: WalkerTables {
                fsm: SideTable::new("walker.fsm"),
                vitals: SideTable::new("walker.vitals"),
            },
        }
    }

    pub fn states(&self) -> WalkerStates {
        self.states
    }

    pub fn tables(&self) -> &WalkerTables {
        &self.tables
    }

    pub fn state_name(&self, entity: Entity) -> &'static str {
        self.table.name(self.tables.fsm.get(entity).active())
    }

    pub(crate) fn spawn(
        &mut self,
        world: &mut World,
        scene: SceneId,
        directive: &SpawnDirective,
        animations: &AnimationTable,
        config: &SimConfig,
    ) -> SimResult<Entity> {
        let payload: WalkerPayload = directive.payload_as()?;
        let first_frame = animations
            .get(WALK)
            .ok_or_else(|| SimError::UnknownAnimation(WALK.to_string()))?
            .frames
            .first()
            .map(|f| f.sprite.clone())
            .unwrap_or_default();

        let entity = world.create_entity(scene);
        world.add_component(entity, Position::new(directive.position));
        world.add_component(entity, Body::new(BODY_OFFSET, BODY_SIZE));
        let mut sprite = Sprite::new(first_frame);
        sprite.flip_x = payload.facing == Facing::Left;
        world.add_component(entity, sprite);
        world.add_component(entity, payload.facing);
        world.add_component(entity, Animation::new(WALK));
        world.add_component(entity, Hitbox::new(BODY_OFFSET, BODY_SIZE, masks::ENEMY));
        world.add_component(entity, Hurtbox::new(BODY_OFFSET, BODY_SIZE, masks::PLAYER));
        world.add_component(entity, Mailbox::new());
        world.add_component(entity, Agent(AgentKind::Walker));

        self.tables.fsm.try_set(entity, Fsm::new(self.states.patrol))?;
        self.tables.vitals.try_set(
            entity,
            Vitals {
                health: config.walker.health,
                hurt_ticks: 0,
                speed: payload.speed.unwrap_or(config.walker.speed),
            },
        )?;
        Ok(entity)
    }

    /// Returns `true` once the walker has died and should be destroyed.
    pub(crate) fn tick(&mut self, world: &mut World, entity: Entity, env: &TickEnv<'_>) -> bool {
        let hit = take_hit(world, entity);
        apply_gravity(world.component_mut::<Body>(entity), env.config);

        let vitals = self.tables.vitals.get_mut(entity);
        vitals.hurt_ticks = vitals.hurt_ticks.saturating_sub(1);

        let mut fsm = *self.tables.fsm.get(entity);
        let mut ctx = WalkerCtx {
            entity,
            world,
            env,
            vitals: self.tables.vitals.get_mut(entity),
            states: self.states,
            hit,
            despawn: false,
        };
        fsm.process(&self.table, &mut ctx);
        let despawn = ctx.despawn;
        *self.tables.fsm.get_mut(entity) = fsm;
        despawn
    }

    pub(crate) fn destroy(&mut self, entity: Entity) {
        self.tables.fsm.delete(entity);
        self.tables.vitals.delete(entity);
    }
}

impl Default for WalkerBehavior {
    fn default() -> Self {
        Self::new()
    }
}
