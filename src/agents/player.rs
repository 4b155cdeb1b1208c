use glam::Vec2;

use super::{Hit, TickEnv, apply_gravity, knockback_sign, take_hit};
use crate::animation::{self, AnimationTable, FrameFlags};
use crate::config::PlayerTuning;
use crate::ecs::{
    Agent, AgentKind, Animation, Body, Entity, Facing, Hitbox, Hurtbox, Mailbox, Position, SceneId,
    Sprite, World, masks,
};
use crate::error::{SimError, SimResult, fail_fast};
use crate::fsm::{Fsm, State, StateId, Strategy, StrategyTable, Transition};
use crate::input::Button;
use crate::side_table::SideTable;
use crate::spawn::SpawnDirective;

const IDLE: &str = "player_idle";
const BODY_OFFSET: Vec2 = Vec2::new(2.0, 0.0);
const BODY_SIZE: Vec2 = Vec2::new(12.0, 16.0);
const WEAPON_SIZE: Vec2 = Vec2::new(14.0, 10.0);
const WEAPON_Y: f32 = 3.0;

/// Ground-contact bookkeeping.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Movement {
    /// Ticks since the body last stood on ground.
    pub air_ticks: u32,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatTimers {
    /// Ticks until another attack may start.
    pub cooldown: u32,
    /// Ticks of hurt stun left.
    pub hurt: u32,
}

/// Side tables owned by the player behavior.
pub struct PlayerTables {
    pub fsm: SideTable<Fsm>,
    pub movement: SideTable<Movement>,
    pub timers: SideTable<CombatTimers>,
}

impl PlayerTables {
    fn new() -> Self {
        Self {
            fsm: SideTable::new("player.fsm"),
            movement: SideTable::new("player.movement"),
            timers: SideTable::new("player.timers"),
        }
    }
}

/// Ids of the player's states, resolved once from the catalog.
#[derive(Copy, Clone, Debug)]
pub struct PlayerStates {
    pub grounded: StateId,
    pub airborne: StateId,
    pub attack: StateId,
    pub hurt: StateId,
}

/// Everything a player state touches during one tick.
pub struct PlayerCtx<'a> {
    pub entity: Entity,
    pub world: &'a mut World,
    pub env: &'a TickEnv<'a>,
    pub tables: &'a mut PlayerTables,
    pub states: PlayerStates,
    pub hit: Option<Hit>,
}

impl PlayerCtx<'_> {
    fn tuning(&self) -> &PlayerTuning {
        &self.env.config.player
    }

    fn animations(&self) -> &AnimationTable {
        self.env.animations
    }

    fn held(&self, button: Button) -> bool {
        self.env.buttons.is_held(button)
    }

    fn pressed(&self, button: Button) -> bool {
        self.env.buttons.is_pressed(button)
    }

    fn body(&self) -> &Body {
        self.world.component::<Body>(self.entity)
    }

    fn body_mut(&mut self) -> &mut Body {
        self.world.component_mut::<Body>(self.entity)
    }

    fn play(&mut self, key: &str) {
        animation::play(self.world, self.entity, self.env.animations, key);
    }

    fn can_attack(&self) -> bool {
        self.pressed(Button::Attack) && self.tables.timers.get(self.entity).cooldown == 0
    }

    /// Apply left/right input to velocity and facing.
    fn steer(&mut self) {
        let dir = match (self.held(Button::Left), self.held(Button::Right)) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        let speed = self.tuning().run_speed;
        self.body_mut().velocity.x = dir * speed;
        if let Some(facing) = Facing::from_dx(dir) {
            self.set_facing(facing);
        }
    }

    fn set_facing(&mut self, facing: Facing) {
        *self.world.component_mut::<Facing>(self.entity) = facing;
        self.world.component_mut::<Sprite>(self.entity).flip_x = facing == Facing::Left;
    }

    fn jump(&mut self) {
        let speed = self.tuning().jump_speed;
        let past_coyote = self.tuning().coyote_ticks + 1;
        self.body_mut().velocity.y = -speed;
        self.tables.movement.get_mut(self.entity).air_ticks = past_coyote;
    }

    /// Where to go once a locked state (attack, hurt) ends.
    fn settle(&self) -> Transition {
        if self.body().on_ground() {
            Transition::To(self.states.grounded)
        } else {
            Transition::To(self.states.airborne)
        }
    }
}

pub type PlayerStrategy = dyn for<'a> Strategy<PlayerCtx<'a>>;

// ── States ──────────────────────────────────────────────────────────────────

struct Grounded;

impl State for Grounded {
    fn name(&self) -> &'static str {
        "grounded"
    }
}

impl<'a> Strategy<PlayerCtx<'a>> for Grounded {
    fn update(&self, ctx: &mut PlayerCtx<'a>) -> Transition {
        if ctx.hit.is_some() {
            return Transition::To(ctx.states.hurt);
        }
        ctx.steer();

        let on_ground = ctx.body().on_ground();
        let movement = ctx.tables.movement.get_mut(ctx.entity);
        movement.air_ticks = if on_ground { 0 } else { movement.air_ticks + 1 };
        let air_ticks = movement.air_ticks;
        let coyote = ctx.tuning().coyote_ticks;

        if ctx.can_attack() {
            return Transition::To(ctx.states.attack);
        }
        if ctx.pressed(Button::Jump) && air_ticks <= coyote {
            ctx.jump();
            return Transition::To(ctx.states.airborne);
        }
        if air_ticks > coyote {
            return Transition::To(ctx.states.airborne);
        }

        if ctx.body().velocity.x != 0.0 {
            ctx.play("player_run");
        } else {
            ctx.play(IDLE);
        }
        Transition::Stay
    }
}

struct Airborne;

impl State for Airborne {
    fn name(&self) -> &'static str {
        "airborne"
    }
}

impl<'a> Strategy<PlayerCtx<'a>> for Airborne {
    fn update(&self, ctx: &mut PlayerCtx<'a>) -> Transition {
        if ctx.hit.is_some() {
            return Transition::To(ctx.states.hurt);
        }
        ctx.steer();

        if ctx.body().on_ground() && ctx.body().velocity.y >= 0.0 {
            ctx.tables.movement.get_mut(ctx.entity).air_ticks = 0;
            return Transition::To(ctx.states.grounded);
        }
        if ctx.can_attack() {
            return Transition::To(ctx.states.attack);
        }

        if ctx.body().velocity.y < 0.0 {
            ctx.play("player_jump");
        } else {
            ctx.play("player_fall");
        }
        Transition::Stay
    }
}

struct Attack;

impl State for Attack {
    fn name(&self) -> &'static str {
        "attack"
    }
}

impl<'a> Strategy<PlayerCtx<'a>> for Attack {
    fn on_enter(&self, ctx: &mut PlayerCtx<'a>) {
        animation::start(ctx.world, ctx.entity, ctx.env.animations, "player_attack");
        if ctx.body().on_ground() {
            ctx.body_mut().velocity.x = 0.0;
        }
    }

    fn update(&self, ctx: &mut PlayerCtx<'a>) -> Transition {
        if ctx.hit.is_some() {
            return Transition::To(ctx.states.hurt);
        }

        let flags = animation::current_flags(ctx.world, ctx.entity, ctx.animations());
        let facing = *ctx.world.component::<Facing>(ctx.entity);
        let hurtbox = ctx.world.component_mut::<Hurtbox>(ctx.entity);
        hurtbox.enabled = flags.contains(FrameFlags::WEAPON_ACTIVE);
        hurtbox.offset.x = match facing {
            Facing::Right => BODY_OFFSET.x + BODY_SIZE.x,
            Facing::Left => BODY_OFFSET.x - WEAPON_SIZE.x,
        };

        if flags.contains(FrameFlags::CAN_INTERRUPT) && ctx.pressed(Button::Jump) && ctx.body().on_ground() {
            ctx.jump();
            return Transition::To(ctx.states.airborne);
        }
        if animation::has_completed(ctx.world, ctx.entity) {
            return ctx.settle();
        }
        Transition::Stay
    }

    fn on_exit(&self, ctx: &mut PlayerCtx<'a>) {
        ctx.world.component_mut::<Hurtbox>(ctx.entity).enabled = false;
        let cooldown = ctx.tuning().attack_cooldown_ticks;
        ctx.tables.timers.get_mut(ctx.entity).cooldown = cooldown;
    }
}

struct Hurt;

impl State for Hurt {
    fn name(&self) -> &'static str {
        "hurt"
    }
}

impl<'a> Strategy<PlayerCtx<'a>> for Hurt {
    fn on_enter(&self, ctx: &mut PlayerCtx<'a>) {
        let ticks = ctx.tuning().hurt_ticks;
        let speed = ctx.tuning().knockback_speed;
        // At least the entry tick.
        ctx.tables.timers.get_mut(ctx.entity).hurt = ticks.max(1);

        let facing = *ctx.world.component::<Facing>(ctx.entity);
        let direction = ctx.hit.take().map(|h| h.direction).unwrap_or(Vec2::ZERO);
        let body = ctx.body_mut();
        body.velocity.x = knockback_sign(direction, facing.sign()) * speed;
        body.velocity.y = -speed * 0.5;
        animation::start(ctx.world, ctx.entity, ctx.env.animations, "player_hurt");
    }

    fn update(&self, ctx: &mut PlayerCtx<'a>) -> Transition {
        if ctx.tables.timers.get(ctx.entity).hurt == 0 {
            return ctx.settle();
        }
        ctx.body_mut().velocity.x *= 0.9;
        Transition::Stay
    }
}

// ── Behavior ────────────────────────────────────────────────────────────────

pub struct PlayerBehavior {
    table: StrategyTable<PlayerStrategy>,
    states: PlayerStates,
    tables: PlayerTables,
}

impl PlayerBehavior {
    pub fn new() -> Self {
        let mut table: StrategyTable<PlayerStrategy> = StrategyTable::new();
        table.register(Box::new(Grounded));
        table.register(Box::new(Airborne));
        table.register(Box::new(Attack));
        table.register(Box::new(Hurt));

        let states = PlayerStates {
            grounded: fail_fast(table.resolve("grounded")),
            airborne: fail_fast(table.resolve("airborne")),
            attack: fail_fast(table.resolve("attack")),
            hurt: fail_fast(table.resolve("hurt")),
        };

        Self {
            table,
            states,
            tables: PlayerTables::new(),
        }
    }

    pub fn states(&self) -> PlayerStates {
        self.states
    }

    pub fn tables(&self) -> &PlayerTables {
        &self.tables
    }

    /// Name of the state `entity` is in.
    pub fn state_name(&self, entity: Entity) -> &'static str {
        self.table.name(self.tables.fsm.get(entity).active())
    }

    pub(crate) fn spawn(
        &mut self,
        world: &mut World,
        scene: SceneId,
        directive: &SpawnDirective,
        animations: &AnimationTable,
    ) -> SimResult<Entity> {
        let first_frame = animations
            .get(IDLE)
            .ok_or_else(|| SimError::UnknownAnimation(IDLE.to_string()))?
            .frames
            .first()
            .map(|f| f.sprite.clone())
            .unwrap_or_default();

        let entity = world.create_entity(scene);
        world.add_component(entity, Position::new(directive.position));
        world.add_component(entity, Body::new(BODY_OFFSET, BODY_SIZE));
        world.add_component(entity, Sprite::new(first_frame));
        world.add_component(entity, Facing::Right);
        world.add_component(entity, Animation::new(IDLE));
        world.add_component(entity, Hitbox::new(BODY_OFFSET, BODY_SIZE, masks::PLAYER));
        let mut weapon = Hurtbox::new(
            Vec2::new(BODY_OFFSET.x + BODY_SIZE.x, WEAPON_Y),
            WEAPON_SIZE,
            masks::ENEMY,
        );
        weapon.enabled = false;
        world.add_component(entity, weapon);
        world.add_component(entity, Mailbox::new());
        world.add_component(entity, Agent(AgentKind::Player));

        self.tables.fsm.try_set(entity, Fsm::new(self.states.grounded))?;
        self.tables.movement.try_set(entity, Movement::default())?;
        self.tables.timers.try_set(entity, CombatTimers::default())?;
        Ok(entity)
    }

    pub(crate) fn tick(&mut self, world: &mut World, entity: Entity, env: &TickEnv<'_>) {
        let mut hit = take_hit(world, entity);
        if animation::current_flags(world, entity, env.animations).contains(FrameFlags::INVULNERABLE) {
            hit = None;
        }
        apply_gravity(world.component_mut::<Body>(entity), env.config);

        let timers = self.tables.timers.get_mut(entity);
        timers.cooldown = timers.cooldown.saturating_sub(1);
        timers.hurt = timers.hurt.saturating_sub(1);

        let mut fsm = *self.tables.fsm.get(entity);
        let mut ctx = PlayerCtx {
            entity,
            world,
            env,
            tables: &mut self.tables,
            states: self.states,
            hit,
        };
        fsm.process(&self.table, &mut ctx);
        *self.tables.fsm.get_mut(entity) = fsm;
    }

    pub(crate) fn destroy(&mut self, entity: Entity) {
        self.tables.fsm.delete(entity);
        self.tables.movement.delete(entity);
        self.tables.timers.delete(entity);
    }
}

impl Default for PlayerBehavior {
    fn default() -> Self {
        Self::new()
    }
}
