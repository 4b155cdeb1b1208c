// ── Components ──────────────────────────────────────────────────────────────

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::Entity;
use crate::geometry::Rect;

// ── Kinds ───────────────────────────────────────────────────────────────────

/// Discriminant of every component type, in declaration order.
///
/// This order is also the order in which components are torn down when an
/// entity is destroyed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Position,
    Body,
    Sprite,
    Facing,
    Animation,
    Hitbox,
    Hurtbox,
    Mailbox,
    Agent,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 9] = [
        ComponentKind::Position,
        ComponentKind::Body,
        ComponentKind::Sprite,
        ComponentKind::Facing,
        ComponentKind::Animation,
        ComponentKind::Hitbox,
        ComponentKind::Hurtbox,
        ComponentKind::Mailbox,
        ComponentKind::Agent,
    ];

    #[inline]
    fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Bitset of component kinds attached to one entity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ComponentSet(u16);

impl ComponentSet {
    pub const EMPTY: Self = Self(0);

    #[inline]
    pub fn contains(self, kind: ComponentKind) -> bool {
        self.0 & kind.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, kind: ComponentKind) {
        self.0 |= kind.bit();
    }

    #[inline]
    pub fn remove(&mut self, kind: ComponentKind) {
        self.0 &= !kind.bit();
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Attached kinds in declaration order.
    pub fn iter(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

// ── Position ────────────────────────────────────────────────────────────────

/// World-space position in pixels (top-left anchor of the entity).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Position {
    pub pos: Vec2,
    /// Position before the latest physics step, kept for render interpolation.
    pub prev: Vec2,
}

impl Position {
    pub fn new(pos: Vec2) -> Self {
        Self { pos, prev: pos }
    }
}

// ── Body ────────────────────────────────────────────────────────────────────

/// Which sides were blocked by the tile map during the last physics step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Contacts {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

/// Physics body: a collision box relative to the entity position plus velocity.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Body {
    pub offset: Vec2,
    pub size: Vec2,
    /// Pixels per second.
    pub velocity: Vec2,
    pub contacts: Contacts,
}

impl Body {
    pub fn new(offset: Vec2, size: Vec2) -> Self {
        Self {
            offset,
            size,
            ..Default::default()
        }
    }

    pub fn rect_at(&self, pos: Vec2) -> Rect {
        Rect::at(pos, self.offset, self.size)
    }

    #[inline]
    pub fn on_ground(&self) -> bool {
        self.contacts.down
    }
}

// ── Sprite / Facing ─────────────────────────────────────────────────────────

/// Visual frame reference, resolved against sprite metadata by the renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sprite {
    pub frame: String,
    pub flip_x: bool,
}

impl Sprite {
    pub fn new(frame: impl Into<String>) -> Self {
        Self {
            frame: frame.into(),
            flip_x: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// `-1.0` for left, `1.0` for right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// Facing implied by a horizontal direction, or `None` for zero.
    pub fn from_dx(dx: f32) -> Option<Self> {
        if dx < 0.0 {
            Some(Facing::Left)
        } else if dx > 0.0 {
            Some(Facing::Right)
        } else {
            None
        }
    }
}

// ── Animation ───────────────────────────────────────────────────────────────

/// Playback state of one animation from the [`AnimationTable`](crate::animation::AnimationTable).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Animation {
    pub key: String,
    pub frame: usize,
    /// Ticks spent on the current frame.
    pub elapsed: u32,
    /// Set once a non-looping animation has shown its last frame for its full duration.
    pub completed: bool,
}

impl Animation {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }
}

// ── Combat boxes ────────────────────────────────────────────────────────────

/// Damage-receiving box.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Hitbox {
    pub offset: Vec2,
    pub size: Vec2,
    pub mask: u32,
    pub enabled: bool,
}

impl Hitbox {
    pub fn new(offset: Vec2, size: Vec2, mask: u32) -> Self {
        Self {
            offset,
            size,
            mask,
            enabled: true,
        }
    }

    pub fn rect_at(&self, pos: Vec2) -> Rect {
        Rect::at(pos, self.offset, self.size)
    }
}

/// Damage-dealing box.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Hurtbox {
    pub offset: Vec2,
    pub size: Vec2,
    pub mask: u32,
    pub enabled: bool,
}

impl Hurtbox {
    pub fn new(offset: Vec2, size: Vec2, mask: u32) -> Self {
        Self {
            offset,
            size,
            mask,
            enabled: true,
        }
    }

    pub fn rect_at(&self, pos: Vec2) -> Rect {
        Rect::at(pos, self.offset, self.size)
    }
}

/// Faction bits shared by hitbox and hurtbox masks.
pub mod masks {
    pub const PLAYER: u32 = 0b01;
    pub const ENEMY: u32 = 0b10;
}

// ── Mailbox ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Message {
    /// `attacker`'s hurtbox overlapped this entity's hitbox. `direction` points
    /// from the hurtbox center toward the hitbox center.
    CombatHit { attacker: Entity, direction: Vec2 },
}

/// Ordered inbound message queue.
///
/// Producers append; the owning agent drains the whole queue once per tick,
/// whether or not it reacts to every message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mailbox {
    messages: Vec<Message>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Take every queued message, leaving the mailbox empty.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.messages)
    }
}

// ── Agent tag ───────────────────────────────────────────────────────────────

/// Behavior kind driving an entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Player,
    Walker,
}

impl AgentKind {
    pub fn name(self) -> &'static str {
        match self {
            AgentKind::Player => "player",
            AgentKind::Walker => "walker",
        }
    }
}

/// Tag component marking an entity as driven by an agent behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Agent(pub AgentKind);

// ── Type-erased wrapper ─────────────────────────────────────────────────────

/// Any component value, used where the kind is only known at runtime
/// (removal notifications, teardown).
#[derive(Clone, Debug, PartialEq)]
pub enum AnyComponent {
    Position(Position),
    Body(Body),
    Sprite(Sprite),
    Facing(Facing),
    Animation(Animation),
    Hitbox(Hitbox),
    Hurtbox(Hurtbox),
    Mailbox(Mailbox),
    Agent(Agent),
}

impl AnyComponent {
    pub fn kind(&self) -> ComponentKind {
        match self {
            AnyComponent::Position(_) => ComponentKind::Position,
            AnyComponent::Body(_) => ComponentKind::Body,
            AnyComponent::Sprite(_) => ComponentKind::Sprite,
            AnyComponent::Facing(_) => ComponentKind::Facing,
            AnyComponent::Animation(_) => ComponentKind::Animation,
            AnyComponent::Hitbox(_) => ComponentKind::Hitbox,
            AnyComponent::Hurtbox(_) => ComponentKind::Hurtbox,
            AnyComponent::Mailbox(_) => ComponentKind::Mailbox,
            AnyComponent::Agent(_) => ComponentKind::Agent,
        }
    }
}
