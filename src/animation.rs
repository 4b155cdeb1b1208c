// ============================================================================
// ANIMATION.RS: Tick-based sprite animation
// ============================================================================

use std::collections::HashMap;

use serde::Deserialize;

use crate::ecs::{Animation, Entity, SceneId, Sprite, World};
use crate::error::{SimError, SimResult, fail_fast};

// ── Frame flags ──────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameFlag {
    WeaponActive,
    CanInterrupt,
    Invulnerable,
}

/// Bitset of [`FrameFlag`]s attached to one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<FrameFlag>")]
pub struct FrameFlags(u32);

impl FrameFlags {
    pub const NONE: Self = Self(0);
    pub const WEAPON_ACTIVE: Self = Self(1 << 0);
    pub const CAN_INTERRUPT: Self = Self(1 << 1);
    pub const INVULNERABLE: Self = Self(1 << 2);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl From<FrameFlag> for FrameFlags {
    fn from(flag: FrameFlag) -> Self {
        match flag {
            FrameFlag::WeaponActive => FrameFlags::WEAPON_ACTIVE,
            FrameFlag::CanInterrupt => FrameFlags::CAN_INTERRUPT,
            FrameFlag::Invulnerable => FrameFlags::INVULNERABLE,
        }
    }
}

impl From<Vec<FrameFlag>> for FrameFlags {
    fn from(flags: Vec<FrameFlag>) -> Self {
        flags
            .into_iter()
            .fold(FrameFlags::NONE, |acc, f| acc.union(f.into()))
    }
}

// ── Definitions ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FrameDef {
    /// Sprite-frame key written to [`Sprite::frame`] while this frame shows.
    pub sprite: String,
    /// Ticks this frame stays on screen.
    pub duration: u32,
    #[serde(default)]
    pub flags: FrameFlags,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AnimationDef {
    pub frames: Vec<FrameDef>,
    #[serde(default)]
    pub looping: bool,
}

impl AnimationDef {
    /// Total ticks for one pass over all frames.
    pub fn total_ticks(&self) -> u32 {
        self.frames.iter().map(|f| f.duration.max(1)).sum()
    }
}

/// Name-keyed animation definitions.
#[derive(Clone, Debug, Default)]
pub struct AnimationTable {
    defs: HashMap<String, AnimationDef>,
}

impl AnimationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `{ "name": { "looping": bool, "frames": [...] } }` document.
    ///
    /// ```json
    /// { "slash": { "looping": false, "frames": [
    ///     { "sprite": "slash_0", "duration": 3 },
    ///     { "sprite": "slash_1", "duration": 4, "flags": ["weapon_active"] }
    /// ] } }
    /// ```
    pub fn from_json(json: &str) -> SimResult<Self> {
        let defs: HashMap<String, AnimationDef> = serde_json::from_str(json)?;
        if let Some((name, _)) = defs.iter().find(|(_, d)| d.frames.is_empty()) {
            log::warn!("animation '{name}' has no frames");
        }
        Ok(Self { defs })
    }

    pub fn insert(&mut self, name: impl Into<String>, def: AnimationDef) {
        self.defs.insert(name.into(), def);
    }

    pub fn get(&self, name: &str) -> Option<&AnimationDef> {
        self.defs.get(name)
    }

    /// Lookup for keys the caller wired up itself; a miss is a configuration bug.
    #[track_caller]
    pub fn def(&self, name: &str) -> &AnimationDef {
        fail_fast(
            self.defs
                .get(name)
                .ok_or_else(|| SimError::UnknownAnimation(name.to_string())),
        )
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

// ── Advancer ─────────────────────────────────────────────────────────────────

/// Step `anim` by one tick. Returns `true` when the displayed frame changed.
pub fn advance(anim: &mut Animation, def: &AnimationDef) -> bool {
    if anim.completed || def.frames.is_empty() {
        return false;
    }
    anim.elapsed += 1;
    if anim.elapsed < def.frames[anim.frame].duration.max(1) {
        return false;
    }
    anim.elapsed = 0;

    let old = anim.frame;
    if anim.frame + 1 < def.frames.len() {
        anim.frame += 1;
    } else if def.looping {
        anim.frame = 0;
    } else {
        anim.completed = true;
    }
    anim.frame != old
}

/// Advance every animated sprite in `scene`.
pub fn animation_system(world: &mut World, scene: SceneId, table: &AnimationTable) {
    for entity in world.entities_in_scene(scene) {
        if !world.has::<Sprite>(entity) {
            continue;
        }
        let Some(anim) = world.get_mut::<Animation>(entity) else {
            continue;
        };
        let def = table.def(&anim.key);
        if advance(anim, def) {
            let sprite = def.frames[anim.frame].sprite.clone();
            world.component_mut::<Sprite>(entity).frame = sprite;
        }
    }
}

/// Switch `entity` to animation `key`, restarting it from frame zero. Playing
/// the animation that is already active does nothing.
pub fn play(world: &mut World, entity: Entity, table: &AnimationTable, key: &str) {
    if world.component::<Animation>(entity).key == key {
        return;
    }
    start(world, entity, table, key);
}

/// Restart the current animation from frame zero.
pub fn restart(world: &mut World, entity: Entity, table: &AnimationTable) {
    let key = world.component::<Animation>(entity).key.clone();
    start(world, entity, table, &key);
}

/// Play `key` from frame zero, even if it is already the active animation.
pub fn start(world: &mut World, entity: Entity, table: &AnimationTable, key: &str) {
    let def = table.def(key);
    *world.component_mut::<Animation>(entity) = Animation::new(key);
    if let Some(first) = def.frames.first() {
        world.component_mut::<Sprite>(entity).frame = first.sprite.clone();
    }
}

/// Flags of the frame `entity` is currently showing.
pub fn current_flags(world: &World, entity: Entity, table: &AnimationTable) -> FrameFlags {
    let anim = world.component::<Animation>(entity);
    table
        .def(&anim.key)
        .frames
        .get(anim.frame)
        .map(|f| f.flags)
        .unwrap_or_default()
}

pub fn has_completed(world: &World, entity: Entity) -> bool {
    world.component::<Animation>(entity).completed
}
