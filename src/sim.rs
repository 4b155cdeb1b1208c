// ============================================================================
// SIM.RS: Composition root and per-tick pipeline
//
// Stage order per tick: agent logic, physics, combat, animation. World
// lifecycle events are dispatched to agent hooks between stages.
// ============================================================================

use std::collections::HashMap;

use log::{debug, info};

use crate::agents::{Agents, TickEnv};
use crate::animation::{AnimationTable, animation_system};
use crate::combat::combat_system;
use crate::config::SimConfig;
use crate::ecs::{Entity, SceneId, World};
use crate::error::{SimError, SimResult};
use crate::grid::TileGrid;
use crate::input::{ActionMap, Button, Buttons, InputSnapshot};
use crate::physics::{TileSpace, physics_system};
use crate::spawn::SpawnDirective;

/// What one tick did, for callers that log or assert on it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Combat messages delivered to mailboxes this tick.
    pub delivered: usize,
    /// Agents that finished and were destroyed this tick.
    pub despawned: Vec<Entity>,
}

pub struct Simulation {
    world: World,
    config: SimConfig,
    animations: AnimationTable,
    agents: Agents,
    bindings: ActionMap<Button>,
    tiles: HashMap<SceneId, TileGrid>,
    tick_count: u64,
}

impl Simulation {
    pub fn new(config: SimConfig, animations: AnimationTable) -> Self {
        info!(
            "simulation: {} animations, tile size {}, dt {:.4}",
            animations.len(),
            config.tile_size,
            config.fixed_dt
        );
        Self {
            world: World::new(),
            config,
            animations,
            agents: Agents::new(),
            bindings: ActionMap::standard(),
            tiles: HashMap::new(),
            tick_count: 0,
        }
    }

    /// Default config and the embedded animation set.
    pub fn with_defaults() -> SimResult<Self> {
        let animations = AnimationTable::from_json(crate::DEFAULT_ANIMATIONS)?;
        Ok(Self::new(SimConfig::default(), animations))
    }

    // -- Accessors ----------------------------------------------------------

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for tools and tests. Events raised here are
    /// dispatched on the next tick.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn animations(&self) -> &AnimationTable {
        &self.animations
    }

    pub fn agents(&self) -> &Agents {
        &self.agents
    }

    pub fn bindings_mut(&mut self) -> &mut ActionMap<Button> {
        &mut self.bindings
    }

    pub fn tiles(&self, scene: SceneId) -> Option<&TileGrid> {
        self.tiles.get(&scene)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // -- Scenes and agents --------------------------------------------------

    /// Allocate a scene backed by `tiles`.
    pub fn create_scene(&mut self, tiles: TileGrid) -> SceneId {
        let scene = self.world.allocate_scene();
        debug!("scene {} uses a {}x{} tile map", scene.id(), tiles.cols(), tiles.rows());
        self.tiles.insert(scene, tiles);
        scene
    }

    pub fn spawn(&mut self, scene: SceneId, directive: &SpawnDirective) -> SimResult<Entity> {
        let entity = self
            .agents
            .spawn(&mut self.world, scene, directive, &self.animations, &self.config)?;
        dispatch_events(&mut self.world, &mut self.agents);
        Ok(entity)
    }

    /// Spawn every directive in a JSON list, stopping at the first failure.
    pub fn spawn_all_from_json(&mut self, scene: SceneId, json: &str) -> SimResult<Vec<Entity>> {
        SpawnDirective::list_from_json(json)?
            .iter()
            .map(|directive| self.spawn(scene, directive))
            .collect()
    }

    /// Destroy `entity` and run the destroy hooks of whatever agent it was.
    pub fn despawn(&mut self, entity: Entity) -> SimResult<()> {
        self.world.try_destroy_entity(entity)?;
        dispatch_events(&mut self.world, &mut self.agents);
        Ok(())
    }

    // -- Tick ---------------------------------------------------------------

    /// Advance `scene` by one fixed step using raw key input.
    pub fn tick(&mut self, scene: SceneId, input: &InputSnapshot) -> TickReport {
        let buttons = self.bindings.resolve(input);
        self.tick_with_buttons(scene, &buttons)
    }

    /// Advance `scene` by one fixed step with already resolved buttons.
    pub fn tick_with_buttons(&mut self, scene: SceneId, buttons: &Buttons<Button>) -> TickReport {
        let Some(grid) = self.tiles.get(&scene) else {
            panic!("{}", SimError::UnknownScene(scene));
        };
        dispatch_events(&mut self.world, &mut self.agents);

        let env = TickEnv {
            animations: &self.animations,
            config: &self.config,
            buttons,
        };
        let despawned = self.agents.tick(&mut self.world, scene, &env);
        for &entity in &despawned {
            self.world.destroy_entity(entity);
        }
        dispatch_events(&mut self.world, &mut self.agents);

        let space = TileSpace {
            grid,
            tile_size: self.config.tile_size,
        };
        physics_system(&mut self.world, scene, space, self.config.fixed_dt);
        let delivered = combat_system(&mut self.world, scene);
        animation_system(&mut self.world, scene, &self.animations);
        dispatch_events(&mut self.world, &mut self.agents);

        self.tick_count += 1;
        TickReport {
            delivered,
            despawned,
        }
    }
}

/// Hand every buffered world event to the agent hooks.
fn dispatch_events(world: &mut World, agents: &mut Agents) {
    for event in world.drain_events() {
        agents.handle_event(&event);
    }
}
