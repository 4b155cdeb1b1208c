pub mod agents;
pub mod animation;
pub mod combat;
pub mod config;
pub mod ecs;
pub mod error;
pub mod fsm;
pub mod geometry;
pub mod grid;
pub mod input;
pub mod physics;
pub mod side_table;
pub mod sim;
pub mod spawn;

pub use error::{SimError, SimResult};
pub use sim::{Simulation, TickReport};

/// Built-in animation set for the player and walker agents
/// (name-keyed JSON, see `AnimationTable::from_json`).
pub const DEFAULT_ANIMATIONS: &str = include_str!("../resources/animations.json");
