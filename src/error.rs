use thiserror::Error;

use crate::ecs::{ComponentKind, Entity, SceneId};

/// Everything that can go wrong inside the simulation core.
///
/// Most variants are contract violations: they describe a logic defect in the
/// calling code, not a runtime condition. The panicking entry points
/// (`World::add_component`, `Fsm::process`, `SideTable::get`, ...) turn them
/// into an immediate abort through [`fail_fast`]. The `try_*` variants hand
/// them back for tests and tooling.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("entity {0} does not exist")]
    UnknownEntity(Entity),

    #[error("scene {0:?} has no tile map")]
    UnknownScene(SceneId),

    #[error("entity {entity} already has a {kind:?} component")]
    DuplicateComponent { entity: Entity, kind: ComponentKind },

    #[error("entity {entity} has no {kind:?} component")]
    MissingComponent { entity: Entity, kind: ComponentKind },

    #[error("too many state transitions in one tick: {from} -> {to}")]
    TransitionCeiling { from: &'static str, to: &'static str },

    #[error("unknown state '{0}'")]
    UnknownState(String),

    #[error("side table of '{behavior}' has no entry for entity {entity} (create hook not run?)")]
    SideTableMissing { behavior: &'static str, entity: Entity },

    #[error("side table of '{behavior}' already has an entry for entity {entity}")]
    SideTableDuplicate { behavior: &'static str, entity: Entity },

    #[error("unknown animation '{0}'")]
    UnknownAnimation(String),

    #[error("invalid spawn payload for {kind}: {source}")]
    InvalidPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

/// Unwrap a contract-checked result, aborting with the violated invariant.
#[track_caller]
pub fn fail_fast<T>(result: SimResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}
