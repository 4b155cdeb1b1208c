// ============================================================================
// FSM.RS: Strategy-based state machines
//
// States are shared, stateless strategy objects stored once in a
// StrategyTable and referred to by StateId. Each entity owns a small Fsm
// holding its active state and drives it with Fsm::process once per tick.
//
// The table is generic over the strategy object type, not the context, so a
// catalog whose context borrows per-tick data is stored as
// `StrategyTable<dyn for<'a> Strategy<Ctx<'a>>>`.
// ============================================================================

use std::collections::HashMap;

use log::trace;

use crate::error::{SimError, SimResult, fail_fast};

/// Index of a strategy inside its [`StrategyTable`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StateId(usize);

/// Outcome of [`Strategy::update`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    Stay,
    To(StateId),
}

/// Name of a state, used for lookup and diagnostics.
pub trait State {
    fn name(&self) -> &'static str;
}

/// One state of a machine. `C` is whatever per-tick context the caller
/// threads through (an entity id, or a bundle of borrowed systems).
pub trait Strategy<C>: State {
    fn on_enter(&self, _ctx: &mut C) {}
    fn on_exit(&self, _ctx: &mut C) {}
    fn update(&self, ctx: &mut C) -> Transition;
}

/// A closed catalog of strategies, resolved by name at construction.
pub struct StrategyTable<S: ?Sized + State> {
    strategies: Vec<Box<S>>,
    by_name: HashMap<&'static str, StateId>,
}

impl<S: ?Sized + State> StrategyTable<S> {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register a strategy and return its id. Names must be unique.
    pub fn register(&mut self, strategy: Box<S>) -> StateId {
        let name = strategy.name();
        assert!(
            !self.by_name.contains_key(name),
            "state '{name}' registered twice"
        );
        let id = StateId(self.strategies.len());
        self.strategies.push(strategy);
        self.by_name.insert(name, id);
        id
    }

    /// Look a state up by name.
    pub fn resolve(&self, name: &str) -> SimResult<StateId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SimError::UnknownState(name.to_string()))
    }

    pub fn name(&self, id: StateId) -> &'static str {
        self.strategies[id.0].name()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    fn get(&self, id: StateId) -> &S {
        self.strategies[id.0].as_ref()
    }
}

impl<S: ?Sized + State> Default for StrategyTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Most states a single `process` call may run: the active one plus two
/// transitions. A third transition within one call is a cycle.
pub const MAX_STATES_PER_PROCESS: u32 = 3;

/// Per-entity machine state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fsm {
    active: StateId,
    entered: bool,
}

impl Fsm {
    /// The initial state's `on_enter` runs on the first `process`, not here.
    pub fn new(initial: StateId) -> Self {
        Self {
            active: initial,
            entered: false,
        }
    }

    pub fn active(&self) -> StateId {
        self.active
    }

    pub fn is_in(&self, state: StateId) -> bool {
        self.active == state
    }

    /// Jump straight to `state` without running any exit or enter hook. Meant
    /// for spawn-time setup; a machine that has not been processed yet still
    /// enters `state` lazily.
    pub fn force(&mut self, state: StateId) {
        self.active = state;
    }

    /// Run the active state, following transitions until one state stays.
    /// Panics when a call would run more than [`MAX_STATES_PER_PROCESS`] states.
    pub fn process<C, S>(&mut self, table: &StrategyTable<S>, ctx: &mut C)
    where
        S: ?Sized + Strategy<C>,
    {
        fail_fast(self.try_process(table, ctx));
    }

    pub fn try_process<C, S>(&mut self, table: &StrategyTable<S>, ctx: &mut C) -> SimResult<()>
    where
        S: ?Sized + Strategy<C>,
    {
        if !self.entered {
            self.entered = true;
            table.get(self.active).on_enter(ctx);
        }

        let mut states_run = 1;
        loop {
            let current = table.get(self.active);
            let next = match current.update(ctx) {
                Transition::Stay => return Ok(()),
                Transition::To(next) => next,
            };

            if states_run >= MAX_STATES_PER_PROCESS {
                return Err(SimError::TransitionCeiling {
                    from: current.name(),
                    to: table.name(next),
                });
            }

            trace!("fsm: {} -> {}", current.name(), table.name(next));
            current.on_exit(ctx);
            self.active = next;
            table.get(next).on_enter(ctx);
            states_run += 1;
        }
    }
}
