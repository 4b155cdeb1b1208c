use std::collections::{HashMap, HashSet};
use std::hash::Hash;
pub use winit::keyboard::KeyCode;

/// Accumulates the raw key stream between simulation ticks.
///
/// Presses and releases pile up until [`sample`](InputState::sample) is called,
/// which must happen exactly once per tick before any agent logic runs. A key
/// tapped and released between two samples still reports as newly pressed.
#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
    released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a key-down event. OS auto-repeat (already held) is ignored.
    pub fn key_down(&mut self, key: KeyCode) {
        if self.held.insert(key) {
            self.pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: KeyCode) {
        if self.held.remove(&key) {
            self.released.insert(key);
        }
    }

    /// Drop everything, e.g. when the window loses focus.
    pub fn reset(&mut self) {
        self.held.clear();
        self.pressed.clear();
        self.released.clear();
    }

    /// Freeze the state for one tick and start accumulating the next.
    pub fn sample(&mut self) -> InputSnapshot {
        InputSnapshot {
            held: self.held.clone(),
            pressed: std::mem::take(&mut self.pressed),
            released: std::mem::take(&mut self.released),
        }
    }
}

/// Key state for a single tick.
#[derive(Debug, Default, Clone)]
pub struct InputSnapshot {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
    released: HashSet<KeyCode>,
}

impl InputSnapshot {
    pub fn is_key_held(&self, key: KeyCode) -> bool { self.held.contains(&key) }
    pub fn is_key_pressed(&self, key: KeyCode) -> bool { self.pressed.contains(&key) }
    pub fn is_key_released(&self, key: KeyCode) -> bool { self.released.contains(&key) }
}

/// Maps logical actions (defined by the game) to one or more keys.
#[derive(Debug, Clone)]
pub struct ActionMap<A: Hash + Eq + Copy> {
    bindings: HashMap<A, Vec<KeyCode>>,
}

impl<A: Hash + Eq + Copy> ActionMap<A> {
    pub fn new() -> Self {
        Self { bindings: HashMap::new() }
    }

    pub fn bind(&mut self, action: A, key: KeyCode) {
        self.bindings.entry(action).or_default().push(key);
    }

    /// Returns true if any bound key went down since the previous sample.
    pub fn is_pressed(&self, action: A, input: &InputSnapshot) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|k| input.is_key_pressed(*k)))
    }

    /// Returns true if any bound key is currently held.
    pub fn is_held(&self, action: A, input: &InputSnapshot) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|k| input.is_key_held(*k)))
    }

    pub fn is_released(&self, action: A, input: &InputSnapshot) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|k| input.is_key_released(*k)))
    }

    /// Resolve every bound action against one snapshot.
    pub fn resolve(&self, input: &InputSnapshot) -> Buttons<A> {
        let mut buttons = Buttons::default();
        for &action in self.bindings.keys() {
            if self.is_held(action, input) {
                buttons.held.insert(action);
            }
            if self.is_pressed(action, input) {
                buttons.pressed.insert(action);
            }
        }
        buttons
    }
}

impl<A: Hash + Eq + Copy> Default for ActionMap<A> {
    fn default() -> Self { Self::new() }
}

/// Logical action state for one tick, as read by agent logic.
#[derive(Debug, Clone)]
pub struct Buttons<A: Hash + Eq + Copy> {
    held: HashSet<A>,
    pressed: HashSet<A>,
}

impl<A: Hash + Eq + Copy> Buttons<A> {
    pub fn is_held(&self, action: A) -> bool { self.held.contains(&action) }

    /// Newly pressed this tick.
    pub fn is_pressed(&self, action: A) -> bool { self.pressed.contains(&action) }

    pub fn press(&mut self, action: A) {
        self.held.insert(action);
        self.pressed.insert(action);
    }

    pub fn hold(&mut self, action: A) {
        self.held.insert(action);
    }
}

impl<A: Hash + Eq + Copy> Default for Buttons<A> {
    fn default() -> Self {
        Self { held: HashSet::new(), pressed: HashSet::new() }
    }
}

/// Logical buttons read by the player agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Jump,
    Attack,
}

impl ActionMap<Button> {
    /// Arrow keys / WASD to move, Space or Z to jump, X or J to attack.
    pub fn standard() -> Self {
        let mut map = Self::new();
        map.bind(Button::Left, KeyCode::ArrowLeft);
        map.bind(Button::Left, KeyCode::KeyA);
        map.bind(Button::Right, KeyCode::ArrowRight);
        map.bind(Button::Right, KeyCode::KeyD);
        map.bind(Button::Jump, KeyCode::Space);
        map.bind(Button::Jump, KeyCode::KeyZ);
        map.bind(Button::Attack, KeyCode::KeyX);
        map.bind(Button::Attack, KeyCode::KeyJ);
        map
    }
}
