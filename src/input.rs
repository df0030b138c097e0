//! Frame-level input contract
//!
//! The core only ever asks which keys are held and which discrete events
//! arrived this frame. Device handling belongs to the host.

/// Held keys the game polls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    /// Alternate left
    A,
    /// Alternate right
    D,
}

/// Discrete per-frame events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Escape,
    /// P key
    Pause,
    Space,
    Enter,
    /// Window close or equivalent
    Quit,
}

/// Something that can answer input queries for the current frame
pub trait InputSource {
    fn is_down(&self, key: Key) -> bool;
    fn events(&self) -> &[InputEvent];

    fn has_event(&self, event: InputEvent) -> bool {
        self.events().contains(&event)
    }
}

/// Horizontal intent from held keys: -1, 0 or +1
pub fn steer_intent(input: &impl InputSource) -> f32 {
    let left = input.is_down(Key::Left) || input.is_down(Key::A);
    let right = input.is_down(Key::Right) || input.is_down(Key::D);
    match (left, right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}

/// A fixed snapshot of one frame's input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedInput {
    held: Vec<Key>,
    events: Vec<InputEvent>,
}

impl ScriptedInput {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn hold(mut self, key: Key) -> Self {
        if !self.held.contains(&key) {
            self.held.push(key);
        }
        self
    }

    pub fn press(mut self, event: InputEvent) -> Self {
        self.events.push(event);
        self
    }
}

impl InputSource for ScriptedInput {
    fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn events(&self) -> &[InputEvent] {
        &self.events
    }
}
