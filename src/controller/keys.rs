use std::collections::HashSet;

/// Physical keyboard key as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Digits
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    // Cursor keys
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    Space,
    Enter,
    Escape,
    Tab,
    Shift,
    Control,

    /// Anything else, carrying the host's raw scan code
    Other(u32),
}

/// Read access to "is this key currently held"
pub trait KeyboardState {
    fn is_down(&self, key: KeyCode) -> bool;
}

/// Held-key set fed by the host's down/up callbacks
///
/// Hosts deliver OS auto-repeat as repeated downs; [`HeldKeys::press`] reports only the
/// first one as a transition.
#[derive(Debug, Clone, Default)]
pub struct HeldKeys {
    held: HashSet<KeyCode>,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` held; true if it was up before
    pub fn press(&mut self, key: KeyCode) -> bool {
        self.held.insert(key)
    }

    /// Marks `key` released; true if it was held before
    pub fn release(&mut self, key: KeyCode) -> bool {
        self.held.remove(&key)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }
}

impl KeyboardState for HeldKeys {
    fn is_down(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }
}

impl<const N: usize> KeyboardState for [KeyCode; N] {
    fn is_down(&self, key: KeyCode) -> bool {
        self.contains(&key)
    }
}
