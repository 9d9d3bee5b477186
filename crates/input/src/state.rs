/// Logical movement keys. Embodiments map their physical keys onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
}

/// Movement request for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoveIntent {
    /// +1 forward, -1 backward, 0 when neither or both are held.
    pub forward: f32,
    /// +1 right, -1 left.
    pub strafe: f32,
    /// Jump edge for this frame.
    pub jump: bool,
}

impl MoveIntent {
    pub fn is_idle(&self) -> bool {
        self.forward == 0.0 && self.strafe == 0.0 && !self.jump
    }
}

/// Four directional flags plus a jump edge trigger.
///
/// Key events mutate it; the frame driver samples it once per frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    jump_held: bool,
    jump_pending: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Auto-repeat of a held jump key does not retrigger.
    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Forward => self.forward = true,
            Key::Backward => self.backward = true,
            Key::Left => self.left = true,
            Key::Right => self.right = true,
            Key::Jump => {
                if !self.jump_held {
                    self.jump_pending = true;
                }
                self.jump_held = true;
            }
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Forward => self.forward = false,
            Key::Backward => self.backward = false,
            Key::Left => self.left = false,
            Key::Right => self.right = false,
            Key::Jump => self.jump_held = false,
        }
    }

    /// Consume the pending jump edge.
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_pending)
    }

    /// Sample this frame's movement request, consuming the jump edge.
    pub fn sample(&mut self) -> MoveIntent {
        let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
        MoveIntent {
            forward: axis(self.forward, self.backward),
            strafe: axis(self.right, self.left),
            jump: self.take_jump(),
        }
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
