// Device-agnostic input events. Key bindings and device polling live outside this crate.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Grab,
    Use,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressKind {
    Down,
    Up,
    Press,
}

/// `None` addresses the keyboard/mouse debug hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputHand {
    Left,
    Right,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEvent {
    pub action: InputAction,
    pub kind: PressKind,
    pub hand: InputHand,
}

impl InputEvent {
    pub fn grab(kind: PressKind, hand: InputHand) -> Self {
        Self {
            action: InputAction::Grab,
            kind,
            hand,
        }
    }

    pub fn use_item(kind: PressKind, hand: InputHand) -> Self {
        Self {
            action: InputAction::Use,
            kind,
            hand,
        }
    }
}
