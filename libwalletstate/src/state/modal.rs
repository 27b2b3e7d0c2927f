use serde::{Deserialize, Serialize};

use crate::store::{Action, Reduce};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalState {
    pub visible: bool,
}

impl Reduce for ModalState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::ModalOpened => Some(Self { visible: true }),
            Action::ModalClosed => Some(Self { visible: false }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close() {
        let opened = ModalState::default().transition(&Action::ModalOpened);
        assert!(opened.visible);
        assert!(!opened.transition(&Action::ModalClosed).visible);
    }

    #[test]
    fn test_ignores_foreign_actions() {
        assert!(ModalState::default().reduce(&Action::KeyboardHidden).is_none());
    }
}
