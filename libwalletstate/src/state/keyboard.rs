//! Software keyboard geometry

use serde::{Deserialize, Serialize};

use crate::store::{Action, Reduce};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyboardState {
    pub visible: bool,
    /// Current height; zero while hidden
    pub height: f64,
    /// Last height seen while visible, used to lay out screens before the
    /// keyboard appears
    pub last_known_height: Option<f64>,
}

impl Reduce for KeyboardState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::KeyboardShown { height } => Some(Self {
                visible: true,
                height: *height,
                last_known_height: Some(*height),
            }),
            Action::KeyboardHidden => Some(Self {
                visible: false,
                height: 0.0,
                ..self.clone()
            }),
            Action::KeyboardHeightRestored { height } => Some(Self {
                last_known_height: Some(*height),
                ..self.clone()
            }),
            _ => None,
        }
    }
}
