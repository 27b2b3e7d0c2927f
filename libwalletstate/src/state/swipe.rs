use serde::{Deserialize, Serialize};

use crate::store::{Action, Reduce};

/// Horizontal pager gesture
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwipeState {
    pub velocity: f64,
}

impl Reduce for SwipeState {
    type Action = Action;

    fn reduce(&self, action: &Action) -> Option<Self> {
        match action {
            Action::SwipeVelocityUpdated(velocity) => Some(Self {
                velocity: *velocity,
            }),
            _ => None,
        }
    }
}
