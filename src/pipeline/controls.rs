use super::coordinator::Mode;
use super::stats::PipelineSnapshot;
use serde::{Deserialize, Serialize};

/// Affordance of a single control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlState {
    /// Not clickable (model loading, or the other mode is active).
    Disabled,
    /// Clickable; starts the operation.
    Ready,
    /// Operation started, no chunk delivered yet. In stream mode this still
    /// cancels; in disk mode the control is inert until delivery begins.
    Loading,
    /// Operation delivering; clicking stops it.
    Stop,
}

/// Visual state of the two pipeline controls.
///
/// A pure projection of the published snapshot — the core never touches
/// presentation, the UI layer recomputes this after every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlsView {
    /// Live-playback control
    pub stream: ControlState,
    /// Save-to-disk control
    pub save: ControlState,
}

impl ControlsView {
    pub fn project(snapshot: &PipelineSnapshot) -> Self {
        match snapshot.mode {
            Mode::Idle => {
                let state = if snapshot.model_ready {
                    ControlState::Ready
                } else {
                    ControlState::Disabled
                };
                Self {
                    stream: state,
                    save: state,
                }
            }
            Mode::Stream => Self {
                stream: active_state(snapshot),
                save: ControlState::Disabled,
            },
            Mode::Disk => Self {
                stream: ControlState::Disabled,
                save: active_state(snapshot),
            },
        }
    }
}

fn active_state(snapshot: &PipelineSnapshot) -> ControlState {
    if snapshot.delivering {
        ControlState::Stop
    } else {
        ControlState::Loading
    }
}
