use super::error::CaptureError;

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → configuring → running → stopping → idle
///            ↓
///          idle   (authorization denied / no device)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Configuring,
    Running,
    Stopping,
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether `stop` has anything to tear down from this state.
    pub fn is_stoppable(&self) -> bool {
        matches!(self, Self::Running | Self::Configuring)
    }
}

/// Lifecycle of a single still capture request.
///
/// ```text
/// requested → awaiting_hardware → decoded
///                    ↓
///                  failed
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Requested,
    AwaitingHardware,
    Decoded,
    Failed(CaptureError),
}

impl RequestState {
    /// Decoded and failed requests never change state again.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Decoded | Self::Failed(_))
    }
}
