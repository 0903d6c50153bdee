use thiserror::Error;

/// Errors that can occur while driving a camera capture session.
///
/// Recoverable conditions (`DeviceUnavailable`, `ConfigurationRejected`,
/// `AuthorizationDenied`) are absorbed by the session and leave it in its
/// previous state. Failures raised by asynchronous hardware or store
/// completions are delivered through the session's error callback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no camera device matches selector '{0}'")]
    DeviceUnavailable(String),

    #[error("configuration rejected: {0}")]
    ConfigurationRejected(String),

    #[error("invalid configuration: {0}")]
    ConfigurationFailed(String),

    #[error("could not lock device for configuration: {0}")]
    LockContention(String),

    #[error("still image capture failed: {0}")]
    CaptureFailed(String),

    #[error("saving to photo store failed: {0}")]
    PersistenceFailed(String),

    #[error("camera access denied")]
    AuthorizationDenied,

    #[error("a capture is already in progress")]
    CaptureInProgress,

    #[error("session stopped")]
    SessionStopped,

    #[error("session is not running")]
    SessionNotRunning,

    #[error("image decoding failed: {0}")]
    DecodeFailed(String),

    #[error("continuation already resolved")]
    AlreadyResolved,

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// Whether the session absorbs this error locally instead of reporting it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DeviceUnavailable(_) | Self::ConfigurationRejected(_) | Self::AuthorizationDenied
        )
    }
}
