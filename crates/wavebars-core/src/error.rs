use thiserror::Error;

/// Failure reported by a graphics, shader, signal or timer collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BackendError(pub String);

impl BackendError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors surfaced by the visualizer core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisualizerError {
    /// Fatal at startup: no usable graphics context, shader program or timer.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Rejected accent color; the previous color stays in effect.
    #[error("invalid color {0:?}: expected a #rrggbb hex triple")]
    InvalidColor(String),
    /// Capture window outside the power-of-two range the analyser accepts.
    #[error("capture window {0} is not a power of two in [32, 4096]")]
    CaptureWindow(usize),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

pub type Result<T, E = VisualizerError> = std::result::Result<T, E>;
