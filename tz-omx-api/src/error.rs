use thiserror::Error;

/// Mirrors the subset of `OMX_ERRORTYPE` the core graph engine ever
/// inspects or produces. Components may report other codes; anything not
/// listed here collapses to [`OmxError::Undefined`] at the adapter
/// boundary rather than failing to compile against an unbounded C enum.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OmxError {
    #[error("incorrect state operation")]
    IncorrectStateOperation,
    #[error("bad parameter")]
    BadParameter,
    #[error("insufficient resources")]
    InsufficientResources,
    #[error("invalid state")]
    InvalidState,
    #[error("command canceled")]
    CommandCanceled,
    #[error("unsupported setting")]
    UnsupportedSetting,
    #[error("unsupported index")]
    UnsupportedIndex,
    #[error("port unpopulated")]
    PortUnpopulated,
    #[error("stream is corrupt (fatal)")]
    StreamCorruptFatal,
    #[error("format not detected")]
    FormatNotDetected,
    #[error("stream is corrupt (recoverable)")]
    StreamCorrupt,
    #[error("content pipe not found")]
    ContentPipeOpenFailed,
    #[error("notify required")]
    NotifyRequired,
    #[error("timeout waiting for component acknowledgment")]
    Timeout,
    #[error("undefined error: {0}")]
    Undefined(&'static str),
}

impl OmxError {
    /// `is_fatal_error` guard (§4.4): codes that can never be recovered
    /// from by skipping to the next playlist item and therefore drive the
    /// graph straight to teardown.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            OmxError::StreamCorruptFatal
                | OmxError::FormatNotDetected
                | OmxError::InsufficientResources
                | OmxError::Timeout
                | OmxError::Undefined(_)
        )
    }
}

pub type OmxResult<T> = Result<T, OmxError>;
