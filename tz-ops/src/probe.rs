use tz_omx_api::{Coding, Domain};

/// What a successful probe determines about a content URI (§4.4,
/// "probe"): container/coding plus the codec parameters needed to
/// configure the decoder and renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub domain: Domain,
    pub coding: Coding,
    pub container: String,
    pub sample_rate_hz: u32,
    pub channels: u32,
    pub bitrate_kbps: u32,
}

/// Read-only inspection of a content URI, external to the core (§1: audio
/// probing is an external collaborator). Injected so `ops` can run it
/// without depending on a concrete prober implementation; `recoverable`
/// on error distinguishes "skip to next URI" from a fatal probe error.
pub trait Prober: Send {
    fn probe(&mut self, uri: &str) -> Result<ProbeOutcome, ProbeError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeError {
    pub message: String,
    pub recoverable: bool,
}

impl ProbeError {
    pub fn recoverable(message: impl Into<String>) -> Self {
        ProbeError {
            message: message.into(),
            recoverable: true,
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        ProbeError {
            message: message.into(),
            recoverable: false,
        }
    }
}
