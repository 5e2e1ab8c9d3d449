use tz_fsm::GraphVariant;

/// Picks the graph variant for a requested playback kind (§2, "Graph
/// factory"). Fail-closed: an unrecognized request yields `None` rather
/// than a default decoder graph, matching `tizgraphfactory.cpp`'s
/// `null_ptr` result on an unrecognized codec/container.
pub struct GraphFactory;

impl GraphFactory {
    /// `kind` is the caller's declared intent (e.g. a URI scheme or
    /// explicit request such as `"http-server"`), not yet the probed
    /// codec — that only becomes known once `probe` runs inside
    /// `configuring`/`auto_detecting`.
    pub fn variant_for(kind: &str) -> Option<GraphVariant> {
        match kind {
            "decoder" => Some(GraphVariant::Decoder),
            "http-server" | "http_server" => Some(GraphVariant::HttpServer),
            "streaming-service" | "streaming_service" | "dirble" | "soundcloud" | "tunein" => {
                Some(GraphVariant::StreamingService)
            }
            "chromecast" => Some(GraphVariant::Chromecast),
            "youtube" => Some(GraphVariant::YouTube),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_kind_is_rejected_rather_than_defaulted() {
        assert!(GraphFactory::variant_for("some-unknown-codec").is_none());
    }

    #[test]
    fn recognized_kinds_resolve() {
        assert_eq!(GraphFactory::variant_for("decoder"), Some(GraphVariant::Decoder));
        assert_eq!(GraphFactory::variant_for("youtube"), Some(GraphVariant::YouTube));
    }
}
