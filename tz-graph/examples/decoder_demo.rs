//! Minimal end-to-end wiring of a `Decoder` graph against the in-workspace
//! component simulator, in the same spirit as `pmocontrol`'s own
//! `examples/` binaries: install a subscriber, build one collaborator, log
//! what happens.
//!
//! Run with `RUST_LOG=debug cargo run -p tz-graph --example decoder_demo`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tz_component_sim::SimIlCore;
use tz_graph::{Graph, GraphFactory, NullCallbacks};
use tz_ops::{ProbeError, ProbeOutcome, Prober};
use tz_omx_api::{Coding, Domain, GraphConfig, UriListConfig};
use tz_queue::CallbackRegistry;

/// Always reports the same PCM/FLAC outcome; a real prober would actually
/// inspect the URI (§1: out of scope for this crate).
struct FixedProber;

impl Prober for FixedProber {
    fn probe(&mut self, _uri: &str) -> Result<ProbeOutcome, ProbeError> {
        Ok(ProbeOutcome {
            domain: Domain::Audio,
            coding: Coding::Flac,
            container: "flac".into(),
            sample_rate_hz: 44_100,
            channels: 2,
            bitrate_kbps: 900,
        })
    }
}

fn main() {
    let _ = tracing_subscriber::fmt::try_init();

    let il_core = Arc::new(SimIlCore::new());
    let registry = CallbackRegistry::new();
    let variant = GraphFactory::variant_for("decoder").expect("decoder is a recognized kind");

    let graph = Graph::new(variant, il_core, registry, Arc::new(NullCallbacks), Box::new(FixedProber));

    graph
        .load(GraphConfig::UriList(UriListConfig {
            uris: vec!["file:///tmp/track.flac".into()],
            current_index: 0,
            shuffle: false,
        }))
        .expect("graph accepts load while its queue is healthy");

    graph
        .execute(GraphConfig::UriList(UriListConfig {
            uris: vec!["file:///tmp/track.flac".into()],
            current_index: 0,
            shuffle: false,
        }))
        .expect("graph accepts execute while its queue is healthy");

    thread::sleep(Duration::from_millis(50));

    graph.shutdown().expect("graph shuts down cleanly");
}
