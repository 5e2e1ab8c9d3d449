use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Options recognized by the core (§3, "Graph configuration"). Every
/// variant is a plain, `serde`-serializable data record; loading one from
/// a file or the CLI is an external collaborator's job (§1), not this
/// crate's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GraphConfig {
    UriList(UriListConfig),
    HttpServer(HttpServerConfig),
    StreamingService(StreamingServiceConfig),
    ServerTuning(ServerTuningConfig),
    Playback(PlaybackConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UriListConfig {
    pub uris: Vec<String>,
    pub current_index: u32,
    pub shuffle: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    pub station_name: String,
    pub genre: String,
    pub bitrate_kbps: u32,
    pub sample_rate_hz: u32,
    pub channels: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingServiceConfig {
    pub service_credentials: HashMap<String, String>,
    pub playlist_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerTuningConfig {
    pub buffer_seconds: u32,
    pub max_clients: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub initial_volume_percent: u32,
    pub start_paused: bool,
}
