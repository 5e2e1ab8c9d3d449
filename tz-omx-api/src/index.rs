/// Indexes the core must recognize or pass through (§6). The
/// `Tizonia*` variants are the vendor extension range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OmxIndex {
    ParamPortDefinition,
    ParamContentURI,
    ParamAudioPcm,
    ParamAudioMp3,
    ParamAudioAac,
    ParamAudioVorbis,
    ConfigMetadataItemCount,
    ConfigMetadataItem,
    ConfigAudioVolume,
    ConfigAudioMute,
    TizoniaParamAudioOpus,
    TizoniaParamAudioFlac,
    TizoniaParamAudioMp2,
    TizoniaParamBufferPreAnnouncementsMode,
    /// Vendor extension the HTTP-server graph's encoder uses for the
    /// ICY station name/genre pair (§4.5, "configure_station").
    TizoniaParamStationInfo,
    /// Vendor extension the HTTP-server graph's server uses for
    /// buffer/client tuning (§4.5, "configure_server").
    TizoniaParamServerTuning,
}
