use serde::{Deserialize, Serialize};

pub type PortIndex = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Audio,
    Video,
    Other,
}

/// Audio coding types the core must recognize (§6). `Unused` is the OMX
/// wildcard: a tunnel endpoint declaring it accepts any coding on the
/// other side (§3, "or one side declares 'unused' to mean any").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coding {
    Unused,
    Pcm,
    Mp2,
    Mp3,
    Aac,
    Vorbis,
    Flac,
    Opus,
}

impl Coding {
    /// Tunnel compatibility check (§3 invariant: "tunneled pairs must agree
    /// on domain and coding, or one side declares 'unused'").
    pub fn compatible(self, other: Coding) -> bool {
        self == Coding::Unused || other == Coding::Unused || self == other
    }
}

/// How many of `buffer_count` buffers have been allocated/registered on a
/// port (§3, "Port population").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopulationStatus {
    Unpopulated,
    Partial { allocated: u32 },
    FullyPopulated,
}

impl PopulationStatus {
    pub fn is_fully_unpopulated(self) -> bool {
        matches!(self, PopulationStatus::Unpopulated)
    }

    pub fn is_fully_populated(self) -> bool {
        matches!(self, PopulationStatus::FullyPopulated)
    }
}

/// Which end of a tunnel owns the buffer memory (§3, "Buffer supplier").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplierSide {
    Input,
    Output,
    Unspecified,
}

/// A component port's definition record (§3, "Port").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortDef {
    pub index: PortIndex,
    pub direction: PortDirection,
    pub domain: Domain,
    pub coding: Coding,
    pub buffer_count: u32,
    pub buffer_size: u32,
    pub enabled: bool,
    pub supplier_preference: SupplierSide,
    pub population: PopulationStatus,
    /// `true` while a tunneled port is mid-transition (disabling/enabling)
    /// and is therefore exempt from the usual `UseBuffer`/`EmptyThisBuffer`
    /// rejection rule (§4.6).
    pub transitioning_to_enabled: bool,
}

impl PortDef {
    pub fn new(index: PortIndex, direction: PortDirection, domain: Domain, coding: Coding) -> Self {
        PortDef {
            index,
            direction,
            domain,
            coding,
            buffer_count: 4,
            buffer_size: 8192,
            enabled: true,
            supplier_preference: SupplierSide::Unspecified,
            population: PopulationStatus::Unpopulated,
            transitioning_to_enabled: false,
        }
    }
}
