use crate::port::PortIndex;
use crate::state::StateId;

/// `OMX_SendCommand`'s command subset the core uses (§6). `port: None`
/// means "all ports" (the OMX convention of passing `OMX_ALL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OmxCommand {
    StateSet(StateId),
    PortDisable(Option<PortIndex>),
    PortEnable(Option<PortIndex>),
    Flush(Option<PortIndex>),
    MarkBuffer(PortIndex),
}
