use serde::{Deserialize, Serialize};

use crate::handle::ComponentHandle;
use crate::port::{PortIndex, SupplierSide};

/// Small integer identifying a tunnel within a graph (§3, "Tunnel").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TunnelId(pub u32);

/// Ordered pair `(output_port, input_port)`, created at graph setup and
/// torn down at unload. `supplier` records which end won the buffer
/// negotiation during `setup` (§4.4, "setup").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tunnel {
    pub id: TunnelId,
    pub output_handle: ComponentHandle,
    pub output_port: PortIndex,
    pub input_handle: ComponentHandle,
    pub input_port: PortIndex,
    pub supplier: SupplierSide,
    pub enabled: bool,
}

impl Tunnel {
    pub fn new(
        id: TunnelId,
        output_handle: ComponentHandle,
        output_port: PortIndex,
        input_handle: ComponentHandle,
        input_port: PortIndex,
    ) -> Self {
        Tunnel {
            id,
            output_handle,
            output_port,
            input_handle,
            input_port,
            supplier: SupplierSide::Unspecified,
            enabled: false,
        }
    }
}
