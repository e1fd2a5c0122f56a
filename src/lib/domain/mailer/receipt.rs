//! Send receipts

use serde::Serialize;

/// The provider's answer to an accepted transmission
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    /// Provider-assigned transmission id, used to correlate webhook events
    pub transmission_id: String,

    /// Number of recipients the provider accepted
    pub total_accepted: u64,

    /// Number of recipients the provider rejected
    pub total_rejected: u64,
}

impl SendReceipt {
    /// Whether some recipients were rejected while others were accepted
    pub fn is_partial_failure(&self) -> bool {
        self.total_rejected > 0 && self.total_accepted > 0
    }

    /// Whether any recipient was rejected
    pub fn has_rejections(&self) -> bool {
        self.total_rejected > 0
    }
}
