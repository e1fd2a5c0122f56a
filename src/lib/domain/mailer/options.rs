//! Send options

use serde::{Deserialize, Serialize};

use super::MessageKind;

/// Host-configured tracking flags
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackingSettings {
    /// Track opens
    pub open_tracking: bool,

    /// Track clicks
    pub click_tracking: bool,
}

/// Delivery options sent with a transmission
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOptions {
    /// Track opens
    pub open_tracking: bool,

    /// Track clicks
    pub click_tracking: bool,

    /// Whether this is a transactional send
    pub transactional: bool,
}

impl SendOptions {
    /// Derives the options for a message of the given kind.
    ///
    /// Transactional sends never track, whatever the host settings say.
    pub fn new(kind: MessageKind, tracking: TrackingSettings) -> Self {
        match kind {
            MessageKind::Transactional => Self {
                open_tracking: false,
                click_tracking: false,
                transactional: true,
            },
            MessageKind::Bulk => Self {
                open_tracking: tracking.open_tracking,
                click_tracking: tracking.click_tracking,
                transactional: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACK_ALL: TrackingSettings = TrackingSettings {
        open_tracking: true,
        click_tracking: true,
    };

    #[test]
    fn test_transactional_disables_tracking() {
        let options = SendOptions::new(MessageKind::Transactional, TRACK_ALL);

        assert!(options.transactional);
        assert!(!options.open_tracking);
        assert!(!options.click_tracking);
    }

    #[test]
    fn test_bulk_follows_host_tracking() {
        let options = SendOptions::new(MessageKind::Bulk, TRACK_ALL);

        assert!(!options.transactional);
        assert!(options.open_tracking);
        assert!(options.click_tracking);

        let options = SendOptions::new(MessageKind::Bulk, TrackingSettings::default());

        assert!(!options.open_tracking);
        assert!(!options.click_tracking);
    }
}
