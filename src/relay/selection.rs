//! Channel selection policy

use crate::config::ConfigProvider;
use relay_shared::Channel;

/// Pick the outbound channel for one reading from the current flags
///
/// Radio wins over internet; with neither enabled the reading is accepted
/// but not forwarded.
pub fn select_channel(config: &dyn ConfigProvider) -> Channel {
    if config.radio_enabled() {
        Channel::Radio
    } else if config.internet_enabled() {
        Channel::Internet
    } else {
        Channel::None
    }
}
