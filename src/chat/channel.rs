use serde::{Deserialize, Serialize};
use std::fmt;

/// Channel names as they appear on the network, including any leading sigil.
/// No normalisation happens, so `#ops` and `ops` are different channels.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelName(pub String);

/// Format without the surrounding newtype wrapper.
///
/// ```
/// let x = ChannelName("#fp".into());
/// assert_eq!(format!("{}", x), "#fp");
/// ```
impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChannelName {
    fn from(s: &str) -> Self {
        ChannelName(s.to_owned())
    }
}

/// Whether a command argument names a channel rather than being the first
/// positional argument.
pub fn is_channel_name(s: &str) -> bool {
    s.len() > 1 && matches!(s.chars().next(), Some('#' | '&' | '+' | '!'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_channel_name() {
        assert!(is_channel_name("#ops"));
        assert!(is_channel_name("&local"));
        assert!(!is_channel_name("#"));
        assert!(!is_channel_name("proj"));
        assert!(!is_channel_name(""));
    }
}
