//! Start mode attribute (`a=recvonly`, `a=sendrecv`, `a=sendonly`, `a=inactive`)

/// Start mode attribute e.g. (`a=sendonly`)
///
/// Session and Media Level attribute.  
/// If the media leaves it unspecified the mode of the session is used for the media.
///
/// [RFC4566](https://www.rfc-editor.org/rfc/rfc4566.html#section-6)
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub enum StartMode {
    /// No attribute present
    #[default]
    Unspecified,

    /// Only receive media data
    RecvOnly,

    /// Send and receive media data
    SendRecv,

    /// Only send media data
    SendOnly,

    /// Media is inactive not sending any data
    Inactive,
}

impl StartMode {
    /// Attribute name of the mode, `None` if unspecified
    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            StartMode::Unspecified => None,
            StartMode::RecvOnly => Some("recvonly"),
            StartMode::SendRecv => Some("sendrecv"),
            StartMode::SendOnly => Some("sendonly"),
            StartMode::Inactive => Some("inactive"),
        }
    }

    pub(crate) fn from_attribute(key: &str) -> Option<Self> {
        match key {
            "recvonly" => Some(StartMode::RecvOnly),
            "sendrecv" => Some(StartMode::SendRecv),
            "sendonly" => Some(StartMode::SendOnly),
            "inactive" => Some(StartMode::Inactive),
            _ => None,
        }
    }
}
