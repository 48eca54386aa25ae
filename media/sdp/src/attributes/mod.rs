use bytesstr::BytesStr;
use std::fmt;

mod h264_fmtp;
mod rtcp_xr;
mod rtpmap;
mod start_mode;

pub use h264_fmtp::{H264Fmtp, H264FmtpError};
pub use rtcp_xr::{RtcpXr, RttReportMode, StatSummary};
pub(crate) use rtpmap::RtpMap;
pub use start_mode::StartMode;

/// `key[:value]` pair for attributes without a dedicated field, e.g. vendor extensions
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute name, the part before the optional `:`
    pub key: BytesStr,

    /// if the optional `:` is present the part after it is stored inside `value`
    pub value: Option<BytesStr>,
}

impl Attribute {
    /// Property attribute (`a=<key>`)
    pub fn new(key: impl Into<BytesStr>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Value attribute (`a=<key>:<value>`)
    pub fn with_value(key: impl Into<BytesStr>, value: impl Into<BytesStr>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a={}", self.key)?;

        if let Some(value) = self.value.as_ref().filter(|value| !value.is_empty()) {
            write!(f, ":{value}")?;
        }

        Ok(())
    }
}
