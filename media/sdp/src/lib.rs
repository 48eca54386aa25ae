//! SDP ([RFC4566](https://www.rfc-editor.org/rfc/rfc4566.html)) parsing & generation for RTP/AVP streaming sessions.
//!
//! Covers the subset used for RTSP-style announcements: IPv4 only, the `RTP/AVP` profile with dynamic payload
//! types, RTCP extended reports and H.264 format parameters.
//!
//! ```
//! let sdp = "v=0\r\n\
//!            o=- 123456789 1 IN IP4 192.168.43.1\r\n\
//!            s=Test\r\n\
//!            c=IN IP4 239.255.42.1\r\n\
//!            t=0 0\r\n\
//!            m=video 55004 RTP/AVP 96\r\n\
//!            a=rtpmap:96 H264/90000\r\n";
//!
//! let session = ezk_sdp::read_description(sdp).unwrap();
//! let (_, media) = session.media_descriptions().next().unwrap();
//!
//! assert_eq!(media.dst_control_port, 55005);
//! assert!(media.is_multicast);
//!
//! let text = ezk_sdp::write_description(&session, false).unwrap();
//! assert!(text.starts_with("v=0\r\no=- 123456789 1 IN IP4 192.168.43.1\r\n"));
//! ```

#![warn(unreachable_pub)]

use internal::atoi;
use std::ops::RangeInclusive;

mod attributes;
mod connection;
mod generator;
mod line;
mod media;
mod media_description;
mod origin;
mod parser;
mod session_description;
mod time;

pub use attributes::{
    Attribute, H264Fmtp, H264FmtpError, RtcpXr, RttReportMode, StartMode, StatSummary,
};
pub use generator::WriteSessionDescriptionError;
pub use media::MediaType;
pub use media_description::MediaDescription;
pub use parser::ParseSessionDescriptionError;
pub use session_description::{AttributeId, MediaId, NotFoundError, SessionDescription};

/// The only protocol version defined by RFC4566
pub const SDP_VERSION: u32 = 0;

/// The only supported transport protocol
pub const RTP_AVP: &str = "RTP/AVP";

/// RTP payload types which can be assigned per session
///
/// [RFC3551](https://www.rfc-editor.org/rfc/rfc3551.html#section-6)
pub const DYNAMIC_PAYLOAD_TYPES: RangeInclusive<u8> = 96..=127;

/// Mandatory RTP clock rate of H.264 streams
///
/// [RFC6184](https://www.rfc-editor.org/rfc/rfc6184.html#section-8.2.1)
pub const H264_CLOCK_RATE: u32 = 90000;

/// TTL appended to multicast connection addresses
pub const MULTICAST_TTL: u32 = 127;

/// First octets of the IPv4 multicast range
const MULTICAST_FIRST_OCTET: RangeInclusive<u32> = 224..=239;

/// Parse a session description, see [`SessionDescription::parse`]
pub fn read_description(sdp: &str) -> Result<SessionDescription, ParseSessionDescriptionError> {
    SessionDescription::parse(&sdp.to_owned().into())
}

/// Generate a session description, see [`SessionDescription::write`]
pub fn write_description(
    session: &SessionDescription,
    deletion: bool,
) -> Result<String, WriteSessionDescriptionError> {
    session.write(deletion)
}

/// Returns if the leading dotted-decimal octet of `address` lies inside the multicast range
pub fn is_multicast_address(address: &str) -> bool {
    atoi::<u32>(address).is_some_and(|octet| MULTICAST_FIRST_OCTET.contains(&octet))
}

fn is_h264(encoding_name: &str) -> bool {
    encoding_name.eq_ignore_ascii_case("H264")
}
