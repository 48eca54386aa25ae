use crate::session_description::AttributeKey;
use crate::{H264Fmtp, MediaType, RtcpXr, StartMode, is_h264};
use bytesstr::BytesStr;

/// Media description (`m=...` and the lines until the next media field)
///
/// Attributes without a dedicated field are owned by the [`SessionDescription`](crate::SessionDescription)
/// which holds this media, see [`SessionDescription::media_attributes`](crate::SessionDescription::media_attributes).
#[derive(Debug, Clone, PartialEq)]
pub struct MediaDescription {
    pub media_type: MediaType,

    /// Media title (`i=`)
    pub title: Option<BytesStr>,

    /// Connection address, the session's address is used if absent
    pub connection_addr: Option<BytesStr>,
    pub is_multicast: bool,

    /// RTP port
    pub dst_stream_port: u16,

    /// RTCP port, the stream port + 1 unless set with `a=rtcp`
    pub dst_control_port: u16,

    /// Dynamic RTP payload type, see [`DYNAMIC_PAYLOAD_TYPES`](crate::DYNAMIC_PAYLOAD_TYPES)
    pub payload_type: u8,

    /// `a=control`
    pub control_url: Option<BytesStr>,

    /// The session's mode is used if unspecified
    pub start_mode: StartMode,

    /// `a=rtpmap` encoding name, clock rate and optional parameters
    pub encoding_name: Option<BytesStr>,
    pub encoding_params: Option<BytesStr>,
    pub clock_rate: u32,

    /// Only meaningful if the encoding is H264
    pub h264_fmtp: H264Fmtp,

    /// The session's settings are used if not set for this media
    pub rtcp_xr: RtcpXr,

    pub(crate) attributes: Vec<AttributeKey>,
}

impl MediaDescription {
    pub fn new(media_type: MediaType) -> Self {
        Self {
            media_type,
            title: None,
            connection_addr: None,
            is_multicast: false,
            dst_stream_port: 0,
            dst_control_port: 0,
            payload_type: 0,
            control_url: None,
            start_mode: StartMode::Unspecified,
            encoding_name: None,
            encoding_params: None,
            clock_rate: 0,
            h264_fmtp: H264Fmtp::default(),
            rtcp_xr: RtcpXr::default(),
            attributes: Vec::new(),
        }
    }

    /// Set the stream port and derive the control port from it
    pub fn set_ports(&mut self, stream_port: u16) {
        self.dst_stream_port = stream_port;
        self.dst_control_port = if stream_port > 0 {
            stream_port.saturating_add(1)
        } else {
            0
        };
    }

    /// Returns if the encoding name is `H264` (case-insensitive)
    pub fn is_h264(&self) -> bool {
        self.encoding_name.as_deref().is_some_and(is_h264)
    }
}
