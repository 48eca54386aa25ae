use crate::attributes::RtpMap;
use crate::connection::Connection;
use crate::line::Line;
use crate::media::Media;
use crate::origin::Origin;
use crate::session_description::{MediaId, NotFoundError};
use crate::time::Time;
use crate::{
    Attribute, H264_CLOCK_RATE, MediaDescription, SDP_VERSION, SessionDescription, StartMode,
    is_h264,
};
use bytesstr::BytesStr;
use internal::{atoi, leading_number, verbose_error_to_owned};
use nom::Finish;

#[derive(Debug, thiserror::Error)]
pub enum ParseSessionDescriptionError {
    #[error("session description is empty")]
    EmptyDescription,
    #[error("unsupported SDP version {0:?}")]
    UnsupportedVersion(String),
    #[error("unsupported network type {0:?}, only IN is supported")]
    UnsupportedNetworkType(String),
    #[error("unsupported address type {0:?}, only IP4 is supported")]
    UnsupportedAddressType(String),
    #[error("unsupported media type {0:?}")]
    UnsupportedMediaType(String),
    #[error("media field (m=) is missing the media type")]
    MissingMediaType,
    #[error("unsupported transport protocol {0:?}, only RTP/AVP is supported")]
    UnsupportedProtocol(String),
    #[error("payload type {0} is not a dynamic RTP payload type")]
    UnsupportedPayloadType(u32),
    #[error("attribute refers to payload type {found}, but media uses {expected}")]
    PayloadTypeMismatch { expected: u8, found: u32 },
    #[error("rtpmap attribute is missing the encoding name")]
    MissingEncodingName,
    #[error("H264 requires a clock rate of 90000, got {0}")]
    UnsupportedClockRate(u32),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
    #[error("{0} attribute is only allowed inside a media description")]
    MediaLevelOnly(&'static str),
    #[error("{0}")]
    ParseError(nom::error::VerboseError<String>),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl From<nom::error::VerboseError<&str>> for ParseSessionDescriptionError {
    fn from(value: nom::error::VerboseError<&str>) -> Self {
        Self::ParseError(verbose_error_to_owned(value))
    }
}

/// Line by line parser state, the active level is the last media field or the session
#[derive(Default)]
pub(crate) struct Parser {
    session: SessionDescription,
    media: Option<MediaId>,
}

impl Parser {
    pub(crate) fn parse_line(
        &mut self,
        src: &BytesStr,
        line: Line<'_>,
    ) -> Result<(), ParseSessionDescriptionError> {
        let bytes = |s: &str| BytesStr::from_parse(src.as_ref(), s);
        let value = line.value;

        match line.kind {
            'v' => {
                if atoi::<u32>(value.trim()) != Some(SDP_VERSION) {
                    return Err(ParseSessionDescriptionError::UnsupportedVersion(
                        value.into(),
                    ));
                }

                log::debug!("version: {value}");
            }
            'o' => {
                let origin = Origin::parse(value)?;

                log::debug!(
                    "origin: username={:?} session_id={} session_version={} address={:?}",
                    origin.username,
                    origin.session_id,
                    origin.session_version,
                    origin.address
                );

                self.session.session_id = origin.session_id;
                self.session.session_version = origin.session_version;
                self.session.server_addr = origin.address.map(bytes);
            }
            's' => {
                log::debug!("session name: {value}");
                self.session.session_name = Some(bytes(value));
            }
            'i' => match self.media_mut() {
                Some(media) => {
                    log::debug!("media title: {value}");
                    media.title = Some(bytes(value));
                }
                None => {
                    log::debug!("session info: {value}");
                    self.session.session_info = Some(bytes(value));
                }
            },
            'u' => {
                log::debug!("uri: {value}");
                self.session.uri = Some(bytes(value));
            }
            'e' => {
                log::debug!("email: {value}");
                self.session.email = Some(bytes(value));
            }
            'p' => {
                log::debug!("phone: {value}");
                self.session.phone = Some(bytes(value));
            }
            'c' => {
                let Some(connection) = Connection::parse(value)? else {
                    log::warn!("ignoring connection field without address {value:?}");
                    return Ok(());
                };

                log::debug!(
                    "connection: address={} multicast={}",
                    connection.address,
                    connection.multicast
                );

                let address = Some(bytes(connection.address));

                match self.media_mut() {
                    Some(media) => {
                        media.connection_addr = address;
                        media.is_multicast = connection.multicast;
                    }
                    None => {
                        self.session.connection_addr = address;
                        self.session.is_multicast = connection.multicast;
                    }
                }
            }
            't' => {
                let time = Time::parse(value);
                log::debug!("time: start={} stop={}", time.start, time.stop);
            }
            'm' => {
                let media = Media::parse(value)?;

                log::debug!(
                    "media: type={} port={} payload_type={}",
                    media.media_type,
                    media.port,
                    media.payload_type
                );

                let mut media_description = MediaDescription::new(media.media_type);
                media_description.set_ports(media.port);
                media_description.payload_type = media.payload_type;

                self.media = Some(self.session.add_media(media_description));
            }
            'a' => self.parse_attribute(src, value)?,
            kind => log::debug!("ignoring unsupported field {kind}={value}"),
        }

        Ok(())
    }

    fn parse_attribute(
        &mut self,
        src: &BytesStr,
        attribute: &str,
    ) -> Result<(), ParseSessionDescriptionError> {
        let bytes = |s: &str| BytesStr::from_parse(src.as_ref(), s);

        let (key, value) = match attribute.split_once(':') {
            Some((key, value)) => (key, Some(value)),
            None => (attribute, None),
        };

        match key {
            "rtpmap" => {
                let media = self.media_level("rtpmap")?;

                let (_, rtpmap) = RtpMap::parse(value.unwrap_or_default()).finish()?;

                if rtpmap.payload != u32::from(media.payload_type) {
                    return Err(ParseSessionDescriptionError::PayloadTypeMismatch {
                        expected: media.payload_type,
                        found: rtpmap.payload,
                    });
                }

                let encoding = rtpmap
                    .encoding
                    .ok_or(ParseSessionDescriptionError::MissingEncodingName)?;

                if is_h264(encoding) && rtpmap.clock_rate != H264_CLOCK_RATE {
                    return Err(ParseSessionDescriptionError::UnsupportedClockRate(
                        rtpmap.clock_rate,
                    ));
                }

                log::debug!(
                    "rtpmap: encoding={encoding} clock_rate={} params={:?}",
                    rtpmap.clock_rate,
                    rtpmap.params
                );

                media.encoding_name = Some(bytes(encoding));
                media.encoding_params = rtpmap.params.map(bytes);
                media.clock_rate = rtpmap.clock_rate;
            }
            "fmtp" => {
                let id = self
                    .media
                    .ok_or(ParseSessionDescriptionError::MediaLevelOnly("fmtp"))?;
                let media = self.media_level("fmtp")?;

                let (params, payload) =
                    leading_number::<u32>(value.unwrap_or_default().trim_start()).finish()?;

                if payload != u32::from(media.payload_type) {
                    return Err(ParseSessionDescriptionError::PayloadTypeMismatch {
                        expected: media.payload_type,
                        found: payload,
                    });
                }

                if media.is_h264() {
                    log::debug!("H264 fmtp: {params}");

                    if let Err(e) = media.h264_fmtp.update(params.trim()) {
                        log::warn!("failed to apply H264 fmtp parameters {params:?}, {e}");
                    }
                } else {
                    log::debug!("keeping fmtp of non H264 media as attribute");

                    self.session.add_media_attribute(
                        id,
                        Attribute {
                            key: bytes(key),
                            value: value.map(bytes),
                        },
                    )?;
                }
            }
            "tool" | "type" | "charset" => {
                if self.media.is_some() {
                    log::warn!("ignoring session level attribute {key} inside media description");
                    return Ok(());
                }

                log::debug!("{key}: {value:?}");

                let value = value.map(bytes);

                match key {
                    "tool" => self.session.tool = value,
                    "type" => self.session.session_type = value,
                    _ => self.session.charset = value,
                }
            }
            "control" => {
                let Some(value) = value else {
                    log::warn!("ignoring control attribute without url");
                    return Ok(());
                };

                log::debug!("control: {value}");

                let url = Some(bytes(value));

                match self.media_mut() {
                    Some(media) => media.control_url = url,
                    None => self.session.control_url = url,
                }
            }
            "rtcp-xr" => {
                let value = value.unwrap_or_default();

                log::debug!("rtcp-xr: {value}");

                match self.media_mut() {
                    Some(media) => media.rtcp_xr.update(value),
                    None => self.session.rtcp_xr.update(value),
                }
            }
            "rtcp" => {
                let media = self.media_level("rtcp")?;

                // `<port> [<nettype> <addrtype> <address>]`, only the port is used
                let port = value
                    .and_then(|value| atoi::<u16>(value.trim_start()))
                    .unwrap_or_default();

                if port > 0 {
                    log::debug!("rtcp port: {port}");
                    media.dst_control_port = port;
                } else {
                    log::warn!("ignoring invalid rtcp port {value:?}");
                }
            }
            _ => {
                if let Some(start_mode) = StartMode::from_attribute(key) {
                    log::debug!("start mode: {key}");

                    match self.media_mut() {
                        Some(media) => media.start_mode = start_mode,
                        None => self.session.start_mode = start_mode,
                    }

                    return Ok(());
                }

                log::debug!("attribute: {key}={value:?}");

                let attribute = Attribute {
                    key: bytes(key),
                    value: value.map(bytes),
                };

                match self.media {
                    Some(id) => {
                        self.session.add_media_attribute(id, attribute)?;
                    }
                    None => {
                        self.session.add_attribute(attribute);
                    }
                }
            }
        }

        Ok(())
    }

    fn media_mut(&mut self) -> Option<&mut MediaDescription> {
        self.media
            .and_then(|id| self.session.media_mut(id))
    }

    fn media_level(
        &mut self,
        key: &'static str,
    ) -> Result<&mut MediaDescription, ParseSessionDescriptionError> {
        self.media_mut()
            .ok_or(ParseSessionDescriptionError::MediaLevelOnly(key))
    }

    /// Apply the session level defaults to all media and return the parsed session
    pub(crate) fn finish(mut self) -> Result<SessionDescription, ParseSessionDescriptionError> {
        self.session.inherit_session_defaults();

        Ok(self.session)
    }
}
