use crate::{
    Attribute, MULTICAST_TTL, MediaDescription, RTP_AVP,
    SessionDescription, is_multicast_address,
};
use std::fmt;

/// Session description cannot be generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WriteSessionDescriptionError {
    #[error("session description has no server address")]
    MissingServerAddress,
    #[error("media {media} has no connection address and the session provides none")]
    MissingConnectionAddress { media: usize },
    #[error("media {media} has no stream or control port")]
    InvalidPort { media: usize },
    #[error("media {media} has no payload type")]
    InvalidPayloadType { media: usize },
    #[error("media {media} has no encoding name")]
    MissingEncodingName { media: usize },
}

pub(crate) fn write(
    session: &SessionDescription,
    deletion: bool,
) -> Result<String, WriteSessionDescriptionError> {
    let server_addr = non_empty(session.server_addr.as_deref()).ok_or_else(|| {
        log::error!("cannot generate session description without server address");
        WriteSessionDescriptionError::MissingServerAddress
    })?;

    let origin = OriginLine {
        session,
        server_addr,
    };

    if deletion {
        return Ok(format!("{origin}\r\n"));
    }

    for (index, (_, media)) in session.media_descriptions().enumerate() {
        if let Err(e) = validate_media(session, index, media) {
            log::error!("cannot generate session description, {e}");
            return Err(e);
        }
    }

    Ok(SessionLines { session, origin }.to_string())
}

fn validate_media(
    session: &SessionDescription,
    index: usize,
    media: &MediaDescription,
) -> Result<(), WriteSessionDescriptionError> {
    if media.dst_stream_port == 0 || media.dst_control_port == 0 {
        return Err(WriteSessionDescriptionError::InvalidPort { media: index });
    }

    if media.payload_type == 0 {
        return Err(WriteSessionDescriptionError::InvalidPayloadType { media: index });
    }

    if non_empty(media.encoding_name.as_deref()).is_none() {
        return Err(WriteSessionDescriptionError::MissingEncodingName { media: index });
    }

    if non_empty(media.connection_addr.as_deref())
        .or(non_empty(session.connection_addr.as_deref()))
        .is_none()
    {
        return Err(WriteSessionDescriptionError::MissingConnectionAddress { media: index });
    }

    Ok(())
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

struct OriginLine<'a> {
    session: &'a SessionDescription,
    server_addr: &'a str,
}

impl fmt::Display for OriginLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "o=- {} {} IN IP4 {}",
            self.session.session_id, self.session.session_version, self.server_addr
        )
    }
}

/// `c=` line, the multicast TTL is derived from the address
struct ConnectionLine<'a>(&'a str);

impl fmt::Display for ConnectionLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "c=IN IP4 {}", self.0)?;

        if is_multicast_address(self.0) {
            write!(f, "/{MULTICAST_TTL}")?;
        }

        Ok(())
    }
}

struct SessionLines<'a> {
    session: &'a SessionDescription,
    origin: OriginLine<'a>,
}

impl fmt::Display for SessionLines<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let session = self.session;

        write!(f, "v=0\r\n")?;
        write!(f, "{}\r\n", self.origin)?;

        match non_empty(session.session_name.as_deref()) {
            Some(name) => write!(f, "s={name}\r\n")?,
            None => write!(f, "s= \r\n")?,
        }

        let optional = [
            ('i', &session.session_info),
            ('u', &session.uri),
            ('e', &session.email),
            ('p', &session.phone),
        ];

        for (kind, value) in optional {
            if let Some(value) = value {
                write!(f, "{kind}={value}\r\n")?;
            }
        }

        if let Some(address) = non_empty(session.connection_addr.as_deref()) {
            write!(f, "{}\r\n", ConnectionLine(address))?;
        }

        write!(f, "t=0 0\r\n")?;

        if let Some(tool) = &session.tool {
            write!(f, "a=tool:{tool}\r\n")?;
        }

        if let Some(start_mode) = session.start_mode.as_str() {
            write!(f, "a={start_mode}\r\n")?;
        }

        if let Some(session_type) = &session.session_type {
            write!(f, "a=type:{session_type}\r\n")?;
        }

        if let Some(charset) = &session.charset {
            write!(f, "a=charset:{charset}\r\n")?;
        }

        if let Some(control_url) = &session.control_url {
            write!(f, "a=control:{control_url}\r\n")?;
        }

        if !session.rtcp_xr.is_empty() {
            write!(f, "a=rtcp-xr:{}\r\n", session.rtcp_xr)?;
        }

        write_attributes(f, session.attributes())?;

        for (id, media) in session.media_descriptions() {
            write!(f, "{}", MediaLines { session, media })?;
            write_attributes(f, session.media_attributes(id))?;
        }

        Ok(())
    }
}

fn write_attributes<'a>(
    f: &mut fmt::Formatter,
    attributes: impl Iterator<Item = (crate::AttributeId, &'a Attribute)>,
) -> fmt::Result {
    for (_, attribute) in attributes.filter(|(_, attribute)| !attribute.key.is_empty()) {
        write!(f, "{attribute}\r\n")?;
    }

    Ok(())
}

/// Media block without its generic attributes
struct MediaLines<'a> {
    session: &'a SessionDescription,
    media: &'a MediaDescription,
}

impl fmt::Display for MediaLines<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let media = self.media;

        write!(
            f,
            "m={} {} {RTP_AVP} {}\r\n",
            media.media_type, media.dst_stream_port, media.payload_type
        )?;

        if let Some(title) = &media.title {
            write!(f, "i={title}\r\n")?;
        }

        // only addresses which differ from the inherited session address
        if let Some(address) = non_empty(media.connection_addr.as_deref())
            .filter(|address| Some(*address) != self.session.connection_addr.as_deref())
        {
            write!(f, "{}\r\n", ConnectionLine(address))?;
        }

        if let Some(start_mode) = media.start_mode.as_str() {
            write!(f, "a={start_mode}\r\n")?;
        }

        if let Some(control_url) = &media.control_url {
            write!(f, "a=control:{control_url}\r\n")?;
        }

        if let Some(encoding_name) = &media.encoding_name {
            write!(
                f,
                "a=rtpmap:{} {encoding_name}/{}",
                media.payload_type, media.clock_rate
            )?;

            if let Some(params) = &media.encoding_params {
                write!(f, "/{params}")?;
            }

            write!(f, "\r\n")?;
        }

        if media.is_h264() && media.h264_fmtp.valid {
            write!(f, "a=fmtp:{} {}\r\n", media.payload_type, media.h264_fmtp)?;
        }

        if u32::from(media.dst_control_port) != u32::from(media.dst_stream_port) + 1 {
            write!(f, "a=rtcp:{}\r\n", media.dst_control_port)?;
        }

        if !media.rtcp_xr.is_empty() {
            write!(f, "a=rtcp-xr:{}\r\n", media.rtcp_xr)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{MediaType, StartMode};

    fn session() -> SessionDescription {
        let mut session = SessionDescription::new();
        session.session_id = 123456789;
        session.session_version = 1;
        session.server_addr = Some("192.168.43.1".into());
        session.session_name = Some("Test".into());
        session.connection_addr = Some("239.255.42.1".into());
        session
    }

    fn h264_media() -> MediaDescription {
        let mut media = MediaDescription::new(MediaType::Video);
        media.set_ports(55004);
        media.payload_type = 96;
        media.encoding_name = Some("H264".into());
        media.clock_rate = 90000;
        media
    }

    #[test]
    fn minimal() {
        let mut session = session();
        session.add_media(h264_media());

        assert_eq!(
            write(&session, false).unwrap(),
            "v=0\r\n\
             o=- 123456789 1 IN IP4 192.168.43.1\r\n\
             s=Test\r\n\
             c=IN IP4 239.255.42.1/127\r\n\
             t=0 0\r\n\
             m=video 55004 RTP/AVP 96\r\n\
             a=rtpmap:96 H264/90000\r\n"
        );
    }

    #[test]
    fn deletion() {
        let mut session = session();
        session.add_media(MediaDescription::new(MediaType::Audio));

        assert_eq!(
            write(&session, true).unwrap(),
            "o=- 123456789 1 IN IP4 192.168.43.1\r\n"
        );
    }

    #[test]
    fn missing_server_address() {
        let mut session = session();
        session.server_addr = None;

        assert_eq!(
            write(&session, true),
            Err(WriteSessionDescriptionError::MissingServerAddress)
        );

        session.server_addr = Some("".into());

        assert_eq!(
            write(&session, false),
            Err(WriteSessionDescriptionError::MissingServerAddress)
        );
    }

    #[test]
    fn empty_session_name() {
        let mut session = session();
        session.session_name = None;

        assert!(write(&session, false).unwrap().contains("\r\ns= \r\n"));
    }

    #[test]
    fn unicast_connection() {
        let mut session = session();
        session.connection_addr = Some("192.168.43.1".into());

        assert!(
            write(&session, false)
                .unwrap()
                .contains("\r\nc=IN IP4 192.168.43.1\r\nt=0 0\r\n")
        );
    }

    #[test]
    fn invalid_media() {
        let mut session = session();
        session.add_media(h264_media());

        let mut media = h264_media();
        media.dst_control_port = 0;
        let id = session.add_media(media);

        assert_eq!(
            write(&session, false),
            Err(WriteSessionDescriptionError::InvalidPort { media: 1 })
        );

        let media = session.media_mut(id).unwrap();
        media.set_ports(5000);
        media.payload_type = 0;

        assert_eq!(
            write(&session, false),
            Err(WriteSessionDescriptionError::InvalidPayloadType { media: 1 })
        );

        let media = session.media_mut(id).unwrap();
        media.payload_type = 97;
        media.encoding_name = Some("".into());

        assert_eq!(
            write(&session, false),
            Err(WriteSessionDescriptionError::MissingEncodingName { media: 1 })
        );
    }

    #[test]
    fn static_payload_type() {
        let mut session = session();

        let mut media = MediaDescription::new(MediaType::Audio);
        media.set_ports(5004);
        media.payload_type = 8;
        media.encoding_name = Some("PCMA".into());
        media.clock_rate = 8000;
        session.add_media(media);

        let sdp = write(&session, false).unwrap();

        assert!(sdp.contains("\r\nm=audio 5004 RTP/AVP 8\r\na=rtpmap:8 PCMA/8000\r\n"));
    }

    #[test]
    fn missing_connection_address() {
        let mut session = session();
        session.connection_addr = None;
        session.add_media(h264_media());

        assert_eq!(
            write(&session, false),
            Err(WriteSessionDescriptionError::MissingConnectionAddress { media: 0 })
        );
    }

    #[test]
    fn media_block_order() {
        let mut session = session();
        session.tool = Some("libsdp".into());
        session.start_mode = StartMode::SendOnly;
        session.control_url = Some("*".into());
        session.rtcp_xr.update("voip-metrics");
        session.add_attribute(Attribute::with_value("range", "npt=0-"));

        let mut media = h264_media();
        media.title = Some("Camera".into());
        media.connection_addr = Some("10.0.0.2".into());
        media.start_mode = StartMode::RecvOnly;
        media.control_url = Some("track1".into());
        media.dst_control_port = 6000;
        media.h264_fmtp.valid = true;
        media.h264_fmtp.packetization_mode = 1;
        media.h264_fmtp.profile_idc = 0x42;
        media.h264_fmtp.profile_iop = 0xE0;
        media.h264_fmtp.level_idc = 0x1F;
        media.rtcp_xr.update("pkt-loss-rle");
        let id = session.add_media(media);
        session
            .add_media_attribute(id, Attribute::with_value("framerate", "30"))
            .unwrap();
        session.add_media_attribute(id, Attribute::new("")).unwrap();

        assert_eq!(
            write(&session, false).unwrap(),
            "v=0\r\n\
             o=- 123456789 1 IN IP4 192.168.43.1\r\n\
             s=Test\r\n\
             c=IN IP4 239.255.42.1/127\r\n\
             t=0 0\r\n\
             a=tool:libsdp\r\n\
             a=sendonly\r\n\
             a=control:*\r\n\
             a=rtcp-xr:voip-metrics\r\n\
             a=range:npt=0-\r\n\
             m=video 55004 RTP/AVP 96\r\n\
             i=Camera\r\n\
             c=IN IP4 10.0.0.2\r\n\
             a=recvonly\r\n\
             a=control:track1\r\n\
             a=rtpmap:96 H264/90000\r\n\
             a=fmtp:96 packetization-mode=1;profile-level-id=42E01F\r\n\
             a=rtcp:6000\r\n\
             a=rtcp-xr:pkt-loss-rle\r\n\
             a=framerate:30\r\n"
        );
    }

    #[test]
    fn fmtp_only_for_valid_h264() {
        let mut session = session();

        let mut media = h264_media();
        media.encoding_name = Some("H265".into());
        media.h264_fmtp.valid = true;
        session.add_media(media);

        let mut media = h264_media();
        media.h264_fmtp.valid = false;
        session.add_media(media);

        assert!(!write(&session, false).unwrap().contains("a=fmtp"));
    }
}
