use crate::{DYNAMIC_PAYLOAD_TYPES, ParseSessionDescriptionError, RTP_AVP};
use internal::{IResult, atoi, tokens};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::{all_consuming, map};
use nom::error::context;
use std::fmt;

/// Type of a media description, the first token of the media field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Audio,
    Video,
    Text,
    Application,
    Message,
}

impl MediaType {
    pub fn parse(i: &str) -> IResult<&str, Self> {
        context(
            "parsing media type",
            alt((
                map(tag("audio"), |_| MediaType::Audio),
                map(tag("video"), |_| MediaType::Video),
                map(tag("text"), |_| MediaType::Text),
                map(tag("application"), |_| MediaType::Application),
                map(tag("message"), |_| MediaType::Message),
            )),
        )(i)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Text => "text",
            MediaType::Application => "application",
            MediaType::Message => "message",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media field (`m=<media> <port> <proto> <fmt>`)
///
/// Only the first format is used, it must be a dynamic payload type.
///
/// [RFC4566](https://www.rfc-editor.org/rfc/rfc4566.html#section-5.14)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Media {
    pub(crate) media_type: MediaType,

    /// 0 if absent
    pub(crate) port: u16,
    pub(crate) payload_type: u8,
}

impl Media {
    pub(crate) fn parse(i: &str) -> Result<Self, ParseSessionDescriptionError> {
        let mut tokens = tokens(i, ' ');

        let media = tokens
            .next()
            .ok_or(ParseSessionDescriptionError::MissingMediaType)?;
        let port = tokens.next();
        let proto = tokens.next();
        let fmt = tokens.next();

        let (_, media_type) = all_consuming(MediaType::parse)(media).map_err(|_| {
            ParseSessionDescriptionError::UnsupportedMediaType(media.into())
        })?;

        // `<port>[/<number of ports>]`, leaving room for the RTCP port
        let port = match port.map_or(Some(0), atoi::<u32>) {
            Some(port) if port < u32::from(u16::MAX) => port as u16,
            _ => {
                return Err(ParseSessionDescriptionError::InvalidPort(
                    port.unwrap_or_default().into(),
                ));
            }
        };

        if proto != Some(RTP_AVP) {
            return Err(ParseSessionDescriptionError::UnsupportedProtocol(
                proto.unwrap_or_default().into(),
            ));
        }

        let payload_type = fmt.and_then(atoi::<u32>).unwrap_or_default();

        let payload_type = u8::try_from(payload_type)
            .ok()
            .filter(|pt| DYNAMIC_PAYLOAD_TYPES.contains(pt))
            .ok_or(ParseSessionDescriptionError::UnsupportedPayloadType(
                payload_type,
            ))?;

        Ok(Self {
            media_type,
            port,
            payload_type,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn media() {
        let media = Media::parse("video 55004 RTP/AVP 96").unwrap();

        assert_eq!(media.media_type, MediaType::Video);
        assert_eq!(media.port, 55004);
        assert_eq!(media.payload_type, 96);
    }

    #[test]
    fn media_port_count() {
        let media = Media::parse("audio 49170/2 RTP/AVP 97 98").unwrap();

        assert_eq!(media.media_type, MediaType::Audio);
        assert_eq!(media.port, 49170);
        assert_eq!(media.payload_type, 97);
    }

    #[test]
    fn media_types() {
        for (token, media_type) in [
            ("audio", MediaType::Audio),
            ("video", MediaType::Video),
            ("text", MediaType::Text),
            ("application", MediaType::Application),
            ("message", MediaType::Message),
        ] {
            let media = Media::parse(&format!("{token} 5000 RTP/AVP 96")).unwrap();
            assert_eq!(media.media_type, media_type);
            assert_eq!(media_type.to_string(), token);
        }
    }

    #[test]
    fn media_type_case_sensitive() {
        assert!(matches!(
            Media::parse("Video 5000 RTP/AVP 96"),
            Err(ParseSessionDescriptionError::UnsupportedMediaType(t)) if t == "Video"
        ));
        assert!(matches!(
            Media::parse("videos 5000 RTP/AVP 96"),
            Err(ParseSessionDescriptionError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn media_payload_type_boundaries() {
        assert!(Media::parse("video 5000 RTP/AVP 96").is_ok());
        assert!(Media::parse("video 5000 RTP/AVP 127").is_ok());

        assert!(matches!(
            Media::parse("video 5000 RTP/AVP 95"),
            Err(ParseSessionDescriptionError::UnsupportedPayloadType(95))
        ));
        assert!(matches!(
            Media::parse("video 5000 RTP/AVP 128"),
            Err(ParseSessionDescriptionError::UnsupportedPayloadType(128))
        ));
        assert!(matches!(
            Media::parse("video 5000 RTP/AVP"),
            Err(ParseSessionDescriptionError::UnsupportedPayloadType(0))
        ));
    }

    #[test]
    fn media_protocol() {
        assert!(matches!(
            Media::parse("video 5000 RTP/SAVP 96"),
            Err(ParseSessionDescriptionError::UnsupportedProtocol(p)) if p == "RTP/SAVP"
        ));
    }

    #[test]
    fn media_port_range() {
        assert!(Media::parse("video 65534 RTP/AVP 96").is_ok());
        assert!(matches!(
            Media::parse("video 65535 RTP/AVP 96"),
            Err(ParseSessionDescriptionError::InvalidPort(_))
        ));
    }

    #[test]
    fn media_zero_port() {
        let media = Media::parse("video 0 RTP/AVP 96").unwrap();

        assert_eq!(media.port, 0);
    }
}
