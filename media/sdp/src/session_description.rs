use crate::generator::{self, WriteSessionDescriptionError};
use crate::line::lines;
use crate::parser::{ParseSessionDescriptionError, Parser};
use crate::{Attribute, MediaDescription, RtcpXr, StartMode};
use bytesstr::BytesStr;
use slotmap::{SlotMap, new_key_type};
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    pub(crate) struct AttributeKey;
    pub(crate) struct MediaKey;
}

/// Source of the per session tag stored inside every handle
static NEXT_SESSION_TAG: AtomicU64 = AtomicU64::new(0);

fn next_session_tag() -> u64 {
    NEXT_SESSION_TAG.fetch_add(1, Ordering::Relaxed)
}

/// Handle to an [`Attribute`] owned by a [`SessionDescription`] or one of its media
///
/// Only valid for the session which returned it, not for clones of that session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeId {
    session: u64,
    key: AttributeKey,
}

/// Handle to a [`MediaDescription`] owned by a [`SessionDescription`]
///
/// Only valid for the session which returned it, not for clones of that session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MediaId {
    session: u64,
    key: MediaKey,
}

/// Handle is not owned by the session or media it was passed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("attribute not found")]
    Attribute,
    #[error("media not found")]
    Media,
}

/// The Session Description message
///
/// Parse SDP using [`SessionDescription::parse`] and generate it using [`SessionDescription::write`].
///
/// Generic attributes and media descriptions are kept in insertion order and addressed through the
/// [`AttributeId`] and [`MediaId`] handles returned when adding them.
#[derive(Debug)]
pub struct SessionDescription {
    /// Origin session id (`o=`)
    pub session_id: u64,

    /// Origin session version (`o=`)
    pub session_version: u64,

    /// Origin unicast address (`o=`)
    pub server_addr: Option<BytesStr>,

    /// `s=`
    pub session_name: Option<BytesStr>,

    /// `i=` before the first media field
    pub session_info: Option<BytesStr>,

    /// `u=`
    pub uri: Option<BytesStr>,

    /// `e=`
    pub email: Option<BytesStr>,

    /// `p=`
    pub phone: Option<BytesStr>,

    /// `a=tool`
    pub tool: Option<BytesStr>,

    /// `a=type`
    pub session_type: Option<BytesStr>,

    /// `a=charset`
    pub charset: Option<BytesStr>,

    /// Session level connection address (`c=`), used by all media without their own
    pub connection_addr: Option<BytesStr>,
    pub is_multicast: bool,

    /// Session level `a=control`
    pub control_url: Option<BytesStr>,

    pub start_mode: StartMode,
    pub rtcp_xr: RtcpXr,

    /// Stored in every handle given out, so handles of other sessions are rejected
    tag: u64,

    attribute_slots: SlotMap<AttributeKey, Attribute>,
    attributes: Vec<AttributeKey>,

    media_slots: SlotMap<MediaKey, MediaDescription>,
    media: Vec<MediaKey>,
}

impl Default for SessionDescription {
    fn default() -> Self {
        Self {
            session_id: 0,
            session_version: 0,
            server_addr: None,
            session_name: None,
            session_info: None,
            uri: None,
            email: None,
            phone: None,
            tool: None,
            session_type: None,
            charset: None,
            connection_addr: None,
            is_multicast: false,
            control_url: None,
            start_mode: StartMode::Unspecified,
            rtcp_xr: RtcpXr::default(),
            tag: next_session_tag(),
            attribute_slots: SlotMap::with_key(),
            attributes: Vec::new(),
            media_slots: SlotMap::with_key(),
            media: Vec::new(),
        }
    }
}

/// Clones get a tag of their own, handles of the original are not valid for the clone
impl Clone for SessionDescription {
    fn clone(&self) -> Self {
        Self {
            session_id: self.session_id,
            session_version: self.session_version,
            server_addr: self.server_addr.clone(),
            session_name: self.session_name.clone(),
            session_info: self.session_info.clone(),
            uri: self.uri.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            tool: self.tool.clone(),
            session_type: self.session_type.clone(),
            charset: self.charset.clone(),
            connection_addr: self.connection_addr.clone(),
            is_multicast: self.is_multicast,
            control_url: self.control_url.clone(),
            start_mode: self.start_mode,
            rtcp_xr: self.rtcp_xr.clone(),
            tag: next_session_tag(),
            attribute_slots: self.attribute_slots.clone(),
            attributes: self.attributes.clone(),
            media_slots: self.media_slots.clone(),
            media: self.media.clone(),
        }
    }
}

impl SessionDescription {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a session description
    ///
    /// Media inherit the session's connection address, start mode and RTCP XR settings if they don't specify their own.
    pub fn parse(src: &BytesStr) -> Result<Self, ParseSessionDescriptionError> {
        if src.trim().is_empty() {
            return Err(ParseSessionDescriptionError::EmptyDescription);
        }

        let mut parser = Parser::default();

        for line in lines(src) {
            parser.parse_line(src, line)?;
        }

        parser.finish()
    }

    /// Generate the session description
    ///
    /// With `deletion` set only the origin line is generated.
    pub fn write(&self, deletion: bool) -> Result<String, WriteSessionDescriptionError> {
        generator::write(self, deletion)
    }

    fn attribute_id(&self, key: AttributeKey) -> AttributeId {
        AttributeId {
            session: self.tag,
            key,
        }
    }

    fn media_id(&self, key: MediaKey) -> MediaId {
        MediaId {
            session: self.tag,
            key,
        }
    }

    /// Slot key of `id`, `None` if the handle was issued by another session
    fn attribute_key(&self, id: AttributeId) -> Option<AttributeKey> {
        (id.session == self.tag).then_some(id.key)
    }

    fn media_key(&self, id: MediaId) -> Option<MediaKey> {
        (id.session == self.tag).then_some(id.key)
    }

    /// Append a session level attribute
    pub fn add_attribute(&mut self, attribute: Attribute) -> AttributeId {
        let key = self.attribute_slots.insert(attribute);
        self.attributes.push(key);
        self.attribute_id(key)
    }

    /// Remove a session level attribute, fails if `id` does not belong to the session level
    pub fn remove_attribute(&mut self, id: AttributeId) -> Result<Attribute, NotFoundError> {
        let key = self.attribute_key(id).ok_or(NotFoundError::Attribute)?;

        remove_key(&mut self.attributes, key).ok_or(NotFoundError::Attribute)?;

        self.attribute_slots
            .remove(key)
            .ok_or(NotFoundError::Attribute)
    }

    /// Session level attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (AttributeId, &Attribute)> + '_ {
        self.resolve_attributes(&self.attributes)
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Get any attribute, session or media level
    pub fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.attribute_slots.get(self.attribute_key(id)?)
    }

    pub fn attribute_mut(&mut self, id: AttributeId) -> Option<&mut Attribute> {
        let key = self.attribute_key(id)?;
        self.attribute_slots.get_mut(key)
    }

    /// Append a media description
    ///
    /// Attributes of the media are not carried over, use [`SessionDescription::add_media_attribute`].
    pub fn add_media(&mut self, mut media: MediaDescription) -> MediaId {
        media.attributes.clear();

        let key = self.media_slots.insert(media);
        self.media.push(key);
        self.media_id(key)
    }

    /// Remove a media description including all of its attributes
    pub fn remove_media(&mut self, id: MediaId) -> Result<MediaDescription, NotFoundError> {
        let key = self.media_key(id).ok_or(NotFoundError::Media)?;

        remove_key(&mut self.media, key).ok_or(NotFoundError::Media)?;

        let mut media = self.media_slots.remove(key).ok_or(NotFoundError::Media)?;

        for attribute_key in media.attributes.drain(..) {
            self.attribute_slots.remove(attribute_key);
        }

        Ok(media)
    }

    pub fn media(&self, id: MediaId) -> Option<&MediaDescription> {
        self.media_slots.get(self.media_key(id)?)
    }

    pub fn media_mut(&mut self, id: MediaId) -> Option<&mut MediaDescription> {
        let key = self.media_key(id)?;
        self.media_slots.get_mut(key)
    }

    /// Media descriptions in insertion order
    pub fn media_descriptions(&self) -> impl Iterator<Item = (MediaId, &MediaDescription)> + '_ {
        self.media.iter().filter_map(|key| {
            let media = self.media_slots.get(*key)?;
            Some((self.media_id(*key), media))
        })
    }

    pub fn media_count(&self) -> usize {
        self.media.len()
    }

    /// Append an attribute to a media description
    pub fn add_media_attribute(
        &mut self,
        media: MediaId,
        attribute: Attribute,
    ) -> Result<AttributeId, NotFoundError> {
        let media_key = self.media_key(media).ok_or(NotFoundError::Media)?;

        let media = self
            .media_slots
            .get_mut(media_key)
            .ok_or(NotFoundError::Media)?;

        let key = self.attribute_slots.insert(attribute);
        media.attributes.push(key);

        Ok(self.attribute_id(key))
    }

    /// Remove an attribute of a media description, fails if `attribute` does not belong to `media`
    pub fn remove_media_attribute(
        &mut self,
        media: MediaId,
        attribute: AttributeId,
    ) -> Result<Attribute, NotFoundError> {
        let media_key = self.media_key(media).ok_or(NotFoundError::Media)?;
        let key = self
            .attribute_key(attribute)
            .ok_or(NotFoundError::Attribute)?;

        let media = self
            .media_slots
            .get_mut(media_key)
            .ok_or(NotFoundError::Media)?;

        remove_key(&mut media.attributes, key).ok_or(NotFoundError::Attribute)?;

        self.attribute_slots
            .remove(key)
            .ok_or(NotFoundError::Attribute)
    }

    /// Attributes of a media description in insertion order, empty if the media is unknown
    pub fn media_attributes(
        &self,
        media: MediaId,
    ) -> impl Iterator<Item = (AttributeId, &Attribute)> + '_ {
        let keys = self
            .media(media)
            .map(|media| media.attributes.as_slice())
            .unwrap_or_default();

        self.resolve_attributes(keys)
    }

    pub fn media_attribute_count(&self, media: MediaId) -> usize {
        self.media(media)
            .map_or(0, |media| media.attributes.len())
    }

    fn resolve_attributes<'s>(
        &'s self,
        keys: &'s [AttributeKey],
    ) -> impl Iterator<Item = (AttributeId, &'s Attribute)> + 's {
        keys.iter().filter_map(|key| {
            let attribute = self.attribute_slots.get(*key)?;
            Some((self.attribute_id(*key), attribute))
        })
    }

    /// Fill in the media fields left unset with the session level values
    pub(crate) fn inherit_session_defaults(&mut self) {
        for media in self.media_slots.values_mut() {
            if media.connection_addr.is_none() {
                media.connection_addr = self.connection_addr.clone();
                media.is_multicast = self.is_multicast;
            }

            if media.start_mode == StartMode::Unspecified {
                media.start_mode = self.start_mode;
            }

            if !media.rtcp_xr.valid && self.rtcp_xr.valid {
                media.rtcp_xr = self.rtcp_xr.clone();
            }
        }
    }
}

fn remove_key<K: PartialEq>(keys: &mut Vec<K>, key: K) -> Option<K> {
    let position = keys.iter().position(|k| *k == key)?;
    Some(keys.remove(position))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MediaType;

    #[test]
    fn attributes_keep_order() {
        let mut session = SessionDescription::new();

        let a = session.add_attribute(Attribute::new("a"));
        let b = session.add_attribute(Attribute::with_value("b", "1"));
        let c = session.add_attribute(Attribute::new("c"));

        assert_eq!(session.attribute_count(), 3);

        session.remove_attribute(b).unwrap();

        let ids: Vec<_> = session.attributes().map(|(id, _)| id).collect();
        assert_eq!(ids, [a, c]);
        assert_eq!(session.attribute(b), None);
    }

    #[test]
    fn remove_attribute_twice() {
        let mut session = SessionDescription::new();

        let a = session.add_attribute(Attribute::new("a"));

        assert_eq!(
            session.remove_attribute(a).unwrap().key,
            BytesStr::from("a")
        );
        assert_eq!(session.remove_attribute(a), Err(NotFoundError::Attribute));
    }

    #[test]
    fn media_attribute_not_owned() {
        let mut session = SessionDescription::new();

        let session_attr = session.add_attribute(Attribute::new("session"));
        let m1 = session.add_media(MediaDescription::new(MediaType::Video));
        let m2 = session.add_media(MediaDescription::new(MediaType::Audio));
        let m1_attr = session
            .add_media_attribute(m1, Attribute::new("m1"))
            .unwrap();

        assert_eq!(
            session.remove_media_attribute(m2, m1_attr),
            Err(NotFoundError::Attribute)
        );
        assert_eq!(
            session.remove_media_attribute(m1, session_attr),
            Err(NotFoundError::Attribute)
        );
        assert_eq!(session.remove_attribute(m1_attr), Err(NotFoundError::Attribute));

        assert_eq!(session.media_attribute_count(m1), 1);
        assert_eq!(session.attribute_count(), 1);
    }

    #[test]
    fn remove_media_drops_attributes() {
        let mut session = SessionDescription::new();

        let m1 = session.add_media(MediaDescription::new(MediaType::Video));
        let m2 = session.add_media(MediaDescription::new(MediaType::Audio));
        let attr = session
            .add_media_attribute(m1, Attribute::new("framerate"))
            .unwrap();

        let media = session.remove_media(m1).unwrap();

        assert_eq!(media.media_type, MediaType::Video);
        assert_eq!(session.attribute(attr), None);
        assert_eq!(session.media_count(), 1);
        assert_eq!(session.media_descriptions().next().map(|(id, _)| id), Some(m2));

        assert_eq!(session.remove_media(m1), Err(NotFoundError::Media));
        assert_eq!(
            session.add_media_attribute(m1, Attribute::new("x")),
            Err(NotFoundError::Media)
        );
        assert_eq!(session.media_attributes(m1).count(), 0);
    }

    #[test]
    fn inherit_session_defaults() {
        let mut session = SessionDescription::new();
        session.connection_addr = Some("239.255.42.1".into());
        session.is_multicast = true;
        session.start_mode = StartMode::SendOnly;
        session.rtcp_xr.update("voip-metrics");

        let inherits = session.add_media(MediaDescription::new(MediaType::Video));

        let mut own = MediaDescription::new(MediaType::Audio);
        own.connection_addr = Some("10.0.0.1".into());
        own.start_mode = StartMode::Inactive;
        own.rtcp_xr.update("pkt-loss-rle");
        let own = session.add_media(own);

        session.inherit_session_defaults();

        let media = session.media(inherits).unwrap();
        assert_eq!(media.connection_addr.as_deref(), Some("239.255.42.1"));
        assert!(media.is_multicast);
        assert_eq!(media.start_mode, StartMode::SendOnly);
        assert_eq!(media.rtcp_xr, session.rtcp_xr);

        let media = session.media(own).unwrap();
        assert_eq!(media.connection_addr.as_deref(), Some("10.0.0.1"));
        assert!(!media.is_multicast);
        assert_eq!(media.start_mode, StartMode::Inactive);
        assert!(media.rtcp_xr.loss_rle_report);
        assert!(!media.rtcp_xr.voip_metrics_report);
    }
}
