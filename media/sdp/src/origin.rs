use crate::ParseSessionDescriptionError;
use crate::connection::check_network;
use internal::{atoi, tokens};

/// Origin field (`o=<username> <sess-id> <sess-version> <nettype> <addrtype> <unicast-address>`)
///
/// Missing or non-numeric session id & version are read as 0.
///
/// [RFC4566](https://www.rfc-editor.org/rfc/rfc4566.html#section-5.2)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Origin<'i> {
    pub(crate) username: Option<&'i str>,
    pub(crate) session_id: u64,
    pub(crate) session_version: u64,
    pub(crate) address: Option<&'i str>,
}

impl<'i> Origin<'i> {
    pub(crate) fn parse(i: &'i str) -> Result<Self, ParseSessionDescriptionError> {
        let mut tokens = tokens(i, ' ');

        let username = tokens.next();
        let session_id = tokens.next();
        let session_version = tokens.next();

        let nettype = tokens.next();
        let addrtype = tokens.next();
        check_network(nettype, addrtype)?;

        Ok(Self {
            username,
            session_id: session_id.and_then(atoi).unwrap_or_default(),
            session_version: session_version.and_then(atoi).unwrap_or_default(),
            address: tokens.next(),
        })
    }
}
