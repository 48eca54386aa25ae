use crate::{ParseSessionDescriptionError, is_multicast_address};
use internal::tokens;

const NET_TYPE_IN: &str = "IN";
const ADDR_TYPE_IP4: &str = "IP4";

/// Validate the `<nettype> <addrtype>` pair shared by the origin and connection fields
///
/// Only `IN IP4` is supported ([RFC4566](https://www.rfc-editor.org/rfc/rfc4566.html#section-5.7)).
pub(crate) fn check_network(
    nettype: Option<&str>,
    addrtype: Option<&str>,
) -> Result<(), ParseSessionDescriptionError> {
    if nettype != Some(NET_TYPE_IN) {
        return Err(ParseSessionDescriptionError::UnsupportedNetworkType(
            nettype.unwrap_or_default().into(),
        ));
    }

    if addrtype != Some(ADDR_TYPE_IP4) {
        return Err(ParseSessionDescriptionError::UnsupportedAddressType(
            addrtype.unwrap_or_default().into(),
        ));
    }

    Ok(())
}

/// Connection field (`c=<nettype> <addrtype> <connection-address>`)
///
/// [RFC4566](https://www.rfc-editor.org/rfc/rfc4566.html#section-5.7)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Connection<'i> {
    /// Address without any `/ttl` suffix if multicast
    pub(crate) address: &'i str,
    pub(crate) multicast: bool,
}

impl<'i> Connection<'i> {
    /// Returns `None` if the line names no address
    pub(crate) fn parse(i: &'i str) -> Result<Option<Self>, ParseSessionDescriptionError> {
        let mut tokens = tokens(i, ' ');

        let nettype = tokens.next();
        let addrtype = tokens.next();
        check_network(nettype, addrtype)?;

        let Some(address) = tokens.next() else {
            return Ok(None);
        };

        let multicast = is_multicast_address(address);

        let address = if multicast {
            address.split_once('/').map_or(address, |(address, _ttl)| address)
        } else {
            address
        };

        Ok(Some(Self { address, multicast }))
    }
}
