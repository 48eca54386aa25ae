//! RtpMap attribute (`a=rtpmap:...`)

use internal::{IResult, leading_number};
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, space0};
use nom::combinator::{map, opt, rest};
use nom::error::context;
use nom::sequence::{preceded, tuple};

/// Rtpmap attribute (`a=rtpmap:<payload type> <encoding name>/<clock rate>[/<encoding parameters>]`)
///
/// Map the RTP payload type of the media field to an encoding. Absent numbers are read as 0.
///
/// Media-Level attribute
///
/// [RFC4566](https://www.rfc-editor.org/rfc/rfc4566.html#section-6)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RtpMap<'i> {
    pub(crate) payload: u32,
    pub(crate) encoding: Option<&'i str>,
    pub(crate) clock_rate: u32,
    pub(crate) params: Option<&'i str>,
}

impl<'i> RtpMap<'i> {
    pub(crate) fn parse(i: &'i str) -> IResult<&'i str, Self> {
        context(
            "parsing rtpmap",
            map(
                tuple((
                    // payload type
                    preceded(space0, leading_number::<u32>),
                    // encoding
                    preceded(space0, opt(take_while1(|c| c != '/'))),
                    // clock rate
                    opt(preceded(char('/'), leading_number::<u32>)),
                    // optional params
                    opt(preceded(char('/'), rest)),
                )),
                |(payload, encoding, clock_rate, params): (
                    u32,
                    Option<&'i str>,
                    Option<u32>,
                    Option<&'i str>,
                )| RtpMap {
                    payload,
                    encoding: encoding.map(str::trim_end).filter(|e| !e.is_empty()),
                    clock_rate: clock_rate.unwrap_or_default(),
                    params: params.filter(|p| !p.is_empty()),
                },
            ),
        )(i)
    }
}
