//! RTCP extended reports attribute (`a=rtcp-xr:...`)

use internal::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, u32};
use nom::combinator::{all_consuming, map, opt};
use nom::error::context;
use nom::multi::separated_list1;
use nom::sequence::{pair, preceded};
use std::fmt;
use std::mem::take;

/// Which RTP participants may send receiver reference time reports (`rcvr-rtt=<mode>`)
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RttReportMode {
    /// No receiver reference time reports
    #[default]
    None,

    /// All participants
    All,

    /// Only active senders
    Sender,
}

impl RttReportMode {
    fn parse(i: &str) -> IResult<&str, Self> {
        alt((
            map(tag("all"), |_| RttReportMode::All),
            map(tag("sender"), |_| RttReportMode::Sender),
        ))(i)
    }

    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            RttReportMode::None => None,
            RttReportMode::All => Some("all"),
            RttReportMode::Sender => Some("sender"),
        }
    }
}

/// Statistics summary report flags (`stat-summary=loss,dup,jitt,TTL,HL`)
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatSummary {
    pub loss: bool,
    pub dup: bool,
    pub jitter: bool,
    pub ttl: bool,
    pub hl: bool,
}

impl StatSummary {
    pub fn is_empty(&self) -> bool {
        !(self.loss || self.dup || self.jitter || self.ttl || self.hl)
    }

    fn parse(i: &str) -> IResult<&str, Self> {
        map(
            separated_list1(char(','), take_while1(|c| c != ',')),
            |flags: Vec<&str>| {
                let mut summary = StatSummary::default();

                for flag in flags {
                    match flag {
                        "loss" => summary.loss = true,
                        "dup" => summary.dup = true,
                        "jitt" => summary.jitter = true,
                        "TTL" => summary.ttl = true,
                        "HL" => summary.hl = true,
                        _ => log::debug!("ignoring unknown stat-summary flag {flag:?}"),
                    }
                }

                summary
            },
        )(i)
    }

    fn merge(&mut self, other: StatSummary) {
        self.loss |= other.loss;
        self.dup |= other.dup;
        self.jitter |= other.jitter;
        self.ttl |= other.ttl;
        self.hl |= other.hl;
    }
}

impl fmt::Display for StatSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let flags = [
            (self.loss, "loss"),
            (self.dup, "dup"),
            (self.jitter, "jitt"),
            (self.ttl, "TTL"),
            (self.hl, "HL"),
        ];

        let mut first = true;

        for (_, name) in flags.iter().filter(|(set, _)| *set) {
            if !take(&mut first) {
                f.write_str(",")?;
            }

            f.write_str(name)?;
        }

        Ok(())
    }
}

/// A single space separated token of the rtcp-xr attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XrFormat {
    LossRle(Option<u32>),
    DupRle(Option<u32>),
    RcptTimes(Option<u32>),
    RcvrRtt(RttReportMode, Option<u32>),
    StatSummary(StatSummary),
    VoipMetrics,
    DeJitterBuffer,
}

impl XrFormat {
    fn parse(i: &str) -> IResult<&str, Self> {
        context(
            "parsing rtcp-xr format",
            alt((
                map(preceded(tag("pkt-loss-rle"), eq_max_size), XrFormat::LossRle),
                map(preceded(tag("pkt-dup-rle"), eq_max_size), XrFormat::DupRle),
                map(
                    preceded(tag("pkt-rcpt-times"), eq_max_size),
                    XrFormat::RcptTimes,
                ),
                map(
                    preceded(
                        tag("rcvr-rtt="),
                        pair(RttReportMode::parse, colon_max_size),
                    ),
                    |(mode, max_size)| XrFormat::RcvrRtt(mode, max_size),
                ),
                map(
                    preceded(
                        tag("stat-summary"),
                        opt(preceded(char('='), StatSummary::parse)),
                    ),
                    |summary: Option<StatSummary>| {
                        XrFormat::StatSummary(summary.unwrap_or_default())
                    },
                ),
                map(tag("voip-metrics"), |_| XrFormat::VoipMetrics),
                map(tag("de-jitter-buffer"), |_| XrFormat::DeJitterBuffer),
            )),
        )(i)
    }
}

fn eq_max_size(i: &str) -> IResult<&str, Option<u32>> {
    opt(preceded(char('='), u32))(i)
}

fn colon_max_size(i: &str) -> IResult<&str, Option<u32>> {
    opt(preceded(char(':'), u32))(i)
}

/// RTCP extended reports the sender of the description is willing to receive
///
/// Session and Media Level attribute. Media which never carried the attribute use the session's settings.
///
/// [RFC3611](https://www.rfc-editor.org/rfc/rfc3611.html#section-5.1),
/// [RFC7005](https://www.rfc-editor.org/rfc/rfc7005.html)
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RtcpXr {
    /// Set once an `a=rtcp-xr` attribute was parsed at this level
    pub valid: bool,

    /// Loss RLE report blocks (`pkt-loss-rle`)
    pub loss_rle_report: bool,
    pub loss_rle_report_max_size: Option<u32>,

    /// Duplicate RLE report blocks (`pkt-dup-rle`)
    pub dup_rle_report: bool,
    pub dup_rle_report_max_size: Option<u32>,

    /// Packet receipt times report blocks (`pkt-rcpt-times`)
    pub pkt_receipt_times_report: bool,
    pub pkt_receipt_times_report_max_size: Option<u32>,

    /// Receiver reference time report blocks (`rcvr-rtt`)
    pub rtt_report: RttReportMode,
    pub rtt_report_max_size: Option<u32>,

    /// Statistics summary report blocks (`stat-summary`)
    pub stats_summary: StatSummary,

    /// VoIP metrics report blocks (`voip-metrics`)
    pub voip_metrics_report: bool,

    /// De-jitter buffer metrics report blocks (`de-jitter-buffer`)
    pub djb_metrics_report: bool,
}

impl RtcpXr {
    /// Returns if no report is enabled, in which case the attribute is omitted
    pub fn is_empty(&self) -> bool {
        !(self.loss_rle_report
            || self.dup_rle_report
            || self.pkt_receipt_times_report
            || self.rtt_report != RttReportMode::None
            || !self.stats_summary.is_empty()
            || self.voip_metrics_report
            || self.djb_metrics_report)
    }

    /// Apply the value of an `a=rtcp-xr` attribute, ignoring unknown formats
    pub fn update(&mut self, value: &str) {
        self.valid = true;

        for token in value.split_ascii_whitespace() {
            match all_consuming(XrFormat::parse)(token) {
                Ok((_, format)) => self.apply(format),
                Err(_) => log::debug!("ignoring unknown rtcp-xr format {token:?}"),
            }
        }
    }

    fn apply(&mut self, format: XrFormat) {
        match format {
            XrFormat::LossRle(max_size) => {
                self.loss_rle_report = true;
                self.loss_rle_report_max_size = max_size;
            }
            XrFormat::DupRle(max_size) => {
                self.dup_rle_report = true;
                self.dup_rle_report_max_size = max_size;
            }
            XrFormat::RcptTimes(max_size) => {
                self.pkt_receipt_times_report = true;
                self.pkt_receipt_times_report_max_size = max_size;
            }
            XrFormat::RcvrRtt(mode, max_size) => {
                self.rtt_report = mode;
                self.rtt_report_max_size = max_size;
            }
            XrFormat::StatSummary(summary) => self.stats_summary.merge(summary),
            XrFormat::VoipMetrics => self.voip_metrics_report = true,
            XrFormat::DeJitterBuffer => self.djb_metrics_report = true,
        }
    }
}

impl fmt::Display for RtcpXr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        let mut sep = |f: &mut fmt::Formatter| {
            if take(&mut first) {
                Ok(())
            } else {
                f.write_str(" ")
            }
        };

        let rle_reports = [
            (
                self.loss_rle_report,
                "pkt-loss-rle",
                self.loss_rle_report_max_size,
            ),
            (
                self.dup_rle_report,
                "pkt-dup-rle",
                self.dup_rle_report_max_size,
            ),
            (
                self.pkt_receipt_times_report,
                "pkt-rcpt-times",
                self.pkt_receipt_times_report_max_size,
            ),
        ];

        for (_, name, max_size) in rle_reports.iter().filter(|(set, ..)| *set) {
            sep(f)?;
            f.write_str(name)?;

            if let Some(max_size) = max_size {
                write!(f, "={max_size}")?;
            }
        }

        if let Some(mode) = self.rtt_report.as_str() {
            sep(f)?;
            write!(f, "rcvr-rtt={mode}")?;

            if let Some(max_size) = self.rtt_report_max_size {
                write!(f, ":{max_size}")?;
            }
        }

        if !self.stats_summary.is_empty() {
            sep(f)?;
            write!(f, "stat-summary={}", self.stats_summary)?;
        }

        if self.voip_metrics_report {
            sep(f)?;
            f.write_str("voip-metrics")?;
        }

        if self.djb_metrics_report {
            sep(f)?;
            f.write_str("de-jitter-buffer")?;
        }

        Ok(())
    }
}
