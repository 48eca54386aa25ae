//! H.264 format parameters (`a=fmtp:<payload type> <params>`)

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use bytes::Bytes;
use std::fmt;
use std::num::ParseIntError;

/// Failed to apply a H.264 fmtp parameter
///
/// Never fatal to the enclosing attribute, every other parameter is still applied.
#[derive(Debug, thiserror::Error)]
pub enum H264FmtpError {
    #[error("profile-level-id is not exactly 6 characters")]
    MalformedProfileLevelId,
    #[error("profile-level-id contains non-hex characters")]
    InvalidProfileLevelId,
    #[error("packetization-mode is not an integer")]
    InvalidPacketizationMode(#[source] ParseIntError),
    #[error("sprop-parameter-sets contains invalid base64")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// H.264 specific format parameters
///
/// Only meaningful when the media's encoding name is `H264`.
///
/// [RFC6184](https://www.rfc-editor.org/rfc/rfc6184.html#section-8.1)
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct H264Fmtp {
    /// Set once a fmtp attribute for the H.264 payload was parsed
    pub valid: bool,

    pub packetization_mode: u32,

    /// First byte of `profile-level-id`
    pub profile_idc: u8,

    /// Second byte of `profile-level-id`, the constraint set flags
    pub profile_iop: u8,

    /// Third byte of `profile-level-id`
    pub level_idc: u8,

    /// Sequence parameter set NAL unit
    pub sps: Bytes,

    /// Picture parameter set NAL unit
    pub pps: Bytes,
}

impl H264Fmtp {
    /// Apply the `;` separated parameters of a fmtp attribute
    ///
    /// Unknown parameters are ignored. On failure the first error is returned after every parameter was
    /// processed, so values which did parse (e.g. a SPS next to an invalid PPS) are kept.
    pub fn update(&mut self, params: &str) -> Result<(), H264FmtpError> {
        self.valid = true;

        let mut result = Ok(());

        for (key, value) in params.split(';').filter_map(|param| param.split_once('=')) {
            let value = value.trim();

            let param_result = match key.trim() {
                "profile-level-id" => self.set_profile_level_id(value),
                "packetization-mode" => value
                    .parse::<u32>()
                    .map(|mode| self.packetization_mode = mode)
                    .map_err(H264FmtpError::InvalidPacketizationMode),
                "sprop-parameter-sets" => self.set_parameter_sets(value),
                _ => continue,
            };

            result = result.and(param_result);
        }

        result
    }

    fn set_profile_level_id(&mut self, value: &str) -> Result<(), H264FmtpError> {
        if value.len() != 6 {
            return Err(H264FmtpError::MalformedProfileLevelId);
        }

        // hex digits only, no sign
        if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(H264FmtpError::InvalidProfileLevelId);
        }

        let byte = |i: usize| {
            u8::from_str_radix(&value[i..i + 2], 16)
                .map_err(|_| H264FmtpError::InvalidProfileLevelId)
        };

        let profile_idc = byte(0)?;
        let profile_iop = byte(2)?;
        let level_idc = byte(4)?;

        self.profile_idc = profile_idc;
        self.profile_iop = profile_iop;
        self.level_idc = level_idc;

        Ok(())
    }

    fn set_parameter_sets(&mut self, value: &str) -> Result<(), H264FmtpError> {
        let (sps, pps) = value.split_once(',').unwrap_or((value, ""));

        let sps = BASE64_STANDARD.decode(sps.trim()).map(|sps| self.sps = sps.into());
        let pps = BASE64_STANDARD.decode(pps.trim()).map(|pps| self.pps = pps.into());

        sps.and(pps).map_err(H264FmtpError::from)
    }
}

impl fmt::Display for H264Fmtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "packetization-mode={};profile-level-id={:02X}{:02X}{:02X}",
            self.packetization_mode, self.profile_idc, self.profile_iop, self.level_idc
        )?;

        if !self.sps.is_empty() && !self.pps.is_empty() {
            write!(
                f,
                ";sprop-parameter-sets={},{}",
                BASE64_STANDARD.encode(&self.sps),
                BASE64_STANDARD.encode(&self.pps)
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SPS: &[u8] = &[
        0x67, 0x42, 0xe0, 0x1f, 0xda, 0x02, 0x80, 0xf6, 0x80, 0x6d, 0x0a, 0x13, 0x50,
    ];
    const PPS: &[u8] = &[0x68, 0xce, 0x3c, 0x80];

    #[test]
    fn fmtp() {
        let mut fmtp = H264Fmtp::default();
        fmtp.update(
            "packetization-mode=1;profile-level-id=42e01f;sprop-parameter-sets=Z0LgH9oCgPaAbQoTUA==,aM48gA==",
        )
        .unwrap();

        assert!(fmtp.valid);
        assert_eq!(fmtp.packetization_mode, 1);
        assert_eq!(fmtp.profile_idc, 0x42);
        assert_eq!(fmtp.profile_iop, 0xE0);
        assert_eq!(fmtp.level_idc, 0x1F);
        assert_eq!(fmtp.sps, SPS);
        assert_eq!(fmtp.pps, PPS);
    }

    #[test]
    fn fmtp_whitespace_and_unknown_params() {
        let mut fmtp = H264Fmtp::default();
        fmtp.update(" level-asymmetry-allowed=1; packetization-mode = 0 ;profile-level-id=640028")
            .unwrap();

        assert_eq!(fmtp.packetization_mode, 0);
        assert_eq!(fmtp.profile_idc, 0x64);
        assert_eq!(fmtp.profile_iop, 0x00);
        assert_eq!(fmtp.level_idc, 0x28);
    }

    #[test]
    fn fmtp_invalid_base64_keeps_decoded() {
        let mut fmtp = H264Fmtp::default();
        let result = fmtp.update("sprop-parameter-sets=Z0LgH9oCgPaAbQoTUA==,%%%%;packetization-mode=1");

        assert!(matches!(result, Err(H264FmtpError::InvalidBase64(..))));
        assert!(fmtp.valid);
        assert_eq!(fmtp.sps, SPS);
        assert!(fmtp.pps.is_empty());
        assert_eq!(fmtp.packetization_mode, 1);
    }

    #[test]
    fn fmtp_invalid_profile_level_id() {
        let mut fmtp = H264Fmtp::default();

        assert!(matches!(
            fmtp.update("profile-level-id=42e0"),
            Err(H264FmtpError::MalformedProfileLevelId)
        ));
        assert!(matches!(
            fmtp.update("profile-level-id=42zz1f"),
            Err(H264FmtpError::InvalidProfileLevelId)
        ));
        assert!(matches!(
            fmtp.update("profile-level-id=+1+2+3"),
            Err(H264FmtpError::InvalidProfileLevelId)
        ));
        assert!(matches!(
            fmtp.update("packetization-mode=x"),
            Err(H264FmtpError::InvalidPacketizationMode(..))
        ));

        assert_eq!(fmtp.profile_idc, 0);
        assert_eq!(fmtp.profile_iop, 0);
        assert_eq!(fmtp.level_idc, 0);
    }

    #[test]
    fn fmtp_print() {
        let fmtp = H264Fmtp {
            valid: true,
            packetization_mode: 1,
            profile_idc: 0x42,
            profile_iop: 0xE0,
            level_idc: 0x1F,
            sps: Bytes::from_static(SPS),
            pps: Bytes::from_static(PPS),
        };

        assert_eq!(
            fmtp.to_string(),
            "packetization-mode=1;profile-level-id=42E01F;sprop-parameter-sets=Z0LgH9oCgPaAbQoTUA==,aM48gA=="
        );
    }

    #[test]
    fn fmtp_print_without_parameter_sets() {
        let fmtp = H264Fmtp {
            packetization_mode: 0,
            profile_idc: 0x4D,
            profile_iop: 0x00,
            level_idc: 0x0A,
            sps: Bytes::from_static(SPS),
            ..Default::default()
        };

        assert_eq!(
            fmtp.to_string(),
            "packetization-mode=0;profile-level-id=4D000A"
        );
    }
}
