#![allow(dead_code)]

use bytesstr::BytesStr;
use ezk_sdp::{ParseSessionDescriptionError, SessionDescription};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn parse(sdp: &'static str) -> Result<SessionDescription, ParseSessionDescriptionError> {
    init_logger();

    SessionDescription::parse(&BytesStr::from_static(sdp))
}
