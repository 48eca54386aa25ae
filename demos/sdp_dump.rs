//! Parse the session description file given as first argument, print the parsed model and the regenerated SDP.
//!
//! `RUST_LOG=debug cargo run --example sdp_dump -- stream.sdp`

use std::{env, fs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .ok_or("usage: sdp_dump <file.sdp>")?;

    let text = fs::read_to_string(&path)?;

    let session = sdp::read_description(&text)?;

    log::info!(
        "parsed {path}: {} media, {} session attributes",
        session.media_count(),
        session.attribute_count()
    );

    println!("{session:#?}");

    match sdp::write_description(&session, false) {
        Ok(regenerated) => print!("{regenerated}"),
        Err(e) => log::warn!("cannot regenerate {path}, {e}"),
    }

    Ok(())
}
