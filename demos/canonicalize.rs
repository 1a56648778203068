//! Reformat a KeyValues file into canonical form on stdout.
//!
//! Run with: cargo run --example canonicalize -- path/to/file.vmt
//!
//! Set `RUST_LOG=keyvalues=trace` to watch every key as it is parsed.

use keyvalues::KeyValues;
use std::error::Error;
use std::fs::File;
use std::io;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: canonicalize <file>")?;

    let mut root = KeyValues::new();
    let read = root.read_from(File::open(&path)?)?;

    let stdout = io::stdout();
    let written = root.write_to(stdout.lock())?;

    tracing::info!(path = %path, read, written, "canonicalized");
    Ok(())
}
