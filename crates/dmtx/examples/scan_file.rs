//! Decode every Data Matrix symbol in the images given on the command line.
//!
//! ```text
//! RUST_LOG=dmtx_engine=debug cargo run -p dmtx --example scan_file -- a.png b.jpg
//! ```

use std::env;
use std::time::Instant;

use dmtx::{bitmap, bounding_box, DataMatrixEngine, DecodeRequest, EngineConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut config = EngineConfig::default();
    config.detect.detect_inverted = true;
    let engine = DataMatrixEngine::new(config)?;
    let request = DecodeRequest::new(16, 2_000)?;

    let paths: Vec<String> = env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: scan_file <image>...");
        return Ok(());
    }

    for path in &paths {
        let image = bitmap::load(path)?;
        let t0 = Instant::now();
        let report = engine.decode_report(&image, &request)?;
        println!(
            "{path}: {} tag(s) in {:.1} ms{}",
            report.tags.len(),
            t0.elapsed().as_secs_f64() * 1e3,
            if report.timed_out { " (timed out)" } else { "" }
        );
        for tag in &report.tags {
            println!("  {:<24} {:?}", tag.payload().to_string(), tag.corners());
        }
        if let Some(bb) = bounding_box(&report.tags) {
            println!(
                "  covering ({}, {})-({}, {})",
                bb.min_x, bb.min_y, bb.max_x, bb.max_y
            );
        }
    }
    Ok(())
}
