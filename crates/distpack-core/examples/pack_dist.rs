//! Example: packing a build folder with distpack-core
//!
//! Run with: `cargo run --example pack_dist -- [input_dir]`
//!
//! Set `RUST_LOG=distpack_core=debug` to see per-entry events.

use distpack_core::DistPacker;
use distpack_core::PackConfig;
use distpack_core::PackOutcome;
use distpack_core::PatternFilter;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let input = std::env::args().nth(1).unwrap_or_else(|| "dist".to_string());

    // Create a small build output if nothing exists yet
    let created = !std::path::Path::new(&input).exists();
    if created {
        std::fs::create_dir_all(format!("{input}/assets"))?;
        std::fs::write(format!("{input}/index.html"), "<!doctype html>")?;
        std::fs::write(format!("{input}/assets/app.js"), "console.log('hi')")?;
        std::fs::write(format!("{input}/assets/app.js.map"), "{}")?;
    }

    let config = PackConfig::default()
        .with_input_dir(&input)
        .with_path_prefix("my-app")
        .with_filter(PatternFilter::new(["*.map"]).with_skip_hidden(true));

    let packer = DistPacker::new(config).with_done(|result| {
        if let Err(err) = result {
            eprintln!("callback saw failure: {err}");
        }
    });

    // Build tools may fire the hook twice; only the first call packs.
    let outcome = packer.on_build_end();
    let second = packer.on_build_end();
    println!("second signal ignored: {}", second.is_ignored());

    if let PackOutcome::Packed(report) = outcome {
        println!(
            "Packed {} files and {} directories into {} ({:.1}% smaller)",
            report.files_added,
            report.directories_added,
            report.output_path.display(),
            report.compression_percentage()
        );
    }

    if created {
        std::fs::remove_dir_all(&input)?;
    }
    Ok(())
}
