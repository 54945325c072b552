//! Build script for the Spotify dashboard job.
//!
//! Copies the configuration template and the sample listening data into the
//! user's local data directory, where the application looks for them:
//! - Linux: `~/.local/share/spotdash/`
//! - macOS: `~/Library/Application Support/spotdash/`
//! - Windows: `%LOCALAPPDATA%/spotdash/`
//!
//! Missing templates only produce a cargo warning. An existing
//! `sample_data.json` is never overwritten so local edits survive rebuilds.

use std::{env, fs, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");
    println!("cargo:rerun-if-changed=data/sample_data.json");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotdash");
    fs::create_dir_all(&out_dir)?;

    let env_example_path = manifest_dir.join(".env.example");
    if env_example_path.is_file() {
        fs::copy(&env_example_path, out_dir.join(".env.example"))?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
    }

    let sample_path = manifest_dir.join("data/sample_data.json");
    let sample_target = out_dir.join("sample_data.json");
    if sample_path.is_file() {
        if !sample_target.exists() {
            fs::copy(&sample_path, sample_target)?;
        }
    } else {
        println!(
            "cargo:warning=sample data not found at {}",
            sample_path.display()
        );
    }

    Ok(())
}
