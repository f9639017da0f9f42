//! Model sealing utility.
//!
//! Writes `manifest.json` with the SHA-256 digest of `model.json`, so the
//! estimator can detect a modified or truncated artifact at start-up.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin seal_model -- <model_dir>           # write manifest.json
//! cargo run --bin seal_model -- <model_dir> --check   # verify and load
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use medcharge::adapters::forest::{
    sha256_hex, ExportedForest, ModelManifest, MANIFEST_FILE, MODEL_FILE,
};
use medcharge::adapters::ForestModel;
use medcharge::ports::ChargeModel;

fn usage() -> String {
    "Usage: seal_model <model_dir> [--check]".to_string()
}

fn parse_args() -> Result<(PathBuf, bool), String> {
    let mut model_dir: Option<PathBuf> = None;
    let mut check = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--check" => check = true,
            "-h" | "--help" => return Err(usage()),
            _ => {
                if model_dir.is_none() {
                    model_dir = Some(PathBuf::from(arg));
                } else {
                    return Err(usage());
                }
            }
        }
    }

    let model_dir = model_dir.ok_or_else(usage)?;
    Ok((model_dir, check))
}

fn main() -> Result<(), String> {
    let (model_dir, check) = parse_args()?;

    if !model_dir.is_dir() {
        return Err(format!("{model_dir:?} is not a directory"));
    }

    if check {
        let model = ForestModel::load(&model_dir, true).map_err(|e| e.to_string())?;
        println!("Manifest OK: {}", model.describe());
        return Ok(());
    }

    let model_path = model_dir.join(MODEL_FILE);
    let bytes = fs::read(&model_path).map_err(|e| format!("Failed to read {model_path:?}: {e}"))?;

    // Refuse to seal something the estimator would reject anyway.
    let exported: ExportedForest = serde_json::from_slice(&bytes)
        .map_err(|e| format!("{model_path:?} is not a valid model: {e}"))?;
    let model =
        ForestModel::from_exported(exported, model_path.clone()).map_err(|e| e.to_string())?;

    let manifest = ModelManifest {
        version: 1,
        created_at: Some(chrono::Utc::now().timestamp()),
        files: BTreeMap::from([(MODEL_FILE.to_string(), sha256_hex(&bytes))]),
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize {MANIFEST_FILE}: {e}"))?;

    let manifest_path = model_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .map_err(|e| format!("Failed to write {manifest_path:?}: {e}"))?;

    println!("Sealed {}: {manifest_path:?}", model.describe());
    Ok(())
}
