use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub mod dom;

pub use dom::{notify, MockDom, MockElement, MockEvent};

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    keyframes: HashMap<String, String>,
    options: HashMap<String, String>,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(map: &'a HashMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Keyframe specs (`vivi_core::KeyframeSpec` JSON).
pub mod keyframes {
    use super::*;
    use vivi_core::KeyframeSpec;

    pub fn keys() -> Vec<String> {
        MANIFEST.keyframes.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<KeyframeSpec> {
        load_json(lookup(&MANIFEST.keyframes, "keyframes", name)?)
    }
}

/// Start options (`vivi_core::StartOptions` JSON).
pub mod options {
    use super::*;
    use vivi_core::StartOptions;

    pub fn keys() -> Vec<String> {
        MANIFEST.options.keys().cloned().collect()
    }

    pub fn load(name: &str) -> Result<StartOptions> {
        load_json(lookup(&MANIFEST.options, "options", name)?)
    }
}
