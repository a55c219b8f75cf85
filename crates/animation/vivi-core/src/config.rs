//! Configuration for vivi-core.

use serde::{Deserialize, Serialize};

/// Naming and detection knobs for a session manager.
/// Every field has a default, so partial JSON objects are accepted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix of generated keyframe rule names (`<prefix><id>`). Reserved:
    /// caller-supplied names may not start with it.
    pub name_prefix: String,
    /// Title tagging the owned style container so a second initialization
    /// finds it instead of creating another.
    pub style_title: String,
    /// Vendor prefixes tolerated in front of a property name, without dashes.
    pub vendor_prefixes: Vec<String>,
    /// Keyframes at-rule spellings tried in order during initialization.
    pub keyframes_keywords: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name_prefix: "vivi-js-".to_string(),
            style_title: "vivi.js".to_string(),
            vendor_prefixes: ["webkit", "moz", "ms", "o"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            keyframes_keywords: [
                "@keyframes",
                "@-webkit-keyframes",
                "@-moz-keyframes",
                "@-o-keyframes",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON config.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Name of the throwaway rule inserted while testing keyframes keywords.
    pub(crate) fn init_rule_name(&self) -> String {
        format!("{}init", self.name_prefix)
    }
}
