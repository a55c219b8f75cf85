//! Keyframe specs and the registry that materializes them as keyframes
//! rule groups in the owned style container.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::RuleError;
use crate::host::AnimationHost;
use crate::resolver::PropertyResolver;

/// A CSS value supplied either as text or as a bare number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawCssValue")]
pub struct CssValue(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCssValue {
    Text(String),
    Number(f64),
}

impl From<RawCssValue> for CssValue {
    fn from(raw: RawCssValue) -> Self {
        match raw {
            RawCssValue::Text(s) => CssValue(s),
            RawCssValue::Number(n) => CssValue(format_number(n)),
        }
    }
}

impl From<&str> for CssValue {
    fn from(s: &str) -> Self {
        CssValue(s.to_string())
    }
}

impl From<String> for CssValue {
    fn from(s: String) -> Self {
        CssValue(s)
    }
}

impl From<f64> for CssValue {
    fn from(n: f64) -> Self {
        CssValue(format_number(n))
    }
}

impl CssValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `200.0` -> `"200"`, `0.25` -> `"0.25"`.
pub(crate) fn format_number(n: f64) -> String {
    format!("{n}")
}

/// Canonical property -> value, in insertion order.
pub type PropertyMap = IndexMap<String, CssValue>;

/// One keyframe: a literal declaration block or a property map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keyframe {
    Css(String),
    Properties(PropertyMap),
}

/// Offset key (`from`, `to`, `"25%"`, `"0.25"`) -> keyframe, in insertion order.
pub type KeyframeSpec = IndexMap<String, Keyframe>;

/// Normalized percentage for an offset key. `from` and `to` map to 0 and
/// 100, `"NN%"` is a percentage, a bare number is a fraction of the
/// timeline. Rounded to a whole percent; None when unparseable or outside
/// 0..=100.
pub fn offset_percent(key: &str) -> Option<f64> {
    let key = key.trim();
    let pct = match key {
        "from" => 0.0,
        "to" => 100.0,
        _ => match key.strip_suffix('%') {
            Some(p) => p.trim().parse::<f64>().ok()?,
            None => key.parse::<f64>().ok()? * 100.0,
        },
    };
    let pct = pct.round();
    (0.0..=100.0).contains(&pct).then_some(pct)
}

/// Delete every keyframes rule named `name` from the owned container.
/// Returns how many were removed.
pub fn remove_keyframes<H: AnimationHost>(host: &mut H, name: &str) -> usize {
    let end = host.rule_count();
    remove_keyframes_before(host, name, end)
}

/// Like [`remove_keyframes`], limited to the first `end` rules.
fn remove_keyframes_before<H: AnimationHost>(host: &mut H, name: &str, mut end: usize) -> usize {
    let mut removed = 0;
    let mut i = 0;
    while i < end.min(host.rule_count()) {
        if host.keyframes_name_at(i).as_deref() == Some(name) {
            host.delete_rule(i);
            removed += 1;
            end -= 1;
        } else {
            i += 1;
        }
    }
    removed
}

/// Creates and destroys keyframes rule groups using the at-rule keyword
/// detected at initialization.
#[derive(Debug, Clone)]
pub struct KeyframeRegistry {
    keyword: String,
}

impl KeyframeRegistry {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Full rule text for `name`. Property maps go through `resolver`;
    /// properties it cannot resolve keep their canonical spelling.
    pub fn rule_text(
        &self,
        resolver: &mut PropertyResolver,
        name: &str,
        spec: &KeyframeSpec,
    ) -> String {
        let mut text = format!("{} {} {{", self.keyword, name);
        for (key, frame) in spec {
            let Some(pct) = offset_percent(key) else {
                tracing::debug!(rule = name, key = key.as_str(), "skipping bad keyframe offset");
                continue;
            };
            text.push_str(&format!(" {pct}% {{ "));
            match frame {
                Keyframe::Css(css) => {
                    let css = css.trim();
                    if !css.is_empty() {
                        text.push_str(css);
                        text.push(' ');
                    }
                }
                Keyframe::Properties(props) => {
                    for (prop, value) in props {
                        let native = resolver.resolve(prop).unwrap_or_else(|| prop.clone());
                        let css = resolver.css_property_name(&native);
                        text.push_str(&format!("{}: {}; ", css, value.as_str()));
                    }
                }
            }
            text.push('}');
        }
        text.push_str(" }");
        text
    }

    /// Insert a keyframes rule group named `name`, replacing any earlier
    /// group of that name. On rejection the container is left untouched.
    pub fn define<H: AnimationHost>(
        &self,
        host: &mut H,
        resolver: &mut PropertyResolver,
        name: &str,
        spec: &KeyframeSpec,
    ) -> Result<(), RuleError> {
        let text = self.rule_text(resolver, name, spec);
        let existing = host.rule_count();
        host.insert_rule(&text)?;
        let replaced = remove_keyframes_before(host, name, existing);
        tracing::trace!(rule = name, replaced, "defined keyframes");
        Ok(())
    }

    pub fn remove<H: AnimationHost>(&self, host: &mut H, name: &str) -> usize {
        remove_keyframes(host, name)
    }
}
