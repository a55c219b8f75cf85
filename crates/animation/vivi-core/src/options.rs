//! Input contracts for `SessionManager::start`.
//!
//! Plain data (`StartOptions`) is serde-friendly so adapters can build it
//! straight from JSON or JS objects; callbacks and the opaque payload travel
//! separately in [`Handlers`].

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::dispatch::{CompletionCallback, EventCallback, SessionEvent};
use crate::error::ViviError;
use crate::host::AnimationHost;
use crate::keyframes::{format_number, CssValue, Keyframe, KeyframeSpec, PropertyMap, RawCssValue};

/// A CSS time. Numbers are milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCssValue")]
pub struct CssTime(pub String);

impl From<RawCssValue> for CssTime {
    fn from(raw: RawCssValue) -> Self {
        match raw {
            RawCssValue::Text(s) => CssTime(s),
            RawCssValue::Number(ms) => CssTime::millis(ms),
        }
    }
}

impl From<&str> for CssTime {
    fn from(s: &str) -> Self {
        CssTime(s.to_string())
    }
}

impl CssTime {
    pub fn millis(ms: f64) -> Self {
        CssTime(format!("{}ms", format_number(ms)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Options accepted by `start`. Both camelCase and dashed spellings of the
/// timing fields are recognized; a non-empty camelCase value wins. Read them
/// through the accessors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StartOptions {
    /// Existing keyframes rule to run instead of a generated one.
    pub name: Option<String>,
    pub keyframes: Option<KeyframeSpec>,
    pub to: Option<PropertyMap>,
    pub from: Option<PropertyMap>,
    /// Properties merged into every property-map keyframe lacking them.
    pub common: Option<PropertyMap>,
    pub duration: Option<CssTime>,
    pub delay: Option<CssTime>,
    pub direction: Option<String>,
    pub timing_function: Option<String>,
    #[serde(rename = "timing-function", skip_serializing_if = "Option::is_none")]
    pub timing_function_dashed: Option<String>,
    pub iteration_count: Option<CssValue>,
    #[serde(rename = "iteration-count", skip_serializing_if = "Option::is_none")]
    pub iteration_count_dashed: Option<CssValue>,
    pub fill_mode: Option<String>,
    #[serde(rename = "fill-mode", skip_serializing_if = "Option::is_none")]
    pub fill_mode_dashed: Option<String>,
    /// Tear down on the terminal notification. Defaults to true.
    pub remove: Option<bool>,
}

fn prefer<'a>(camel: Option<&'a str>, dashed: Option<&'a str>) -> Option<&'a str> {
    match camel {
        Some(v) if !v.is_empty() => Some(v),
        _ => dashed.or(camel),
    }
}

impl StartOptions {
    pub fn timing_function(&self) -> Option<&str> {
        prefer(
            self.timing_function.as_deref(),
            self.timing_function_dashed.as_deref(),
        )
    }

    pub fn iteration_count(&self) -> Option<&str> {
        prefer(
            self.iteration_count.as_ref().map(CssValue::as_str),
            self.iteration_count_dashed.as_ref().map(CssValue::as_str),
        )
    }

    pub fn fill_mode(&self) -> Option<&str> {
        prefer(self.fill_mode.as_deref(), self.fill_mode_dashed.as_deref())
    }

    /// True when the options name at least one animation source.
    pub fn has_source(&self) -> bool {
        self.name.is_some() || self.keyframes.is_some() || self.to.is_some() || self.from.is_some()
    }

    /// Keyframes to materialize: explicit `keyframes`, else `{to, from}`
    /// from whichever endpoints are present, with `common` merged in.
    pub fn resolved_keyframes(&self) -> Option<KeyframeSpec> {
        let mut spec = match &self.keyframes {
            Some(k) => k.clone(),
            None => {
                let mut synth = KeyframeSpec::new();
                if let Some(from) = &self.from {
                    synth.insert("from".to_string(), Keyframe::Properties(from.clone()));
                }
                if let Some(to) = &self.to {
                    synth.insert("to".to_string(), Keyframe::Properties(to.clone()));
                }
                synth
            }
        };
        if spec.is_empty() {
            return None;
        }

        if let Some(common) = &self.common {
            for frame in spec.values_mut() {
                if let Keyframe::Properties(props) = frame {
                    for (prop, value) in common {
                        if !props.contains_key(prop) {
                            props.insert(prop.clone(), value.clone());
                        }
                    }
                }
            }
        }
        Some(spec)
    }
}

/// Element argument of `start`: a direct element or a collection that must
/// hold exactly one.
#[derive(Clone, Debug, PartialEq)]
pub enum Target<E> {
    Element(E),
    Collection(Vec<E>),
}

impl<E> Target<E> {
    pub fn into_element(self) -> Result<E, ViviError> {
        match self {
            Target::Element(e) => Ok(e),
            Target::Collection(mut items) if items.len() == 1 => Ok(items.remove(0)),
            Target::Collection(items) => Err(ViviError::invalid(format!(
                "element collection must hold exactly one element, got {}",
                items.len()
            ))),
        }
    }
}

/// Callbacks and opaque payload for one session.
pub struct Handlers<H: AnimationHost> {
    pub on_event: Option<EventCallback<H>>,
    pub on_completion: Option<CompletionCallback<H>>,
    pub info: Option<H::Info>,
}

impl<H: AnimationHost> Default for Handlers<H> {
    fn default() -> Self {
        Self {
            on_event: None,
            on_completion: None,
            info: None,
        }
    }
}

impl<H: AnimationHost> fmt::Debug for Handlers<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("on_event", &self.on_event.is_some())
            .field("on_completion", &self.on_completion.is_some())
            .field("info", &self.info.is_some())
            .finish()
    }
}

impl<H: AnimationHost> Handlers<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_event(mut self, f: impl Fn(&SessionEvent<H>) + 'static) -> Self {
        self.on_event = Some(Rc::new(f));
        self
    }

    pub fn on_completion(mut self, f: impl Fn(bool, &SessionEvent<H>) + 'static) -> Self {
        self.on_completion = Some(Rc::new(f));
        self
    }

    pub fn info(mut self, info: H::Info) -> Self {
        self.info = Some(info);
        self
    }
}
