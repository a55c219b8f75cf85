//! Session records and the derivation of an element's native animation
//! property lists from its ordered sessions.

use std::fmt;

use crate::dispatch::{CompletionCallback, EventCallback};
use crate::host::AnimationHost;
use crate::ids::SessionId;
use crate::options::StartOptions;
use crate::resolver::PropertyResolver;

/// Canonical animation longhands, in materialization order.
pub const ANIMATION_PROPERTIES: [&str; 8] = [
    "animationName",
    "animationDuration",
    "animationDelay",
    "animationDirection",
    "animationTimingFunction",
    "animationIterationCount",
    "animationFillMode",
    "animationPlayState",
];

/// Per-session timing fields as supplied; defaults are applied only when
/// the property lists are built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Timing {
    pub duration: Option<String>,
    pub delay: Option<String>,
    pub direction: Option<String>,
    pub timing_function: Option<String>,
    pub iteration_count: Option<String>,
    pub fill_mode: Option<String>,
}

impl Timing {
    pub fn from_options(opts: &StartOptions) -> Self {
        Self {
            duration: opts.duration.as_ref().map(|t| t.as_str().to_string()),
            delay: opts.delay.as_ref().map(|t| t.as_str().to_string()),
            direction: opts.direction.clone(),
            timing_function: opts.timing_function().map(str::to_string),
            iteration_count: opts.iteration_count().map(str::to_string),
            fill_mode: opts.fill_mode().map(str::to_string),
        }
    }
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v,
        _ => default,
    }
}

/// One logical animation.
pub struct Session<H: AnimationHost> {
    pub id: SessionId,
    pub element: H::Element,
    /// Value placed in the native animation-name list.
    pub rule_name: String,
    /// Whether teardown must delete a keyframes rule named `rule_name`.
    pub generated_rule: bool,
    pub timing: Timing,
    pub pause_count: u32,
    pub cancelled: bool,
    pub remove_on_end: bool,
    pub(crate) on_event: Option<EventCallback<H>>,
    pub(crate) on_completion: Option<CompletionCallback<H>>,
    pub info: Option<H::Info>,
}

impl<H: AnimationHost> Session<H> {
    pub fn is_paused(&self) -> bool {
        self.pause_count > 0
    }

    pub fn play_state(&self) -> &'static str {
        if self.is_paused() {
            "paused"
        } else {
            "running"
        }
    }

    /// Caller-supplied rule name, if the session was started with one.
    pub fn caller_name(&self) -> Option<&str> {
        (!self.generated_rule).then_some(self.rule_name.as_str())
    }
}

impl<H: AnimationHost> fmt::Debug for Session<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("element", &self.element)
            .field("rule_name", &self.rule_name)
            .field("generated_rule", &self.generated_rule)
            .field("timing", &self.timing)
            .field("pause_count", &self.pause_count)
            .field("cancelled", &self.cancelled)
            .field("remove_on_end", &self.remove_on_end)
            .finish_non_exhaustive()
    }
}

/// Eight parallel lists, one entry per session, index-aligned with the
/// element's session order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PropertyLists {
    columns: [Vec<String>; 8],
}

impl PropertyLists {
    pub fn from_sessions<'a, H, I>(sessions: I) -> Self
    where
        H: AnimationHost + 'a,
        I: IntoIterator<Item = &'a Session<H>>,
    {
        let mut lists = Self::default();
        for s in sessions {
            lists.push(s);
        }
        lists
    }

    fn push<H: AnimationHost>(&mut self, s: &Session<H>) {
        let t = &s.timing;
        let row = [
            s.rule_name.as_str(),
            or_default(&t.duration, "0s"),
            or_default(&t.delay, "0s"),
            or_default(&t.direction, "normal"),
            or_default(&t.timing_function, "ease"),
            or_default(&t.iteration_count, "1"),
            or_default(&t.fill_mode, "both"),
            s.play_state(),
        ];
        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Comma-joined value for each entry of [`ANIMATION_PROPERTIES`].
    pub fn joined(&self) -> [String; 8] {
        std::array::from_fn(|i| self.columns[i].join(","))
    }
}

/// Native spellings of [`ANIMATION_PROPERTIES`], resolved once at
/// initialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationProperties {
    native: [String; 8],
}

impl AnimationProperties {
    /// None if any longhand is missing from the environment.
    pub fn resolve(resolver: &mut PropertyResolver) -> Option<Self> {
        let mut native: [String; 8] = Default::default();
        for (slot, canonical) in native.iter_mut().zip(ANIMATION_PROPERTIES) {
            *slot = resolver.resolve(canonical)?;
        }
        Some(Self { native })
    }

    pub fn native(&self) -> &[String; 8] {
        &self.native
    }

    /// Assign every list to its native property on `element`.
    pub fn apply<H: AnimationHost>(&self, host: &mut H, element: &H::Element, lists: &PropertyLists) {
        for (property, value) in self.native.iter().zip(lists.joined()) {
            host.set_style_property(element, property, &value);
        }
    }
}
