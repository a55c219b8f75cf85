//! Host boundary.
//!
//! The session manager never touches a document directly. Adapters (the DOM
//! adapter in vivi-wasm, the in-memory host in vivi-test-fixtures) implement
//! [`AnimationHost`] and feed native lifecycle notifications back through
//! `SessionManager::dispatch` as [`Notification`]s.

use std::fmt;

use crate::error::RuleError;

/// Environment the manager orchestrates: a style property surface, one owned
/// style-rule container, per-element inline animation properties and
/// per-element lifecycle listeners.
pub trait AnimationHost {
    /// Animated element. Identity is `PartialEq`.
    type Element: Clone + PartialEq + fmt::Debug;
    /// Raw native notification, echoed to callbacks untouched.
    type Event: Clone;
    /// Opaque caller payload carried by a session.
    type Info: Clone;

    /// Property names exposed by a detached scratch element's style
    /// declaration, in enumeration order.
    fn style_property_names(&self) -> Vec<String>;

    /// Create the owned style container, or locate one already tagged with
    /// `title`. Returns false if no container can be obtained.
    fn attach_style_container(&mut self, title: &str) -> bool;

    /// Append `rule` at the end of the owned container.
    fn insert_rule(&mut self, rule: &str) -> Result<(), RuleError>;

    /// Number of rules currently in the owned container.
    fn rule_count(&self) -> usize;

    /// Name of the rule at `index` if it is a keyframes rule.
    fn keyframes_name_at(&self, index: usize) -> Option<String>;

    /// Delete the rule at `index`.
    fn delete_rule(&mut self, index: usize);

    /// Assign an inline style property on `element`, by native name.
    fn set_style_property(&mut self, element: &Self::Element, property: &str, value: &str);

    /// Attach the single lifecycle listener to `element` for every event in
    /// `events`.
    fn listen(&mut self, element: &Self::Element, events: &[&str]);

    /// Detach what `listen` attached.
    fn unlisten(&mut self, element: &Self::Element, events: &[&str]);
}

/// A native lifecycle notification as delivered to the listener on
/// `target`.
pub struct Notification<H: AnimationHost> {
    /// Element whose listener received the notification.
    pub target: H::Element,
    /// Native event type name (`animationend`, `webkitAnimationStart`, ...).
    pub event_type: String,
    /// Value of the native animation-name the notification refers to.
    pub animation_name: String,
    pub event: H::Event,
}

impl<H: AnimationHost> Clone for Notification<H> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            event_type: self.event_type.clone(),
            animation_name: self.animation_name.clone(),
            event: self.event.clone(),
        }
    }
}

impl<H: AnimationHost> fmt::Debug for Notification<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("target", &self.target)
            .field("event_type", &self.event_type)
            .field("animation_name", &self.animation_name)
            .finish_non_exhaustive()
    }
}
