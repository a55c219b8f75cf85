//! In-memory host: a style property list, one style sheet that understands
//! just enough of `@keyframes` to name its rules, inline element styles and
//! listener bookkeeping.

use std::collections::HashMap;

use vivi_core::{AnimationHost, Notification, RuleError, ANIMATION_PROPERTIES};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct MockElement(pub u32);

/// Native notification as the mock engine would deliver it.
#[derive(Clone, Debug, PartialEq)]
pub struct MockEvent {
    pub event_type: String,
    pub animation_name: String,
    pub elapsed_time: f64,
}

#[derive(Clone, Debug)]
struct MockRule {
    text: String,
    keyframes_name: Option<String>,
}

#[derive(Clone, Debug, Default)]
struct MockSheet {
    title: String,
    rules: Vec<MockRule>,
}

#[derive(Clone, Debug)]
pub struct MockDom {
    properties: Vec<String>,
    keywords: Vec<String>,
    can_attach: bool,
    reject_containing: Vec<String>,
    sheets: Vec<MockSheet>,
    owned: Option<usize>,
    styles: HashMap<MockElement, HashMap<String, String>>,
    listeners: HashMap<MockElement, Vec<String>>,
    listen_calls: usize,
    unlisten_calls: usize,
}

fn standard_properties() -> Vec<String> {
    let mut names: Vec<String> = ["animation", "opacity", "transform", "left", "top", "color"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    names.extend(ANIMATION_PROPERTIES.iter().map(|s| s.to_string()));
    names.push("backgroundColor".into());
    names
}

impl Default for MockDom {
    fn default() -> Self {
        Self::standard()
    }
}

impl MockDom {
    /// Unprefixed properties and `@keyframes`.
    pub fn standard() -> Self {
        Self {
            properties: standard_properties(),
            keywords: vec!["@keyframes".into()],
            can_attach: true,
            reject_containing: Vec::new(),
            sheets: Vec::new(),
            owned: None,
            styles: HashMap::new(),
            listeners: HashMap::new(),
            listen_calls: 0,
            unlisten_calls: 0,
        }
    }

    /// Old WebKit: `webkit`-prefixed animation properties and transform,
    /// only `@-webkit-keyframes`.
    pub fn webkit() -> Self {
        let properties = standard_properties()
            .into_iter()
            .map(|p| {
                if p.starts_with("animation") || p == "transform" {
                    let mut chars = p.chars();
                    let first = chars.next().map(|c| c.to_ascii_uppercase());
                    format!("webkit{}{}", first.unwrap_or_default(), chars.as_str())
                } else {
                    p
                }
            })
            .collect();
        Self {
            properties,
            keywords: vec!["@-webkit-keyframes".into()],
            ..Self::standard()
        }
    }

    /// No animation properties at all.
    pub fn without_animations() -> Self {
        Self {
            properties: vec!["opacity".into(), "color".into()],
            ..Self::standard()
        }
    }

    /// Refuse to create a style container.
    pub fn without_style_container(mut self) -> Self {
        self.can_attach = false;
        self
    }

    /// Reject every rule whose text contains `needle`.
    pub fn rejecting(mut self, needle: &str) -> Self {
        self.reject_containing.push(needle.to_string());
        self
    }

    /// Add a sheet that already exists before the manager runs.
    pub fn with_existing_sheet(mut self, title: &str) -> Self {
        self.sheets.push(MockSheet {
            title: title.to_string(),
            rules: Vec::new(),
        });
        self
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    fn owned(&self) -> Option<&MockSheet> {
        self.owned.map(|i| &self.sheets[i])
    }

    /// Names of keyframes rules in the owned sheet, in order.
    pub fn keyframes_names(&self) -> Vec<String> {
        self.owned()
            .map(|s| {
                s.rules
                    .iter()
                    .filter_map(|r| r.keyframes_name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_keyframes(&self, name: &str) -> bool {
        self.keyframes_names().iter().any(|n| n == name)
    }

    /// Text of the first keyframes rule named `name`.
    pub fn rule_text(&self, name: &str) -> Option<String> {
        self.owned()?
            .rules
            .iter()
            .find(|r| r.keyframes_name.as_deref() == Some(name))
            .map(|r| r.text.clone())
    }

    /// Inline style value on `element`, by native property name.
    pub fn style(&self, element: MockElement, property: &str) -> Option<&str> {
        self.styles
            .get(&element)
            .and_then(|s| s.get(property))
            .map(String::as_str)
    }

    pub fn has_listener(&self, element: MockElement) -> bool {
        self.listeners
            .get(&element)
            .is_some_and(|events| !events.is_empty())
    }

    pub fn listened_events(&self, element: MockElement) -> Vec<String> {
        self.listeners.get(&element).cloned().unwrap_or_default()
    }

    pub fn listen_calls(&self) -> usize {
        self.listen_calls
    }

    pub fn unlisten_calls(&self) -> usize {
        self.unlisten_calls
    }
}

/// Keyframes rule name if `text` is an accepted keyframes at-rule. Err for
/// anything the sheet would refuse.
fn parse_rule(text: &str, keywords: &[String]) -> Result<Option<String>, String> {
    let text = text.trim();
    let opens = text.matches('{').count();
    if opens == 0 || opens != text.matches('}').count() || !text.ends_with('}') {
        return Err("SyntaxError: unbalanced rule".into());
    }
    if !text.starts_with('@') {
        return Ok(None);
    }
    let head = &text[..text.find('{').unwrap_or(text.len())];
    let mut parts = head.split_whitespace();
    let keyword = parts.next().unwrap_or_default();
    if !keywords.iter().any(|k| k == keyword) {
        return Err(format!("SyntaxError: unsupported at-rule {keyword}"));
    }
    match (parts.next(), parts.next()) {
        (Some(name), None) => Ok(Some(name.to_string())),
        _ => Err("SyntaxError: bad keyframes name".into()),
    }
}

impl AnimationHost for MockDom {
    type Element = MockElement;
    type Event = MockEvent;
    type Info = serde_json::Value;

    fn style_property_names(&self) -> Vec<String> {
        self.properties.clone()
    }

    fn attach_style_container(&mut self, title: &str) -> bool {
        if let Some(i) = self.sheets.iter().position(|s| s.title == title) {
            self.owned = Some(i);
            return true;
        }
        if !self.can_attach {
            return false;
        }
        self.sheets.push(MockSheet {
            title: title.to_string(),
            rules: Vec::new(),
        });
        self.owned = Some(self.sheets.len() - 1);
        true
    }

    fn insert_rule(&mut self, rule: &str) -> Result<(), RuleError> {
        let Some(i) = self.owned else {
            return Err(RuleError::new(rule, "no style sheet"));
        };
        if self.reject_containing.iter().any(|n| rule.contains(n.as_str())) {
            return Err(RuleError::new(rule, "SyntaxError: rejected"));
        }
        let keyframes_name =
            parse_rule(rule, &self.keywords).map_err(|reason| RuleError::new(rule, reason))?;
        self.sheets[i].rules.push(MockRule {
            text: rule.trim().to_string(),
            keyframes_name,
        });
        Ok(())
    }

    fn rule_count(&self) -> usize {
        self.owned().map_or(0, |s| s.rules.len())
    }

    fn keyframes_name_at(&self, index: usize) -> Option<String> {
        self.owned()?.rules.get(index)?.keyframes_name.clone()
    }

    fn delete_rule(&mut self, index: usize) {
        if let Some(i) = self.owned {
            if index < self.sheets[i].rules.len() {
                self.sheets[i].rules.remove(index);
            }
        }
    }

    fn set_style_property(&mut self, element: &MockElement, property: &str, value: &str) {
        self.styles
            .entry(*element)
            .or_default()
            .insert(property.to_string(), value.to_string());
    }

    fn listen(&mut self, element: &MockElement, events: &[&str]) {
        self.listen_calls += 1;
        let attached = self.listeners.entry(*element).or_default();
        for e in events {
            if !attached.iter().any(|a| a == e) {
                attached.push(e.to_string());
            }
        }
    }

    fn unlisten(&mut self, element: &MockElement, events: &[&str]) {
        self.unlisten_calls += 1;
        if let Some(attached) = self.listeners.get_mut(element) {
            attached.retain(|a| !events.contains(&a.as_str()));
            if attached.is_empty() {
                self.listeners.remove(element);
            }
        }
    }
}

/// Notification as delivered to the listener on `target`.
pub fn notify(target: MockElement, event_type: &str, animation_name: &str) -> Notification<MockDom> {
    Notification {
        target,
        event_type: event_type.to_string(),
        animation_name: animation_name.to_string(),
        event: MockEvent {
            event_type: event_type.to_string(),
            animation_name: animation_name.to_string(),
            elapsed_time: 0.0,
        },
    }
}
