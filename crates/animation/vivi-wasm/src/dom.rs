//! `AnimationHost` over the browser DOM.

use js_sys::{Function, Object, Reflect};
use tracing::{debug, trace};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleSheet, Document, Event, HtmlElement, HtmlStyleElement};

use vivi_core::{AnimationHost, Notification, RuleError};

/// `CSSRule.KEYFRAMES_RULE` (also `WEBKIT_KEYFRAMES_RULE`).
const KEYFRAMES_RULE: u16 = 7;

pub struct DomHost {
    document: Document,
    sheet: Option<CssStyleSheet>,
    listener: Option<Function>,
}

impl DomHost {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            sheet: None,
            listener: None,
        }
    }

    /// Function attached by `listen` to every observed element.
    pub fn set_listener(&mut self, listener: Function) {
        self.listener = Some(listener);
    }

    fn create_container(&self, title: &str) -> Result<CssStyleSheet, JsValue> {
        let style: HtmlStyleElement = self.document.create_element("style")?.dyn_into()?;
        style.set_title(title);
        let head = self
            .document
            .head()
            .ok_or_else(|| JsValue::from_str("document has no head"))?;
        head.append_child(&style)?;
        let sheet = style
            .sheet()
            .ok_or_else(|| JsValue::from_str("style element has no sheet"))?;
        Ok(sheet.dyn_into::<CssStyleSheet>()?)
    }

    fn rules_len(sheet: &CssStyleSheet) -> u32 {
        sheet.css_rules().map(|rules| rules.length()).unwrap_or(0)
    }
}

/// Best-effort text of a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            Reflect::get(value, &JsValue::from_str("message"))
                .ok()?
                .as_string()
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

impl AnimationHost for DomHost {
    type Element = HtmlElement;
    type Event = Event;
    type Info = JsValue;

    fn style_property_names(&self) -> Vec<String> {
        let scratch = match self.document.create_element("div") {
            Ok(el) => el,
            Err(e) => {
                debug!(error = js_message(&e).as_str(), "scratch element not created");
                return Vec::new();
            }
        };
        let Ok(scratch) = scratch.dyn_into::<HtmlElement>() else {
            return Vec::new();
        };

        // Style properties mostly live on the declaration's prototypes.
        let mut names = Vec::new();
        let mut obj: Object = scratch.style().into();
        loop {
            names.extend(
                Object::get_own_property_names(&obj)
                    .iter()
                    .filter_map(|key| key.as_string()),
            );
            let proto = Object::get_prototype_of(&obj);
            if proto.is_null() {
                break;
            }
            obj = proto;
        }
        names
    }

    fn attach_style_container(&mut self, title: &str) -> bool {
        let sheets = self.document.style_sheets();
        for i in 0..sheets.length() {
            let Some(sheet) = sheets.item(i) else {
                continue;
            };
            if sheet.title().as_deref() != Some(title) {
                continue;
            }
            if let Ok(css) = sheet.dyn_into::<CssStyleSheet>() {
                trace!(title, "reusing style container");
                self.sheet = Some(css);
                return true;
            }
        }
        match self.create_container(title) {
            Ok(sheet) => {
                self.sheet = Some(sheet);
                true
            }
            Err(e) => {
                debug!(error = js_message(&e).as_str(), "style container not created");
                false
            }
        }
    }

    fn insert_rule(&mut self, rule: &str) -> Result<(), RuleError> {
        let sheet = self
            .sheet
            .as_ref()
            .ok_or_else(|| RuleError::new(rule, "no style container"))?;
        sheet
            .insert_rule_with_index(rule, Self::rules_len(sheet))
            .map(|_| ())
            .map_err(|e| RuleError::new(rule, js_message(&e)))
    }

    fn rule_count(&self) -> usize {
        self.sheet.as_ref().map_or(0, |s| Self::rules_len(s) as usize)
    }

    fn keyframes_name_at(&self, index: usize) -> Option<String> {
        let rule = self.sheet.as_ref()?.css_rules().ok()?.item(index as u32)?;
        if rule.type_() != KEYFRAMES_RULE {
            return None;
        }
        Reflect::get(&rule, &JsValue::from_str("name"))
            .ok()?
            .as_string()
    }

    fn delete_rule(&mut self, index: usize) {
        let Some(sheet) = &self.sheet else {
            return;
        };
        if let Err(e) = sheet.delete_rule(index as u32) {
            debug!(index, error = js_message(&e).as_str(), "deleteRule failed");
        }
    }

    fn set_style_property(&mut self, element: &HtmlElement, property: &str, value: &str) {
        let style = element.style();
        if let Err(e) = Reflect::set(
            &style,
            &JsValue::from_str(property),
            &JsValue::from_str(value),
        ) {
            debug!(property, error = js_message(&e).as_str(), "style assignment failed");
        }
    }

    fn listen(&mut self, element: &HtmlElement, events: &[&str]) {
        let Some(listener) = &self.listener else {
            return;
        };
        for name in events {
            if let Err(e) = element.add_event_listener_with_callback(name, listener) {
                debug!(event = *name, error = js_message(&e).as_str(), "addEventListener failed");
            }
        }
    }

    fn unlisten(&mut self, element: &HtmlElement, events: &[&str]) {
        let Some(listener) = &self.listener else {
            return;
        };
        for name in events {
            let _ = element.remove_event_listener_with_callback(name, listener);
        }
    }
}

/// Lift a DOM event into a notification for the element whose listener
/// caught it. None for events that carry no animation name.
pub fn notification(event: Event) -> Option<Notification<DomHost>> {
    let target = event.current_target()?.dyn_into::<HtmlElement>().ok()?;
    let animation_name = Reflect::get(&event, &JsValue::from_str("animationName"))
        .ok()?
        .as_string()?;
    Some(Notification {
        target,
        event_type: event.type_(),
        animation_name,
        event,
    })
}
