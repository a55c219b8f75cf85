use std::cell::RefCell;
use std::rc::{Rc, Weak};

use js_sys::{Function, Object, Reflect};
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, HtmlElement};

use vivi_core::{
    Config, Handlers, KeyframeSpec, SessionEvent, SessionId, SessionManager, StartOptions, Target,
    ViviError,
};

pub mod dom;

pub use dom::DomHost;

type Manager = SessionManager<DomHost>;

/// Option keys that carry JS values rather than data.
const HANDLER_KEYS: [&str; 3] = ["callback", "completion", "info"];

struct Context {
    manager: Rc<RefCell<Manager>>,
    // Keeps the shared lifecycle listener alive.
    _listener: Closure<dyn FnMut(Event)>,
}

thread_local! {
    static CONTEXT: RefCell<Option<Rc<Context>>> = const { RefCell::new(None) };
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn to_js(err: ViviError) -> JsError {
    JsError::new(&format!("vivi: {err}"))
}

fn build_context(cfg: Config) -> Result<Rc<Context>, JsError> {
    console_error_panic_hook::set_once();

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsError::new("vivi: no document"))?;
    let manager = Rc::new(RefCell::new(SessionManager::new(DomHost::new(document), cfg)));

    let weak: Weak<RefCell<Manager>> = Rc::downgrade(&manager);
    let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(manager) = weak.upgrade() else {
            return;
        };
        let Some(note) = dom::notification(event) else {
            return;
        };
        // Release the borrow before callbacks run; they may call back in.
        let delivery = match manager.try_borrow_mut() {
            Ok(mut mgr) => mgr.dispatch(note),
            Err(_) => {
                tracing::warn!("lifecycle event while the manager is busy; dropped");
                return;
            }
        };
        if let Some(delivery) = delivery {
            delivery.deliver();
        }
    });
    manager
        .borrow_mut()
        .host_mut()
        .set_listener(listener.as_ref().unchecked_ref::<Function>().clone());

    Ok(Rc::new(Context {
        manager,
        _listener: listener,
    }))
}

fn context() -> Result<Rc<Context>, JsError> {
    if let Some(ctx) = CONTEXT.with(|c| c.borrow().clone()) {
        return Ok(ctx);
    }
    let ctx = build_context(Config::default())?;
    CONTEXT.with(|c| *c.borrow_mut() = Some(Rc::clone(&ctx)));
    Ok(ctx)
}

fn with_manager<T>(f: impl FnOnce(&mut Manager) -> Result<T, ViviError>) -> Result<T, JsError> {
    let ctx = context()?;
    let mut mgr = ctx
        .manager
        .try_borrow_mut()
        .map_err(|_| JsError::new("vivi: re-entrant call"))?;
    f(&mut mgr).map_err(to_js)
}

/// Ids never allocated (zero, negative, fractional) address no session.
fn session_id(id: f64) -> SessionId {
    if id.is_finite() && id >= 1.0 && id.fract() == 0.0 {
        SessionId(id as u64)
    } else {
        SessionId(0)
    }
}

fn target_from_js(value: JsValue) -> Result<Target<HtmlElement>, ViviError> {
    if jsvalue_is_undefined_or_null(&value) {
        return Err(ViviError::invalid("element is missing"));
    }
    let value = match value.dyn_into::<HtmlElement>() {
        Ok(el) => return Ok(Target::Element(el)),
        Err(other) => other,
    };
    // Array-likes (NodeList, arrays, jQuery objects) must hold exactly one element.
    let len = Reflect::get(&value, &JsValue::from_str("length"))
        .ok()
        .and_then(|l| l.as_f64())
        .ok_or_else(|| ViviError::invalid("target is neither an element nor a collection"))?;
    if len != 1.0 {
        return Err(ViviError::invalid(format!(
            "element collection must hold exactly one element, got {len}"
        )));
    }
    let first = Reflect::get_u32(&value, 0)
        .ok()
        .and_then(|item| item.dyn_into::<HtmlElement>().ok())
        .ok_or_else(|| ViviError::invalid("element collection holds a non-element"))?;
    Ok(Target::Collection(vec![first]))
}

fn payload(ev: &SessionEvent<DomHost>) -> JsValue {
    let obj = Object::new();
    let _ = Reflect::set(&obj, &"id".into(), &JsValue::from_f64(ev.id.0 as f64));
    let _ = Reflect::set(&obj, &"type".into(), &JsValue::from_str(ev.kind.as_str()));
    let _ = Reflect::set(&obj, &"event".into(), &ev.event);
    if let Some(info) = &ev.info {
        let _ = Reflect::set(&obj, &"info".into(), info);
    }
    obj.into()
}

fn function_field(obj: &Object, key: &str) -> Option<Function> {
    Reflect::get(obj, &JsValue::from_str(key))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

/// Split a JS options object into serde data and JS handlers.
fn split_options(options: &JsValue) -> Result<(StartOptions, Handlers<DomHost>), JsError> {
    let obj = options
        .dyn_ref::<Object>()
        .ok_or_else(|| to_js(ViviError::invalid("options must be an object")))?;

    let data = Object::new();
    for key in Object::keys(obj).iter() {
        let is_handler = key
            .as_string()
            .is_some_and(|k| HANDLER_KEYS.contains(&k.as_str()));
        if is_handler {
            continue;
        }
        let value = Reflect::get(obj, &key).map_err(|e| JsError::new(&dom::js_message(&e)))?;
        let _ = Reflect::set(&data, &key, &value);
    }
    let parsed: StartOptions = swb::from_value(data.into())
        .map_err(|e| JsError::new(&format!("vivi: options error: {e}")))?;

    let mut handlers = Handlers::new();
    if let Some(f) = function_field(obj, "callback") {
        handlers = handlers.on_event(move |ev| {
            if let Err(e) = f.call1(&JsValue::UNDEFINED, &payload(ev)) {
                tracing::warn!(error = dom::js_message(&e).as_str(), "callback threw");
            }
        });
    }
    if let Some(f) = function_field(obj, "completion") {
        handlers = handlers.on_completion(move |success, ev| {
            if let Err(e) = f.call2(&JsValue::UNDEFINED, &JsValue::from_bool(success), &payload(ev)) {
                tracing::warn!(error = dom::js_message(&e).as_str(), "completion threw");
            }
        });
    }
    // Falsy info (null, 0, "") is not attached.
    let info = Reflect::get(obj, &JsValue::from_str("info")).unwrap_or(JsValue::UNDEFINED);
    if info.is_truthy() {
        handlers = handlers.info(info);
    }
    Ok((parsed, handlers))
}

/// Replace the default configuration. Only valid before any other call.
/// Example:
///   configure({ name_prefix: "fx-" })
#[wasm_bindgen]
pub fn configure(config: JsValue) -> Result<(), JsError> {
    if CONTEXT.with(|c| c.borrow().is_some()) {
        return Err(JsError::new(
            "vivi: configure() must precede every other call",
        ));
    }
    let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
        Config::default()
    } else {
        swb::from_value(config).map_err(|e| JsError::new(&format!("vivi: config error: {e}")))?
    };
    let ctx = build_context(cfg)?;
    CONTEXT.with(|c| *c.borrow_mut() = Some(ctx));
    Ok(())
}

/// Whether native CSS animations are usable here. Detection runs once.
#[wasm_bindgen]
pub fn supported() -> bool {
    with_manager(|m| Ok(m.supported())).unwrap_or(false)
}

/// Start a session on `element` (an element or an array-like holding one).
/// `options` holds name/keyframes/to/from/common, the timing fields and
/// `remove`, plus optional `callback(payload)`, `completion(success,
/// payload)` and `info`. Returns the session id.
#[wasm_bindgen]
pub fn start(element: JsValue, options: JsValue) -> Result<f64, JsError> {
    // Unsupported environments fail before the arguments are looked at.
    with_manager(|m| m.supported().then_some(()).ok_or(ViviError::Unsupported))?;
    let target = target_from_js(element).map_err(to_js)?;
    let (opts, handlers) = split_options(&options)?;
    let id = with_manager(|m| m.start(target, opts, handlers))?;
    Ok(id.0 as f64)
}

#[wasm_bindgen]
pub fn cancel(id: f64) -> Result<(), JsError> {
    with_manager(|m| m.cancel(session_id(id)))
}

#[wasm_bindgen]
pub fn pause(id: f64) -> Result<(), JsError> {
    with_manager(|m| m.pause(session_id(id)))
}

#[wasm_bindgen]
pub fn resume(id: f64) -> Result<(), JsError> {
    with_manager(|m| m.resume(session_id(id)))
}

/// Register a reusable keyframes rule under `name`.
#[wasm_bindgen]
pub fn define(name: String, keyframes: JsValue) -> Result<(), JsError> {
    let spec: KeyframeSpec = swb::from_value(keyframes)
        .map_err(|e| JsError::new(&format!("vivi: keyframes error: {e}")))?;
    with_manager(|m| m.define(&name, &spec))
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
