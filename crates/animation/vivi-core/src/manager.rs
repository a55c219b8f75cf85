//! SessionManager: owns the host, detection results and the session store,
//! and exposes the public start/cancel/pause/resume/define operations.
//!
//! Every structural change to an element's sessions rewrites that element's
//! full native property lists before returning, so a notification processed
//! right afterwards always sees a consistent element.

use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::dispatch::{Delivery, EventTable, SessionEvent};
use crate::error::ViviError;
use crate::host::{AnimationHost, Notification};
use crate::ids::{IdAllocator, SessionId};
use crate::keyframes::{remove_keyframes, KeyframeRegistry, KeyframeSpec};
use crate::options::{Handlers, StartOptions, Target};
use crate::resolver::PropertyResolver;
use crate::session::{AnimationProperties, Session, Timing};
use crate::store::SessionStore;

/// Results of one-time feature detection.
#[derive(Debug, Clone)]
struct Runtime {
    registry: KeyframeRegistry,
    properties: AnimationProperties,
    events: EventTable,
}

#[derive(Debug, Clone)]
enum Detection {
    Pending,
    Unsupported,
    Supported(Rc<Runtime>),
}

pub struct SessionManager<H: AnimationHost> {
    cfg: Config,
    host: H,
    resolver: PropertyResolver,
    detection: Detection,
    ids: IdAllocator,
    store: SessionStore<H>,
}

impl<H: AnimationHost> SessionManager<H> {
    /// Detection is deferred to the first `supported` (or other) call.
    pub fn new(host: H, cfg: Config) -> Self {
        Self {
            cfg,
            host,
            resolver: PropertyResolver::default(),
            detection: Detection::Pending,
            ids: IdAllocator::new(),
            store: SessionStore::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Run detection once; report whether native keyframe animations are
    /// usable. A negative answer is permanent.
    pub fn supported(&mut self) -> bool {
        if matches!(self.detection, Detection::Pending) {
            self.detection = match self.detect() {
                Some(rt) => {
                    debug!(keyword = rt.registry.keyword(), "native animations supported");
                    Detection::Supported(Rc::new(rt))
                }
                None => {
                    warn!("native animations not supported; session manager disabled");
                    Detection::Unsupported
                }
            };
        }
        matches!(self.detection, Detection::Supported(_))
    }

    fn detect(&mut self) -> Option<Runtime> {
        self.resolver =
            PropertyResolver::new(self.host.style_property_names(), &self.cfg.vendor_prefixes);
        self.resolver.resolve("animation")?;

        if !self.host.attach_style_container(&self.cfg.style_title) {
            debug!(title = self.cfg.style_title.as_str(), "no style container");
            return None;
        }

        let init = self.cfg.init_rule_name();
        let mut keyword = None;
        for kw in &self.cfg.keyframes_keywords {
            match self.host.insert_rule(&format!("{kw} {init} {{}}")) {
                Ok(()) => {
                    remove_keyframes(&mut self.host, &init);
                    keyword = Some(kw.clone());
                    break;
                }
                Err(e) => trace!(error = %e, "keyframes keyword rejected"),
            }
        }
        let registry = KeyframeRegistry::new(keyword?);

        let properties = AnimationProperties::resolve(&mut self.resolver)?;
        Some(Runtime {
            registry,
            properties,
            events: EventTable::vendor(),
        })
    }

    fn runtime(&mut self) -> Result<Rc<Runtime>, ViviError> {
        self.supported();
        match &self.detection {
            Detection::Supported(rt) => Ok(Rc::clone(rt)),
            _ => Err(ViviError::Unsupported),
        }
    }

    fn ensure_supported(&mut self) -> Result<(), ViviError> {
        if self.supported() {
            Ok(())
        } else {
            Err(ViviError::Unsupported)
        }
    }

    /// Native spelling of a canonical property, after detection.
    pub fn resolve_property(&mut self, canonical: &str) -> Result<Option<String>, ViviError> {
        self.ensure_supported()?;
        Ok(self.resolver.resolve(canonical))
    }

    /// Start a session on `target`. Returns its id.
    pub fn start(
        &mut self,
        target: Target<H::Element>,
        options: StartOptions,
        handlers: Handlers<H>,
    ) -> Result<SessionId, ViviError> {
        let rt = self.runtime()?;
        let element = target.into_element()?;

        if !options.has_source() {
            return Err(ViviError::invalid(
                "start() needs one of name, keyframes, to or from",
            ));
        }
        if let Some(name) = &options.name {
            if name.is_empty() {
                return Err(ViviError::invalid("name is empty"));
            }
            if name.starts_with(&self.cfg.name_prefix) {
                return Err(ViviError::invalid(format!(
                    "name `{name}` uses the reserved prefix `{}`",
                    self.cfg.name_prefix
                )));
            }
        }

        let id = self.ids.alloc();
        let (rule_name, generated_rule) = match &options.name {
            Some(name) => (name.clone(), false),
            None => (format!("{}{}", self.cfg.name_prefix, id), true),
        };

        if let Some(spec) = options.resolved_keyframes() {
            self.materialize_rule(&rt.registry, &rule_name, &spec);
        }

        let session = Session {
            id,
            element: element.clone(),
            rule_name,
            generated_rule,
            timing: Timing::from_options(&options),
            pause_count: 0,
            cancelled: false,
            remove_on_end: options.remove.unwrap_or(true),
            on_event: handlers.on_event,
            on_completion: handlers.on_completion,
            info: handlers.info,
        };
        debug!(%id, rule = session.rule_name.as_str(), "starting session");

        if self.store.insert(session) {
            self.host.listen(&element, rt.events.names());
        }
        self.refresh(&rt, &element);
        Ok(id)
    }

    fn materialize_rule(&mut self, registry: &KeyframeRegistry, name: &str, spec: &KeyframeSpec) {
        if let Err(e) = registry.define(&mut self.host, &mut self.resolver, name, spec) {
            // The animation name then refers to nothing; the native engine
            // treats that as a no-op.
            debug!(error = %e, "keyframes rule not created");
        }
    }

    /// Cancel a live session. Unknown ids are ignored.
    pub fn cancel(&mut self, id: SessionId) -> Result<(), ViviError> {
        let rt = self.runtime()?;
        match self.store.get_mut(id) {
            Some(session) => {
                session.cancelled = true;
                debug!(%id, "cancelling session");
                self.teardown(&rt, id);
            }
            None => trace!(%id, "cancel on unknown session"),
        }
        Ok(())
    }

    pub fn pause(&mut self, id: SessionId) -> Result<(), ViviError> {
        self.adjust_pause(id, true)
    }

    /// Undo one `pause`. Extra calls leave the session running.
    pub fn resume(&mut self, id: SessionId) -> Result<(), ViviError> {
        self.adjust_pause(id, false)
    }

    fn adjust_pause(&mut self, id: SessionId, pause: bool) -> Result<(), ViviError> {
        let rt = self.runtime()?;
        let Some(session) = self.store.get_mut(id) else {
            trace!(%id, "pause/resume on unknown session");
            return Ok(());
        };
        session.pause_count = if pause {
            session.pause_count.saturating_add(1)
        } else {
            session.pause_count.saturating_sub(1)
        };
        let element = session.element.clone();
        self.refresh(&rt, &element);
        Ok(())
    }

    /// Register a reusable keyframes rule outside any session. Rejected
    /// rules are silently dropped.
    pub fn define(&mut self, name: &str, spec: &KeyframeSpec) -> Result<(), ViviError> {
        let rt = self.runtime()?;
        self.materialize_rule(&rt.registry, name, spec);
        Ok(())
    }

    /// Correlate a native notification with its session and apply its
    /// state changes. Returns the callbacks to run, or None when the
    /// notification belongs to no live session.
    pub fn dispatch(&mut self, note: Notification<H>) -> Option<Delivery<H>> {
        let rt = match &self.detection {
            Detection::Supported(rt) => Rc::clone(rt),
            _ => return None,
        };
        let Some(id) = self.correlate(&note) else {
            trace!(name = note.animation_name.as_str(), "dropping uncorrelated notification");
            return None;
        };
        let kind = rt.events.kind(&note.event_type);
        let session = self.store.get(id)?;

        let payload = SessionEvent {
            id,
            kind,
            event: note.event,
            info: session.info.clone(),
        };
        let on_event = session.on_event.clone();
        let completion = match &session.on_completion {
            Some(cb) if kind.is_terminal() => Some((!session.cancelled, cb.clone())),
            _ => None,
        };
        trace!(%id, kind = kind.as_str(), "dispatching");

        if kind.is_terminal() && session.remove_on_end {
            self.teardown(&rt, id);
        }
        Some(Delivery::new(payload, on_event, completion))
    }

    /// Dispatch and run the callbacks immediately.
    pub fn handle(&mut self, note: Notification<H>) -> bool {
        match self.dispatch(note) {
            Some(delivery) => {
                delivery.deliver();
                true
            }
            None => false,
        }
    }

    fn correlate(&self, note: &Notification<H>) -> Option<SessionId> {
        let id = match note.animation_name.strip_prefix(&self.cfg.name_prefix) {
            Some(digits) => SessionId(digits.parse().ok()?),
            None => self.store.lookup_name(&note.target, &note.animation_name)?,
        };
        // Notifications bubble; only the listener on the session's own
        // element may act on it.
        let session = self.store.get(id)?;
        (session.element == note.target).then_some(id)
    }

    fn teardown(&mut self, rt: &Runtime, id: SessionId) {
        let Some(removed) = self.store.remove(id) else {
            return;
        };
        let session = removed.session;
        self.refresh(rt, &session.element);
        if removed.element_emptied {
            self.host.unlisten(&session.element, rt.events.names());
        }
        if session.generated_rule {
            rt.registry.remove(&mut self.host, &session.rule_name);
        }
        debug!(%id, cancelled = session.cancelled, "session torn down");
    }

    fn refresh(&mut self, rt: &Runtime, element: &H::Element) {
        let lists = self.store.property_lists(element);
        rt.properties.apply(&mut self.host, element, &lists);
    }

    pub fn is_live(&self, id: SessionId) -> bool {
        self.store.contains(id)
    }

    pub fn session(&self, id: SessionId) -> Option<&Session<H>> {
        self.store.get(id)
    }

    /// Ids of `element`'s live sessions, in start order.
    pub fn sessions_on(&self, element: &H::Element) -> Vec<SessionId> {
        self.store.ids_on(element).to_vec()
    }

    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// Number of elements currently observed.
    pub fn element_count(&self) -> usize {
        self.store.element_count()
    }

    /// Native spellings of the eight animation longhands, once detected.
    pub fn animation_properties(&self) -> Option<&[String; 8]> {
        match &self.detection {
            Detection::Supported(rt) => Some(rt.properties.native()),
            _ => None,
        }
    }
}
