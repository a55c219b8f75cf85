//! vivi core (host-agnostic)
//!
//! Orchestrates keyframe animations run by a native animation engine: which
//! animations run, on which element, under which logical session id, and
//! when callers hear about them. Interpolation itself belongs to the host.
//!
//! Adapters implement [`AnimationHost`] and drive a [`SessionManager`]:
//! `start`/`cancel`/`pause`/`resume`/`define` from the caller side,
//! `dispatch` from the host's lifecycle listener.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host;
pub mod ids;
pub mod keyframes;
pub mod manager;
pub mod options;
pub mod resolver;
pub mod session;
pub mod store;

// Re-exports for consumers (adapters)
pub use config::Config;
pub use dispatch::{
    CompletionCallback, Delivery, EventCallback, EventTable, LifecycleKind, SessionEvent,
};
pub use error::{RuleError, ViviError};
pub use host::{AnimationHost, Notification};
pub use ids::SessionId;
pub use keyframes::{offset_percent, CssValue, Keyframe, KeyframeRegistry, KeyframeSpec, PropertyMap};
pub use manager::SessionManager;
pub use options::{CssTime, Handlers, StartOptions, Target};
pub use resolver::PropertyResolver;
pub use session::{PropertyLists, Session, Timing, ANIMATION_PROPERTIES};
