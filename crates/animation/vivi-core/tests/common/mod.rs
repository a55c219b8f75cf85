#![allow(dead_code)]

use vivi_core::{Config, SessionManager};
use vivi_test_fixtures::{MockDom, MockElement};

pub fn init_tracing() {
    let default_filter = "vivi_core=debug";
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn manager(dom: MockDom) -> SessionManager<MockDom> {
    init_tracing();
    let mut mgr = SessionManager::new(dom, Config::default());
    assert!(mgr.supported());
    mgr
}

/// The eight inline animation lists of `el`, in canonical order.
pub fn lists(mgr: &SessionManager<MockDom>, el: MockElement) -> Vec<String> {
    let native = mgr.animation_properties().expect("supported manager");
    native
        .iter()
        .map(|p| mgr.host().style(el, p).unwrap_or_default().to_string())
        .collect()
}

/// Entry count of every list on `el`; panics if they disagree.
pub fn list_len(mgr: &SessionManager<MockDom>, el: MockElement) -> usize {
    let all = lists(mgr, el);
    let lens: Vec<usize> = all
        .iter()
        .map(|l| if l.is_empty() { 0 } else { l.split(',').count() })
        .collect();
    assert!(lens.windows(2).all(|w| w[0] == w[1]), "ragged lists: {all:?}");
    lens[0]
}
