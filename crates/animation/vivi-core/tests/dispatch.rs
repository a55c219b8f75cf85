mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{list_len, lists, manager};
use serde_json::json;
use vivi_core::{Handlers, LifecycleKind, SessionId, StartOptions, Target};
use vivi_test_fixtures::{notify, options, MockDom, MockElement};

const EL: MockElement = MockElement(1);

type Log = Rc<RefCell<Vec<(SessionId, LifecycleKind, Option<serde_json::Value>)>>>;

fn recording(log: &Log) -> Handlers<MockDom> {
    let log = log.clone();
    Handlers::new().on_event(move |ev| log.borrow_mut().push((ev.id, ev.kind, ev.info.clone())))
}

#[test]
fn every_kind_reaches_on_event() {
    let mut mgr = manager(MockDom::standard());
    let log: Log = Rc::default();
    let id = mgr
        .start(
            Target::Element(EL),
            options::load("fade-out").unwrap(),
            recording(&log).info(json!("row-3")),
        )
        .unwrap();

    for event_type in [
        "webkitAnimationStart",
        "animationiteration",
        "somethingElse",
        "oanimationend",
    ] {
        assert!(mgr.handle(notify(EL, event_type, "vivi-js-1")));
    }

    let info = Some(json!("row-3"));
    assert_eq!(
        *log.borrow(),
        [
            (id, LifecycleKind::Start, info.clone()),
            (id, LifecycleKind::Iteration, info.clone()),
            (id, LifecycleKind::Unknown, info.clone()),
            (id, LifecycleKind::End, info),
        ]
    );
    assert!(!mgr.is_live(id));
}

#[test]
fn info_absent_without_payload() {
    let mut mgr = manager(MockDom::standard());
    let log: Log = Rc::default();
    mgr.start(Target::Element(EL), options::load("fade-out").unwrap(), recording(&log))
        .unwrap();
    mgr.handle(notify(EL, "animationstart", "vivi-js-1"));
    assert_eq!(log.borrow()[0].2, None);
}

#[test]
fn unknown_kind_never_completes_or_tears_down() {
    let mut mgr = manager(MockDom::standard());
    let id = mgr
        .start(
            Target::Element(EL),
            options::load("fade-out").unwrap(),
            Handlers::new().on_completion(|_, _| panic!("no completion expected")),
        )
        .unwrap();
    let delivery = mgr.dispatch(notify(EL, "animationcancel", "vivi-js-1")).unwrap();
    assert_eq!(delivery.payload.kind, LifecycleKind::Unknown);
    assert_eq!(delivery.completion(), None);
    delivery.deliver();
    assert!(mgr.is_live(id));
}

#[test]
fn foreign_and_malformed_names_are_dropped() {
    let mut mgr = manager(MockDom::standard());
    let log: Log = Rc::default();
    mgr.start(Target::Element(EL), options::load("fade-out").unwrap(), recording(&log))
        .unwrap();

    assert!(!mgr.handle(notify(EL, "animationend", "someone-elses-animation")));
    assert!(!mgr.handle(notify(EL, "animationend", "vivi-js-")));
    assert!(!mgr.handle(notify(EL, "animationend", "vivi-js-abc")));
    assert!(!mgr.handle(notify(EL, "animationend", "vivi-js-99")));
    assert!(log.borrow().is_empty());
    assert_eq!(list_len(&mgr, EL), 1);
}

#[test]
fn bubbled_notifications_from_other_elements_are_ignored() {
    let mut mgr = manager(MockDom::standard());
    let parent = MockElement(10);
    let child = MockElement(11);
    let log: Log = Rc::default();
    let child_id = mgr
        .start(Target::Element(child), options::load("fade-out").unwrap(), recording(&log))
        .unwrap();
    mgr.start(Target::Element(parent), options::load("fade-out").unwrap(), Handlers::new())
        .unwrap();

    // The child's end bubbles up to the parent's listener too.
    assert!(!mgr.handle(notify(parent, "animationend", "vivi-js-1")));
    assert!(mgr.is_live(child_id));
    assert!(mgr.handle(notify(child, "animationend", "vivi-js-1")));
    assert_eq!(log.borrow().len(), 1);
    assert!(!mgr.is_live(child_id));
}

#[test]
fn trailing_end_after_cancel_is_dropped() {
    let mut mgr = manager(MockDom::standard());
    let completions = Rc::new(RefCell::new(0));
    let count = completions.clone();
    let id = mgr
        .start(
            Target::Element(EL),
            options::load("fade-out").unwrap(),
            Handlers::new().on_completion(move |_, _| *count.borrow_mut() += 1),
        )
        .unwrap();
    mgr.cancel(id).unwrap();
    assert!(!mgr.handle(notify(EL, "animationend", "vivi-js-1")));
    assert_eq!(*completions.borrow(), 0);
}

#[test]
fn natural_end_completes_successfully() {
    let mut mgr = manager(MockDom::standard());
    let result = Rc::new(RefCell::new(None));
    let slot = result.clone();
    mgr.start(
        Target::Element(EL),
        options::load("fade-out").unwrap(),
        Handlers::new().on_completion(move |ok, _| *slot.borrow_mut() = Some(ok)),
    )
    .unwrap();
    mgr.handle(notify(EL, "animationend", "vivi-js-1"));
    assert_eq!(*result.borrow(), Some(true));
}

#[test]
fn named_sessions_correlate_by_element_and_name() {
    let mut mgr = manager(MockDom::standard());
    let other = MockElement(2);
    let log: Log = Rc::default();
    let opts = StartOptions {
        name: Some("spin".into()),
        ..Default::default()
    };
    let on_el = mgr
        .start(Target::Element(EL), opts.clone(), recording(&log))
        .unwrap();
    let on_other = mgr
        .start(Target::Element(other), opts, recording(&log))
        .unwrap();

    mgr.handle(notify(other, "animationstart", "spin"));
    mgr.handle(notify(EL, "animationend", "spin"));
    let got: Vec<(SessionId, LifecycleKind)> = log.borrow().iter().map(|(i, k, _)| (*i, *k)).collect();
    assert_eq!(
        got,
        [(on_other, LifecycleKind::Start), (on_el, LifecycleKind::End)]
    );
    assert!(!mgr.is_live(on_el));
    assert!(mgr.is_live(on_other));

    // Once ended, the name no longer resolves on that element.
    assert!(!mgr.handle(notify(EL, "animationend", "spin")));
}

#[test]
fn reused_name_points_at_the_newest_session() {
    let mut mgr = manager(MockDom::standard());
    let log: Log = Rc::default();
    let opts = StartOptions {
        name: Some("spin".into()),
        remove: Some(false),
        ..Default::default()
    };
    let older = mgr
        .start(Target::Element(EL), opts.clone(), recording(&log))
        .unwrap();
    let newer = mgr
        .start(Target::Element(EL), opts, recording(&log))
        .unwrap();
    assert_eq!(lists(&mgr, EL)[0], "spin,spin");

    mgr.handle(notify(EL, "animationiteration", "spin"));
    assert_eq!(log.borrow()[0].0, newer);

    // Cancelling the older session must not unhook the newer one's name.
    mgr.cancel(older).unwrap();
    mgr.handle(notify(EL, "animationiteration", "spin"));
    assert_eq!(log.borrow()[1].0, newer);
    assert_eq!(lists(&mgr, EL)[0], "spin");
}

#[test]
fn callbacks_may_reenter_the_manager() {
    let mgr = Rc::new(RefCell::new(manager(MockDom::standard())));
    let next = MockElement(2);
    let chained = Rc::new(RefCell::new(None));

    let handle = mgr.clone();
    let slot = chained.clone();
    mgr.borrow_mut()
        .start(
            Target::Element(EL),
            options::load("fade-out").unwrap(),
            Handlers::new().on_completion(move |ok, _| {
                assert!(ok);
                let id = handle
                    .borrow_mut()
                    .start(Target::Element(next), options::load("fade-out").unwrap(), Handlers::new())
                    .unwrap();
                *slot.borrow_mut() = Some(id);
            }),
        )
        .unwrap();

    let delivery = mgr
        .borrow_mut()
        .dispatch(notify(EL, "animationend", "vivi-js-1"))
        .unwrap();
    assert_eq!(delivery.completion(), Some(true));
    delivery.deliver();

    let follow_up = chained.borrow().expect("completion started a session");
    let mgr = mgr.borrow();
    assert_eq!(follow_up, SessionId(2));
    assert!(mgr.is_live(follow_up));
    assert!(!mgr.host().has_listener(EL));
    assert!(mgr.host().has_listener(next));
}
