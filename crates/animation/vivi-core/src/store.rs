//! Session store: id -> record, element -> ordered session ids, and
//! (element, caller name) -> id.

use std::collections::HashMap;

use crate::host::AnimationHost;
use crate::ids::SessionId;
use crate::session::{PropertyLists, Session};

/// Sessions of one element, in start order.
#[derive(Debug)]
struct ElementEntry<E> {
    element: E,
    order: Vec<SessionId>,
    names: HashMap<String, SessionId>,
}

/// What `SessionStore::remove` took out.
#[derive(Debug)]
pub struct Removed<H: AnimationHost> {
    pub session: Session<H>,
    /// The element has no sessions left and its entry is gone.
    pub element_emptied: bool,
}

pub struct SessionStore<H: AnimationHost> {
    sessions: HashMap<SessionId, Session<H>>,
    // Elements are only PartialEq, so this stays a small linear table.
    elements: Vec<ElementEntry<H::Element>>,
}

impl<H: AnimationHost> Default for SessionStore<H> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            elements: Vec::new(),
        }
    }
}

impl<H: AnimationHost> SessionStore<H> {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry_index(&self, element: &H::Element) -> Option<usize> {
        self.elements.iter().position(|e| &e.element == element)
    }

    /// Insert `session` at the end of its element's list. Returns true when
    /// this is the element's first session.
    pub fn insert(&mut self, session: Session<H>) -> bool {
        let id = session.id;
        let caller_name = session.caller_name().map(str::to_string);
        let first = match self.entry_index(&session.element) {
            Some(i) => {
                self.elements[i].order.push(id);
                if let Some(name) = caller_name {
                    self.elements[i].names.insert(name, id);
                }
                false
            }
            None => {
                let mut names = HashMap::new();
                if let Some(name) = caller_name {
                    names.insert(name, id);
                }
                self.elements.push(ElementEntry {
                    element: session.element.clone(),
                    order: vec![id],
                    names,
                });
                true
            }
        };
        self.sessions.insert(id, session);
        first
    }

    /// Remove a session from every index.
    pub fn remove(&mut self, id: SessionId) -> Option<Removed<H>> {
        let session = self.sessions.remove(&id)?;
        let mut element_emptied = false;
        if let Some(i) = self.entry_index(&session.element) {
            let entry = &mut self.elements[i];
            entry.order.retain(|s| *s != id);
            // A newer session may have claimed the same name.
            if let Some(name) = session.caller_name() {
                if entry.names.get(name) == Some(&id) {
                    entry.names.remove(name);
                }
            }
            if entry.order.is_empty() {
                self.elements.remove(i);
                element_emptied = true;
            }
        }
        Some(Removed {
            session,
            element_emptied,
        })
    }

    pub fn get(&self, id: SessionId) -> Option<&Session<H>> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session<H>> {
        self.sessions.get_mut(&id)
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Session started on `element` under caller name `name`.
    pub fn lookup_name(&self, element: &H::Element, name: &str) -> Option<SessionId> {
        let i = self.entry_index(element)?;
        self.elements[i].names.get(name).copied()
    }

    /// Ids of `element`'s sessions in start order.
    pub fn ids_on(&self, element: &H::Element) -> &[SessionId] {
        match self.entry_index(element) {
            Some(i) => &self.elements[i].order,
            None => &[],
        }
    }

    /// `element`'s sessions in start order.
    pub fn sessions_on<'a>(
        &'a self,
        element: &H::Element,
    ) -> impl Iterator<Item = &'a Session<H>> + 'a {
        self.ids_on(element)
            .iter()
            .filter_map(move |id| self.sessions.get(id))
    }

    /// Property lists derived from `element`'s current sessions.
    pub fn property_lists(&self, element: &H::Element) -> PropertyLists {
        PropertyLists::from_sessions(self.sessions_on(element))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of elements that currently own sessions.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}
