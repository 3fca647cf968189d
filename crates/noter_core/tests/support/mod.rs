#![allow(dead_code)]

use noter_core::{
    AdapterError, DocumentAdapter, DocumentKind, Location, Mark, MarkId, MarkSurface,
    NavigationListener, RemarkRange, SessionBinding, Viewport,
};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Scriptable viewer state shared between a test and its adapter.
pub struct ViewerState {
    pub kind: DocumentKind,
    pub document_id: Option<String>,
    pub title: Option<String>,
    pub location: Location,
    pub viewport: Option<Viewport>,
    pub text: String,
    pub listener: Option<NavigationListener>,
    pub navigations: Vec<Location>,
}

#[derive(Clone)]
pub struct Viewer(pub Rc<RefCell<ViewerState>>);

impl Viewer {
    fn with(kind: DocumentKind, document_id: &str, location: Location) -> Self {
        Self(Rc::new(RefCell::new(ViewerState {
            kind,
            document_id: Some(document_id.to_string()),
            title: None,
            location,
            viewport: None,
            text: String::new(),
            listener: None,
            navigations: Vec::new(),
        })))
    }

    pub fn paged(document_id: &str, page: u32) -> Self {
        Self::with(DocumentKind::Paged, document_id, Location::paged(page))
    }

    pub fn ranged(document_id: &str, index: u32, offset: u64, viewport: Viewport) -> Self {
        let viewer = Self::with(DocumentKind::Ranged, document_id, Location::ranged(index, offset));
        viewer.0.borrow_mut().viewport = Some(viewport);
        viewer
    }

    pub fn node(document_id: &str, node: &str, offset: u64, viewport: Viewport) -> Self {
        let viewer = Self::with(DocumentKind::Node, document_id, Location::node(node, offset));
        viewer.0.borrow_mut().viewport = Some(viewport);
        viewer
    }

    pub fn virtual_document(kind: DocumentKind, location: Location) -> Self {
        let viewer = Self::with(kind, "", location);
        viewer.0.borrow_mut().document_id = None;
        viewer
    }

    pub fn with_text(self, text: &str) -> Self {
        self.0.borrow_mut().text = text.to_string();
        self
    }

    pub fn with_title(self, title: &str) -> Self {
        self.0.borrow_mut().title = Some(title.to_string());
        self
    }

    pub fn location(&self) -> Location {
        self.0.borrow().location.clone()
    }

    pub fn navigations(&self) -> Vec<Location> {
        self.0.borrow().navigations.clone()
    }

    /// Simulates user movement and notifies the registered listener.
    pub fn move_to(&self, location: Location) -> bool {
        self.0.borrow_mut().location = location;
        self.notify()
    }

    pub fn scroll(&self, viewport: Viewport) -> bool {
        self.0.borrow_mut().viewport = Some(viewport);
        self.notify()
    }

    pub fn notify(&self) -> bool {
        self.0
            .borrow()
            .listener
            .as_ref()
            .is_some_and(|listener| listener.notify())
    }

    pub fn adapter(&self) -> Box<dyn DocumentAdapter> {
        Box::new(MockAdapter(Rc::clone(&self.0)))
    }
}

struct MockAdapter(Rc<RefCell<ViewerState>>);

impl DocumentAdapter for MockAdapter {
    fn kind(&self) -> DocumentKind {
        self.0.borrow().kind
    }

    fn document_id(&self) -> Result<String, AdapterError> {
        self.0
            .borrow()
            .document_id
            .clone()
            .ok_or(AdapterError::VirtualDocument)
    }

    fn document_title(&self) -> Option<String> {
        self.0.borrow().title.clone()
    }

    fn current_location(&self) -> Location {
        self.0.borrow().location.clone()
    }

    fn navigate_to(&mut self, location: &Location) -> Result<(), AdapterError> {
        let mut state = self.0.borrow_mut();
        if location.kind() != state.kind {
            return Err(AdapterError::NavigationFailed(location.to_string()));
        }
        state.location = location.clone();
        state.navigations.push(location.clone());
        Ok(())
    }

    fn on_navigation_event(&mut self, listener: NavigationListener) {
        self.0.borrow_mut().listener = Some(listener);
    }

    fn viewport(&self) -> Option<Viewport> {
        self.0.borrow().viewport
    }

    fn region_text(&self, range: RemarkRange) -> Option<String> {
        let state = self.0.borrow();
        state
            .text
            .get(range.begin as usize..range.end as usize)
            .map(str::to_string)
    }
}

/// Mark surface that records live marks and call counts.
#[derive(Default)]
pub struct SurfaceLog {
    next: u64,
    pub live: BTreeMap<u64, Mark>,
    pub added: usize,
    pub removed: usize,
}

#[derive(Clone, Default)]
pub struct Surface(pub Rc<RefCell<SurfaceLog>>);

impl Surface {
    pub fn live(&self) -> Vec<Mark> {
        self.0.borrow().live.values().cloned().collect()
    }

    pub fn calls(&self) -> (usize, usize) {
        let log = self.0.borrow();
        (log.added, log.removed)
    }

    pub fn boxed(&self) -> Box<dyn MarkSurface> {
        Box::new(self.clone())
    }
}

impl MarkSurface for Surface {
    fn add_mark(&mut self, mark: &Mark) -> MarkId {
        let mut log = self.0.borrow_mut();
        log.next += 1;
        log.added += 1;
        let id = log.next;
        log.live.insert(id, mark.clone());
        MarkId(id)
    }

    fn remove_mark(&mut self, id: MarkId) {
        let mut log = self.0.borrow_mut();
        assert!(log.live.remove(&id.0).is_some(), "mark released twice");
        log.removed += 1;
    }
}

/// Note-side and document-side surfaces of one session.
#[derive(Clone, Default)]
pub struct Surfaces {
    pub notes: Surface,
    pub document: Surface,
}

pub fn bind(viewer: &Viewer) -> (SessionBinding, Surfaces) {
    let surfaces = Surfaces::default();
    let binding = SessionBinding::new(
        viewer.adapter(),
        surfaces.notes.boxed(),
        surfaces.document.boxed(),
    );
    (binding, surfaces)
}

/// Root heading owned by `document_id`.
pub fn root(title: &str, document_id: &str) -> String {
    format!("* {title}\n:PROPERTIES:\n:NOTER_DOCUMENT: \"{document_id}\"\n:END:\n")
}

/// Second-level note stamped with `location`.
pub fn note(title: &str, location: &str) -> String {
    format!("** {title}\n:PROPERTIES:\n:NOTER_PAGE: {location}\n:END:\n")
}
