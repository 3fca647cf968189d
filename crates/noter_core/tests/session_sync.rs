mod support;

use noter_core::{
    content_hash, AdapterError, AdapterFactory, Direction, DocumentAdapter, DocumentKind,
    Location, MarkStyle, MemoryNoteStore, NoteKey, NoteRequest, NoteStore, NoterConfig,
    RemarkRange, SessionCreateError, SessionError, SessionId, SessionManager, SessionState,
    Viewport,
};
use std::sync::Arc;
use support::{bind, note, root, Surfaces, Viewer};

const PAPER: &str = "paper.pdf";

fn paper_key() -> NoteKey {
    NoteKey::new("paper.notes.org")
}

fn manager_with(text: &str) -> SessionManager<MemoryNoteStore> {
    let store = MemoryNoteStore::with_document(paper_key(), text);
    SessionManager::new(store, NoterConfig::default())
}

fn attach(manager: &mut SessionManager<MemoryNoteStore>, viewer: &Viewer) -> (SessionId, Surfaces) {
    let (binding, surfaces) = bind(viewer);
    (manager.attach(binding).unwrap(), surfaces)
}

fn stored_text(manager: &SessionManager<MemoryNoteStore>) -> String {
    manager.store().load(&paper_key()).unwrap().unwrap().text
}

fn paper_notes() -> String {
    [
        root("Paper", PAPER),
        note("Intro", "1"),
        note("Method", "3"),
        note("Results", "5"),
    ]
    .concat()
}

/// Pads `text` with a body line so that it is exactly `len` bytes long.
fn pad_to(text: &mut String, len: usize) {
    let dashes = len - 1 - text.len();
    text.push_str(&"-".repeat(dashes));
    text.push('\n');
    assert_eq!(text.len(), len);
}

#[test]
fn create_partitions_and_marks_current_notes() {
    let mut manager = manager_with(&paper_notes());
    let viewer = Viewer::paged(PAPER, 3);
    let (id, surfaces) = attach(&mut manager, &viewer);

    let snapshot = manager.snapshot(id).unwrap();
    assert_eq!(snapshot.state, SessionState::Active);
    assert_eq!(snapshot.previous, ["Intro"]);
    assert_eq!(snapshot.current, ["Method"]);
    assert_eq!(snapshot.after, ["Results"]);
    assert_eq!(snapshot.split_fraction, 0.5);

    let marks = surfaces.notes.live();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].style, MarkStyle::CurrentNote);
    let text = stored_text(&manager);
    let range = marks[0].range.start as usize..marks[0].range.end as usize;
    assert_eq!(&text[range], "** Method");
}

#[test]
fn insert_goes_right_after_nearest_previous_note() {
    let mut text = [root("Paper", PAPER), note("Setup", "2")].concat();
    pad_to(&mut text, 100);
    text.push_str(&note("Later", "5"));

    let mut manager = manager_with(&text);
    let viewer = Viewer::paged(PAPER, 3);
    let (id, surfaces) = attach(&mut manager, &viewer);
    assert!(manager.snapshot(id).unwrap().current.is_empty());
    assert_eq!(surfaces.notes.live()[0].style, MarkStyle::NoCurrentNote);

    let inserted = manager
        .insert_note(id, &NoteRequest::titled("Fig 1"))
        .unwrap();
    assert!(inserted.created);

    let stored = stored_text(&manager);
    let new_entry = "** Fig 1\n:PROPERTIES:\n:NOTER_PAGE: 3\n:END:\n";
    assert_eq!(&stored[..100], &text[..100]);
    assert_eq!(&stored[100..100 + new_entry.len()], new_entry);
    assert_eq!(inserted.cursor, 100 + new_entry.len());

    let session = manager.session(id).unwrap();
    let current = session.partition().current.clone();
    assert_eq!(current.len(), 1);
    let entry = session.tree().entry(current[0]);
    assert_eq!(entry.title, "Fig 1");
    assert_eq!(entry.level, session.tree().entry(session.root()).level + 1);
    assert_eq!(entry.location_for(DocumentKind::Paged), Some(Location::paged(3)));
    assert_eq!(surfaces.notes.live()[0].style, MarkStyle::CurrentNote);
}

#[test]
fn insert_without_previous_goes_to_end_of_root_text() {
    let text = [root("Paper", PAPER), "root remarks\n".to_string(), note("Later", "9")].concat();
    let mut manager = manager_with(&text);
    let viewer = Viewer::paged(PAPER, 2);
    let (id, _surfaces) = attach(&mut manager, &viewer);

    manager.insert_note(id, &NoteRequest::titled("First")).unwrap();
    let stored = stored_text(&manager);
    let expected = format!(
        "{}root remarks\n** First\n:PROPERTIES:\n:NOTER_PAGE: 2\n:END:\n{}",
        root("Paper", PAPER),
        note("Later", "9")
    );
    assert_eq!(stored, expected);
}

#[test]
fn same_title_at_current_location_appends() {
    let mut text = [root("Paper", PAPER), note("Intro", "3")].concat();
    pad_to(&mut text, 250);
    text.push_str(&note("Other", "4"));

    let mut manager = manager_with(&text);
    let viewer = Viewer::paged(PAPER, 3);
    let (id, _surfaces) = attach(&mut manager, &viewer);

    let inserted = manager
        .insert_note(id, &NoteRequest::titled("Intro").with_body("more"))
        .unwrap();
    assert!(!inserted.created);
    assert_eq!(inserted.cursor, 255);

    let stored = stored_text(&manager);
    assert_eq!(&stored[250..], format!("more\n{}", note("Other", "4")));
    assert_eq!(stored.matches("** Intro").count(), 1);
    assert_eq!(manager.snapshot(id).unwrap().current, ["Intro"]);
}

#[test]
fn appending_with_remark_stamps_range_and_hash() {
    let document = "0123456789abcdefghijKLMNOPQRST";
    let mut manager = manager_with(&[root("Paper", PAPER), note("Intro", "3")].concat());
    let viewer = Viewer::paged(PAPER, 3).with_text(document);
    let (id, surfaces) = attach(&mut manager, &viewer);
    assert!(surfaces.document.live().is_empty());

    let inserted = manager
        .insert_note(
            id,
            &NoteRequest::titled("Intro").with_remark(RemarkRange::new(10, 20)),
        )
        .unwrap();
    assert!(!inserted.created);
    assert!(inserted.written);

    let stored = stored_text(&manager);
    let expected = format!(
        "{}** Intro\n:PROPERTIES:\n:NOTER_PAGE: 3\n:NOTER_REMARK_RANGE: (10 20)\n:NOTER_REMARK_HASH: \"{}\"\n:END:\nabcdefghij\n",
        root("Paper", PAPER),
        content_hash("abcdefghij")
    );
    assert_eq!(stored, expected);
    assert_eq!(inserted.cursor, stored.len());

    let marks = surfaces.document.live();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].range, 10..20);
    assert_eq!(marks[0].style, MarkStyle::Remark);
}

#[test]
fn blank_title_defaults_to_location() {
    let mut manager = manager_with(&root("Paper", PAPER));
    let viewer = Viewer::paged(PAPER, 3);
    let (id, _surfaces) = attach(&mut manager, &viewer);

    let inserted = manager.insert_note(id, &NoteRequest::titled("  ")).unwrap();
    assert_eq!(inserted.title, "Notes for page 3");
    assert!(stored_text(&manager).contains("** Notes for page 3\n"));
}

#[test]
fn remarks_are_hashed_and_stale_ones_hidden() {
    let document = "0123456789abcdefghijKLMNOPQRST";
    let stale = content_hash("not what is there");
    let text = [
        root("Paper", PAPER),
        format!(
            "** Stale\n:PROPERTIES:\n:NOTER_PAGE: 3\n:NOTER_REMARK_RANGE: (10 20)\n:NOTER_REMARK_HASH: \"{stale}\"\n:END:\n"
        ),
    ]
    .concat();
    let mut manager = manager_with(&text);
    let viewer = Viewer::paged(PAPER, 3).with_text(document);
    let (id, surfaces) = attach(&mut manager, &viewer);

    assert_eq!(manager.snapshot(id).unwrap().current, ["Stale"]);
    assert!(surfaces.document.live().is_empty());

    manager
        .insert_note(
            id,
            &NoteRequest::titled("Quote").with_remark(RemarkRange::new(20, 30)),
        )
        .unwrap();
    let stored = stored_text(&manager);
    assert!(stored.contains(":NOTER_REMARK_RANGE: (20 30)\n"));
    assert!(stored.contains(&format!(
        ":NOTER_REMARK_HASH: \"{}\"\n",
        content_hash("KLMNOPQRST")
    )));

    let marks = surfaces.document.live();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0].range, 20..30);
    assert_eq!(marks[0].style, MarkStyle::Remark);
    assert!(stored.contains("** Stale\n"));
}

#[test]
fn remark_without_hash_is_always_shown() {
    let text = [
        root("Paper", PAPER),
        "** Loose\n:PROPERTIES:\n:NOTER_PAGE: 3\n:NOTER_REMARK_RANGE: (1 4)\n:END:\n".to_string(),
    ]
    .concat();
    let mut manager = manager_with(&text);
    let viewer = Viewer::paged(PAPER, 3);
    let (_id, surfaces) = attach(&mut manager, &viewer);
    assert_eq!(surfaces.document.live()[0].range, 1..4);
}

#[test]
fn sync_to_next_fails_when_nothing_follows() {
    let mut manager = manager_with(&paper_notes());
    let viewer = Viewer::paged(PAPER, 5);
    let (id, _surfaces) = attach(&mut manager, &viewer);

    let err = manager.sync_to_next(id).unwrap_err();
    assert!(matches!(err, SessionError::NoAdjacentNote(Direction::Next)));
    assert_eq!(manager.snapshot(id).unwrap().location, Location::paged(5));
    assert!(viewer.navigations().is_empty());
}

#[test]
fn sync_to_previous_and_next_walk_the_notes() {
    let mut manager = manager_with(&paper_notes());
    let viewer = Viewer::paged(PAPER, 4);
    let (id, _surfaces) = attach(&mut manager, &viewer);

    manager.sync_to_previous(id).unwrap();
    assert_eq!(viewer.location(), Location::paged(3));
    let snapshot = manager.snapshot(id).unwrap();
    assert_eq!(snapshot.location, Location::paged(3));
    assert_eq!(snapshot.current, ["Method"]);

    manager.sync_to_next(id).unwrap();
    assert_eq!(viewer.location(), Location::paged(5));
    manager.sync_to_previous(id).unwrap();
    manager.sync_to_previous(id).unwrap();
    assert_eq!(viewer.location(), Location::paged(1));
    let err = manager.sync_to_previous(id).unwrap_err();
    assert!(matches!(err, SessionError::NoAdjacentNote(Direction::Previous)));
}

#[test]
fn sync_to_current_without_note_is_a_no_op() {
    let mut manager = manager_with(&paper_notes());
    let viewer = Viewer::paged(PAPER, 2);
    let (id, _surfaces) = attach(&mut manager, &viewer);
    manager.sync_to_current(id).unwrap();
    assert!(viewer.navigations().is_empty());
}

#[test]
fn sync_to_note_at_uses_enclosing_child() {
    let text = [
        root("Paper", PAPER),
        "about the paper\n".to_string(),
        note("Intro", "1"),
        "intro body\n".to_string(),
        "*** Detail\nnested\n".to_string(),
        "** Loose\nno location\n".to_string(),
    ]
    .concat();
    let mut manager = manager_with(&text);
    let viewer = Viewer::paged(PAPER, 9);
    let (id, _surfaces) = attach(&mut manager, &viewer);

    let nested = text.find("nested").unwrap();
    manager.sync_to_note_at(id, nested).unwrap();
    assert_eq!(viewer.location(), Location::paged(1));
    assert_eq!(manager.snapshot(id).unwrap().current, ["Intro"]);

    let about = text.find("about the paper").unwrap();
    let err = manager.sync_to_note_at(id, about).unwrap_err();
    assert!(matches!(err, SessionError::NoLocationAtPoint));
    let loose = text.find("no location").unwrap();
    let err = manager.sync_to_note_at(id, loose).unwrap_err();
    assert!(matches!(err, SessionError::NoLocationAtPoint));
}

#[test]
fn repeated_navigation_without_change_is_idempotent() {
    let text = [
        root("Book", "book.epub"),
        note("Early", "(1 10)"),
        note("Late", "(1 400)"),
    ]
    .concat();
    let store = MemoryNoteStore::with_document(NoteKey::new("book.notes.org"), text);
    let mut manager = SessionManager::new(store, NoterConfig::default());
    let viewer = Viewer::ranged("book.epub", 1, 50, Viewport::new(0, 100));
    let (id, surfaces) = attach(&mut manager, &viewer);

    let partition = manager.session(id).unwrap().partition().clone();
    let marks = surfaces.notes.live();
    let calls = surfaces.notes.calls();

    for _ in 0..2 {
        assert!(viewer.move_to(Location::ranged(1, 60)));
        let report = manager.dispatch_pending();
        assert!(report.refreshed.is_empty());
        assert_eq!(manager.session(id).unwrap().partition(), &partition);
        assert_eq!(surfaces.notes.live(), marks);
        assert_eq!(surfaces.notes.calls(), calls);
    }

    assert!(viewer.scroll(Viewport::new(50, 450)));
    let report = manager.dispatch_pending();
    assert_eq!(report.refreshed, vec![id]);
    let snapshot = manager.snapshot(id).unwrap();
    assert_eq!(snapshot.current, ["Late"]);
    assert_eq!(snapshot.previous, ["Early"]);

    viewer.notify();
    assert!(manager.dispatch_pending().refreshed.is_empty());
}

#[test]
fn paged_navigation_recomputes_on_page_change_only() {
    let mut manager = manager_with(&paper_notes());
    let viewer = Viewer::paged(PAPER, 3);
    let (id, surfaces) = attach(&mut manager, &viewer);

    viewer.move_to(Location::paged(3));
    viewer.move_to(Location::paged(3));
    assert!(manager.dispatch_pending().refreshed.is_empty());

    viewer.move_to(Location::paged(5));
    assert_eq!(manager.dispatch_pending().refreshed, vec![id]);
    assert_eq!(manager.snapshot(id).unwrap().current, ["Results"]);
    assert_eq!(surfaces.notes.live().len(), 1);
}

#[test]
fn external_edit_is_picked_up_on_navigation() {
    let mut manager = manager_with(&paper_notes());
    let viewer = Viewer::paged(PAPER, 3);
    let (id, _surfaces) = attach(&mut manager, &viewer);

    let edited = format!("{}{}", paper_notes(), note("Second look", "3"));
    manager.store().save(&paper_key(), &edited).unwrap();
    viewer.notify();
    assert_eq!(manager.dispatch_pending().refreshed, vec![id]);
    assert_eq!(
        manager.snapshot(id).unwrap().current,
        ["Method", "Second look"]
    );
}

#[test]
fn losing_the_root_kills_the_session() {
    let mut manager = manager_with(&paper_notes());
    let viewer = Viewer::paged(PAPER, 3);
    let (id, surfaces) = attach(&mut manager, &viewer);

    manager.store().save(&paper_key(), "* Unrelated\n").unwrap();
    viewer.move_to(Location::paged(4));
    let report = manager.dispatch_pending();
    assert_eq!(report.killed, vec![id]);
    assert!(manager.session(id).is_none());
    assert!(surfaces.notes.live().is_empty());
    manager.sync_to_next(id).unwrap();
    assert_eq!(manager.snapshot(id).unwrap().state, SessionState::Killed);
    assert_eq!(stored_text(&manager), "* Unrelated\n");
}

#[test]
fn commands_on_killed_sessions_do_nothing() {
    let mut manager = manager_with(&paper_notes());
    let viewer = Viewer::paged(PAPER, 3);
    let (id, _surfaces) = attach(&mut manager, &viewer);
    manager.kill(id).unwrap();
    let stored = stored_text(&manager);
    let revision = manager.store().revision(&paper_key()).unwrap();

    let inserted = manager
        .insert_note(id, &NoteRequest::titled(" Late ").with_body("text"))
        .unwrap();
    assert!(!inserted.written);
    assert!(!inserted.created);
    assert_eq!(inserted.title, "Late");
    manager.sync_to_current(id).unwrap();
    manager.sync_to_previous(id).unwrap();
    manager.sync_to_note_at(id, 0).unwrap();
    manager.set_split_fraction(id, 0.4).unwrap();
    assert!(matches!(
        manager.set_split_fraction(id, 2.0),
        Err(SessionError::InvalidSplitFraction(_))
    ));

    assert_eq!(stored_text(&manager), stored);
    assert_eq!(manager.store().revision(&paper_key()).unwrap(), revision);
    assert!(viewer.navigations().is_empty());

    let unknown = serde_json::from_str::<SessionId>("\"00000000-0000-0000-0000-000000000000\"").unwrap();
    assert!(matches!(
        manager.sync_to_next(unknown),
        Err(SessionError::UnknownSession(_))
    ));
    assert!(matches!(
        manager.snapshot(unknown),
        Err(SessionError::UnknownSession(_))
    ));
}

#[test]
fn kill_persists_location_releases_marks_and_is_idempotent() {
    let mut manager = manager_with(&paper_notes());
    let viewer = Viewer::paged(PAPER, 3);
    let (id, surfaces) = attach(&mut manager, &viewer);
    assert!(!surfaces.notes.live().is_empty());

    manager.kill(id).unwrap();
    assert!(surfaces.notes.live().is_empty());
    assert!(surfaces.document.live().is_empty());
    assert!(stored_text(&manager).starts_with(
        "* Paper\n:PROPERTIES:\n:NOTER_DOCUMENT: \"paper.pdf\"\n:NOTER_PAGE: 3\n:END:\n"
    ));
    manager.kill(id).unwrap();
    assert!(manager.is_empty());

    let resumed = Viewer::paged(PAPER, 1);
    let (again, _surfaces) = attach(&mut manager, &resumed);
    assert_ne!(again, id);
    assert_eq!(resumed.location(), Location::paged(3));
    assert_eq!(resumed.navigations(), vec![Location::paged(3)]);
}

#[test]
fn resume_can_be_disabled() {
    let text = "* Paper\n:PROPERTIES:\n:NOTER_DOCUMENT: \"paper.pdf\"\n:NOTER_PAGE: 7\n:END:\n";
    let store = MemoryNoteStore::with_document(paper_key(), text);
    let config = NoterConfig::from_json_str(r#"{"resume_on_create": false}"#).unwrap();
    let mut manager = SessionManager::new(store, config);
    let viewer = Viewer::paged(PAPER, 2);
    let (id, _surfaces) = attach(&mut manager, &viewer);
    assert!(viewer.navigations().is_empty());
    assert_eq!(manager.snapshot(id).unwrap().location, Location::paged(2));
}

#[test]
fn one_session_per_document() {
    let mut manager = manager_with(&paper_notes());
    let first = Viewer::paged(PAPER, 1);
    let (id, _surfaces) = attach(&mut manager, &first);

    let (binding, _) = bind(&Viewer::paged(PAPER, 2));
    let err = manager.attach(binding).unwrap_err();
    assert!(matches!(err, SessionError::AlreadyBound(ref doc) if doc == PAPER));
    assert_eq!(manager.len(), 1);

    manager.kill(id).unwrap();
    let (binding, _) = bind(&Viewer::paged(PAPER, 2));
    assert!(manager.attach(binding).is_ok());
}

#[test]
fn virtual_documents_cannot_start_sessions() {
    let mut manager = manager_with(&paper_notes());
    let viewer = Viewer::virtual_document(DocumentKind::Paged, Location::paged(1));
    let (binding, _) = bind(&viewer);
    let err = manager.attach(binding).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Create(SessionCreateError::VirtualDocument)
    ));
    assert!(manager.is_empty());
}

#[test]
fn missing_root_is_created_and_saved() {
    let store = MemoryNoteStore::new();
    let mut manager = SessionManager::new(store, NoterConfig::default());
    let viewer = Viewer::paged("papers/attention.pdf", 1).with_title("Attention");
    let (id, surfaces) = attach(&mut manager, &viewer);

    let key = NoteKey::new("papers/attention.notes.org");
    let document = manager.store().load(&key).unwrap().unwrap();
    assert_eq!(
        document.text,
        "* Attention\n:PROPERTIES:\n:NOTER_DOCUMENT: \"papers/attention.pdf\"\n:END:\n"
    );
    assert_eq!(manager.snapshot(id).unwrap().note_key, key);
    assert_eq!(surfaces.notes.live()[0].style, MarkStyle::NoCurrentNote);
}

#[test]
fn failed_create_does_not_save_a_new_root() {
    let mut manager = manager_with("* Other\n");
    let viewer = Viewer::paged(PAPER, 1);
    viewer.0.borrow_mut().location = Location::ranged(0, 0);

    let (binding, surfaces) = bind(&viewer);
    let err = manager.attach(binding).unwrap_err();
    assert!(matches!(
        err,
        SessionError::Create(SessionCreateError::KindMismatch {
            expected: DocumentKind::Paged,
            actual: DocumentKind::Ranged,
        })
    ));
    assert_eq!(stored_text(&manager), "* Other\n");
    assert_eq!(manager.store().revision(&paper_key()).unwrap(), Some(1));
    assert!(manager.is_empty());
    assert!(surfaces.notes.live().is_empty());
}

#[test]
fn node_documents_share_one_note_file() {
    let store = MemoryNoteStore::new();
    let mut manager = SessionManager::new(store, NoterConfig::default());
    let viewer = Viewer::node("(emacs)", "Top", 0, Viewport::new(0, 100));
    let (id, _surfaces) = attach(&mut manager, &viewer);
    assert_eq!(
        manager.snapshot(id).unwrap().note_key,
        NoteKey::new("help-notes.org")
    );

    manager.insert_note(id, &NoteRequest::titled("Top")).unwrap();
    let text = manager
        .store()
        .load(&NoteKey::new("help-notes.org"))
        .unwrap()
        .unwrap()
        .text;
    assert!(text.contains(":NOTER_PAGE: (\"Top\" 0)\n"));
}

#[test]
fn split_fraction_is_read_validated_and_persisted() {
    let text = "* Paper\n:PROPERTIES:\n:NOTER_DOCUMENT: \"paper.pdf\"\n:NOTER_SPLIT_FRACTION: 0.25\n:END:\n";
    let mut manager = manager_with(text);
    let viewer = Viewer::paged(PAPER, 1);
    let (id, _surfaces) = attach(&mut manager, &viewer);
    assert_eq!(manager.session(id).unwrap().split_fraction(), 0.25);

    let err = manager.set_split_fraction(id, 1.2).unwrap_err();
    assert!(matches!(err, SessionError::InvalidSplitFraction(_)));

    manager.set_split_fraction(id, 0.4).unwrap();
    assert_eq!(manager.snapshot(id).unwrap().split_fraction, 0.4);
    assert!(stored_text(&manager).contains(":NOTER_SPLIT_FRACTION: 0.4\n"));
}

struct PagedFactory;

impl AdapterFactory for PagedFactory {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Paged
    }

    fn attach(&self, target: &str) -> Result<Box<dyn DocumentAdapter>, AdapterError> {
        Ok(Viewer::paged(target, 3).adapter())
    }
}

#[test]
fn start_selects_adapter_by_kind() {
    let mut manager = manager_with(&paper_notes());
    manager.register_adapter(Arc::new(PagedFactory)).unwrap();

    let surfaces = Surfaces::default();
    let id = manager
        .start(
            DocumentKind::Paged,
            PAPER,
            surfaces.notes.boxed(),
            surfaces.document.boxed(),
        )
        .unwrap();
    assert_eq!(manager.snapshot(id).unwrap().current, ["Method"]);

    let err = manager
        .start(
            DocumentKind::Node,
            "(emacs) Top",
            surfaces.notes.boxed(),
            surfaces.document.boxed(),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Create(SessionCreateError::UnsupportedKind(DocumentKind::Node))
    ));
}

#[test]
fn kill_all_ends_every_session() {
    let mut manager = manager_with(&paper_notes());
    let first = Viewer::paged(PAPER, 1);
    let (_first, first_surfaces) = attach(&mut manager, &first);
    let other = Viewer::paged("other.pdf", 2);
    let (_other, other_surfaces) = attach(&mut manager, &other);

    manager.kill_all().unwrap();
    assert!(manager.is_empty());
    assert!(first_surfaces.notes.live().is_empty());
    assert!(other_surfaces.notes.live().is_empty());
    assert!(manager
        .store()
        .load(&NoteKey::new("other.notes.org"))
        .unwrap()
        .unwrap()
        .text
        .contains(":NOTER_PAGE: 2\n"));
}
