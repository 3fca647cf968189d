//! CLI smoke entry point.
//!
//! # Responsibility
//! - Attach a paged session to a note file at a given page.
//! - Print the resulting partition and marks as deterministic output.
//!
//! Usage: `noter_cli <notes-file> <document-id> <page>`. Set `NOTER_LOG_DIR`
//! to an absolute path to enable file logging.

use noter_core::{
    DocumentAdapter, DocumentKind, Location, Mark, MarkId, MarkSurface, MemoryNoteStore,
    NavigationListener, NoteSourceResolver, NoterConfig, RemarkRange, SessionBinding,
    SessionManager, Viewport,
};
use noter_core::{AdapterError, NoteStore};
use std::error::Error;
use std::process::ExitCode;

/// Viewer stand-in that sits on one page.
struct FixedPage {
    document_id: String,
    page: u32,
}

impl DocumentAdapter for FixedPage {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Paged
    }

    fn document_id(&self) -> Result<String, AdapterError> {
        Ok(self.document_id.clone())
    }

    fn current_location(&self) -> Location {
        Location::paged(self.page)
    }

    fn navigate_to(&mut self, location: &Location) -> Result<(), AdapterError> {
        match location {
            Location::Paged { page } => {
                self.page = *page;
                Ok(())
            }
            other => Err(AdapterError::NavigationFailed(format!(
                "not a page: {other}"
            ))),
        }
    }

    fn on_navigation_event(&mut self, _listener: NavigationListener) {}

    fn viewport(&self) -> Option<Viewport> {
        None
    }

    fn region_text(&self, _range: RemarkRange) -> Option<String> {
        None
    }
}

struct PrintedMarks {
    side: &'static str,
    next: u64,
}

impl MarkSurface for PrintedMarks {
    fn add_mark(&mut self, mark: &Mark) -> MarkId {
        self.next += 1;
        println!(
            "mark side={} style={:?} range={}..{}",
            self.side, mark.style, mark.range.start, mark.range.end
        );
        MarkId(self.next)
    }

    fn remove_mark(&mut self, _id: MarkId) {}
}

fn run(args: &[String]) -> Result<(), Box<dyn Error>> {
    let [notes_path, document_id, page] = args else {
        return Err("usage: noter_cli <notes-file> <document-id> <page>".into());
    };
    let page: u32 = page.parse()?;

    if let Ok(log_dir) = std::env::var("NOTER_LOG_DIR") {
        noter_core::init_logging("info", &log_dir)?;
    }

    let config = NoterConfig::default();
    let key = NoteSourceResolver::from_config(&config).resolve(document_id, DocumentKind::Paged);
    let text = std::fs::read_to_string(notes_path)?;
    let store = MemoryNoteStore::with_document(key.clone(), text);

    let mut manager = SessionManager::new(store, config);
    let adapter = FixedPage {
        document_id: document_id.clone(),
        page,
    };
    let id = manager.attach(SessionBinding::new(
        Box::new(adapter),
        Box::new(PrintedMarks {
            side: "notes",
            next: 0,
        }),
        Box::new(PrintedMarks {
            side: "document",
            next: 0,
        }),
    ))?;

    let snapshot = manager.snapshot(id)?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    manager.kill(id)?;

    if let Some(document) = manager.store().load(&key)? {
        println!("revision={}", document.revision);
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("noter_cli: {err}");
            ExitCode::FAILURE
        }
    }
}
