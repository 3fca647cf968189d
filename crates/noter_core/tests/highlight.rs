mod support;

use noter_core::{
    content_hash, plan_highlights, Location, LocationOrder, MarkStyle, NoteTree, PropertyKeys,
};
use support::{note, root, Viewer};

const DOCUMENT_TEXT: &str = "The quick brown fox jumps over the lazy dog";

fn remarked(title: &str, page: u32, range: (u64, u64), hash: Option<&str>) -> String {
    let mut out = format!(
        "** {title}\n:PROPERTIES:\n:NOTER_PAGE: {page}\n:NOTER_REMARK_RANGE: ({} {})\n",
        range.0, range.1
    );
    if let Some(hash) = hash {
        out.push_str(&format!(":NOTER_REMARK_HASH: \"{hash}\"\n"));
    }
    out.push_str(":END:\n");
    out
}

fn plan_at(text: &str, page: u32) -> (NoteTree, noter_core::HighlightPlan) {
    let mut tree = NoteTree::load(text, 1, &PropertyKeys::default()).unwrap();
    let root = tree.find_root("paper.pdf").unwrap();
    let partition = tree
        .partition(root, &Location::paged(page), &LocationOrder::exact())
        .unwrap();
    let viewer = Viewer::paged("paper.pdf", page).with_text(DOCUMENT_TEXT);
    let adapter = viewer.adapter();
    let plan = plan_highlights(&tree, root, &partition, adapter.as_ref());
    (tree, plan)
}

fn marked_text(tree: &NoteTree, range: &std::ops::Range<u64>) -> String {
    tree.text()[range.start as usize..range.end as usize].to_string()
}

#[test]
fn every_current_heading_is_marked() {
    let text = [
        root("Paper", "paper.pdf"),
        note("One", "2"),
        note("Two", "2"),
        note("Three", "4"),
    ]
    .concat();
    let (tree, plan) = plan_at(&text, 2);
    let headings: Vec<String> = plan
        .note_marks
        .iter()
        .map(|mark| {
            assert_eq!(mark.style, MarkStyle::CurrentNote);
            marked_text(&tree, &mark.range)
        })
        .collect();
    assert_eq!(headings, ["** One", "** Two"]);
    assert!(plan.document_marks.is_empty());
}

#[test]
fn no_current_note_marks_nearest_previous() {
    let text = [
        root("Paper", "paper.pdf"),
        note("One", "1"),
        note("Two", "2"),
        note("Far", "9"),
    ]
    .concat();
    let (tree, plan) = plan_at(&text, 5);
    assert_eq!(plan.note_marks.len(), 1);
    assert_eq!(plan.note_marks[0].style, MarkStyle::NoCurrentNote);
    assert_eq!(marked_text(&tree, &plan.note_marks[0].range), "** Two");
}

#[test]
fn no_previous_note_marks_the_root() {
    let text = [root("Paper", "paper.pdf"), note("Far", "9")].concat();
    let (tree, plan) = plan_at(&text, 1);
    assert_eq!(plan.note_marks.len(), 1);
    assert_eq!(plan.note_marks[0].style, MarkStyle::NoCurrentNote);
    assert_eq!(marked_text(&tree, &plan.note_marks[0].range), "* Paper");
}

#[test]
fn fresh_remark_is_marked_in_the_document() {
    let hash = content_hash("brown fox");
    let text = [
        root("Paper", "paper.pdf"),
        remarked("Fox", 1, (10, 19), Some(&hash)),
    ]
    .concat();
    let (_tree, plan) = plan_at(&text, 1);
    assert_eq!(plan.document_marks.len(), 1);
    assert_eq!(plan.document_marks[0].range, 10..19);
    assert_eq!(plan.document_marks[0].style, MarkStyle::Remark);
}

#[test]
fn stale_remark_is_suppressed_but_note_still_marked() {
    let hash = content_hash("brown cat");
    let text = [
        root("Paper", "paper.pdf"),
        remarked("Fox", 1, (10, 19), Some(&hash)),
    ]
    .concat();
    let (tree, plan) = plan_at(&text, 1);
    assert!(plan.document_marks.is_empty());
    assert_eq!(plan.note_marks.len(), 1);
    assert!(tree.text().contains(&hash));
}

#[test]
fn unreadable_region_with_hash_is_suppressed() {
    let hash = content_hash("anything");
    let text = [
        root("Paper", "paper.pdf"),
        remarked("Beyond", 1, (100, 120), Some(&hash)),
        remarked("Unhashed", 1, (100, 120), None),
    ]
    .concat();
    let (_tree, plan) = plan_at(&text, 1);
    assert_eq!(plan.document_marks.len(), 1);
    assert_eq!(plan.document_marks[0].range, 100..120);
}

#[test]
fn remarks_off_the_current_location_are_not_marked() {
    let text = [
        root("Paper", "paper.pdf"),
        remarked("Elsewhere", 3, (0, 3), None),
    ]
    .concat();
    let (_tree, plan) = plan_at(&text, 1);
    assert!(plan.document_marks.is_empty());
    assert_eq!(plan.note_marks[0].style, MarkStyle::NoCurrentNote);
}
