//! End-to-end browser tests over a fixture data directory

mod helpers;

use pretty_assertions::assert_eq;

use crosswoz_gallery::browser::BrowseOutcome;
use crosswoz_gallery::surface::{Block, Control};
use crosswoz_gallery::{GalleryError, Page};

fn turn_headers(page: &Page) -> usize {
    page.headers()
        .iter()
        .filter(|h| h.starts_with("Turn #"))
        .count()
}

#[test]
fn dialogue_example_renders_two_turns() {
    let dir = helpers::fixture_dir();
    let browser = helpers::browser(&dir);

    let mut page = Page::from_query("t", [("file", "train.json"), ("example", "1")]);
    let outcome = browser.visualize(&mut page).unwrap();

    assert_eq!(
        outcome,
        BrowseOutcome::Dialogue {
            example_id: Some("1".to_string()),
            matching: 2,
            turns: 2,
        }
    );
    assert_eq!(turn_headers(&page), 2);
    assert_eq!(page.headers()[0], "Task Description (单领域)");
}

#[test]
fn database_table_renders_every_record() {
    let dir = helpers::fixture_dir();
    let browser = helpers::browser(&dir);

    let mut page = Page::from_query("t", [("file", "database/hotel_db.json")]);
    let outcome = browser.visualize(&mut page).unwrap();

    assert_eq!(outcome, BrowseOutcome::Database { rows: 3 });
    assert_eq!(page.headers(), vec!["database/hotel_db.json"]);
    let tables = page.tables();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].frame.len(), 3);
    assert_eq!(tables[0].frame.columns, vec!["名称", "酒店类型", "评分"]);
}

#[test]
fn default_selection_is_first_file_and_example() {
    let dir = helpers::fixture_dir();
    let browser = helpers::browser(&dir);

    let mut page = Page::new("t");
    let outcome = browser.visualize(&mut page).unwrap();

    match outcome {
        BrowseOutcome::Dialogue { example_id, .. } => assert_eq!(example_id.as_deref(), Some("1")),
        other => panic!("unexpected outcome {:?}", other),
    }
    assert!(matches!(&page.controls()[0], Control::Title(t) if t == "CrossWOZ Dataset Viewer"));
}

#[test]
fn type_filter_restricts_examples() {
    let dir = helpers::fixture_dir();
    let browser = helpers::browser(&dir);

    let mut page = Page::from_query("t", [("file", "train.json"), ("types", "不独立多领域")]);
    let outcome = browser.visualize(&mut page).unwrap();

    assert_eq!(
        outcome,
        BrowseOutcome::Dialogue {
            example_id: Some("2".to_string()),
            matching: 1,
            turns: 1,
        }
    );
    let select = page
        .controls()
        .iter()
        .find_map(|c| match c {
            Control::Select { key, label, options, .. } if key == "example" => {
                Some((label.clone(), options.clone()))
            }
            _ => None,
        })
        .unwrap();
    assert_eq!(select, ("Select example (1 total)".to_string(), vec!["2".to_string()]));
}

#[test]
fn example_outside_filter_falls_back_to_first_match() {
    let dir = helpers::fixture_dir();
    let browser = helpers::browser(&dir);

    let mut page = Page::from_query(
        "t",
        [("file", "train.json"), ("types", "不独立多领域"), ("example", "1")],
    );
    let outcome = browser.visualize(&mut page).unwrap();
    assert!(matches!(
        outcome,
        BrowseOutcome::Dialogue { example_id: Some(ref id), .. } if id == "2"
    ));
}

#[test]
fn empty_split_shows_no_examples() {
    let dir = helpers::fixture_dir();
    let browser = helpers::browser(&dir);

    let mut page = Page::from_query("t", [("file", "val.json")]);
    let outcome = browser.visualize(&mut page).unwrap();

    assert_eq!(
        outcome,
        BrowseOutcome::Dialogue {
            example_id: None,
            matching: 0,
            turns: 0,
        }
    );
    assert_eq!(
        page.blocks(),
        &[Block::Markdown("No examples match the selected types.".to_string())]
    );
}

#[test]
fn missing_file_is_fatal() {
    let dir = helpers::fixture_dir();
    let browser = helpers::browser(&dir);

    let mut page = Page::from_query("t", [("file", "database/taxi_db.json")]);
    let err = browser.visualize(&mut page).unwrap_err();
    assert!(matches!(err, GalleryError::Io { .. }));
}

#[test]
fn repeated_renders_read_each_file_once() {
    let dir = helpers::fixture_dir();
    let browser = helpers::browser(&dir);

    for example in ["1", "2", "1"] {
        let mut page = Page::from_query("t", [("file", "train.json"), ("example", example)]);
        browser.visualize(&mut page).unwrap();
    }
    let mut page = Page::from_query("t", [("file", "database/hotel_db.json")]);
    browser.visualize(&mut page).unwrap();
    let mut page = Page::from_query("t", [("file", "database/hotel_db.json")]);
    browser.visualize(&mut page).unwrap();

    assert_eq!(browser.store().disk_reads(), 2);
}

#[test]
fn example_ids_listing() {
    let dir = helpers::fixture_dir();
    let browser = helpers::browser(&dir);
    let split = crosswoz_gallery::Split::Train;

    assert_eq!(browser.example_ids(split, None).unwrap(), vec!["1", "2"]);
    assert_eq!(
        browser
            .example_ids(split, Some(&["单领域".to_string()][..]))
            .unwrap(),
        vec!["1"]
    );
}

#[test]
fn rendered_page_highlights_second_turn() {
    let dir = helpers::fixture_dir();
    let browser = helpers::browser(&dir);

    let mut page = Page::from_query("t", [("file", "train.json"), ("example", "1")]);
    browser.visualize(&mut page).unwrap();
    let html = page.to_html();

    assert!(html.contains("<h2>Turn #1</h2>"));
    assert!(html.contains("<td style=\"color: #fa323c\">60元</td>"));
}
