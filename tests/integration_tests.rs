//! Integration tests for the question/answer extraction pipeline

use pdf_qa_extract::checkpoint::CheckpointStore;
use pdf_qa_extract::segmenter::segment;
use pdf_qa_extract::{
    build_stream, csv, extract_columns, extract_report, extract_report_with_diagnostics,
    extract_rows, repair_breaks, sanitize, DiagnosticsDump, ExtractConfig, QaError, RawPage,
};
use std::fs;
use tempfile::TempDir;

fn page(number: u32, left: &str, right: &str) -> RawPage {
    RawPage::new(number, Some(left.to_string()), Some(right.to_string()))
}

/// Two chapters laid out across four pages the way the book prints them
fn sample_book() -> Vec<RawPage> {
    vec![
        page(
            14,
            "Front matter INTRODUCTION\nThis chapter covers the upper limb.\n12 facts that look like questions",
            "MAIN QUESTIONS\n1 A 30-year-old man falls on an out-\nstretched hand. Which bone is\nmost likely fractured?\nA. Scaphoid\nB. Lunate",
        ),
        page(
            15,
            "C. Capitate\n2 Which nerve supplies the deltoid?\nA. Radial\nB. Axillary",
            "Back\nANSWERS\n1 A. The scaphoid is the most com-\nmonly fractured carpal bone.",
        ),
        page(
            16,
            "2 B. The axillary nerve supplies the\ndeltoid and teres minor.",
            "INTRODUCTION\nThe lower limb.\nQUESTIONS\n1 Which muscle is the chief flexor of the hip?\nA. Iliopsoas\nB. Sartorius",
        ),
        page(
            17,
            "2 Which\u{2019}s the longest vein?\nA. Great saphenous\nB. Femoral",
            "ANSWERS\n1 A. Iliopsoas.\n9 A. The great saphenous vein.",
        ),
    ]
}

// ============================================================================
// Text Normalizer Tests
// ============================================================================

#[test]
fn test_sanitize_right_single_quote() {
    assert_eq!(sanitize("\u{2019}"), "'");
}

#[test]
fn test_sanitize_pure_ascii_unchanged() {
    let text = "QUESTIONS\n1 Foo? A. Bar";
    assert_eq!(sanitize(text), text);
}

#[test]
fn test_repair_breaks_examples() {
    assert_eq!(repair_breaks(&["foo-", "bar", "baz"]), vec!["foobar", "baz"]);
    assert_eq!(repair_breaks(&["abc", "def"]), vec!["abc", "def"]);
}

#[test]
fn test_repair_breaks_idempotent() {
    let once = repair_breaks(&["ana-", "tomy", " of the ", "hand-", ""]);
    assert_eq!(repair_breaks(&once), once);
}

// ============================================================================
// Page Stream Tests
// ============================================================================

#[test]
fn test_stream_pages_non_decreasing() {
    let stream = build_stream(&sample_book());
    assert_eq!(stream.lines.len(), stream.page_of_line.len());
    assert!(stream.page_of_line.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_stream_joins_across_lines() {
    let stream = build_stream(&sample_book());
    assert!(stream
        .lines
        .iter()
        .any(|l| l == "1 A 30-year-old man falls on an outstretched hand. Which bone is"));
    assert!(stream.lines.iter().any(|l| l.contains("most commonly fractured")));
}

#[test]
fn test_stream_empty_input() {
    let stream = build_stream(&[]);
    assert!(stream.is_empty());
}

// ============================================================================
// Segmentation Tests
// ============================================================================

#[test]
fn test_segmentation_of_sample_book() {
    let sections = segment(&build_stream(&sample_book()));
    assert_eq!(sections.len(), 2);

    let chapter_one = &sections[&1];
    assert_eq!(chapter_one.questions[0].text, "Front matter ");
    assert!(chapter_one
        .questions
        .iter()
        .all(|l| !l.text.contains("upper limb")));
    assert!(chapter_one.answers.iter().any(|l| l.text.starts_with("2 B.")));

    let chapter_two = &sections[&2];
    assert!(chapter_two.questions[0].text.starts_with("1 Which muscle"));
    assert!(chapter_two.answers.iter().all(|l| l.text != "The lower limb."));
}

#[test]
fn test_segmentation_example() {
    let pages = vec![page(
        1,
        "QUESTIONS\n1 Foo?\nA. Opt\nANSWERS",
        "1 A. Bar\nQUESTIONS\n2 Baz?",
    )];
    let sections = segment(&build_stream(&pages));
    let q1: Vec<&str> = sections[&1].questions.iter().map(|l| l.text.as_str()).collect();
    let a1: Vec<&str> = sections[&1].answers.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(q1, vec!["1 Foo?", "A. Opt"]);
    assert_eq!(a1, vec!["1 A. Bar"]);
    assert_eq!(sections[&2].questions[0].text, "2 Baz?");
}

// ============================================================================
// End-to-End Tests
// ============================================================================

#[test]
fn test_sample_book_rows() {
    let report = extract_report(&sample_book());
    let keys: Vec<(u32, u32, char)> = report
        .rows
        .iter()
        .map(|r| (r.chapter, r.question_number, r.answer_letter))
        .collect();
    assert_eq!(keys, vec![(1, 1, 'A'), (1, 2, 'B'), (2, 1, 'A'), (2, 2, 'A')]);

    let first = &report.rows[0];
    assert_eq!(
        first.question_text,
        "A 30-year-old man falls on an outstretched hand. Which bone is most likely fractured?"
    );
    assert_eq!(first.question_options, "A Scaphoid\nB Lunate\nC Capitate");
    assert_eq!(
        first.answer_text,
        "The scaphoid is the most commonly fractured carpal bone."
    );
    // Answer 1 closes when answer 2 starts, on page 16
    assert_eq!(first.page_number, 16);

    let last = &report.rows[3];
    assert_eq!(last.question_text, "Which's the longest vein?");
    assert_eq!(last.page_number, 17);

    assert!(report.unanswered.is_empty());
    assert!(report.orphan_answers.is_empty());
}

#[test]
fn test_pipeline_is_deterministic() {
    let pages = sample_book();
    assert_eq!(extract_rows(&pages), extract_rows(&pages));
}

#[test]
fn test_missing_answers_are_reported() {
    let pages = vec![page(
        20,
        "QUESTIONS\n1 First?\nA. x\n2 Second?\nA. y",
        "ANSWERS\n1 A. Only the first.",
    )];
    let report = extract_report(&pages);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.unanswered.len(), 1);
    assert_eq!(report.unanswered[0].key.question_number, 2);
}

#[test]
fn test_pages_without_text() {
    let pages = vec![
        RawPage::new(30, None, None),
        RawPage::new(31, Some("1 Q?\nA. a".into()), None),
        RawPage::new(32, None, Some("ANSWERS\n1 A. a".into())),
    ];
    let rows = extract_rows(&pages);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].page_number, 32);
}

// ============================================================================
// Diagnostics and Output Tests
// ============================================================================

#[test]
fn test_diagnostics_dump_matches_plain_run() {
    let tmp = TempDir::new().unwrap();
    let dump = DiagnosticsDump::new(tmp.path());
    let pages = sample_book();

    let report = extract_report_with_diagnostics(&pages, &dump).unwrap();
    assert_eq!(report.rows, extract_rows(&pages));

    assert!(tmp.path().join("document.txt").exists());
    assert!(tmp.path().join("chapter_1/question_2.json").exists());
    assert!(tmp.path().join("chapter_2/answer_2.json").exists());
}

#[test]
fn test_csv_output() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("out.csv");
    csv::save_rows(&path, &extract_rows(&sample_book())).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("chapter,page,question_number,question,question_options,answer_letter,answer\n"));
    assert!(text.contains("\"A Scaphoid\nB Lunate\nC Capitate\""));
}

// ============================================================================
// Extraction Tests
// ============================================================================

#[test]
fn test_extract_columns_nonexistent_file() {
    let result = extract_columns("/nonexistent/book.pdf", &ExtractConfig::default());
    assert!(matches!(result, Err(QaError::Io(_))));
}

#[test]
fn test_extract_columns_rejects_bad_config() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.pdf");
    fs::write(&path, b"").unwrap();
    let config = ExtractConfig {
        workers: 0,
        ..Default::default()
    };
    assert!(matches!(
        extract_columns(&path, &config),
        Err(QaError::InvalidConfig(_))
    ));
}

#[test]
fn test_checkpoint_store_round_trip() {
    let tmp = TempDir::new().unwrap();
    let store = CheckpointStore::new(tmp.path());
    let raw = page(14, "left", "right");
    store.save(&raw).unwrap();
    assert_eq!(store.load(14).unwrap(), Some(raw));
    assert_eq!(store.load(15).unwrap(), None);
}
