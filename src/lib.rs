//! Question/answer extraction from a two-column textbook PDF
//!
//! This crate provides:
//! - Column text extraction per page (left and right column boxes)
//! - Reconstruction of the document as one page-tagged line stream
//! - Segmentation into per-chapter question and answer regions
//! - Parsing of multiple-choice questions and their answers
//! - Joining questions and answers into flat output rows

pub mod answers;
pub mod checkpoint;
pub mod csv;
pub mod diagnostics;
pub mod extractor;
pub mod joiner;
pub mod model;
pub mod normalize;
pub mod questions;
pub mod segmenter;
pub mod stream;

#[cfg(test)]
mod test_log;

pub use diagnostics::DiagnosticsDump;
pub use extractor::{extract_columns, ColumnBox, ExtractConfig};
pub use joiner::{join, JoinReport};
pub use model::{Answer, OutputRow, Question, RawPage, RecordKey};
pub use normalize::{repair_breaks, sanitize};
pub use stream::{build_stream, PageStream};

use answers::parse_answers;
use questions::parse_questions;
use segmenter::segment;
use std::path::Path;

/// Result of processing a whole PDF
#[derive(Debug)]
pub struct QaProcessResult {
    /// Joined rows, in chapter order
    pub rows: Vec<OutputRow>,
    /// Questions that found no answer
    pub unanswered: usize,
    /// Answers that found no question
    pub orphan_answers: usize,
    /// Number of pages extracted
    pub page_count: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

/// Parsed records of every chapter, in chapter order
#[derive(Debug, Default)]
struct ParsedRecords {
    questions: Vec<Question>,
    answers: Vec<Answer>,
}

fn parse_records(stream: &PageStream) -> ParsedRecords {
    let mut records = ParsedRecords::default();
    for (chapter, lines) in segment(stream) {
        records.questions.extend(parse_questions(&lines.questions, chapter));
        records.answers.extend(parse_answers(&lines.answers, chapter));
    }
    records
}

/// Run the full text pipeline over extracted pages.
///
/// Pages must be in ascending page order. The run is deterministic: the same
/// pages always give the same report.
pub fn extract_report(pages: &[RawPage]) -> JoinReport {
    let stream = build_stream(pages);
    let records = parse_records(&stream);
    join(&records.questions, &records.answers)
}

/// Run the text pipeline and return only the joined rows
pub fn extract_rows(pages: &[RawPage]) -> Vec<OutputRow> {
    extract_report(pages).rows
}

/// Same as [`extract_report`], also dumping the reconstructed document and
/// every parsed record
pub fn extract_report_with_diagnostics(
    pages: &[RawPage],
    dump: &DiagnosticsDump,
) -> Result<JoinReport, QaError> {
    let stream = build_stream(pages);
    dump.write_document(&stream)?;

    let records = parse_records(&stream);
    for question in &records.questions {
        dump.write_question(question)?;
    }
    for answer in &records.answers {
        dump.write_answer(answer)?;
    }

    Ok(join(&records.questions, &records.answers))
}

/// Extract, parse and join a PDF file.
///
/// When `dump` is given, diagnostics are written alongside.
pub fn process_pdf<P: AsRef<Path>>(
    path: P,
    config: &ExtractConfig,
    dump: Option<&DiagnosticsDump>,
) -> Result<QaProcessResult, QaError> {
    let start = std::time::Instant::now();

    let pages = extract_columns(&path, config)?;
    let report = match dump {
        Some(dump) => extract_report_with_diagnostics(&pages, dump)?,
        None => extract_report(&pages),
    };

    Ok(QaProcessResult {
        unanswered: report.unanswered.len(),
        orphan_answers: report.orphan_answers.len(),
        rows: report.rows,
        page_count: pages.len(),
        processing_time_ms: start.elapsed().as_millis() as u64,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum QaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Page {page} out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<lopdf::Error> for QaError {
    fn from(e: lopdf::Error) -> Self {
        QaError::Parse(e.to_string())
    }
}
