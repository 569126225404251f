//! Records flowing through the extraction pipeline

use serde::Serialize;
use std::collections::BTreeMap;

pub const CHAPTER_COL: &str = "chapter";
pub const PAGE_COL: &str = "page";
pub const QUESTION_NUMBER_COL: &str = "question_number";
pub const QUESTION_COL: &str = "question";
pub const QUESTION_OPTIONS_COL: &str = "question_options";
pub const ANSWER_LETTER_COL: &str = "answer_letter";
pub const ANSWER_COL: &str = "answer";

/// Raw column text of one physical page, as produced by the extractor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// 0-based page index
    pub page_number: u32,
    /// Text of the left column, if any was found
    pub left_text: Option<String>,
    /// Text of the right column, if any was found
    pub right_text: Option<String>,
}

impl RawPage {
    pub fn new(page_number: u32, left_text: Option<String>, right_text: Option<String>) -> Self {
        Self {
            page_number,
            left_text,
            right_text,
        }
    }
}

/// Join key shared by questions and answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordKey {
    pub chapter: u32,
    pub question_number: u32,
}

/// A parsed multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub chapter: u32,
    /// Page where the question record was closed
    pub page_number: u32,
    pub question_number: u32,
    pub text: String,
    /// Options keyed by their letter; a repeated letter overwrites
    pub options: BTreeMap<char, String>,
}

impl Question {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            chapter: self.chapter,
            question_number: self.question_number,
        }
    }

    /// Options rendered one `"LETTER text"` per line
    pub fn formatted_options(&self) -> String {
        self.options
            .iter()
            .map(|(letter, text)| format!("{} {}", letter, text))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A parsed answer: the correct letter plus its explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub chapter: u32,
    pub page_number: u32,
    pub question_number: u32,
    pub answer_letter: char,
    pub text: String,
}

impl Answer {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            chapter: self.chapter,
            question_number: self.question_number,
        }
    }
}

/// One joined question/answer row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub page_number: u32,
    pub chapter: u32,
    pub question_number: u32,
    pub question_text: String,
    pub question_options: String,
    pub answer_letter: char,
    pub answer_text: String,
}

impl OutputRow {
    pub fn column_headers() -> [&'static str; 7] {
        [
            CHAPTER_COL,
            PAGE_COL,
            QUESTION_NUMBER_COL,
            QUESTION_COL,
            QUESTION_OPTIONS_COL,
            ANSWER_LETTER_COL,
            ANSWER_COL,
        ]
    }

    /// Field values in `column_headers` order
    pub fn fields(&self) -> [String; 7] {
        [
            self.chapter.to_string(),
            self.page_number.to_string(),
            self.question_number.to_string(),
            self.question_text.clone(),
            self.question_options.clone(),
            self.answer_letter.to_string(),
            self.answer_text.clone(),
        ]
    }
}
