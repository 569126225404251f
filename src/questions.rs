//! Parsing a chapter's question region into question records
//!
//! A question starts on a line beginning with its number (`66 A patient...`).
//! Option lines look like `B. Option text`. Anything else continues the body
//! of the open question.

use crate::model::Question;
use crate::segmenter::PagedLine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static QUESTION_START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s+(.+)").unwrap());
static OPTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z])\.\s+(.+)").unwrap());

/// Guards record numbering against OCR damage.
///
/// The first number of a region is taken as-is. After that, a number more
/// than one past the last accepted number is clamped to `last + 1`; equal,
/// lower and next numbers pass through. Records are numbered from 1, so a
/// `0` is always clamped.
#[derive(Debug, Default)]
pub(crate) struct NumberSequence {
    last: Option<u32>,
}

impl NumberSequence {
    pub(crate) fn accept(&mut self, raw: &str, kind: &str, chapter: u32) -> u32 {
        let parsed = raw.parse::<u32>().ok().filter(|n| *n >= 1);
        let number = match (self.last, parsed) {
            (None, Some(n)) => n,
            (Some(last), Some(n)) if n <= last.saturating_add(1) => n,
            (last, _) => {
                let next = last.map_or(1, |l| l.saturating_add(1));
                log::warn!(
                    "{} number {} is out of sequence in chapter {}. Adjusting to {}.",
                    kind,
                    raw,
                    chapter,
                    next
                );
                next
            }
        };
        self.last = Some(number);
        number
    }
}

#[derive(Debug)]
struct OpenQuestion {
    number: u32,
    body: Vec<String>,
    options: BTreeMap<char, String>,
}

impl OpenQuestion {
    fn close(self, chapter: u32, page_number: u32) -> Question {
        Question {
            chapter,
            page_number,
            question_number: self.number,
            text: self.body.join(" "),
            options: self.options,
        }
    }
}

#[derive(Debug)]
struct QuestionParser {
    chapter: u32,
    sequence: NumberSequence,
    open: Option<OpenQuestion>,
    last_page: u32,
    questions: Vec<Question>,
}

impl QuestionParser {
    fn new(chapter: u32) -> Self {
        Self {
            chapter,
            sequence: NumberSequence::default(),
            open: None,
            last_page: 0,
            questions: Vec::new(),
        }
    }

    fn feed(&mut self, line: &str, page: u32) {
        self.last_page = page;
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        if let Some(caps) = QUESTION_START_RE.captures(line) {
            let number = self.sequence.accept(&caps[1], "Question", self.chapter);
            if let Some(done) = self.open.take() {
                self.questions.push(done.close(self.chapter, page));
            }
            self.open = Some(OpenQuestion {
                number,
                body: vec![caps[2].to_string()],
                options: BTreeMap::new(),
            });
            return;
        }

        let Some(open) = self.open.as_mut() else {
            log::debug!(
                "Dropping text before first question in chapter {}: {:?}",
                self.chapter,
                line
            );
            return;
        };

        match OPTION_RE.captures(line) {
            Some(caps) => {
                let letter = caps[1].chars().next().unwrap_or('?');
                open.options.insert(letter, caps[2].to_string());
            }
            None => open.body.push(line.to_string()),
        }
    }

    fn finish(mut self) -> Vec<Question> {
        if let Some(done) = self.open.take() {
            self.questions.push(done.close(self.chapter, self.last_page));
        }
        self.questions
    }
}

/// Parse one chapter's question lines into questions, in document order
pub fn parse_questions(lines: &[PagedLine], chapter: u32) -> Vec<Question> {
    let mut parser = QuestionParser::new(chapter);
    for line in lines {
        parser.feed(&line.text, line.page);
    }
    parser.finish()
}
