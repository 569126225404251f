//! Splitting the document stream into per-chapter question and answer regions
//!
//! Chapters alternate a QUESTIONS region and an ANSWERS region. Every ANSWERS
//! marker closes the chapter's questions; the next QUESTIONS marker closes
//! the answers and opens a new chapter. An INTRODUCTION block before a
//! chapter's questions is skipped.

use crate::stream::PageStream;
use std::collections::BTreeMap;

pub const QUESTIONS: &str = "QUESTIONS";
pub const MAIN_QUESTIONS: &str = "MAIN QUESTIONS";
pub const ANSWERS: &str = "ANSWERS";
pub const INTRODUCTION: &str = "INTRODUCTION";
pub const BACK: &str = "Back";

/// Lines that only mark structure and never carry record text
const MARKER_LINES: [&str; 4] = [BACK, QUESTIONS, MAIN_QUESTIONS, ANSWERS];

/// A line with the page it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedLine {
    pub text: String,
    pub page: u32,
}

impl PagedLine {
    pub fn new(text: impl Into<String>, page: u32) -> Self {
        Self {
            text: text.into(),
            page,
        }
    }
}

/// Question and answer regions of one chapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterLines {
    pub questions: Vec<PagedLine>,
    pub answers: Vec<PagedLine>,
}

/// Regions of every chapter, keyed by chapter number (1-based)
pub type ChapterSections = BTreeMap<u32, ChapterLines>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Questions,
    Answers,
}

/// Running state of the segmentation pass
#[derive(Debug)]
struct Segmenter {
    chapter: u32,
    region: Region,
    skipping_introduction: bool,
    pending: Vec<PagedLine>,
    sections: ChapterSections,
}

impl Segmenter {
    fn new() -> Self {
        Self {
            chapter: 1,
            region: Region::Questions,
            skipping_introduction: false,
            pending: Vec::new(),
            sections: ChapterSections::new(),
        }
    }

    /// Move the pending lines into the current chapter's active region
    fn flush(&mut self) {
        let lines = std::mem::take(&mut self.pending);
        let chapter = self.sections.entry(self.chapter).or_default();
        match self.region {
            Region::Questions => chapter.questions.extend(lines),
            Region::Answers => chapter.answers.extend(lines),
        }
    }

    fn feed(&mut self, line: &str, page: u32) {
        if self.skipping_introduction && !line.contains(QUESTIONS) {
            return;
        }

        let mut line = line;
        if let Some(pos) = line.find(INTRODUCTION) {
            log::debug!("Introduction starts on page {}", page);
            self.skipping_introduction = true;
            line = &line[..pos];
        }

        if line.contains(ANSWERS) {
            if self.region == Region::Questions {
                self.flush();
                self.region = Region::Answers;
            } else {
                log::debug!(
                    "Repeated answers marker in chapter {} on page {}",
                    self.chapter,
                    page
                );
            }
            self.skipping_introduction = false;
        } else if line.contains(QUESTIONS) {
            if self.region == Region::Answers {
                self.flush();
                self.chapter += 1;
                self.region = Region::Questions;
            }
            self.skipping_introduction = false;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || MARKER_LINES.contains(&trimmed) {
            return;
        }
        self.pending.push(PagedLine::new(line, page));
    }

    fn finish(mut self) -> ChapterSections {
        self.flush();
        self.sections
    }
}

/// Classify every line of the stream into a chapter's questions or answers
pub fn segment(stream: &PageStream) -> ChapterSections {
    segment_lines(stream.iter())
}

/// Segment raw `(line, page)` pairs in document order
pub fn segment_lines<'a, I>(lines: I) -> ChapterSections
where
    I: IntoIterator<Item = (&'a str, u32)>,
{
    let mut segmenter = Segmenter::new();
    for (line, page) in lines {
        segmenter.feed(line, page);
    }
    segmenter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[PagedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    fn run(lines: &[&str]) -> ChapterSections {
        segment_lines(lines.iter().map(|l| (*l, 1)))
    }

    #[test]
    fn test_alternating_regions() {
        let sections = run(&[
            "QUESTIONS",
            "1 Foo?",
            "A. Opt",
            "ANSWERS",
            "1 A. Bar",
            "QUESTIONS",
            "2 Baz?",
        ]);
        assert_eq!(texts(&sections[&1].questions), vec!["1 Foo?", "A. Opt"]);
        assert_eq!(texts(&sections[&1].answers), vec!["1 A. Bar"]);
        assert_eq!(texts(&sections[&2].questions), vec!["2 Baz?"]);
        assert!(sections[&2].answers.is_empty());
    }

    #[test]
    fn test_lines_before_any_marker_are_questions() {
        let sections = run(&["1 Early?", "ANSWERS", "1 B. Yes"]);
        assert_eq!(texts(&sections[&1].questions), vec!["1 Early?"]);
        assert_eq!(texts(&sections[&1].answers), vec!["1 B. Yes"]);
    }

    #[test]
    fn test_marker_lines_are_dropped() {
        let sections = run(&["MAIN QUESTIONS", "Back", "1 Q?", "ANSWERS", "Back", "1 C. A"]);
        assert_eq!(texts(&sections[&1].questions), vec!["1 Q?"]);
        assert_eq!(texts(&sections[&1].answers), vec!["1 C. A"]);
    }

    #[test]
    fn test_introduction_is_skipped_until_questions() {
        let sections = run(&[
            "ANSWERS",
            "1 A. Last answer of chapter one",
            "INTRODUCTION",
            "Prose about the chapter.",
            "1 This looks like a question but is prose",
            "QUESTIONS",
            "1 Real question?",
        ]);
        assert_eq!(
            texts(&sections[&1].answers),
            vec!["1 A. Last answer of chapter one"]
        );
        assert_eq!(texts(&sections[&2].questions), vec!["1 Real question?"]);
    }

    #[test]
    fn test_introduction_prefix_is_kept() {
        let sections = run(&["tail of text INTRODUCTION more", "skipped", "QUESTIONS", "1 Q?"]);
        assert_eq!(texts(&sections[&1].questions), vec!["tail of text ", "1 Q?"]);
    }

    #[test]
    fn test_repeated_answers_marker_keeps_questions() {
        let sections = run(&["1 Q?", "ANSWERS", "1 A. a", "ANSWERS", "2 B. b"]);
        assert_eq!(texts(&sections[&1].questions), vec!["1 Q?"]);
        assert_eq!(texts(&sections[&1].answers), vec!["1 A. a", "2 B. b"]);
    }

    #[test]
    fn test_pages_follow_lines() {
        let lines = vec![("1 Q?", 30), ("ANSWERS", 31), ("1 D. d", 32)];
        let sections = segment_lines(lines);
        assert_eq!(sections[&1].questions, vec![PagedLine::new("1 Q?", 30)]);
        assert_eq!(sections[&1].answers, vec![PagedLine::new("1 D. d", 32)]);
    }

    #[test]
    fn test_final_answers_are_flushed() {
        let sections = run(&["1 Q?", "ANSWERS", "1 A. a", "2 A. b"]);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[&1].answers.len(), 2);
    }
}
