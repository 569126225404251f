//! Parsing a chapter's answer region into answer records
//!
//! An answer starts with the question number and the correct letter on one
//! line (`12 C. The ulnar nerve...`); following lines continue the
//! explanation.

use crate::model::Answer;
use crate::questions::NumberSequence;
use crate::segmenter::PagedLine;
use once_cell::sync::Lazy;
use regex::Regex;

static ANSWER_START_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s+([A-Z])\.\s+(.+)").unwrap());

#[derive(Debug)]
struct OpenAnswer {
    number: u32,
    letter: char,
    body: Vec<String>,
}

impl OpenAnswer {
    fn close(self, chapter: u32, page_number: u32) -> Answer {
        Answer {
            chapter,
            page_number,
            question_number: self.number,
            answer_letter: self.letter,
            text: self.body.join(" "),
        }
    }
}

/// Parse one chapter's answer lines into answers, in document order
pub fn parse_answers(lines: &[PagedLine], chapter: u32) -> Vec<Answer> {
    let mut sequence = NumberSequence::default();
    let mut open: Option<OpenAnswer> = None;
    let mut last_page = 0;
    let mut answers = Vec::new();

    for PagedLine { text, page } in lines {
        last_page = *page;
        let line = text.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = ANSWER_START_RE.captures(line) {
            let number = sequence.accept(&caps[1], "Answer", chapter);
            if let Some(done) = open.take() {
                answers.push(done.close(chapter, *page));
            }
            open = Some(OpenAnswer {
                number,
                letter: caps[2].chars().next().unwrap_or('?'),
                body: vec![caps[3].to_string()],
            });
            continue;
        }

        match open.as_mut() {
            Some(answer) => answer.body.push(line.to_string()),
            None => log::debug!(
                "Dropping text before first answer in chapter {}: {:?}",
                chapter,
                line
            ),
        }
    }

    if let Some(done) = open {
        answers.push(done.close(chapter, last_page));
    }

    answers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[(&str, u32)]) -> Vec<PagedLine> {
        raw.iter().map(|(t, p)| PagedLine::new(*t, *p)).collect()
    }

    #[test]
    fn test_answer_with_continuation() {
        let input = lines(&[
            ("12 C. The ulnar nerve", 50),
            ("supplies the hypothenar muscles.", 50),
        ]);
        let answers = parse_answers(&input, 2);
        assert_eq!(answers.len(), 1);
        let a = &answers[0];
        assert_eq!(a.chapter, 2);
        assert_eq!(a.question_number, 12);
        assert_eq!(a.answer_letter, 'C');
        assert_eq!(
            a.text,
            "The ulnar nerve supplies the hypothenar muscles."
        );
    }

    #[test]
    fn test_sequential_answers() {
        let input = lines(&[
            ("1 A. First", 60),
            ("more", 60),
            ("2 D. Second", 61),
            ("3 B. Third", 62),
        ]);
        let answers = parse_answers(&input, 1);
        let summary: Vec<(u32, char, u32)> = answers
            .iter()
            .map(|a| (a.question_number, a.answer_letter, a.page_number))
            .collect();
        assert_eq!(summary, vec![(1, 'A', 61), (2, 'D', 62), (3, 'B', 62)]);
        assert_eq!(answers[0].text, "First more");
    }

    #[test]
    fn test_number_without_letter_is_continuation() {
        let input = lines(&[("1 B. Explanation", 1), ("20 percent of cases", 1)]);
        let answers = parse_answers(&input, 1);
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].text, "Explanation 20 percent of cases");
    }

    #[test]
    fn test_answer_numbering_clamped() {
        let input = lines(&[("1 A. a", 1), ("2 B. b", 1), ("30 C. c", 1)]);
        let numbers: Vec<u32> = parse_answers(&input, 1)
            .iter()
            .map(|a| a.question_number)
            .collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_region() {
        assert!(parse_answers(&[], 1).is_empty());
        let input = lines(&[("Explanatory preface", 1)]);
        assert!(parse_answers(&input, 1).is_empty());
    }
}
