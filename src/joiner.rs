//! Pairing questions with answers by (chapter, question number)

use crate::model::{Answer, OutputRow, Question, RecordKey};
use std::collections::{HashMap, HashSet};

/// A record left without a partner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unmatched {
    pub key: RecordKey,
    /// Page the record was found on
    pub page_number: u32,
}

/// Result of joining questions and answers
#[derive(Debug, Clone, Default)]
pub struct JoinReport {
    pub rows: Vec<OutputRow>,
    /// Questions with no answer
    pub unanswered: Vec<Unmatched>,
    /// Answers with no question
    pub orphan_answers: Vec<Unmatched>,
}

type AnswersByChapter<'a> = HashMap<u32, HashMap<u32, &'a Answer>>;

fn lookup<'a>(answers: &AnswersByChapter<'a>, chapter: u32, number: u32) -> Option<&'a Answer> {
    answers.get(&chapter).and_then(|bucket| bucket.get(&number)).copied()
}

/// Whether a question and the answer looked up for it describe the same record
fn is_same_record(question: &Question, answer: &Answer) -> bool {
    question.chapter == answer.chapter && question.question_number == answer.question_number
}

/// Join questions and answers into output rows.
///
/// Rows follow question order. A repeated key keeps the last record seen for
/// it. The row's page is the answer's page.
pub fn join(questions: &[Question], answers: &[Answer]) -> JoinReport {
    let mut report = JoinReport::default();

    // chapter -> question number -> answer
    let mut answers_by_chapter: AnswersByChapter = HashMap::new();
    for answer in answers {
        let bucket = answers_by_chapter.entry(answer.chapter).or_default();
        if bucket.insert(answer.question_number, answer).is_some() {
            log::warn!(
                "Duplicate answer {} in chapter {} on page {}; keeping the last one.",
                answer.question_number,
                answer.chapter,
                answer.page_number
            );
        }
    }

    let mut last_question_index: HashMap<RecordKey, usize> = HashMap::with_capacity(questions.len());
    for (i, question) in questions.iter().enumerate() {
        if last_question_index.insert(question.key(), i).is_some() {
            log::warn!(
                "Duplicate question {} in chapter {} on page {}; keeping the last one.",
                question.question_number,
                question.chapter,
                question.page_number
            );
        }
    }

    for (i, question) in questions.iter().enumerate() {
        let key = question.key();
        if last_question_index.get(&key) != Some(&i) {
            continue;
        }

        let Some(answer) = lookup(&answers_by_chapter, question.chapter, question.question_number) else {
            log::warn!(
                "No answer found for question {} in chapter {} page {}.",
                question.question_number,
                question.chapter,
                question.page_number
            );
            report.unanswered.push(Unmatched {
                key,
                page_number: question.page_number,
            });
            continue;
        };

        if !is_same_record(question, answer) {
            log::error!(
                "Answer {:?} paired with question {:?}; skipping record.",
                answer.key(),
                key
            );
            continue;
        }

        report.rows.push(OutputRow {
            page_number: answer.page_number,
            chapter: question.chapter,
            question_number: question.question_number,
            question_text: question.text.clone(),
            question_options: question.formatted_options(),
            answer_letter: answer.answer_letter,
            answer_text: answer.text.clone(),
        });
    }

    let question_keys: HashSet<RecordKey> = last_question_index.into_keys().collect();
    for answer in answers {
        let key = answer.key();
        let is_kept = lookup(&answers_by_chapter, answer.chapter, answer.question_number)
            .is_some_and(|kept| std::ptr::eq(kept, answer));
        if question_keys.contains(&key) || !is_kept {
            continue;
        }
        log::warn!(
            "Answer found for question {} in chapter {} page {} but question not found.",
            answer.question_number,
            answer.chapter,
            answer.page_number
        );
        report.orphan_answers.push(Unmatched {
            key,
            page_number: answer.page_number,
        });
    }

    log::info!("Processed {} question-answer pairs.", report.rows.len());
    report
}
