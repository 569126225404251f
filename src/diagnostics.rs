//! Debug dumps of the reconstructed document and of every parsed record
//!
//! None of this affects the output rows; it exists to track down parser
//! drift by diffing what each stage saw.

use crate::model::{Answer, Question};
use crate::stream::PageStream;
use crate::QaError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Output directory for diagnostic dumps
#[derive(Debug, Clone)]
pub struct DiagnosticsDump {
    dir: PathBuf,
}

impl DiagnosticsDump {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn chapter_dir(&self, chapter: u32) -> Result<PathBuf, QaError> {
        let dir = self.dir.join(format!("chapter_{}", chapter));
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn write_json<T: Serialize>(path: PathBuf, record: &T) -> Result<(), QaError> {
        fs::write(path, serde_json::to_string_pretty(record)?)?;
        Ok(())
    }

    /// Write the reconstructed line stream to `document.txt`
    pub fn write_document(&self, stream: &PageStream) -> Result<(), QaError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.dir.join("document.txt"), stream.text())?;
        Ok(())
    }

    pub fn write_question(&self, question: &Question) -> Result<(), QaError> {
        let dir = self.chapter_dir(question.chapter)?;
        Self::write_json(
            dir.join(format!("question_{}.json", question.question_number)),
            question,
        )
    }

    pub fn write_answer(&self, answer: &Answer) -> Result<(), QaError> {
        let dir = self.chapter_dir(answer.chapter)?;
        Self::write_json(
            dir.join(format!("answer_{}.json", answer.question_number)),
            answer,
        )
    }
}
