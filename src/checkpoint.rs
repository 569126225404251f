//! Per-page checkpoint cache for extracted column text
//!
//! Extraction is by far the slowest stage, so each page's columns are saved
//! as `page_{n}.json` and reused on the next run.

use crate::model::RawPage;
use crate::QaError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct PageCheckpoint {
    left_text: Option<String>,
    right_text: Option<String>,
}

/// Directory of page checkpoints
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn page_path(&self, page_number: u32) -> PathBuf {
        self.dir.join(format!("page_{}.json", page_number))
    }

    /// Load a page's columns, or `None` when the page was never saved
    pub fn load(&self, page_number: u32) -> Result<Option<RawPage>, QaError> {
        let path = self.page_path(page_number);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        let checkpoint: PageCheckpoint = serde_json::from_str(&data)?;
        Ok(Some(RawPage::new(
            page_number,
            checkpoint.left_text,
            checkpoint.right_text,
        )))
    }

    /// Save a page's columns, creating the directory if needed
    pub fn save(&self, page: &RawPage) -> Result<(), QaError> {
        fs::create_dir_all(&self.dir)?;
        let checkpoint = PageCheckpoint {
            left_text: page.left_text.clone(),
            right_text: page.right_text.clone(),
        };
        fs::write(
            self.page_path(page.page_number),
            serde_json::to_string(&checkpoint)?,
        )?;
        Ok(())
    }
}
