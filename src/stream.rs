//! Reconstruction of the document line stream from per-page column text

use crate::model::RawPage;
use crate::normalize::{repair_breaks_with_pages, sanitize};

/// The whole document as one ordered sequence of lines, each tagged with
/// the page it came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStream {
    pub lines: Vec<String>,
    /// `page_of_line[i]` is the source page of `lines[i]`
    pub page_of_line: Vec<u32>,
}

impl PageStream {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn page_of(&self, index: usize) -> Option<u32> {
        self.page_of_line.get(index).copied()
    }

    /// Iterate `(line, page)` pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.lines
            .iter()
            .map(String::as_str)
            .zip(self.page_of_line.iter().copied())
    }

    /// The reconstructed document text
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Merge pages into one line stream.
///
/// Pages must already be in ascending page order. Each page contributes its
/// sanitized left column, then its right column; hyphenation is repaired once
/// over the whole document so words split across columns or pages rejoin.
pub fn build_stream(pages: &[RawPage]) -> PageStream {
    let mut raw: Vec<(String, u32)> = Vec::new();

    for page in pages {
        let left = page.left_text.as_deref().map(sanitize).unwrap_or_default();
        let right = page.right_text.as_deref().map(sanitize).unwrap_or_default();
        let combined = format!("{}\n{}\n", left, right);
        raw.extend(
            combined
                .split('\n')
                .map(|line| (line.to_string(), page.page_number)),
        );
    }

    let (lines, page_of_line): (Vec<String>, Vec<u32>) =
        repair_breaks_with_pages(raw).into_iter().unzip();
    PageStream {
        lines,
        page_of_line,
    }
}
