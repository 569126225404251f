//! Column text extraction from PDF using lopdf
//!
//! Each page is split into a left and a right column box. Text items are
//! pulled from the content stream with their positions, assigned to a box,
//! and grouped back into lines in stream order.

use crate::checkpoint::CheckpointStore;
use crate::model::RawPage;
use crate::QaError;
use lopdf::{Document, Object, ObjectId};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Page height used when a page carries no usable MediaBox
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// A text item with position information
#[derive(Debug, Clone)]
pub struct TextItem {
    /// The text content
    pub text: String,
    /// X position on page
    pub x: f32,
    /// Y position on page (PDF coordinates, origin at bottom-left)
    pub y: f32,
    /// 0-based page index
    pub page: u32,
}

/// A line of text (grouped text items)
#[derive(Debug, Clone)]
pub struct TextLine {
    pub items: Vec<TextItem>,
    pub y: f32,
    pub page: u32,
}

impl TextLine {
    pub fn text(&self) -> String {
        self.items
            .iter()
            .map(|i| i.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A rectangular region of a page in top-left origin points
/// (`top` and `bottom` are measured down from the top edge)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBox {
    pub x0: f32,
    pub top: f32,
    pub x1: f32,
    pub bottom: f32,
}

impl ColumnBox {
    pub const fn new(x0: f32, top: f32, x1: f32, bottom: f32) -> Self {
        Self { x0, top, x1, bottom }
    }

    /// Whether a point in PDF coordinates falls inside the box
    pub fn contains(&self, x: f32, y: f32, page_height: f32) -> bool {
        let from_top = page_height - y;
        x >= self.x0 && x < self.x1 && from_top >= self.top && from_top <= self.bottom
    }

    fn is_valid(&self) -> bool {
        self.x0 < self.x1 && self.top < self.bottom
    }
}

/// Configuration for column extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Left column region
    pub left: ColumnBox,
    /// Right column region
    pub right: ColumnBox,
    /// First page index to extract (earlier pages are front matter)
    pub start_page: u32,
    /// Page index to stop before, or `None` to run to the end of the document
    pub end_page: Option<u32>,
    /// Number of parallel workers
    pub workers: usize,
    /// Directory for per-page checkpoints, if caching is wanted
    pub checkpoint_dir: Option<PathBuf>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            left: ColumnBox::new(0.0, 0.0, 300.0, 783.0),
            right: ColumnBox::new(300.0, 0.0, 611.64, 783.0),
            start_page: 14,
            end_page: None,
            workers: 8,
            checkpoint_dir: None,
        }
    }
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<(), QaError> {
        if self.workers == 0 {
            return Err(QaError::InvalidConfig("workers must be at least 1".into()));
        }
        if !self.left.is_valid() || !self.right.is_valid() {
            return Err(QaError::InvalidConfig("column box has no area".into()));
        }
        Ok(())
    }

    /// Exclusive upper page index for a document of `total_pages` pages
    pub fn page_limit(&self, total_pages: u32) -> u32 {
        self.end_page.map_or(total_pages, |end| end.min(total_pages))
    }
}

/// Split `[start_page, total_pages)` into one contiguous range per worker.
///
/// The last worker takes the remainder. Workers beyond the number of pages
/// get empty ranges.
pub fn distribute_page_ranges(total_pages: u32, workers: usize, start_page: u32) -> Vec<Range<u32>> {
    log::info!("Distributing pages among workers...");
    let workers = workers.max(1) as u32;
    let start = start_page.min(total_pages);
    let per_worker = (total_pages - start) / workers;

    (0..workers)
        .map(|i| {
            let from = start + i * per_worker;
            let to = if i == workers - 1 {
                total_pages
            } else {
                start + (i + 1) * per_worker
            };
            log::info!("Worker {} will process pages {:?}", i, from..to);
            from..to
        })
        .collect()
}

/// Extract left/right column text for every page from `start_page` on
pub fn extract_columns<P: AsRef<Path>>(path: P, config: &ExtractConfig) -> Result<Vec<RawPage>, QaError> {
    let buffer = std::fs::read(path)?;
    extract_columns_mem(&buffer, config)
}

/// Extract column text from a PDF held in memory.
///
/// Page ranges run in parallel, each worker on its own parsed copy of the
/// document. The result is sorted by page number.
pub fn extract_columns_mem(buffer: &[u8], config: &ExtractConfig) -> Result<Vec<RawPage>, QaError> {
    config.validate()?;

    let total_pages = Document::load_mem(buffer)?.get_pages().len() as u32;
    let ranges = distribute_page_ranges(
        config.page_limit(total_pages),
        config.workers,
        config.start_page,
    );
    let checkpoints = config.checkpoint_dir.as_ref().map(CheckpointStore::new);

    log::info!("Workers have started processing pages...");
    let chunks = ranges
        .into_par_iter()
        .enumerate()
        .map(|(worker, range)| {
            let pages = extract_page_range(buffer, range, total_pages, config, checkpoints.as_ref())?;
            log::info!("Worker {} finished {} pages", worker, pages.len());
            Ok(pages)
        })
        .collect::<Result<Vec<Vec<RawPage>>, QaError>>()?;
    log::info!("All workers have completed processing pages.");

    let mut pages: Vec<RawPage> = chunks.into_iter().flatten().collect();
    pages.sort_by_key(|p| p.page_number);
    Ok(pages)
}

/// Extract one worker's page range
fn extract_page_range(
    buffer: &[u8],
    range: Range<u32>,
    total_pages: u32,
    config: &ExtractConfig,
    checkpoints: Option<&CheckpointStore>,
) -> Result<Vec<RawPage>, QaError> {
    let mut results = Vec::with_capacity(range.len());
    let mut missing = Vec::new();

    for page_number in range {
        if page_number >= total_pages {
            return Err(QaError::PageOutOfRange {
                page: page_number,
                total: total_pages,
            });
        }
        match checkpoints.map(|c| c.load(page_number)).transpose()?.flatten() {
            Some(cached) => {
                log::info!("Loaded checkpoint for page {}", page_number);
                results.push(cached);
            }
            None => missing.push(page_number),
        }
    }

    // A fully cached range never parses the PDF
    if missing.is_empty() {
        return Ok(results);
    }

    let doc = Document::load_mem(buffer)?;
    let page_ids = doc.get_pages();

    for page_number in missing {
        let page_id = *page_ids
            .get(&(page_number + 1))
            .ok_or(QaError::PageOutOfRange {
                page: page_number,
                total: total_pages,
            })?;
        let page = extract_page_columns(&doc, page_id, page_number, config)?;

        if let Some(store) = checkpoints {
            store.save(&page)?;
        }
        log::info!("Extracted columns for page {}", page_number);
        results.push(page);
    }

    Ok(results)
}

/// Extract both columns of a single page
pub fn extract_page_columns(
    doc: &Document,
    page_id: ObjectId,
    page_number: u32,
    config: &ExtractConfig,
) -> Result<RawPage, QaError> {
    let items = extract_page_text_items(doc, page_id, page_number)?;
    let height = page_height(doc, page_id);

    let column_text = |column: &ColumnBox| -> Option<String> {
        let col_items: Vec<TextItem> = items
            .iter()
            .filter(|i| column.contains(i.x, i.y, height))
            .cloned()
            .collect();
        let lines = group_single_column(col_items);
        if lines.is_empty() {
            None
        } else {
            Some(lines.iter().map(TextLine::text).collect::<Vec<_>>().join("\n"))
        }
    };

    Ok(RawPage::new(
        page_number,
        column_text(&config.left),
        column_text(&config.right),
    ))
}

/// Height of the page's MediaBox, falling back to US Letter
fn page_height(doc: &Document, page_id: ObjectId) -> f32 {
    doc.get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"MediaBox").ok())
        .and_then(|obj| obj.as_array().ok())
        .filter(|rect| rect.len() == 4)
        .and_then(|rect| Some(get_number(&rect[3])? - get_number(&rect[1])?))
        .filter(|h| *h > 0.0)
        .unwrap_or(DEFAULT_PAGE_HEIGHT)
}

/// Multiply two 2D transformation matrices
/// Matrix format: [a, b, c, d, e, f] representing:
/// | a  b  0 |
/// | c  d  0 |
/// | e  f  1 |
fn multiply_matrices(m1: &[f32; 6], m2: &[f32; 6]) -> [f32; 6] {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

/// Extract positioned text items from a single page
pub fn extract_page_text_items(
    doc: &Document,
    page_id: ObjectId,
    page_number: u32,
) -> Result<Vec<TextItem>, QaError> {
    use lopdf::content::Content;

    let mut items = Vec::new();

    let fonts = doc.get_page_fonts(page_id).unwrap_or_default();

    let content_data = doc
        .get_page_content(page_id)
        .map_err(|e| QaError::Parse(e.to_string()))?;
    let content = Content::decode(&content_data).map_err(|e| QaError::Parse(e.to_string()))?;

    let mut ctm = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut ctm_stack: Vec<[f32; 6]> = Vec::new();

    let mut current_font = String::new();
    let mut current_font_size: f32 = 12.0;
    let mut text_matrix = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut line_matrix = [1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
    let mut in_text_block = false;

    let mut push_item = |text: String, text_matrix: &[f32; 6], ctm: &[f32; 6]| {
        if text.trim().is_empty() {
            return;
        }
        let combined = multiply_matrices(text_matrix, ctm);
        items.push(TextItem {
            text,
            x: combined[4],
            y: combined[5],
            page: page_number,
        });
    };

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => ctm_stack.push(ctm),
            "Q" => {
                if let Some(saved) = ctm_stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let new_matrix = [
                        get_number(&op.operands[0]).unwrap_or(1.0),
                        get_number(&op.operands[1]).unwrap_or(0.0),
                        get_number(&op.operands[2]).unwrap_or(0.0),
                        get_number(&op.operands[3]).unwrap_or(1.0),
                        get_number(&op.operands[4]).unwrap_or(0.0),
                        get_number(&op.operands[5]).unwrap_or(0.0),
                    ];
                    ctm = multiply_matrices(&new_matrix, &ctm);
                }
            }
            "BT" => {
                in_text_block = true;
                text_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
                line_matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
            }
            "ET" => in_text_block = false,
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let Ok(name) = op.operands[0].as_name() {
                        current_font = String::from_utf8_lossy(name).to_string();
                    }
                    if let Some(size) = get_number(&op.operands[1]) {
                        current_font_size = size;
                    }
                }
            }
            "Td" | "TD" => {
                if op.operands.len() >= 2 {
                    line_matrix[4] += get_number(&op.operands[0]).unwrap_or(0.0);
                    line_matrix[5] += get_number(&op.operands[1]).unwrap_or(0.0);
                    text_matrix = line_matrix;
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    for (i, operand) in op.operands.iter().take(6).enumerate() {
                        text_matrix[i] =
                            get_number(operand).unwrap_or(if i == 0 || i == 3 { 1.0 } else { 0.0 });
                    }
                    line_matrix = text_matrix;
                }
            }
            "T*" => {
                // Approximate leading
                line_matrix[5] -= current_font_size * 1.2;
                text_matrix = line_matrix;
            }
            "Tj" => {
                if in_text_block && !op.operands.is_empty() {
                    if let Some(text) =
                        extract_text_from_operand(&op.operands[0], doc, &fonts, &current_font)
                    {
                        push_item(text, &text_matrix, &ctm);
                    }
                }
            }
            "TJ" => {
                if in_text_block && !op.operands.is_empty() {
                    if let Ok(array) = op.operands[0].as_array() {
                        let combined_text: String = array
                            .iter()
                            .filter_map(|item| {
                                extract_text_from_operand(item, doc, &fonts, &current_font)
                            })
                            .collect();
                        push_item(combined_text, &text_matrix, &ctm);
                    }
                }
            }
            "'" => {
                line_matrix[5] -= current_font_size * 1.2;
                text_matrix = line_matrix;
                if !op.operands.is_empty() {
                    if let Some(text) =
                        extract_text_from_operand(&op.operands[0], doc, &fonts, &current_font)
                    {
                        push_item(text, &text_matrix, &ctm);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(items)
}

/// Helper to get f32 from Object
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decode a string operand using the current font's encoding
fn extract_text_from_operand(
    obj: &Object,
    doc: &Document,
    fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
    current_font: &str,
) -> Option<String> {
    let Object::String(bytes, _) = obj else {
        return None;
    };

    if let Some(font_dict) = fonts.get(current_font.as_bytes()) {
        if let Ok(encoding) = font_dict.get_font_encoding(doc) {
            if let Ok(text) = Document::decode_text(&encoding, bytes) {
                return Some(text);
            }
        }
    }

    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return Some(String::from_utf16_lossy(&utf16));
    }

    // Latin-1
    Some(bytes.iter().map(|&b| b as char).collect())
}

/// Group items from one column into lines.
///
/// Keeps PDF stream order (normally reading order) and only merges
/// consecutive items sharing a baseline, which are then sorted left to right.
pub fn group_single_column(items: Vec<TextItem>) -> Vec<TextLine> {
    let y_tolerance = 3.0;
    let mut lines: Vec<TextLine> = Vec::new();

    for item in items {
        match lines.last_mut() {
            Some(last) if last.page == item.page && (last.y - item.y).abs() < y_tolerance => {
                last.items.push(item);
            }
            _ => {
                let (y, page) = (item.y, item.page);
                lines.push(TextLine {
                    items: vec![item],
                    y,
                    page,
                });
            }
        }
    }

    for line in &mut lines {
        line.items
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    }

    lines
}
