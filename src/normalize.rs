//! Text normalization for extracted column text
//!
//! This module provides:
//! - ASCII transliteration of smart punctuation, ligatures, accented and Greek letters
//! - Repair of words hyphenated across line breaks

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// ASCII replacements that take precedence over the general transliteration
static ASCII_FALLBACKS: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    // Quotes
    m.insert('\u{2018}', "'");
    m.insert('\u{2019}', "'");
    m.insert('\u{201A}', "'");
    m.insert('\u{201B}', "'");
    m.insert('\u{2032}', "'");
    m.insert('\u{201C}', "\"");
    m.insert('\u{201D}', "\"");
    m.insert('\u{201E}', "\"");
    m.insert('\u{2033}', "\"");
    m.insert('\u{00AB}', "<<");
    m.insert('\u{00BB}', ">>");

    // Dashes and hyphens
    m.insert('\u{2010}', "-");
    m.insert('\u{2011}', "-");
    m.insert('\u{2012}', "-");
    m.insert('\u{2013}', "-");
    m.insert('\u{2014}', "--");
    m.insert('\u{2015}', "--");
    m.insert('\u{2212}', "-");
    m.insert('\u{00AD}', "");

    // Spaces
    m.insert('\u{00A0}', " ");
    m.insert('\u{2009}', " ");
    m.insert('\u{202F}', " ");

    // Letters without decompositions
    m.insert('\u{00DF}', "ss");
    m.insert('\u{00C6}', "AE");
    m.insert('\u{00E6}', "ae");
    m.insert('\u{0152}', "OE");
    m.insert('\u{0153}', "oe");
    m.insert('\u{00D8}', "O");
    m.insert('\u{00F8}', "o");
    m.insert('\u{0141}', "L");
    m.insert('\u{0142}', "l");
    m.insert('\u{0110}', "D");
    m.insert('\u{0111}', "d");
    m.insert('\u{00D0}', "D");
    m.insert('\u{00F0}', "d");
    m.insert('\u{00DE}', "Th");
    m.insert('\u{00FE}', "th");
    m.insert('\u{03BC}', "u");
    m.insert('\u{00B5}', "u");

    // Symbols common in clinical text
    m.insert('\u{2022}', "*");
    m.insert('\u{00B7}', "*");
    m.insert('\u{00B0}', "deg");
    m.insert('\u{00B1}', "+-");
    m.insert('\u{00D7}', "x");
    m.insert('\u{00F7}', "/");
    m.insert('\u{2044}', "/");
    m.insert('\u{2190}', "<-");
    m.insert('\u{2192}', "->");
    m.insert('\u{2191}', "^");
    m.insert('\u{2193}', "v");
    m.insert('\u{2264}', "<=");
    m.insert('\u{2265}', ">=");
    m.insert('\u{2260}', "!=");
    m.insert('\u{2248}', "~");
    m.insert('\u{00A9}', "(c)");
    m.insert('\u{00AE}', "(r)");
    m.insert('\u{2122}', "TM");

    m
});

/// Transliterate text to ASCII.
///
/// Characters with an explicit fallback use it; everything else goes through
/// `deunicode` (ligatures split, accents stripped, Greek spelled in Latin
/// letters). Characters it has no mapping for are dropped.
pub fn sanitize(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii() {
            out.push(c);
        } else if let Some(replacement) = ASCII_FALLBACKS.get(&c) {
            out.push_str(replacement);
        } else if let Some(replacement) = deunicode::deunicode_char(c) {
            out.push_str(replacement);
        } else {
            log::debug!("No ASCII equivalent for {:?}; dropping it", c);
        }
    }
    out
}

/// Join words hyphenated across line breaks.
///
/// Lines are trimmed; a line ending in `-` loses the hyphen and absorbs the
/// next line with no space in between. Lines that are blank after trimming
/// are dropped. A hyphen on the very last line is kept.
pub fn repair_breaks<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    repair_breaks_with_pages(lines.iter().map(|l| (l.as_ref(), 0)))
        .into_iter()
        .map(|(line, _)| line)
        .collect()
}

/// Same as [`repair_breaks`], carrying each line's source page.
///
/// A merged line takes the page of the last raw line it absorbed.
pub fn repair_breaks_with_pages<I, S>(lines: I) -> Vec<(String, u32)>
where
    I: IntoIterator<Item = (S, u32)>,
    S: AsRef<str>,
{
    let mut repaired = Vec::new();
    let mut pending: Option<(String, u32)> = None;

    for (raw, page) in lines {
        let line = raw.as_ref().trim();
        pending = Some(match pending.take() {
            Some((mut prev, _)) if prev.ends_with('-') => {
                prev.pop();
                prev.push_str(line);
                (prev, page)
            }
            Some(prev) => {
                if !prev.0.is_empty() {
                    repaired.push(prev);
                }
                (line.to_string(), page)
            }
            None => (line.to_string(), page),
        });
    }

    if let Some(last) = pending {
        if !last.0.is_empty() {
            repaired.push(last);
        }
    }

    repaired
}
