//! Line-oriented parsing of texture atlas descriptions
//!
//! The format groups regions under pages. A nameless line opens a page
//! when no page is active, and a region otherwise; `key: value` lines
//! assign fields to whichever record is active; a blank line closes
//! both. Field lines after the first region that do not name a region
//! field fall through to the page, which is how the format spells
//! trailing page-scoped keys.

use std::io::BufRead;

use thiserror::Error;

use crate::atlas::{Atlas, AtlasError};
use crate::models::{FieldValue, Page, PageId, Region, SchemaError};

/// Error type for parsing failures, carrying the 1-based line number.
#[derive(Debug, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ErrorKind,
}

/// What went wrong on a line.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A field value failed its type-specific decode
    #[error("field '{key}' expects {expected}, got '{value}'")]
    MalformedField { key: String, expected: &'static str, value: String },
    /// A `key: value` line arrived before any page declaration
    #[error("field line '{line}' before any page declaration")]
    UnexpectedContext { line: String },
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Scanner context: which record field lines currently apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NoContext,
    InPage(PageId),
    InRegion(PageId),
}

/// Stateful line scanner building an [`Atlas`] incrementally.
///
/// Feed lines in file order, then call [`finish`](AtlasParser::finish).
/// Every record is committed to the atlas the moment its declaration
/// line is seen; subsequent field lines mutate it in place. Errors are
/// fatal - the parse has no recovery path.
#[derive(Debug)]
pub struct AtlasParser {
    atlas: Atlas,
    state: State,
}

impl AtlasParser {
    pub fn new() -> Self {
        AtlasParser { atlas: Atlas::new(), state: State::NoContext }
    }

    /// Consume one line. `line_no` is 1-based and only used in errors.
    pub fn feed(&mut self, raw: &str, line_no: usize) -> Result<(), ParseError> {
        let line = raw.trim();
        if line.is_empty() {
            self.state = State::NoContext;
            return Ok(());
        }
        match line.split_once(':') {
            Some((key, value)) => self.assign(key.trim(), value.trim(), line, line_no),
            None => self.declare(line, line_no),
        }
    }

    /// Finish the parse and hand back the atlas.
    pub fn finish(self) -> Atlas {
        self.atlas
    }

    /// A nameless line: a page when no context is active, a region
    /// under the current page otherwise.
    fn declare(&mut self, name: &str, line_no: usize) -> Result<(), ParseError> {
        match self.state {
            State::NoContext => {
                let id = self.atlas.insert_page(Page::new(name));
                self.state = State::InPage(id);
            }
            State::InPage(id) | State::InRegion(id) => {
                self.atlas
                    .add_region(Region::new(id, name))
                    .map_err(|e| ParseError { line: line_no, kind: e.into() })?;
                self.state = State::InRegion(id);
            }
        }
        Ok(())
    }

    /// A `key: value` line, dispatched on the active context.
    fn assign(
        &mut self,
        key: &str,
        value: &str,
        raw_line: &str,
        line_no: usize,
    ) -> Result<(), ParseError> {
        match self.state {
            State::NoContext => Err(ParseError {
                line: line_no,
                kind: ErrorKind::UnexpectedContext { line: raw_line.to_string() },
            }),
            State::InPage(id) => self.assign_page_field(id, key, value, line_no),
            State::InRegion(id) => self.assign_region_field(id, key, value, line_no),
        }
    }

    /// Page decoder table: `size` and `filter` decode as pairs, every
    /// other key takes the arbitrary-assignment path.
    fn assign_page_field(
        &mut self,
        id: PageId,
        key: &str,
        value: &str,
        line_no: usize,
    ) -> Result<(), ParseError> {
        match key {
            "size" => {
                let (w, h) = int_pair(line_no, key, value)?;
                let page = self.page_mut(id, line_no)?;
                page.width = Some(w);
                page.height = Some(h);
            }
            "filter" => {
                let (min, mag) = split_pair(line_no, key, value)?;
                let page = self.page_mut(id, line_no)?;
                page.min_filter = Some(min.to_string());
                page.mag_filter = Some(mag.to_string());
            }
            _ => return self.assign_page_arbitrary(id, key, value, line_no),
        }
        Ok(())
    }

    /// Region decoder table. Keys outside it are page assignments: the
    /// format allows page-scoped keys to trail the first region, so the
    /// fallthrough goes to the region's page, never to the region.
    fn assign_region_field(
        &mut self,
        id: PageId,
        key: &str,
        value: &str,
        line_no: usize,
    ) -> Result<(), ParseError> {
        match key {
            "rotate" => {
                // Only the literal `false` decodes to false
                self.active_region(id).rotate = Some(value != "false");
            }
            "xy" => {
                let (x, y) = int_pair(line_no, key, value)?;
                let region = self.active_region(id);
                region.x = Some(x);
                region.y = Some(y);
            }
            "size" => {
                let (w, h) = int_pair(line_no, key, value)?;
                let region = self.active_region(id);
                region.width = Some(w);
                region.height = Some(h);
            }
            "orig" => {
                let (w, h) = int_pair(line_no, key, value)?;
                let region = self.active_region(id);
                region.orig_width = Some(w);
                region.orig_height = Some(h);
            }
            "offset" => {
                let (x, y) = int_pair(line_no, key, value)?;
                let region = self.active_region(id);
                region.offset_x = Some(x);
                region.offset_y = Some(y);
            }
            "index" => {
                self.active_region(id).index = Some(parse_int(line_no, key, value)?);
            }
            _ => return self.assign_page_arbitrary(id, key, value, line_no),
        }
        Ok(())
    }

    /// Arbitrary assignment on a page: a typed string field when the
    /// key names one, the extras map otherwise.
    fn assign_page_arbitrary(
        &mut self,
        id: PageId,
        key: &str,
        value: &str,
        line_no: usize,
    ) -> Result<(), ParseError> {
        let page = self.page_mut(id, line_no)?;
        if page.set(key, FieldValue::Str(value.to_string())).is_err() {
            page.set_extra(key, value);
        }
        Ok(())
    }

    fn page_mut(&mut self, id: PageId, line_no: usize) -> Result<&mut Page, ParseError> {
        self.atlas.page_mut(id).map_err(|e| ParseError { line: line_no, kind: e.into() })
    }

    fn active_region(&mut self, id: PageId) -> &mut Region {
        match self.atlas.last_region_mut(id) {
            Some(region) => region,
            // InRegion is only entered after a successful add_region
            None => unreachable!(),
        }
    }
}

impl Default for AtlasParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an atlas description, reading the lines to exhaustion.
pub fn parse_atlas<R: BufRead>(reader: R) -> Result<Atlas, ParseError> {
    let mut parser = AtlasParser::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ParseError { line: i + 1, kind: e.into() })?;
        parser.feed(&line, i + 1)?;
    }
    Ok(parser.finish())
}

/// Split a pair value on the first comma only, trimming both sides.
fn split_pair<'a>(
    line: usize,
    key: &str,
    value: &'a str,
) -> Result<(&'a str, &'a str), ParseError> {
    match value.split_once(',') {
        Some((a, b)) => Ok((a.trim(), b.trim())),
        None => Err(malformed(line, key, "a comma-separated pair", value)),
    }
}

fn int_pair(line: usize, key: &str, value: &str) -> Result<(i64, i64), ParseError> {
    let (a, b) = split_pair(line, key, value)?;
    Ok((parse_int(line, key, a)?, parse_int(line, key, b)?))
}

fn parse_int(line: usize, key: &str, text: &str) -> Result<i64, ParseError> {
    text.parse().map_err(|_| malformed(line, key, "an integer", text))
}

fn malformed(line: usize, key: &str, expected: &'static str, value: &str) -> ParseError {
    ParseError {
        line,
        kind: ErrorKind::MalformedField {
            key: key.to_string(),
            expected,
            value: value.to_string(),
        },
    }
}
