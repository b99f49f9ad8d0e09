//! Data models for atlas records (pages and regions)
//!
//! Both record types carry a fixed, closed set of typed fields. A field
//! that was never assigned is absent, which is distinct from holding a
//! zero or empty value, for both equality and serialized output. Pages
//! additionally carry an `extras` map for keys the atlas format allows
//! to be assigned freely outside the typed schema.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Typed field names accepted by [`Page::set`].
pub const PAGE_FIELDS: &[&str] =
    &["name", "format", "min_filter", "mag_filter", "width", "height", "repeat"];

/// Typed field names accepted by [`Region::set`].
pub const REGION_FIELDS: &[&str] = &[
    "name",
    "rotate",
    "x",
    "y",
    "width",
    "height",
    "orig_width",
    "orig_height",
    "offset_x",
    "offset_y",
    "index",
];

/// Error for a field name or value rejected at record construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The field name is not part of the record's schema
    #[error("{record} has no field '{field}'")]
    UnknownField { record: &'static str, field: String },
    /// The field exists but cannot hold a value of this shape
    #[error("{record} field '{field}' cannot hold '{value}'")]
    InvalidValue { record: &'static str, field: String, value: String },
}

impl SchemaError {
    fn reject(record: &'static str, known: &[&str], field: &str, value: &FieldValue) -> Self {
        if known.contains(&field) {
            SchemaError::InvalidValue {
                record,
                field: field.to_string(),
                value: value.to_string(),
            }
        } else {
            SchemaError::UnknownField { record, field: field.to_string() }
        }
    }
}

/// A record field value read or assigned generically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// Non-owning handle to a page in an atlas page table.
///
/// Holding a `PageId` never keeps a page alive; resolving one is a
/// table lookup on the atlas that fails if the index is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PageId(usize);

impl PageId {
    pub fn new(index: usize) -> Self {
        PageId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One packed source image and its rendering attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mag_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<String>,
    /// Keys assigned outside the typed schema, in sorted order
    #[serde(flatten)]
    pub extras: BTreeMap<String, String>,
}

impl Page {
    /// Create a page with only its name set.
    pub fn new(name: impl Into<String>) -> Self {
        Page {
            name: name.into(),
            format: None,
            min_filter: None,
            mag_filter: None,
            width: None,
            height: None,
            repeat: None,
            extras: BTreeMap::new(),
        }
    }

    /// Build a page from named field values.
    ///
    /// Every key must name a typed field and carry a value of the right
    /// shape; anything else is a [`SchemaError`]. The extras map is not
    /// reachable from here.
    pub fn from_fields<I, K>(name: impl Into<String>, fields: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: AsRef<str>,
    {
        let mut page = Page::new(name);
        for (key, value) in fields {
            page.set(key.as_ref(), value)?;
        }
        Ok(page)
    }

    /// Assign a typed field by name.
    pub fn set(&mut self, key: &str, value: FieldValue) -> Result<(), SchemaError> {
        match (key, value) {
            ("name", FieldValue::Str(s)) => self.name = s,
            ("format", FieldValue::Str(s)) => self.format = Some(s),
            ("min_filter", FieldValue::Str(s)) => self.min_filter = Some(s),
            ("mag_filter", FieldValue::Str(s)) => self.mag_filter = Some(s),
            ("width", FieldValue::Int(n)) => self.width = Some(n),
            ("height", FieldValue::Int(n)) => self.height = Some(n),
            ("repeat", FieldValue::Str(s)) => self.repeat = Some(s),
            (_, value) => return Err(SchemaError::reject("Page", PAGE_FIELDS, key, &value)),
        }
        Ok(())
    }

    /// Record a key outside the typed schema.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.extras.insert(key.into(), value.into());
    }

    /// Read a field generically. Typed fields win over extras; absent
    /// fields read as `None`.
    pub fn field(&self, key: &str) -> Option<FieldValue> {
        let typed = match key {
            "name" => Some(FieldValue::Str(self.name.clone())),
            "format" => self.format.clone().map(FieldValue::Str),
            "min_filter" => self.min_filter.clone().map(FieldValue::Str),
            "mag_filter" => self.mag_filter.clone().map(FieldValue::Str),
            "width" => self.width.map(FieldValue::Int),
            "height" => self.height.map(FieldValue::Int),
            "repeat" => self.repeat.clone().map(FieldValue::Str),
            _ => None,
        };
        typed.or_else(|| self.extras.get(key).cloned().map(FieldValue::Str))
    }
}

/// One sprite's placement and geometry within a page.
///
/// The page reference is established at creation and immutable; there
/// is no way to construct a region without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Region {
    page: PageId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orig_width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orig_height: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
}

impl Region {
    /// Create a region attached to `page` with only its name set.
    pub fn new(page: PageId, name: impl Into<String>) -> Self {
        Region {
            page,
            name: name.into(),
            rotate: None,
            x: None,
            y: None,
            width: None,
            height: None,
            orig_width: None,
            orig_height: None,
            offset_x: None,
            offset_y: None,
            index: None,
        }
    }

    /// Build a region from named field values; see [`Page::from_fields`].
    pub fn from_fields<I, K>(
        page: PageId,
        name: impl Into<String>,
        fields: I,
    ) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: AsRef<str>,
    {
        let mut region = Region::new(page, name);
        for (key, value) in fields {
            region.set(key.as_ref(), value)?;
        }
        Ok(region)
    }

    /// The page this region belongs to.
    pub fn page(&self) -> PageId {
        self.page
    }

    /// Assign a typed field by name.
    pub fn set(&mut self, key: &str, value: FieldValue) -> Result<(), SchemaError> {
        match (key, value) {
            ("name", FieldValue::Str(s)) => self.name = s,
            ("rotate", FieldValue::Bool(b)) => self.rotate = Some(b),
            ("x", FieldValue::Int(n)) => self.x = Some(n),
            ("y", FieldValue::Int(n)) => self.y = Some(n),
            ("width", FieldValue::Int(n)) => self.width = Some(n),
            ("height", FieldValue::Int(n)) => self.height = Some(n),
            ("orig_width", FieldValue::Int(n)) => self.orig_width = Some(n),
            ("orig_height", FieldValue::Int(n)) => self.orig_height = Some(n),
            ("offset_x", FieldValue::Int(n)) => self.offset_x = Some(n),
            ("offset_y", FieldValue::Int(n)) => self.offset_y = Some(n),
            ("index", FieldValue::Int(n)) => self.index = Some(n),
            (_, value) => return Err(SchemaError::reject("Region", REGION_FIELDS, key, &value)),
        }
        Ok(())
    }

    /// Read a typed field generically; absent fields read as `None`.
    pub fn field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "name" => Some(FieldValue::Str(self.name.clone())),
            "rotate" => self.rotate.map(FieldValue::Bool),
            "x" => self.x.map(FieldValue::Int),
            "y" => self.y.map(FieldValue::Int),
            "width" => self.width.map(FieldValue::Int),
            "height" => self.height.map(FieldValue::Int),
            "orig_width" => self.orig_width.map(FieldValue::Int),
            "orig_height" => self.orig_height.map(FieldValue::Int),
            "offset_x" => self.offset_x.map(FieldValue::Int),
            "offset_y" => self.offset_y.map(FieldValue::Int),
            "index" => self.index.map(FieldValue::Int),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Construction tests ==========

    #[test]
    fn test_page_from_fields() {
        let page = Page::from_fields(
            "sheet.png",
            [("width", FieldValue::Int(64)), ("format", FieldValue::from("RGBA8888"))],
        )
        .unwrap();
        assert_eq!(page.name, "sheet.png");
        assert_eq!(page.width, Some(64));
        assert_eq!(page.height, None);
        assert_eq!(page.format.as_deref(), Some("RGBA8888"));
    }

    #[test]
    fn test_page_unknown_field_is_schema_error() {
        let result = Page::from_fields("sheet.png", [("bogus", FieldValue::Int(1))]);
        match result.unwrap_err() {
            SchemaError::UnknownField { record, field } => {
                assert_eq!(record, "Page");
                assert_eq!(field, "bogus");
            }
            other => panic!("Expected UnknownField, got {:?}", other),
        }
    }

    #[test]
    fn test_page_mistyped_field_is_schema_error() {
        let result = Page::from_fields("sheet.png", [("width", FieldValue::from("wide"))]);
        match result.unwrap_err() {
            SchemaError::InvalidValue { record, field, value } => {
                assert_eq!(record, "Page");
                assert_eq!(field, "width");
                assert_eq!(value, "wide");
            }
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_region_from_fields() {
        let region = Region::from_fields(
            PageId::new(0),
            "sprite1",
            [("x", FieldValue::Int(2)), ("rotate", FieldValue::Bool(false))],
        )
        .unwrap();
        assert_eq!(region.page(), PageId::new(0));
        assert_eq!(region.x, Some(2));
        assert_eq!(region.rotate, Some(false));
        assert_eq!(region.index, None);
    }

    #[test]
    fn test_region_unknown_field_is_schema_error() {
        let result = Region::from_fields(PageId::new(0), "sprite1", [("custom", FieldValue::Int(7))]);
        match result.unwrap_err() {
            SchemaError::UnknownField { record, field } => {
                assert_eq!(record, "Region");
                assert_eq!(field, "custom");
            }
            other => panic!("Expected UnknownField, got {:?}", other),
        }
    }

    // ========== Absence tests ==========

    #[test]
    fn test_absent_field_differs_from_zero() {
        let mut with_zero = Region::new(PageId::new(0), "r");
        with_zero.index = Some(0);
        let without = Region::new(PageId::new(0), "r");
        assert_ne!(with_zero, without);
        assert_eq!(without.field("index"), None);
        assert_eq!(with_zero.field("index"), Some(FieldValue::Int(0)));
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let mut region = Region::new(PageId::new(0), "sprite1");
        region.x = Some(2);
        let json = serde_json::to_string(&region).unwrap();
        assert!(json.contains("\"x\":2"));
        assert!(!json.contains("rotate"));
        assert!(!json.contains("offset_x"));
    }

    #[test]
    fn test_page_serialize_flattens_extras() {
        let mut page = Page::new("sheet.png");
        page.set_extra("custom", "7");
        let json = serde_json::to_string(&page).unwrap();
        assert!(json.contains("\"custom\":\"7\""));
        assert!(!json.contains("extras"));
        assert!(!json.contains("format"));
    }

    // ========== Generic access tests ==========

    #[test]
    fn test_page_field_reads_typed_then_extras() {
        let mut page = Page::new("sheet.png");
        page.format = Some("RGBA8888".to_string());
        page.set_extra("custom", "7");
        assert_eq!(page.field("name"), Some(FieldValue::from("sheet.png")));
        assert_eq!(page.field("format"), Some(FieldValue::from("RGBA8888")));
        assert_eq!(page.field("custom"), Some(FieldValue::from("7")));
        assert_eq!(page.field("missing"), None);
    }

    #[test]
    fn test_extras_stay_outside_typed_schema() {
        let mut page = Page::new("sheet.png");
        page.set_extra("width", "64");
        // The typed field is still unset; the extra is only a fallback
        assert_eq!(page.width, None);
        assert_eq!(page.field("width"), Some(FieldValue::from("64")));
    }

    #[test]
    fn test_region_has_no_extras_path() {
        let region = Region::new(PageId::new(0), "sprite1");
        assert_eq!(region.field("custom"), None);
    }

    // ========== FieldValue tests ==========

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::from("Linear").to_string(), "Linear");
        assert_eq!(FieldValue::Int(-3).to_string(), "-3");
        assert_eq!(FieldValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_field_value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&FieldValue::Int(30)).unwrap(), "30");
        assert_eq!(serde_json::to_string(&FieldValue::Bool(false)).unwrap(), "false");
        assert_eq!(serde_json::to_string(&FieldValue::from("a")).unwrap(), "\"a\"");
    }
}
