//! JSON rendering of navigation results
//!
//! Records render as objects holding only their present fields, the
//! atlas as its visible page sequence plus the grouped region
//! sequence. A region's page reference renders as the page's name,
//! resolved through the atlas.

use serde_json::{Map, Value};

use crate::atlas::Atlas;
use crate::models::{FieldValue, Page, Region};
use crate::query::Node;

/// Render any navigation result.
pub fn render(node: &Node) -> Value {
    match node {
        Node::Atlas(atlas) => render_atlas(atlas),
        Node::Pages(atlas) => Value::Array(atlas.pages().map(render_page).collect()),
        Node::Regions(atlas) => {
            Value::Array(atlas.regions().map(|r| render_region(r, atlas)).collect())
        }
        Node::Page(page) => render_page(page),
        Node::Region(region, atlas) => render_region(region, atlas),
        Node::Value(value) => render_value(value),
    }
}

/// Render the whole atlas as `{"pages": [...], "regions": [...]}`.
pub fn render_atlas(atlas: &Atlas) -> Value {
    let mut map = Map::new();
    map.insert("pages".to_string(), Value::Array(atlas.pages().map(render_page).collect()));
    map.insert(
        "regions".to_string(),
        Value::Array(atlas.regions().map(|r| render_region(r, atlas)).collect()),
    );
    Value::Object(map)
}

pub fn render_page(page: &Page) -> Value {
    let mut map = Map::new();
    map.insert("name".to_string(), Value::String(page.name.clone()));
    insert_str(&mut map, "format", &page.format);
    insert_str(&mut map, "min_filter", &page.min_filter);
    insert_str(&mut map, "mag_filter", &page.mag_filter);
    insert_int(&mut map, "width", page.width);
    insert_int(&mut map, "height", page.height);
    insert_str(&mut map, "repeat", &page.repeat);
    for (key, value) in &page.extras {
        if !map.contains_key(key) {
            map.insert(key.clone(), Value::String(value.clone()));
        }
    }
    Value::Object(map)
}

pub fn render_region(region: &Region, atlas: &Atlas) -> Value {
    let mut map = Map::new();
    // Page names are the useful identity; fall back to the raw index
    // for a handle the atlas cannot resolve
    let page = match atlas.page(region.page()) {
        Ok(page) => Value::String(page.name.clone()),
        Err(_) => Value::from(region.page().index()),
    };
    map.insert("page".to_string(), page);
    map.insert("name".to_string(), Value::String(region.name.clone()));
    if let Some(rotate) = region.rotate {
        map.insert("rotate".to_string(), Value::Bool(rotate));
    }
    insert_int(&mut map, "x", region.x);
    insert_int(&mut map, "y", region.y);
    insert_int(&mut map, "width", region.width);
    insert_int(&mut map, "height", region.height);
    insert_int(&mut map, "orig_width", region.orig_width);
    insert_int(&mut map, "orig_height", region.orig_height);
    insert_int(&mut map, "offset_x", region.offset_x);
    insert_int(&mut map, "offset_y", region.offset_y);
    insert_int(&mut map, "index", region.index);
    Value::Object(map)
}

fn render_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Str(s) => Value::String(s.clone()),
        FieldValue::Int(n) => Value::from(*n),
        FieldValue::Bool(b) => Value::Bool(*b),
    }
}

fn insert_str(map: &mut Map<String, Value>, key: &str, field: &Option<String>) {
    if let Some(value) = field {
        map.insert(key.to_string(), Value::String(value.clone()));
    }
}

fn insert_int(map: &mut Map<String, Value>, key: &str, field: Option<i64>) {
    if let Some(value) = field {
        map.insert(key.to_string(), Value::from(value));
    }
}
