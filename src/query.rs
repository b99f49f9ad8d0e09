//! Attribute-path navigation over a parsed atlas
//!
//! A path is a sequence of segments. Each segment is tried as an
//! attribute of the current node, then as a numeric index when the
//! node is a sequence, then as a name key. Navigation is read-only
//! and every dead end is a typed error.

use thiserror::Error;

use crate::atlas::{Atlas, AtlasError};
use crate::models::{FieldValue, Page, Region};

/// Error walking an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("'{0}' is not an attribute here")]
    NoSuchAttribute(String),
    #[error("no entry named '{0}'")]
    NoSuchKey(String),
    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("'{0}' cannot be navigated into")]
    NotNavigable(String),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
}

/// A position in the object graph during navigation.
#[derive(Debug, Clone)]
pub enum Node<'a> {
    Atlas(&'a Atlas),
    /// The page sequence, first-seen order
    Pages(&'a Atlas),
    /// The region sequence, grouped iteration order
    Regions(&'a Atlas),
    Page(&'a Page),
    Region(&'a Region, &'a Atlas),
    Value(FieldValue),
}

/// Walk a whole path from the atlas root.
pub fn navigate<'a, I, S>(atlas: &'a Atlas, segments: I) -> Result<Node<'a>, QueryError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut node = Node::Atlas(atlas);
    for segment in segments {
        node = lookup(node, segment.as_ref())?;
    }
    Ok(node)
}

/// Resolve one path segment against a node.
pub fn lookup<'a>(node: Node<'a>, segment: &str) -> Result<Node<'a>, QueryError> {
    match node {
        Node::Atlas(atlas) => match segment {
            "pages" => Ok(Node::Pages(atlas)),
            "regions" => Ok(Node::Regions(atlas)),
            _ => Err(QueryError::NoSuchAttribute(segment.to_string())),
        },
        Node::Pages(atlas) => {
            if let Ok(index) = segment.parse::<usize>() {
                atlas
                    .pages()
                    .nth(index)
                    .map(Node::Page)
                    .ok_or(QueryError::IndexOutOfRange { index, len: atlas.page_count() })
            } else {
                atlas
                    .pages()
                    .find(|page| page.name == segment)
                    .map(Node::Page)
                    .ok_or_else(|| QueryError::NoSuchKey(segment.to_string()))
            }
        }
        Node::Regions(atlas) => {
            if let Ok(index) = segment.parse::<usize>() {
                atlas
                    .regions()
                    .nth(index)
                    .map(|region| Node::Region(region, atlas))
                    .ok_or(QueryError::IndexOutOfRange { index, len: atlas.len() })
            } else {
                Err(QueryError::NoSuchKey(segment.to_string()))
            }
        }
        Node::Page(page) => page
            .field(segment)
            .map(Node::Value)
            .ok_or_else(|| QueryError::NoSuchAttribute(segment.to_string())),
        Node::Region(region, atlas) => {
            if segment == "page" {
                // The back-reference resolves through the atlas table
                Ok(Node::Page(atlas.page(region.page())?))
            } else {
                region
                    .field(segment)
                    .map(Node::Value)
                    .ok_or_else(|| QueryError::NoSuchAttribute(segment.to_string()))
            }
        }
        Node::Value(value) => Err(QueryError::NotNavigable(value.to_string())),
    }
}
