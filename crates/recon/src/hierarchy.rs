//! WBS hierarchy: item codes, ancestor lookup and tag descriptors.
//!
//! Codes are dot-separated digit runs. Depth 2 is a subsection, depth 3 a tag
//! group, depth 4 a leaf item. Nothing checks that a leaf's ancestors exist;
//! a missing ancestor simply resolves to an empty string.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::{ITEM, SUBSECTION, TAG_CODE, TAG_DESCRIPTION, TAG_RAW};
use crate::model::{Cell, Table};

pub const SUBSECTION_DEPTH: usize = 2;
pub const TAG_DEPTH: usize = 3;
pub const LEAF_DEPTH: usize = 4;

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+(\.\d+)*$").expect("static pattern"))
}

// ---------------------------------------------------------------------------
// Item codes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemCode(String);

impl ItemCode {
    /// Parse trimmed text; `None` if it is not a dotted digit sequence.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        code_pattern().is_match(text).then(|| Self(text.to_string()))
    }

    pub fn depth(&self) -> usize {
        self.0.split('.').count()
    }

    /// First `depth` segments joined by '.', or `None` if the code is shallower.
    pub fn prefix(&self, depth: usize) -> Option<String> {
        if depth > self.depth() {
            return None;
        }
        Some(self.0.split('.').take(depth).collect::<Vec<_>>().join("."))
    }
}

impl std::fmt::Display for ItemCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDescriptor {
    pub code: String,
    pub description: String,
}

impl TagDescriptor {
    /// Split a tag group description on the first `" - "`.
    pub fn split(raw: &str) -> Self {
        match raw.split_once(" - ") {
            Some((code, description)) => Self {
                code: code.trim().to_string(),
                description: description.trim().to_string(),
            },
            None => Self {
                code: raw.trim().to_string(),
                description: String::new(),
            },
        }
    }

    /// Audit form written to `TAG_RAW`.
    pub fn raw(code: &str, description: &str) -> String {
        if description.is_empty() {
            code.to_string()
        } else {
            format!("{code} - {description}")
        }
    }
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Ancestor lookup tables built from the full WBS outline.
#[derive(Debug, Clone, Default)]
pub struct HierarchyIndex {
    subsections: HashMap<String, String>,
    tags: HashMap<String, String>,
}

impl HierarchyIndex {
    /// Build from `(code, description)` pairs. A repeated code keeps its last
    /// description.
    pub fn build<'a>(outline: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut index = Self::default();
        for (code, description) in outline {
            let Some(code) = ItemCode::parse(code) else {
                continue;
            };
            let target = match code.depth() {
                SUBSECTION_DEPTH => &mut index.subsections,
                TAG_DEPTH => &mut index.tags,
                _ => continue,
            };
            target.insert(code.0, description.trim().to_string());
        }
        index
    }

    pub fn subsection_count(&self) -> usize {
        self.subsections.len()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn subsection_of(&self, leaf: &ItemCode) -> String {
        lookup(&self.subsections, leaf, SUBSECTION_DEPTH)
    }

    pub fn tag_raw_of(&self, leaf: &ItemCode) -> String {
        lookup(&self.tags, leaf, TAG_DEPTH)
    }

    /// Resolve a code into its leaf ancestry, or `None` if it is not a leaf.
    pub fn resolve(&self, code: &str) -> Option<Ancestry> {
        let code = ItemCode::parse(code).filter(|c| c.depth() == LEAF_DEPTH)?;
        let subsection = self.subsection_of(&code);
        let tag_raw = self.tag_raw_of(&code);
        let tag = TagDescriptor::split(&tag_raw);
        Some(Ancestry {
            code,
            subsection,
            tag,
            tag_raw,
        })
    }
}

fn lookup(map: &HashMap<String, String>, leaf: &ItemCode, depth: usize) -> String {
    leaf.prefix(depth)
        .and_then(|p| map.get(&p).cloned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestry {
    pub code: ItemCode,
    pub subsection: String,
    pub tag: TagDescriptor,
    pub tag_raw: String,
}

/// Result of indexing the processed EAP rows.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedLeaves {
    pub table: Table,
    pub orphans: usize,
}

/// Enrich the leaf rows of `eap` with their ancestry.
///
/// `eap` carries `ITEM` and `DESCRICAO` plus any further columns; non-leaf
/// rows are dropped. Output columns: `ITEM`, `SUBESTACAO`, `TAG_CODE`,
/// `TAG_DESCRICAO`, `TAG_RAW`, then every other `eap` column in order.
pub fn index_leaves(eap: &Table, index: &HierarchyIndex) -> IndexedLeaves {
    let item_idx = eap.column_index(ITEM);
    let rest: Vec<usize> = (0..eap.width()).filter(|&i| Some(i) != item_idx).collect();

    let mut columns: Vec<String> = [ITEM, SUBSECTION, TAG_CODE, TAG_DESCRIPTION, TAG_RAW]
        .iter()
        .map(|s| s.to_string())
        .collect();
    columns.extend(rest.iter().filter_map(|&i| eap.columns.get(i).cloned()));

    let mut rows = Vec::new();
    let mut orphans = 0;
    for row in &eap.rows {
        let code_text = item_idx
            .and_then(|i| row.get(i))
            .map(Cell::as_text)
            .unwrap_or_default();
        let Some(ancestry) = index.resolve(&code_text) else {
            continue;
        };
        if ancestry.subsection.is_empty() || ancestry.tag_raw.is_empty() {
            orphans += 1;
        }

        let mut out = vec![
            Cell::Text(ancestry.code.to_string()),
            Cell::Text(ancestry.subsection),
            Cell::Text(ancestry.tag.code),
            Cell::Text(ancestry.tag.description),
            Cell::Text(ancestry.tag_raw),
        ];
        out.extend(rest.iter().map(|&i| row.get(i).cloned().unwrap_or(Cell::Blank)));
        rows.push(out);
    }

    IndexedLeaves {
        table: Table { columns, rows },
        orphans,
    }
}
