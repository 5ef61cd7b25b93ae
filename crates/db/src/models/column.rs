use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::Task;
use crate::types::ColumnCategory;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub id: Uuid,
    pub board_id: Uuid,
    pub name: String,
    pub slug: String,
    pub category: ColumnCategory,
    pub color: String,
    pub wip_limit: Option<u32>,
    /// Unique within the board; monotonically reflects display order.
    pub position: i32,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateColumn {
    pub board_id: Uuid,
    pub name: String,
    pub slug: String,
    pub category: ColumnCategory,
    pub color: String,
    pub wip_limit: Option<u32>,
    pub position: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub color: Option<String>,
    pub wip_limit: Option<u32>,
    pub position: Option<i32>,
}

/// Derives a url-safe slug from a column name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true;
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
