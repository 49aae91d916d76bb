//! Pagination records

use serde::{Deserialize, Deserializer, Serialize};

/// One bounded batch of records returned by a single list call
///
/// `page_token` is present iff `has_more` is true on a well-formed response.
/// Missing or `null` fields decode as an empty final page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub items: Vec<T>,
    #[serde(default)]
    pub page_token: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_more: bool,
}

fn null_as_default<'de, D, V>(deserializer: D) -> Result<V, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de> + Default,
{
    Ok(Option::<V>::deserialize(deserializer)?.unwrap_or_default())
}

impl<T> Page<T> {
    /// Final page holding `items`.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, page_token: None, has_more: false }
    }

    /// Intermediate page whose continuation is `token`.
    pub fn more(items: Vec<T>, token: impl Into<String>) -> Self {
        Self { items, page_token: Some(token.into()), has_more: true }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::last(Vec::new())
    }
}

/// Message retrieval progress reported after every page
///
/// `processed` never decreases within one run; `estimated_total` is a
/// heuristic that may move either way until the final page, where it
/// equals `processed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEstimate {
    pub processed: usize,
    pub estimated_total: usize,
    pub has_more: bool,
}

impl ProgressEstimate {
    /// Completion percentage in `0..=100`.
    pub fn percent(&self) -> u8 {
        if self.estimated_total == 0 {
            return if self.has_more { 0 } else { 100 };
        }
        let ratio = self.processed.min(self.estimated_total) * 100 / self.estimated_total;
        u8::try_from(ratio).unwrap_or(100)
    }
}
