use serde::{Deserialize, Serialize};

/// Paging parameters for list endpoints (`?page=<p>&size=<n>`).
///
/// Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
}

impl PageQuery {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }

    /// Query pairs in the order the backend documents them.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ]
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

/// One page of a server-side list: `{"items": [...], "total": n}`.
///
/// `total` counts every item on the server, not just this page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: usize,
}
