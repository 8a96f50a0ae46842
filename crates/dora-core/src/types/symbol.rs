//! Symbol search types: the filter, its partial update, and result pages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default market queried before the user picks one.
pub const DEFAULT_MARKET: &str = "CN";

/// Default number of symbols per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ---------------------------------------------------------------------------
// Symbol kind
// ---------------------------------------------------------------------------

/// Instrument category accepted by the symbol search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    #[default]
    Stock,
    Index,
    All,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Index => "index",
            Self::All => "all",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SymbolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stock" => Ok(Self::Stock),
            "index" => Ok(Self::Index),
            "all" => Ok(Self::All),
            other => Err(format!("unknown symbol kind: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Current symbol-search filter held by the quant store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub market: String,
    pub query: String,
    pub kind: SymbolKind,
    pub page: u32,
    pub page_size: u32,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            market: DEFAULT_MARKET.into(),
            query: String::new(),
            kind: SymbolKind::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchFilter {
    /// Query-string pairs for `GET /quant/symbols`.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("market", self.market.clone()),
            ("q", self.query.clone()),
            ("kind", self.kind.to_string()),
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ]
    }

    /// Adopt the pagination the server actually served.
    ///
    /// Missing or zero values leave the requested value in place.
    pub fn adopt_served(&mut self, page: &PageResult) {
        if let Some(p) = page.page.filter(|p| *p >= 1) {
            self.page = p;
        }
        if let Some(size) = page.page_size.filter(|s| *s >= 1) {
            self.page_size = size;
        }
    }
}

/// Partial filter passed to a refresh. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterUpdate {
    pub market: Option<String>,
    pub query: Option<String>,
    pub kind: Option<SymbolKind>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl FilterUpdate {
    pub fn market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn kind(mut self, kind: SymbolKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Merge onto `current`, field by field. Last write wins.
    pub fn apply(&self, current: &SearchFilter) -> SearchFilter {
        SearchFilter {
            market: self.market.clone().unwrap_or_else(|| current.market.clone()),
            query: self.query.clone().unwrap_or_else(|| current.query.clone()),
            kind: self.kind.unwrap_or(current.kind),
            page: self.page.unwrap_or(current.page),
            page_size: self.page_size.unwrap_or(current.page_size),
        }
    }
}

// ---------------------------------------------------------------------------
// Records and pages
// ---------------------------------------------------------------------------

/// A tradable instrument as returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolRecord {
    pub symbol: String,
    pub market: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub industry: Option<String>,
    pub kind: Option<String>,
}

/// One page of symbol search results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    #[serde(default)]
    pub items: Vec<SymbolRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}
