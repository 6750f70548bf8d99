use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub last_page: u32,
}

impl<T> Page<T> {
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.page >= self.last_page
    }
}

// Accepts a bare array or `{data|items, total, page, per_page|limit, last_page}`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr<T> {
            List(Vec<T>),
            Paged(Paged<T>),
        }

        #[derive(Deserialize)]
        struct Paged<T> {
            #[serde(alias = "items")]
            data: Vec<T>,
            #[serde(default)]
            total: Option<u64>,
            #[serde(default)]
            page: Option<u32>,
            #[serde(default, alias = "limit", alias = "perPage")]
            per_page: Option<u32>,
            #[serde(default, alias = "lastPage", alias = "totalPages")]
            last_page: Option<u32>,
        }

        let paged = match Repr::<T>::deserialize(deserializer)? {
            Repr::List(items) => Paged {
                data: items,
                total: None,
                page: None,
                per_page: None,
                last_page: None,
            },
            Repr::Paged(paged) => paged,
        };

        let count = u32::try_from(paged.data.len()).unwrap_or(u32::MAX);
        let total = paged.total.unwrap_or(u64::from(count));
        let per_page = paged.per_page.unwrap_or(count).max(1);
        let last_page = paged.last_page.unwrap_or_else(|| {
            u32::try_from(total.div_ceil(u64::from(per_page)))
                .unwrap_or(u32::MAX)
                .max(1)
        });

        Ok(Self {
            items: paged.data,
            total,
            page: paged.page.unwrap_or(1),
            per_page,
            last_page,
        })
    }
}

/// Filters for a collection request, sent as the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(rename = "limit", skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(flatten)]
    pub filters: BTreeMap<String, String>,
}

impl ListParams {
    /// No paging, search or filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 1-based page number, sent as `page`.
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Page size, sent as `limit`.
    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Free-text search term, sent as `search`.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Extra query parameter; a repeated key keeps the last value.
    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}
