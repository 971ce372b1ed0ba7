use serde::Deserialize;

use crate::config::DEFAULT_PAGE_LIMIT;
use crate::models::interview::Interview;

/// Raw list query string. Values stay as text so bad input falls back to
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub status: Option<String>,
    pub q: Option<String>,
}

/// Effective window and filters for a list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub status: Option<String>,
    /// Lowercased search needle.
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            status: None,
            search: None,
        }
    }
}

impl ListQuery {
    /// Resolves raw params. `limit` is clamped to `max_limit`.
    pub fn from_params(params: ListParams, max_limit: u32) -> Self {
        let page = positive(params.page.as_deref()).unwrap_or(1);
        let limit = positive(params.limit.as_deref())
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(max_limit.max(1));

        let status = params
            .status
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && s != "All");
        let search = params
            .q
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        Self {
            page,
            limit,
            status,
            search,
        }
    }

    #[cfg(test)]
    pub fn window(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            ..Self::default()
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub fn is_filtered(&self) -> bool {
        self.status.is_some() || self.search.is_some()
    }

    /// In-process filter check, mirrored by the SQL `WHERE` clause.
    pub fn matches(&self, record: &Interview) -> bool {
        if let Some(status) = &self.status {
            if record.status.as_deref() != Some(status.as_str()) {
                return false;
            }
        }
        match &self.search {
            Some(needle) => record
                .searchable_fields()
                .any(|field| field.to_lowercase().contains(needle.as_str())),
            None => true,
        }
    }
}

fn positive(raw: Option<&str>) -> Option<u32> {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|n| *n >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, limit: Option<&str>) -> ListParams {
        ListParams {
            page: page.map(String::from),
            limit: limit.map(String::from),
            ..ListParams::default()
        }
    }

    #[test]
    fn test_defaults_when_absent() {
        let q = ListQuery::from_params(params(None, None), 100);
        assert_eq!((q.page, q.limit), (1, 10));
        assert_eq!(q.offset(), 0);
    }

    #[test]
    fn test_non_numeric_falls_back() {
        let q = ListQuery::from_params(params(Some("two"), Some("lots")), 100);
        assert_eq!((q.page, q.limit), (1, 10));
    }

    #[test]
    fn test_zero_and_negative_fall_back() {
        let q = ListQuery::from_params(params(Some("0"), Some("-5")), 100);
        assert_eq!((q.page, q.limit), (1, 10));
    }

    #[test]
    fn test_limit_is_clamped() {
        let q = ListQuery::from_params(params(Some("3"), Some("5000")), 100);
        assert_eq!((q.page, q.limit), (3, 100));
        assert_eq!(q.offset(), 200);
    }

    #[test]
    fn test_status_all_means_unfiltered() {
        let q = ListQuery::from_params(
            ListParams {
                status: Some("All".into()),
                q: Some("   ".into()),
                ..ListParams::default()
            },
            100,
        );
        assert!(!q.is_filtered());
    }

    #[test]
    fn test_search_is_lowercased() {
        let q = ListQuery::from_params(
            ListParams {
                q: Some(" ACME ".into()),
                ..ListParams::default()
            },
            100,
        );
        assert_eq!(q.search.as_deref(), Some("acme"));
    }
}
