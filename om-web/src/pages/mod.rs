//! HTML page handlers
//!
//! Each handler reads from the shared dataset, shapes the rows it needs and
//! renders one template. Unknown route parameters render the 404 page.

use axum::extract::State;
use axum::response::Html;
use serde::Serialize;

use crate::error::PageError;
use crate::pagination::Pagination;
use crate::AppState;

pub mod about;
pub mod check;
pub mod compare;
pub mod downloads;
pub mod exclusions;
pub mod home;
pub mod hotspots;
pub mod insights;
pub mod lookup;
pub mod ml_analysis;
pub mod procedures;
pub mod providers;
pub mod risk;
pub mod specialties;
pub mod states;
pub mod timeline;
pub mod trends;
pub mod watchlist;

pub type PageResult = Result<Html<String>, PageError>;

/// Fallback for every unmatched path
pub async fn not_found(State(state): State<AppState>) -> PageError {
    state.not_found()
}

/// Previous/next links for a paginated table
#[derive(Debug, Clone, Serialize)]
pub struct Pager {
    pub page: usize,
    pub total_pages: usize,
    pub first_row: usize,
    pub last_row: usize,
    pub total: usize,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl Pager {
    /// Links to neighbouring pages of `path`, keeping the active filters
    pub fn new(p: &Pagination, path: &str, params: &[(&str, Option<&str>)]) -> Self {
        Self {
            page: p.page,
            total_pages: p.total_pages,
            first_row: p.first_row(),
            last_row: p.last_row(),
            total: p.total,
            prev: (p.page > 1).then(|| page_href(path, params, p.page - 1)),
            next: (p.page < p.total_pages).then(|| page_href(path, params, p.page + 1)),
        }
    }
}

/// `path?k=v&page=n`, skipping empty parameters and page 1
pub fn page_href(path: &str, params: &[(&str, Option<&str>)], page: usize) -> String {
    let mut qs = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            qs.append_pair(key, value);
        }
    }
    if page > 1 {
        qs.append_pair("page", &page.to_string());
    }
    let qs = qs.finish();
    if qs.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, qs)
    }
}

/// Trimmed query value, `None` when blank
pub(crate) fn param(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::calculate_pagination;

    #[test]
    fn test_page_href_encodes_and_skips_blank() {
        let href = page_href("/providers", &[("q", Some("st louis")), ("state", Some("")), ("sort", None)], 2);
        assert_eq!(href, "/providers?q=st+louis&page=2");
        assert_eq!(page_href("/providers", &[], 1), "/providers");
    }

    #[test]
    fn test_pager_links() {
        let p = calculate_pagination(120, 2, 50);
        let pager = Pager::new(&p, "/watchlist", &[("tab", Some("ml"))]);
        assert_eq!(pager.prev.as_deref(), Some("/watchlist?tab=ml"));
        assert_eq!(pager.next.as_deref(), Some("/watchlist?tab=ml&page=3"));

        let last = Pager::new(&calculate_pagination(120, 3, 50), "/watchlist", &[]);
        assert!(last.next.is_none());
    }
}
