//! Page envelope shared by every listing endpoint.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

/// Requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number, starting at 1.
    pub page: u32,
    /// Items per page.
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Clamp raw query values into a usable page request.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            page_size: page_size
                .filter(|s| *s > 0)
                .map(|s| s.min(MAX_PAGE_SIZE))
                .unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }
}

/// Query parameters of paginated endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number, starting at 1 (default 1).
    pub page_number: Option<u32>,
    /// Items per page (default 10, at most 100).
    pub page_size: Option<u32>,
}

impl From<&PageQuery> for PageRequest {
    fn from(value: &PageQuery) -> Self {
        PageRequest::new(value.page_number, value.page_size)
    }
}

/// One page of results.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginator<T> {
    /// Total number of pages.
    pub pages_count: u32,
    /// Current page number.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
    /// Total number of items across all pages.
    pub total_count: u32,
    /// Items of the current page.
    pub items: Vec<T>,
}

impl<T> Paginator<T> {
    /// Slice an already sorted collection into the requested page.
    pub fn paginate(items: Vec<T>, request: PageRequest) -> Self {
        let total_count = items.len() as u32;
        let pages_count = total_count.div_ceil(request.page_size);
        let items = items
            .into_iter()
            .skip(request.offset())
            .take(request.page_size as usize)
            .collect();

        Self {
            pages_count,
            page: request.page,
            page_size: request.page_size,
            total_count,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        assert_eq!(PageRequest::new(None, None), PageRequest::default());
        assert_eq!(
            PageRequest::new(Some(0), Some(1000)),
            PageRequest {
                page: 1,
                page_size: MAX_PAGE_SIZE
            }
        );
    }

    #[test]
    fn paginate_slices_and_counts_pages() {
        let page = Paginator::paginate((1..=25).collect(), PageRequest::new(Some(3), Some(10)));
        assert_eq!(page.pages_count, 3);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = Paginator::paginate(vec![1, 2], PageRequest::new(Some(5), Some(10)));
        assert_eq!(page.pages_count, 1);
        assert!(page.items.is_empty());
    }
}
