use serde::Serialize;
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u32 = 1;
/// Leaderboards render 25 rows per screen; the API defaults to match.
pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 100;

pub(crate) fn default_page() -> u32 {
    DEFAULT_PAGE
}

pub(crate) fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// Where a page sits within the full ordered result set.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct PageMeta {
    pub page: u32,
    pub page_size: u32,
    pub total_items: i64,
    pub total_pages: u32,
}

impl PageMeta {
    pub fn compute(page: u32, page_size: u32, total_items: i64) -> Self {
        let per_page = page_size.max(1) as i64;
        let total_pages = ((total_items + per_page - 1) / per_page).max(0) as u32;

        Self {
            page,
            page_size,
            total_items,
            total_pages,
        }
    }
}

/// One page of results plus its placement metadata.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> Paginated<T> {
    pub fn of(data: Vec<T>, page: u32, page_size: u32, total_items: i64) -> Self {
        Self {
            data,
            pagination: PageMeta::compute(page, page_size, total_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_last_page_rounds_up() {
        let meta = PageMeta::compute(1, 25, 51);
        assert_eq!(meta.total_pages, 3);
    }

    #[test]
    fn exact_fit_adds_no_extra_page() {
        let meta = PageMeta::compute(2, 25, 50);
        assert_eq!(meta.total_pages, 2);
    }

    #[test]
    fn empty_result_set_has_zero_pages() {
        let page: Paginated<u32> = Paginated::of(vec![], 1, DEFAULT_PAGE_SIZE, 0);
        assert_eq!(page.pagination.total_pages, 0);
        assert!(page.data.is_empty());
    }
}
