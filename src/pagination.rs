//! Splitting an ordered list of rows into fixed-size pages.

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The number of rows on each page.
    pub page_size: usize,
    /// The maximum number of page links to show in the pagination indicator.
    pub max_pages: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_pages: 5,
        }
    }
}

/// The slice of rows that make up one page.
#[derive(Debug, PartialEq, Eq)]
pub struct PageWindow {
    /// The 1-based page number after clamping.
    pub page: usize,
    /// The number of pages, at least one even when there are no rows.
    pub total_pages: usize,
    /// The index of the first row on the page.
    pub start: usize,
    /// One past the index of the last row on the page.
    pub end: usize,
}

impl PageWindow {
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Find the rows on `requested_page` out of `total_rows` rows.
///
/// Requested pages below one are treated as page one, and requested pages
/// past the end are treated as the last page.
pub fn paginate(total_rows: usize, requested_page: i64, page_size: usize) -> PageWindow {
    let page_size = page_size.max(1);
    let total_pages = total_rows.div_ceil(page_size).max(1);
    let page = if requested_page < 1 {
        1
    } else {
        usize::try_from(requested_page)
            .unwrap_or(usize::MAX)
            .min(total_pages)
    };

    let start = ((page - 1) * page_size).min(total_rows);
    let end = (start + page_size).min(total_rows);

    PageWindow {
        page,
        total_pages,
        start,
        end,
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(usize),
    CurrPage(usize),
    Ellipsis,
    NextButton(usize),
    BackButton(usize),
}

/// Build the list of page links to show below a table.
///
/// At most `max_pages` consecutive page numbers are shown around
/// `curr_page`. The first and last pages are always reachable, with an
/// ellipsis standing in for any skipped pages.
pub fn create_pagination_indicators(
    curr_page: usize,
    page_count: usize,
    max_pages: usize,
) -> Vec<PaginationIndicator> {
    let max_pages = max_pages.max(1);
    let half_window = max_pages / 2;

    let window_start = curr_page
        .saturating_sub(half_window)
        .max(1)
        .min(page_count.saturating_sub(max_pages) + 1);
    let window_end = (window_start + max_pages - 1).min(page_count);

    let mut indicators = Vec::with_capacity(max_pages + 6);

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if window_start > 1 {
        indicators.push(PaginationIndicator::Page(1));
        indicators.push(PaginationIndicator::Ellipsis);
    }

    for page in window_start..=window_end {
        if page == curr_page {
            indicators.push(PaginationIndicator::CurrPage(page));
        } else {
            indicators.push(PaginationIndicator::Page(page));
        }
    }

    if window_end < page_count {
        indicators.push(PaginationIndicator::Ellipsis);
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}
