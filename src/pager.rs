// 📄 Pager - fixed-size pages over an ordered sequence
//
// Two different "nothing to show" outcomes:
// - empty input: a Page with has_results() == false
// - page past the end of non-empty input: PageOutOfRange

use serde::Serialize;

use crate::error::{Result, TriviaError};

pub const QUESTIONS_PER_PAGE: usize = 10;

/// One page of results plus enough context to render navigation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// False only when the underlying sequence was empty.
    pub fn has_results(&self) -> bool {
        self.total_items > 0
    }

    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }
}

/// Number of pages needed for `total` items.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size)
}

/// Slice `items` into page `page` (1-based) of `QUESTIONS_PER_PAGE`.
pub fn paginate<T: Clone>(items: &[T], page: usize) -> Result<Page<T>> {
    paginate_with_size(items, page, QUESTIONS_PER_PAGE)
}

pub fn paginate_with_size<T: Clone>(items: &[T], page: usize, page_size: usize) -> Result<Page<T>> {
    if page == 0 {
        return Err(TriviaError::invalid("page", "pages start at 1"));
    }
    if page_size == 0 {
        return Err(TriviaError::invalid("page_size", "must be at least 1"));
    }

    let total_pages = page_count(items.len(), page_size);
    if items.is_empty() {
        return Ok(Page {
            items: Vec::new(),
            page,
            total_items: 0,
            total_pages,
        });
    }

    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return Err(TriviaError::PageOutOfRange { page, total_pages });
    }
    let end = (start + page_size).min(items.len());

    Ok(Page {
        items: items[start..end].to_vec(),
        page,
        total_items: items.len(),
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twenty_three_items() {
        let items: Vec<u32> = (1..=23).collect();

        let first = paginate(&items, 1).unwrap();
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert!(!first.is_last());

        let third = paginate(&items, 3).unwrap();
        assert_eq!(third.items, vec![21, 22, 23]);
        assert!(third.is_last());

        assert!(matches!(
            paginate(&items, 5),
            Err(TriviaError::PageOutOfRange { page: 5, total_pages: 3 })
        ));
    }

    #[test]
    fn test_pages_reassemble_input() {
        for n in [1usize, 9, 10, 11, 20, 37] {
            let items: Vec<usize> = (0..n).collect();
            let pages = page_count(n, QUESTIONS_PER_PAGE);
            assert_eq!(pages, (n + 9) / 10);

            let joined: Vec<usize> = (1..=pages)
                .flat_map(|p| paginate(&items, p).unwrap().items)
                .collect();
            assert_eq!(joined, items, "n = {}", n);
            assert!(paginate(&items, pages + 1).is_err());
        }
    }

    #[test]
    fn test_empty_input_is_not_out_of_range() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 1).unwrap();
        assert!(!page.has_results());
        assert!(page.items.is_empty());

        // any page of nothing is still "no results", not a scroll past the end
        assert!(!paginate(&items, 4).unwrap().has_results());
    }

    #[test]
    fn test_page_zero_is_invalid() {
        assert!(matches!(
            paginate(&[1, 2, 3], 0),
            Err(TriviaError::InvalidInput { field: "page", .. })
        ));
    }
}
