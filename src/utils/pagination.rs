use serde::Serialize;

/// One window of an ordered result set. Pages are 1-indexed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_other_pages: bool,
}

impl<T> Page<T> {
    /// The page an empty result set produces: page 1 of 1, no items.
    pub fn empty(per_page: usize) -> Self {
        paginate(Vec::new(), None, per_page)
    }
}

/// Slice `items` into fixed-size pages and return the requested window.
///
/// The page value arrives as a raw query-string value and is clamped, never
/// rejected: anything that does not parse as a positive integer means page
/// 1, and a page past the end means the last page. An empty input still
/// yields one (empty) page so callers always get a well-formed window.
pub fn paginate<T>(items: Vec<T>, requested_page: Option<&str>, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total = items.len();
    let total_pages = if total == 0 {
        1
    } else {
        (total + per_page - 1) / per_page
    };
    let page = parse_page(requested_page).min(total_pages);
    let items: Vec<T> = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        per_page,
        total,
        total_pages,
        has_other_pages: total_pages > 1,
    }
}

fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input_yields_single_empty_page() {
        let page = paginate(Vec::<i32>::new(), None, 5);
        assert!(page.items.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total, 0);
        assert!(!page.has_other_pages);
    }

    #[test]
    fn test_splits_in_order() {
        let items: Vec<i32> = (1..=7).collect();

        let first = paginate(items.clone(), Some("1"), 3);
        assert_eq!(first.items, vec![1, 2, 3]);
        assert_eq!(first.total_pages, 3);
        assert!(first.has_other_pages);

        let second = paginate(items.clone(), Some("2"), 3);
        assert_eq!(second.items, vec![4, 5, 6]);

        let last = paginate(items, Some("3"), 3);
        assert_eq!(last.items, vec![7]);
    }

    #[test]
    fn test_invalid_page_values_clamp_to_first() {
        let items: Vec<i32> = (1..=10).collect();
        for raw in [None, Some("0"), Some("abc"), Some("-3"), Some(""), Some("1.5")] {
            let page = paginate(items.clone(), raw, 5);
            assert_eq!(page.page, 1, "raw page {:?} should clamp to 1", raw);
            assert_eq!(page.items, vec![1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn test_overflow_clamps_to_last_page() {
        let items: Vec<i32> = (1..=10).collect();
        let page = paginate(items, Some("999"), 5);
        assert_eq!(page.page, 2);
        assert_eq!(page.items, vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_whitespace_around_number_is_tolerated() {
        let items: Vec<i32> = (1..=10).collect();
        let page = paginate(items, Some(" 2 "), 5);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn test_single_page_has_no_other_pages() {
        let page = paginate(vec![1, 2], Some("1"), 5);
        assert!(!page.has_other_pages);
        assert_eq!(page.total_pages, 1);
    }

    proptest! {
        #[test]
        fn prop_pages_concatenate_to_input(
            items in proptest::collection::vec(0i64..1000, 0..60),
            per_page in 1usize..10,
        ) {
            let total_pages = paginate(items.clone(), None, per_page).total_pages;
            let expected = if items.is_empty() {
                1
            } else {
                (items.len() + per_page - 1) / per_page
            };
            prop_assert_eq!(total_pages, expected);

            let mut collected = Vec::new();
            for number in 1..=total_pages {
                let page = paginate(items.clone(), Some(&number.to_string()), per_page);
                prop_assert_eq!(page.page, number);
                collected.extend(page.items);
            }
            prop_assert_eq!(collected, items);
        }

        #[test]
        fn prop_any_page_value_stays_in_range(raw in "\\PC*", per_page in 1usize..10) {
            let items: Vec<i64> = (0..17).collect();
            let page = paginate(items, Some(&raw), per_page);
            prop_assert!(page.page >= 1);
            prop_assert!(page.page <= page.total_pages);
        }
    }
}
