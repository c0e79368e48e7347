//! Page number resolution for the image list.

/// Result of resolving a requested page number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// A valid 1-based page
    Page(u64),
    /// The number parsed but lies outside `1..=last`
    OutOfRange { last: u64 },
}

/// Number of pages for `count` items; an empty listing still has one page
pub fn num_pages(count: u64, per_page: u64) -> u64 {
    let per_page = per_page.max(1);
    count.div_ceil(per_page).max(1)
}

/// Resolve the raw `page` query value.
///
/// Missing or non-integer values give the first page.
pub fn resolve_page(requested: Option<&str>, num_pages: u64) -> PageOutcome {
    let number = match requested.map(str::trim).and_then(|p| p.parse::<i64>().ok()) {
        Some(n) => n,
        None => return PageOutcome::Page(1),
    };

    if number >= 1 && (number as u64) <= num_pages {
        PageOutcome::Page(number as u64)
    } else {
        PageOutcome::OutOfRange { last: num_pages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_pages() {
        assert_eq!(num_pages(0, 8), 1);
        assert_eq!(num_pages(8, 8), 1);
        assert_eq!(num_pages(9, 8), 2);
        assert_eq!(num_pages(16, 8), 2);
        assert_eq!(num_pages(17, 8), 3);
    }

    #[test]
    fn test_non_integer_falls_back_to_first() {
        assert_eq!(resolve_page(Some("abc"), 3), PageOutcome::Page(1));
        assert_eq!(resolve_page(Some("2.5"), 3), PageOutcome::Page(1));
        assert_eq!(resolve_page(Some(""), 3), PageOutcome::Page(1));
        assert_eq!(resolve_page(None, 3), PageOutcome::Page(1));
    }

    #[test]
    fn test_valid_pages() {
        assert_eq!(resolve_page(Some("1"), 2), PageOutcome::Page(1));
        assert_eq!(resolve_page(Some("2"), 2), PageOutcome::Page(2));
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(resolve_page(Some("999"), 2), PageOutcome::OutOfRange { last: 2 });
        assert_eq!(resolve_page(Some("0"), 2), PageOutcome::OutOfRange { last: 2 });
        assert_eq!(resolve_page(Some("-1"), 2), PageOutcome::OutOfRange { last: 2 });
    }
}
