use crate::params::ParamMap;

pub const SKIP_KEY: &str = "skip";
pub const TAKE_KEY: &str = "take";
pub const PAGE_KEY: &str = "page";
pub const PAGE_SIZE_KEY: &str = "pageSize";
pub const PAGINATION_KEYS: [&str; 4] = [SKIP_KEY, TAKE_KEY, PAGE_KEY, PAGE_SIZE_KEY];

/// Resolved `skip`/`take` window. Both absent means no pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub skip: Option<i64>,
    pub take: Option<u64>,
}

/// Resolve pagination from offset-style (`skip`/`take`) or page-style
/// (`page`/`pageSize`) parameters.
///
/// Offset parameters always win over page parameters. Malformed values never
/// fail:
/// - an unparseable `skip` becomes 0, while a negative `skip` is kept as given;
/// - a non-positive or unparseable `take` becomes the page size;
/// - a non-positive or unparseable `page` becomes page 1;
/// - a non-positive or unparseable `pageSize` keeps the page size.
///
/// When a key repeats, its last occurrence is used.
#[must_use]
pub fn resolve_pagination(params: &ParamMap, default_page_size: u64) -> Pagination {
    let mut page_size = default_page_size;

    let mut skip = params
        .last(SKIP_KEY)
        .map(|raw| parse_integer(raw).unwrap_or(0));
    let mut take = params
        .last(TAKE_KEY)
        .map(|raw| positive(parse_integer(raw)).unwrap_or(page_size));

    if skip.is_none()
        && let Some(raw_page) = params.last(PAGE_KEY)
    {
        if let Some(size) = params.last(PAGE_SIZE_KEY).and_then(|raw| positive(parse_integer(raw))) {
            page_size = size;
        }
        let page = positive(parse_integer(raw_page)).unwrap_or(1);
        skip = Some(page_offset(page, page_size));
        take.get_or_insert(page_size);
    }

    if skip.is_some() && take.is_none() {
        take = Some(page_size);
    }

    tracing::trace!(?skip, ?take, "resolved pagination");
    Pagination { skip, take }
}

/// Read a leading integer the way lenient form parsers do: surrounding
/// whitespace and an optional sign are accepted, parsing stops at the first
/// non-digit, and no digits at all is a failure (`"10abc"` → 10, `"1.9"` → 1,
/// `"abc"` → `None`). Out-of-range values saturate.
#[must_use]
pub fn parse_integer(raw: &str) -> Option<i64> {
    let text = raw.trim_start();
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let digits_len = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude = unsigned[..digits_len].bytes().fold(0_i64, |acc, digit| {
        acc.saturating_mul(10).saturating_add(i64::from(digit - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

fn positive(value: Option<i64>) -> Option<u64> {
    value
        .filter(|value| *value > 0)
        .and_then(|value| u64::try_from(value).ok())
}

fn page_offset(page: u64, page_size: u64) -> i64 {
    let pages_before = i64::try_from(page - 1).unwrap_or(i64::MAX);
    let page_size = i64::try_from(page_size).unwrap_or(i64::MAX);
    pages_before.saturating_mul(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(query: &str) -> Pagination {
        resolve_pagination(&ParamMap::parse(query), 10)
    }

    #[test]
    fn test_no_pagination_params() {
        assert_eq!(resolve(""), Pagination::default());
        assert_eq!(resolve("status=active"), Pagination::default());
    }

    #[test]
    fn test_page_uses_default_page_size() {
        assert_eq!(resolve("page=2"), Pagination { skip: Some(10), take: Some(10) });
        assert_eq!(resolve("page=1"), Pagination { skip: Some(0), take: Some(10) });
    }

    #[test]
    fn test_page_with_page_size() {
        assert_eq!(
            resolve("page=3&pageSize=25"),
            Pagination { skip: Some(50), take: Some(25) }
        );
    }

    #[test]
    fn test_invalid_page_falls_back_to_first_page() {
        for query in ["page=0", "page=-3", "page=abc", "page="] {
            assert_eq!(
                resolve(query),
                Pagination { skip: Some(0), take: Some(10) },
                "{query}"
            );
        }
    }

    #[test]
    fn test_invalid_page_size_keeps_default() {
        assert_eq!(
            resolve("page=2&pageSize=abc"),
            Pagination { skip: Some(10), take: Some(10) }
        );
        assert_eq!(
            resolve("page=2&pageSize=0"),
            Pagination { skip: Some(10), take: Some(10) }
        );
    }

    #[test]
    fn test_page_size_without_page_is_ignored() {
        assert_eq!(resolve("pageSize=50"), Pagination::default());
    }

    #[test]
    fn test_skip_and_take() {
        assert_eq!(resolve("skip=20&take=5"), Pagination { skip: Some(20), take: Some(5) });
    }

    #[test]
    fn test_skip_alone_gets_default_take() {
        assert_eq!(resolve("skip=30"), Pagination { skip: Some(30), take: Some(10) });
    }

    #[test]
    fn test_unparseable_skip_becomes_zero() {
        assert_eq!(resolve("skip=abc"), Pagination { skip: Some(0), take: Some(10) });
    }

    #[test]
    fn test_negative_skip_is_preserved() {
        assert_eq!(resolve("skip=-5"), Pagination { skip: Some(-5), take: Some(10) });
    }

    #[test]
    fn test_take_alone_leaves_skip_absent() {
        assert_eq!(resolve("take=5"), Pagination { skip: None, take: Some(5) });
    }

    #[test]
    fn test_non_positive_take_uses_default() {
        assert_eq!(resolve("take=-5"), Pagination { skip: None, take: Some(10) });
        assert_eq!(resolve("take=0"), Pagination { skip: None, take: Some(10) });
        assert_eq!(resolve("take=many"), Pagination { skip: None, take: Some(10) });
    }

    #[test]
    fn test_take_with_page() {
        assert_eq!(
            resolve("take=7&page=3"),
            Pagination { skip: Some(20), take: Some(7) }
        );
    }

    #[test]
    fn test_offset_params_win_over_page_params() {
        let expected = resolve("skip=5&take=15");
        for query in [
            "skip=5&take=15&page=4&pageSize=50",
            "page=4&pageSize=50&skip=5&take=15",
            "pageSize=50&take=15&page=4&skip=5",
        ] {
            assert_eq!(resolve(query), expected, "{query}");
        }
    }

    #[test]
    fn test_last_occurrence_wins() {
        assert_eq!(resolve("page=2&page=3"), Pagination { skip: Some(20), take: Some(10) });
    }

    #[test]
    fn test_parse_integer_is_lenient() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("  42"), Some(42));
        assert_eq!(parse_integer("+7"), Some(7));
        assert_eq!(parse_integer("-7"), Some(-7));
        assert_eq!(parse_integer("10abc"), Some(10));
        assert_eq!(parse_integer("1.9"), Some(1));
        assert_eq!(parse_integer("abc"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("-"), None);
        assert_eq!(parse_integer("99999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_huge_page_saturates() {
        let pagination = resolve("page=99999999999999999999&pageSize=1000");
        assert_eq!(pagination.skip, Some(i64::MAX));
        assert_eq!(pagination.take, Some(1000));
    }
}
