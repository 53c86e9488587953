//! Client-side table paging and sorting over already-fetched rows.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(CoreError::InvalidSortDirection),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice out page `page` (1-based).
///
/// A page past the end comes back empty rather than clamped; the UI disables
/// its "next" control from `total_pages`.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Result<Page<T>> {
    if page < 1 {
        return Err(CoreError::InvalidPage(page));
    }
    if page_size == 0 {
        return Err(CoreError::InvalidPageSize);
    }

    let total_items = items.len();
    let start = (page - 1).saturating_mul(page_size);
    let page_items = items
        .iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    Ok(Page {
        items: page_items,
        page,
        page_size,
        total_items,
        total_pages: total_items.div_ceil(page_size),
    })
}

/// Stable sort by an optional key. Rows whose key is `None` stay at the end
/// in both directions, so unranked keywords never float above ranked ones.
///
/// Keys that do not compare (NaN) are treated as equal and keep their
/// original order.
pub fn sort_by<T, K, F>(items: &mut [T], key_fn: F, direction: SortDirection)
where
    K: PartialOrd,
    F: Fn(&T) -> Option<K>,
{
    items.sort_by(|a, b| match (key_fn(a), key_fn(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(ka), Some(kb)) => {
            let ord = ka.partial_cmp(&kb).unwrap_or(Ordering::Equal);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_by<T, K, F>(items: &[T], key_fn: F, direction: SortDirection) -> Vec<T>
    where
        T: Clone,
        K: PartialOrd,
        F: Fn(&T) -> Option<K>,
    {
        let mut out = items.to_vec();
        sort_by(&mut out, key_fn, direction);
        out
    }

    #[test]
    fn page_beyond_range_is_empty() {
        let items = vec![1, 2, 3, 4, 5];
        let page = paginate(&items, 3, 5).expect("page");
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.total_items, 5);
    }

    #[test]
    fn pages_slice_in_order() {
        let items: Vec<u32> = (1..=12).collect();
        assert_eq!(paginate(&items, 1, 5).expect("p1").items, vec![1, 2, 3, 4, 5]);
        let last = paginate(&items, 3, 5).expect("p3");
        assert_eq!(last.items, vec![11, 12]);
        assert_eq!(last.total_pages, 3);
    }

    #[test]
    fn empty_input_has_zero_pages() {
        let page = paginate::<u8>(&[], 1, 10).expect("page");
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        assert_eq!(paginate(&[1], 0, 5), Err(CoreError::InvalidPage(0)));
        assert_eq!(paginate(&[1], 1, 0), Err(CoreError::InvalidPageSize));
    }

    #[test]
    fn huge_page_number_does_not_overflow() {
        let page = paginate(&[1, 2, 3], usize::MAX, 2).expect("page");
        assert!(page.items.is_empty());
    }

    #[test]
    fn nulls_sort_last_in_both_directions() {
        let positions = vec![Some(4.0), None, Some(1.0), None, Some(9.5)];

        let asc = sorted_by(&positions, |p| *p, SortDirection::Asc);
        assert_eq!(asc, vec![Some(1.0), Some(4.0), Some(9.5), None, None]);

        let desc = sorted_by(&positions, |p| *p, SortDirection::Desc);
        assert_eq!(desc, vec![Some(9.5), Some(4.0), Some(1.0), None, None]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let rows = vec![("a", 2), ("b", 1), ("c", 2), ("d", 1), ("e", 2)];

        let asc = sorted_by(&rows, |r| Some(r.1), SortDirection::Asc);
        let ids: Vec<&str> = asc.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c", "e"]);

        let desc = sorted_by(&rows, |r| Some(r.1), SortDirection::Desc);
        let ids: Vec<&str> = desc.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec!["a", "c", "e", "b", "d"]);
    }

    #[test]
    fn parses_direction() {
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!(" asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert!("up".parse::<SortDirection>().is_err());
    }
}
