//! Ordering and window filtering applied before releases are shown.

use std::cmp::Reverse;

use crate::date_window::DateWindow;
use crate::types::ReleaseItem;

/// Sorts newest first by effective date. Items without a date go last.
///
/// The sort is stable, so an already sorted list keeps its order.
pub fn sort_by_recency(releases: &mut [ReleaseItem]) {
    releases.sort_by_key(|item| Reverse(item.effective_date()));
}

/// Keeps only items whose effective date lies inside `window`.
///
/// The catalog applies its own date filter; this second pass guards the
/// output against records the catalog let through anyway.
pub fn retain_in_window(releases: &mut Vec<ReleaseItem>, window: &DateWindow) {
    releases.retain(|item| item.effective_date().is_some_and(|date| window.contains(date)));
}

/// Sorted, window-filtered releases ready for a renderer.
pub fn prepare_listing(mut releases: Vec<ReleaseItem>, window: &DateWindow) -> Vec<ReleaseItem> {
    sort_by_recency(&mut releases);
    retain_in_window(&mut releases, window);
    releases
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::date_window::compute_window_from;
    use crate::providers::mock::{movie, series};

    fn item(record: crate::types::CatalogRecord) -> ReleaseItem {
        ReleaseItem::from_record(record, None)
    }

    fn window() -> DateWindow {
        compute_window_from(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(), 30)
    }

    #[test]
    fn test_sorts_by_effective_date_descending() {
        let mut releases = vec![
            item(movie(1, "hi", "2024-03-02")),
            item(series(2, "hi", "2024-03-25")),
            item(movie(3, "hi", "2024-03-10")),
        ];

        sort_by_recency(&mut releases);

        let ids: Vec<u64> = releases.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_release_date_wins_over_first_air_date() {
        let mut record = movie(1, "en", "2024-03-05");
        record.first_air_date = NaiveDate::from_ymd_opt(2024, 3, 30);

        assert_eq!(
            item(record).effective_date(),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
    }

    #[test]
    fn test_sorting_sorted_list_is_stable() {
        let mut releases = vec![
            item(movie(1, "te", "2024-03-20")),
            item(movie(2, "te", "2024-03-20")),
            item(movie(3, "te", "2024-03-11")),
            item(movie(4, "te", "2024-03-01")),
        ];
        sort_by_recency(&mut releases);
        let once = releases.clone();

        sort_by_recency(&mut releases);
        assert_eq!(releases, once);
        assert_eq!(releases[0].id, 1);
        assert_eq!(releases[1].id, 2);
    }

    #[test]
    fn test_window_filter_is_inclusive() {
        let releases = vec![
            item(movie(1, "hi", "2024-02-29")),
            item(movie(2, "hi", "2024-03-01")),
            item(movie(3, "hi", "2024-03-31")),
            item(movie(4, "hi", "2024-04-01")),
            item(movie(5, "hi", "not-a-date")),
        ];

        let listing = prepare_listing(releases, &window());

        let ids: Vec<u64> = listing.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert!(
            listing
                .iter()
                .all(|r| r.effective_date().is_some_and(|d| window().contains(d)))
        );
    }
}
