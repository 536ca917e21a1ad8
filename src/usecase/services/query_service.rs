//! Derived views over the active row set.
//!
//! Every function here is pure: it reads a snapshot of rows plus view state
//! and recomputes from scratch.

use std::cell::RefCell;
use std::cmp::Ordering;

use feruca::Collator;

use crate::domain::entities::dataset::{FilterState, Pagination, Row, SortDirection, SortSpec};
use crate::domain::entities::numeric::parse_numeric;

/// Global search first, then every non-blank column filter, all ANDed.
pub fn filter_rows<'a>(rows: &'a [Row], filters: &FilterState) -> Vec<&'a Row> {
    let mut result: Vec<&Row> = rows.iter().collect();

    if !filters.global_search.trim().is_empty() {
        let query = filters.global_search.to_lowercase();
        result.retain(|row| row.values().any(|value| value.to_lowercase().contains(&query)));
    }

    for (column, filter) in &filters.column_filters {
        if filter.trim().is_empty() {
            continue;
        }
        let query = filter.to_lowercase();
        result.retain(|row| row.get(column).to_lowercase().contains(&query));
    }

    result
}

/// Stable sort; equal keys keep their relative order.
pub fn sort_rows(rows: &mut [&Row], sort: &SortSpec) {
    rows.sort_by(|a, b| {
        let ordering = compare_values(a.get(&sort.column), b.get(&sort.column));
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

pub fn filtered_rows<'a>(
    rows: &'a [Row],
    filters: &FilterState,
    sort: Option<&SortSpec>,
) -> Vec<&'a Row> {
    let mut result = filter_rows(rows, filters);
    if let Some(sort) = sort {
        sort_rows(&mut result, sort);
    }
    result
}

pub fn paginate<'a>(filtered: &[&'a Row], pagination: Pagination) -> Vec<&'a Row> {
    let page_size = pagination.page_size.max(1);
    let start = pagination.page.saturating_sub(1).saturating_mul(page_size);
    filtered.iter().skip(start).take(page_size).copied().collect()
}

/// Numeric when both sides parse as numbers, text collation when neither does.
///
/// A number always sorts before a non-number so the ordering stays total.
pub fn compare_values(a: &str, b: &str) -> Ordering {
    match (parse_numeric(a), parse_numeric(b)) {
        (Some(left), Some(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => collate(a, b),
    }
}

thread_local! {
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Unicode collation (CLDR root order), falling back to code points when the
/// collator sees two strings as equal.
pub fn collate(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| collator.borrow_mut().collate(a, b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs.iter().copied().collect()
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            row(&[("a", "1"), ("b", "x")]),
            row(&[("a", "1"), ("b", "y")]),
            row(&[("a", "2"), ("b", "x")]),
        ]
    }

    fn column_values<'a>(rows: &[&'a Row], column: &str) -> Vec<&'a str> {
        rows.iter().map(|row| row.get(column)).collect()
    }

    #[test]
    fn global_search_and_column_filter_are_anded() {
        let rows = sample_rows();
        let mut filters = FilterState::default();
        filters.global_search = "1".to_string();
        filters.column_filters.insert("b".to_string(), "x".to_string());

        let result = filter_rows(&rows, &filters);
        assert_eq!(result, vec![&rows[0]]);
    }

    #[test]
    fn filters_are_case_insensitive_substrings() {
        let rows = vec![row(&[("name", "Alice Smith")]), row(&[("name", "Bob")])];
        let mut filters = FilterState::default();
        filters.global_search = "SMI".to_string();
        assert_eq!(filter_rows(&rows, &filters), vec![&rows[0]]);

        let mut filters = FilterState::default();
        filters.column_filters.insert("name".to_string(), "bO".to_string());
        assert_eq!(filter_rows(&rows, &filters), vec![&rows[1]]);
    }

    #[test]
    fn blank_filters_keep_every_row() {
        let rows = sample_rows();
        let mut filters = FilterState::default();
        filters.global_search = "  ".to_string();
        filters.column_filters.insert("a".to_string(), String::new());
        assert_eq!(filter_rows(&rows, &filters).len(), 3);
    }

    #[test]
    fn numeric_values_sort_numerically() {
        let rows = vec![row(&[("a", "10")]), row(&[("a", "2")]), row(&[("a", "1,5")])];
        let sort = SortSpec {
            column: "a".to_string(),
            direction: SortDirection::Asc,
        };
        let sorted = filtered_rows(&rows, &FilterState::default(), Some(&sort));
        assert_eq!(column_values(&sorted, "a"), vec!["1,5", "2", "10"]);
    }

    #[test]
    fn mixed_values_sort_numbers_before_text() {
        let rows = vec![row(&[("a", "10")]), row(&[("a", "2")]), row(&[("a", "abc")])];
        let sort = SortSpec {
            column: "a".to_string(),
            direction: SortDirection::Asc,
        };
        let sorted = filtered_rows(&rows, &FilterState::default(), Some(&sort));
        let values = column_values(&sorted, "a");

        assert_eq!(values, vec!["2", "10", "abc"]);
        assert_eq!(compare_values("abc", "2"), Ordering::Greater);
    }

    #[test]
    fn mixed_comparison_is_transitive() {
        // Collating every mixed pair as text would cycle: "2" > "1a" > "10" > "2".
        let mut values = vec!["1a", "2", "10", "", "b"];
        values.sort_by(|a, b| compare_values(a, b));
        assert_eq!(values, vec!["2", "10", "", "1a", "b"]);
    }

    #[test]
    fn descending_sort_reverses_and_ties_stay_stable() {
        let rows = vec![
            row(&[("k", "b"), ("id", "1")]),
            row(&[("k", "a"), ("id", "2")]),
            row(&[("k", "b"), ("id", "3")]),
        ];
        let sort = SortSpec {
            column: "k".to_string(),
            direction: SortDirection::Desc,
        };
        let sorted = filtered_rows(&rows, &FilterState::default(), Some(&sort));
        assert_eq!(column_values(&sorted, "id"), vec!["1", "3", "2"]);
    }

    #[test]
    fn collation_ignores_case_first() {
        assert_eq!(collate("apple", "Banana"), Ordering::Less);
        assert_eq!(collate("Banana", "cherry"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }

    #[test]
    fn accented_text_sorts_beside_its_base_letters() {
        let mut values = vec!["zebra", "école", "apple", "Émile", "eagle"];
        values.sort_by(|a, b| compare_values(a, b));
        assert_eq!(values, vec!["apple", "eagle", "école", "Émile", "zebra"]);
    }

    #[test]
    fn collation_ties_break_deterministically() {
        assert_ne!(collate("resume", "Resume"), Ordering::Equal);
        assert_eq!(
            collate("resume", "Resume"),
            collate("Resume", "resume").reverse()
        );
    }

    #[test]
    fn pagination_slices_last_partial_page() {
        let rows: Vec<Row> = (0..45)
            .map(|idx| row(&[("n", idx.to_string().as_str())]))
            .collect();
        let filtered = filter_rows(&rows, &FilterState::default());
        let pagination = Pagination {
            page: 3,
            page_size: 20,
        };

        assert_eq!(pagination.total_pages(filtered.len()), 3);
        let page = paginate(&filtered, pagination);
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].get("n"), "40");
    }

    #[test]
    fn pagination_past_the_end_is_empty() {
        let rows = sample_rows();
        let filtered = filter_rows(&rows, &FilterState::default());
        let page = paginate(
            &filtered,
            Pagination {
                page: 5,
                page_size: 2,
            },
        );
        assert!(page.is_empty());
    }
}
