//! Course grouping: from a flat record list to per-course series.

use std::cmp::Ordering;

use crate::core::domain::{CourseSeries, HistoricalRecord};

/// Group records into per-course series.
///
/// Each record's count is appended to its course's series in input order, and
/// courses keep their first-appearance order. Empty input yields an empty mapping.
pub fn group_records(records: &[HistoricalRecord]) -> CourseSeries {
    let mut series = CourseSeries::new();
    for record in records {
        series.push(&record.course_id, &record.term, record.enrollment_count);
    }
    series
}

/// Reorder every course's observations by term label.
///
/// The sort is stable, so observations sharing a term keep their input order.
/// Course order is unchanged.
pub fn sort_chronologically(series: &mut CourseSeries) {
    for history in series.histories_mut() {
        let mut observations: Vec<(String, u32)> = history
            .terms
            .drain(..)
            .zip(history.counts.drain(..))
            .collect();
        observations.sort_by(|a, b| compare_terms(&a.0, &b.0));

        let (terms, counts): (Vec<String>, Vec<u32>) = observations.into_iter().unzip();
        history.terms = terms;
        history.counts = counts;
    }
}

/// Compare term labels in natural order.
///
/// Digit runs compare numerically and other text compares case-insensitively, so
/// `"2021-2"` sorts before `"2021-10"` and `"Term 9"` before `"term 10"`.
pub fn compare_terms(a: &str, b: &str) -> Ordering {
    let mut left = TermChunks::new(a);
    let mut right = TermChunks::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = compare_chunks(x, y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_chunks(x: &str, y: &str) -> Ordering {
    let x_numeric = x.bytes().all(|b| b.is_ascii_digit());
    let y_numeric = y.bytes().all(|b| b.is_ascii_digit());

    match (x_numeric, y_numeric) {
        (true, true) => {
            let x = x.trim_start_matches('0');
            let y = y.trim_start_matches('0');
            x.len().cmp(&y.len()).then_with(|| x.cmp(y))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => x.to_lowercase().cmp(&y.to_lowercase()),
    }
}

/// Splits a term label into alternating digit and non-digit runs.
struct TermChunks<'a> {
    rest: &'a str,
}

impl<'a> TermChunks<'a> {
    fn new(term: &'a str) -> Self {
        Self { rest: term.trim() }
    }
}

impl<'a> Iterator for TermChunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(i, _)| i)
            .unwrap_or(self.rest.len());

        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(rows: &[(&str, &str, u32)]) -> Vec<HistoricalRecord> {
        rows.iter()
            .map(|(term, course, count)| HistoricalRecord::new(*term, *course, *count))
            .collect()
    }

    #[test]
    fn test_group_empty_input() {
        let series = group_records(&[]);
        assert!(series.is_empty());
    }

    #[test]
    fn test_group_preserves_arrival_order() {
        let input = records(&[
            ("2022-2", "C1", 12),
            ("2022-1", "C2", 5),
            ("2022-1", "C1", 10),
            ("2022-3", "C1", 14),
        ]);

        let series = group_records(&input);
        assert_eq!(series.course_ids().collect::<Vec<_>>(), vec!["C1", "C2"]);
        assert_eq!(series.get("C1"), Some(&[12, 10, 14][..]));
        assert_eq!(series.get("C2"), Some(&[5][..]));
    }

    #[test]
    fn test_group_is_deterministic() {
        let input = records(&[("a", "X", 1), ("b", "Y", 2), ("c", "X", 3)]);
        assert_eq!(group_records(&input), group_records(&input));
    }

    #[test]
    fn test_sort_chronologically_reorders_within_course() {
        let input = records(&[
            ("2022-2", "C1", 12),
            ("2022-10", "C2", 9),
            ("2022-1", "C1", 10),
            ("2022-2", "C2", 7),
            ("2022-3", "C1", 14),
        ]);

        let mut series = group_records(&input);
        sort_chronologically(&mut series);

        assert_eq!(series.course_ids().collect::<Vec<_>>(), vec!["C1", "C2"]);
        assert_eq!(series.get("C1"), Some(&[10, 12, 14][..]));
        assert_eq!(series.get("C2"), Some(&[7, 9][..]));
        assert_eq!(series.histories()[0].terms, vec!["2022-1", "2022-2", "2022-3"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_terms() {
        let input = records(&[("T1", "C", 3), ("T1", "C", 1), ("T0", "C", 2)]);
        let mut series = group_records(&input);
        sort_chronologically(&mut series);
        assert_eq!(series.get("C"), Some(&[2, 3, 1][..]));
    }

    #[test]
    fn test_compare_terms_natural_order() {
        assert_eq!(compare_terms("2021-2", "2021-10"), Ordering::Less);
        assert_eq!(compare_terms("Term 9", "term 10"), Ordering::Less);
        assert_eq!(compare_terms("2020", "2020"), Ordering::Equal);
        assert_eq!(compare_terms("007", "7"), Ordering::Equal);
        assert_eq!(compare_terms("2020", "2020-1"), Ordering::Less);
        assert_eq!(compare_terms("", "2020"), Ordering::Less);
    }
}
