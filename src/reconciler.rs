//! Client side filtering for the list screens.
//!
//! A [`Reconciler`] owns the last fetched collection (`source`) and the view of
//! it that passes the active [`Filters`] (`filtered`). Every change to the
//! source or to the filters re-derives `filtered` from scratch, so the two can
//! never drift apart, and deleting a record touches both in one call.

use std::fmt::Debug;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    models::{MovementLog, SaleLine, StockRecord},
    utils::parse_date,
    AppError, Result,
};

/// What the list screens need to know about a row
pub trait Record: Clone {
    type Id: Copy + PartialEq + Debug;
    fn id(&self) -> Self::Id;
    /// Field matched by the code filter
    fn code(&self) -> &str;
    /// Field matched by the date range
    fn timestamp(&self) -> NaiveDateTime;
    /// Value summed into the list total
    fn amount(&self) -> f64;
}

impl Record for StockRecord {
    type Id = i64;
    fn id(&self) -> i64 {
        self.id
    }
    fn code(&self) -> &str {
        &self.item_code
    }
    fn timestamp(&self) -> NaiveDateTime {
        self.created_at
    }
    fn amount(&self) -> f64 {
        f64::from(self.quantity)
    }
}
impl Record for SaleLine {
    type Id = i64;
    fn id(&self) -> i64 {
        self.sale_id
    }
    fn code(&self) -> &str {
        &self.item_code
    }
    fn timestamp(&self) -> NaiveDateTime {
        self.date
    }
    fn amount(&self) -> f64 {
        self.total_price
    }
}
impl Record for MovementLog {
    type Id = i64;
    fn id(&self) -> i64 {
        self.id
    }
    fn code(&self) -> &str {
        &self.item_code
    }
    fn timestamp(&self) -> NaiveDateTime {
        self.operation_date
    }
    fn amount(&self) -> f64 {
        self.quantity_changed as f64
    }
}

/// Active predicates. `None` means no constraint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    code: Option<String>,
}

impl Filters {
    /// Builds filters from raw form fields, blank fields are absent
    pub fn parse(start_date: &str, end_date: &str, code: &str) -> Result<Self> {
        let date = |raw: &str, label: &str| -> Result<Option<NaiveDate>> {
            if raw.trim().is_empty() {
                return Ok(None);
            }
            parse_date(raw)
                .map(Some)
                .ok_or_else(|| AppError::ValidationFailed(format!("Data {label} inválida: {raw}")))
        };
        Ok(Self {
            start_date: date(start_date, "inicial")?,
            end_date: date(end_date, "final")?,
            code: None,
        }
        .with_code(code))
    }
    pub fn with_start(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }
    pub fn with_end(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }
    pub fn with_code(mut self, code: &str) -> Self {
        let code = code.trim();
        self.code = if code.is_empty() {
            None
        } else {
            Some(code.to_lowercase())
        };
        self
    }
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.code.is_none()
    }
    /// Conjunction of every active predicate. Both bounds are inclusive and
    /// stand for midnight of their day, so the end day itself only keeps
    /// records stamped at 00:00.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        let ts = record.timestamp();
        if let Some(start) = self.start_date {
            if ts < start.and_time(NaiveTime::MIN) {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if ts > end.and_time(NaiveTime::MIN) {
                return false;
            }
        }
        if let Some(code) = &self.code {
            if !record.code().to_lowercase().contains(code.as_str()) {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(AppError),
}

#[derive(Clone, Debug)]
pub struct Reconciler<R: Record> {
    source: Vec<R>,
    filtered: Vec<R>,
    filters: Filters,
    state: LoadState,
    generation: u64,
}

impl<R: Record> Default for Reconciler<R> {
    fn default() -> Self {
        Self {
            source: Vec::new(),
            filtered: Vec::new(),
            filters: Filters::default(),
            state: LoadState::Idle,
            generation: 0,
        }
    }
}

impl<R: Record> Reconciler<R> {
    pub fn new() -> Self {
        Self::default()
    }
    /// Starts a fetch and returns the tag its response must carry. Any
    /// response tagged with an older generation is dropped.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.generation
    }
    /// Applies a fetch result. Returns `false` when the result is stale.
    pub fn finish_load(&mut self, generation: u64, result: Result<Vec<R>>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                "dropping stale response {generation}, current is {current}",
                current = self.generation
            );
            return false;
        }
        match result {
            Ok(records) => {
                self.source = records;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                self.source.clear();
                self.state = LoadState::Failed(e);
            }
        }
        self.refilter();
        true
    }
    pub fn set_filters(&mut self, filters: Filters) {
        self.filters = filters;
        self.refilter();
    }
    pub fn clear_filters(&mut self) {
        self.set_filters(Filters::default());
    }
    /// Drops every record with `id` from source and view. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, id: R::Id) -> bool {
        let before = self.source.len();
        self.source.retain(|r| r.id() != id);
        self.filtered.retain(|r| r.id() != id);
        before != self.source.len()
    }
    pub fn source(&self) -> &[R] {
        &self.source
    }
    pub fn filtered(&self) -> &[R] {
        &self.filtered
    }
    pub fn state(&self) -> &LoadState {
        &self.state
    }
    pub fn error(&self) -> Option<String> {
        match &self.state {
            LoadState::Failed(e) => Some(e.user_message()),
            _ => None,
        }
    }
    /// Sum over the filtered rows, computed on every call
    pub fn aggregate(&self) -> f64 {
        self.filtered.iter().map(Record::amount).sum()
    }

    fn refilter(&mut self) {
        self.filtered = if self.filters.is_empty() {
            self.source.clone()
        } else {
            self.source
                .iter()
                .filter(|r| self.filters.matches(*r))
                .cloned()
                .collect()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Row {
        id: i64,
        code: &'static str,
        at: NaiveDateTime,
        total: f64,
    }
    impl Record for Row {
        type Id = i64;
        fn id(&self) -> i64 {
            self.id
        }
        fn code(&self) -> &str {
            self.code
        }
        fn timestamp(&self) -> NaiveDateTime {
            self.at
        }
        fn amount(&self) -> f64 {
            self.total
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
    fn row(id: i64, code: &'static str, date: NaiveDate, hour: u32, total: f64) -> Row {
        Row {
            id,
            code,
            at: date.and_hms_opt(hour, 0, 0).unwrap(),
            total,
        }
    }
    fn two_rows() -> Vec<Row> {
        vec![
            row(1, "A1", day(2025, 1, 1), 0, 10.0),
            row(2, "B2", day(2025, 1, 5), 0, 20.0),
        ]
    }
    fn loaded(rows: Vec<Row>) -> Reconciler<Row> {
        let mut rec = Reconciler::new();
        let generation = rec.begin_load();
        assert!(rec.finish_load(generation, Ok(rows)));
        rec
    }
    fn codes(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.code).collect()
    }

    #[test]
    fn code_filter_is_case_insensitive() {
        let mut rec = loaded(two_rows());
        rec.set_filters(Filters::default().with_code("a1"));
        assert_eq!(codes(rec.filtered()), vec!["A1"]);
        rec.set_filters(Filters::default().with_code("2"));
        assert_eq!(codes(rec.filtered()), vec!["B2"]);
    }
    #[test]
    fn start_date_filter() {
        let mut rec = loaded(two_rows());
        rec.set_filters(Filters::default().with_start(day(2025, 1, 2)));
        assert_eq!(codes(rec.filtered()), vec!["B2"]);
    }
    #[test]
    fn date_bounds_are_midnight_of_their_day() {
        let rows = vec![
            row(1, "A", day(2025, 1, 1), 23, 1.0),
            row(2, "B", day(2025, 1, 2), 0, 1.0),
            row(3, "C", day(2025, 1, 3), 0, 1.0),
            row(4, "D", day(2025, 1, 3), 12, 1.0),
            row(5, "E", day(2025, 1, 4), 0, 1.0),
        ];
        let mut rec = loaded(rows);
        rec.set_filters(
            Filters::default()
                .with_start(day(2025, 1, 2))
                .with_end(day(2025, 1, 3)),
        );
        assert_eq!(codes(rec.filtered()), vec!["B", "C"]);
        rec.set_filters(
            Filters::default()
                .with_start(day(2025, 1, 3))
                .with_end(day(2025, 1, 2)),
        );
        assert!(rec.filtered().is_empty());
    }
    #[test]
    fn clearing_restores_source_in_order() {
        let rows = vec![
            row(3, "C3", day(2025, 2, 1), 0, 3.0),
            row(1, "A1", day(2025, 1, 1), 0, 1.0),
            row(2, "B2", day(2025, 1, 5), 0, 2.0),
        ];
        let mut rec = loaded(rows.clone());
        rec.set_filters(Filters::default().with_code("b").with_start(day(2025, 1, 2)));
        assert_eq!(codes(rec.filtered()), vec!["B2"]);
        rec.clear_filters();
        assert_eq!(rec.filtered(), rows.as_slice());
        assert_eq!(rec.source(), rows.as_slice());
    }
    #[test]
    fn blank_code_is_no_filter() -> anyhow::Result<()> {
        let filters = Filters::parse("", " ", "   ")?;
        assert!(filters.is_empty());
        let mut rec = loaded(two_rows());
        rec.set_filters(filters);
        assert_eq!(rec.filtered(), rec.source());
        Ok(())
    }
    #[test]
    fn bad_date_is_validation_error() {
        let err = Filters::parse("2025-02-30", "", "").unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
    }
    #[test]
    fn every_filter_combination_is_a_conjunctive_subset() {
        let rows = vec![
            row(1, "A1", day(2025, 1, 1), 9, 1.5),
            row(2, "b2", day(2025, 1, 5), 12, 2.25),
            row(3, "AB3", day(2025, 1, 7), 23, 4.0),
            row(4, "C4", day(2025, 2, 1), 0, 8.0),
            row(5, "a5", day(2024, 12, 31), 15, 16.0),
        ];
        let starts = [None, Some(day(2025, 1, 1)), Some(day(2025, 1, 6))];
        let ends = [None, Some(day(2025, 1, 5)), Some(day(2025, 1, 31))];
        let needles = ["", "a", "B", "3", "zz"];
        let mut rec = loaded(rows.clone());
        for start in starts {
            for end in ends {
                for needle in needles {
                    let mut filters = Filters::default().with_code(needle);
                    filters.start_date = start;
                    filters.end_date = end;
                    rec.set_filters(filters.clone());
                    let expected = rows
                        .iter()
                        .filter(|r| {
                            start.map_or(true, |s| r.at.date() >= s)
                                && end.map_or(true, |e| r.at <= e.and_time(NaiveTime::MIN))
                                && r.code.to_lowercase().contains(&needle.to_lowercase())
                        })
                        .cloned()
                        .collect::<Vec<_>>();
                    assert_eq!(rec.filtered(), expected.as_slice(), "{filters:?}");
                    assert!(rec.filtered().iter().all(|r| rec.source().contains(r)));
                    let sum: f64 = expected.iter().map(|r| r.total).sum();
                    assert_eq!(rec.aggregate(), sum);
                }
            }
        }
        rec.clear_filters();
        assert_eq!(rec.filtered(), rows.as_slice());
    }
    #[test]
    fn delete_removes_from_both_sequences() {
        let mut rec = loaded(two_rows());
        assert!(rec.remove(1));
        assert_eq!(codes(rec.source()), vec!["B2"]);
        assert_eq!(codes(rec.filtered()), vec!["B2"]);
        assert!(!rec.remove(1));
    }
    #[test]
    fn delete_while_filtered_keeps_order() {
        let rows = vec![
            row(1, "A1", day(2025, 1, 1), 0, 1.0),
            row(2, "A2", day(2025, 1, 2), 0, 2.0),
            row(3, "B3", day(2025, 1, 3), 0, 4.0),
            row(4, "A4", day(2025, 1, 4), 0, 8.0),
        ];
        let mut rec = loaded(rows);
        rec.set_filters(Filters::default().with_code("a"));
        assert_eq!(rec.aggregate(), 11.0);
        assert!(rec.remove(2));
        assert_eq!(codes(rec.filtered()), vec!["A1", "A4"]);
        assert_eq!(codes(rec.source()), vec!["A1", "B3", "A4"]);
        assert_eq!(rec.aggregate(), 9.0);
        rec.clear_filters();
        assert_eq!(codes(rec.filtered()), vec!["A1", "B3", "A4"]);
        assert_eq!(rec.aggregate(), 13.0);
    }
    #[test]
    fn failed_fetch_leaves_nothing_behind() {
        let mut rec = loaded(two_rows());
        let generation = rec.begin_load();
        let applied = rec.finish_load(
            generation,
            Err(AppError::NetworkUnavailable(String::from("connection refused"))),
        );
        assert!(applied);
        assert!(rec.source().is_empty());
        assert!(rec.filtered().is_empty());
        assert_eq!(rec.aggregate(), 0.0);
        assert_eq!(
            rec.error().as_deref(),
            Some("Erro de conexão com o servidor.")
        );
    }
    #[test]
    fn stale_response_is_dropped() {
        let mut rec = Reconciler::<Row>::new();
        let first = rec.begin_load();
        let second = rec.begin_load();
        assert!(!rec.finish_load(first, Ok(two_rows())));
        assert_eq!(rec.state(), &LoadState::Loading);
        assert!(rec.source().is_empty());
        assert!(rec.finish_load(second, Ok(two_rows()[1..].to_vec())));
        assert_eq!(codes(rec.source()), vec!["B2"]);
        assert_eq!(rec.state(), &LoadState::Ready);
    }
    #[test]
    fn new_source_is_refiltered_with_current_filters() {
        let mut rec = loaded(two_rows());
        rec.set_filters(Filters::default().with_code("b"));
        let generation = rec.begin_load();
        rec.finish_load(
            generation,
            Ok(vec![
                row(7, "B7", day(2025, 3, 1), 0, 5.0),
                row(8, "C8", day(2025, 3, 2), 0, 6.0),
            ]),
        );
        assert_eq!(codes(rec.filtered()), vec!["B7"]);
        assert_eq!(rec.aggregate(), 5.0);
    }
    #[test]
    fn end_day_after_midnight_is_excluded() -> anyhow::Result<()> {
        let mut rec = loaded(vec![
            row(1, "A1", day(2025, 1, 3), 12, 1.0),
            row(2, "A1", day(2025, 1, 2), 18, 1.0),
        ]);
        rec.set_filters(Filters::parse("", "2025-01-03", "")?);
        assert_eq!(rec.filtered().len(), 1);
        assert_eq!(rec.filtered()[0].id, 2);
        Ok(())
    }
}
