//! Record grouping and in-column ordering.
//!
//! Everything here is pure and synchronous: inputs are borrowed, nothing is
//! mutated, no I/O happens. The board view is recomputed from scratch on every
//! render.

use crate::categories::CategoryStore;
use crate::pending::PendingMoves;
use crate::types::{Category, CategoryId, OrderingPolicy, Record, RecordId};
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;

/// The category a record renders in: a pending move wins over the fetched
/// value.
pub fn effective_category<'a>(
    record: &'a Record,
    pending: &'a PendingMoves,
) -> Option<&'a CategoryId> {
    pending
        .effective_category(&record.id)
        .or(record.category_id.as_ref())
}

/// Compare two records under `policy`.
///
/// `NextEventAsc` is two-tiered: every record with a next event sorts before
/// every record without one, and two records without one compare equal.
pub fn compare(policy: OrderingPolicy, a: &Record, b: &Record) -> Ordering {
    match policy {
        OrderingPolicy::Manual => a.position_key.total_cmp(&b.position_key),
        OrderingPolicy::ValueDesc => b.total_value().total_cmp(&a.total_value()),
        OrderingPolicy::ValueAsc => a.total_value().total_cmp(&b.total_value()),
        OrderingPolicy::NextEventAsc => match (&a.next_event_at, &b.next_event_at) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

/// Stable sort; ties keep their incoming (fetch) order.
pub fn sort_records(records: &mut [&Record], policy: OrderingPolicy) {
    records.sort_by(|a, b| compare(policy, a, b));
}

/// Partition `records` into one bucket per known category, in column order.
///
/// Records whose effective category is unset or unknown are left out.
/// Every category gets a bucket, empty or not.
pub fn group<'a>(
    records: &'a [Record],
    categories: &CategoryStore,
    pending: &PendingMoves,
    policy: OrderingPolicy,
) -> IndexMap<CategoryId, Vec<&'a Record>> {
    let mut buckets: IndexMap<CategoryId, Vec<&'a Record>> = categories
        .iter()
        .map(|c| (c.id.clone(), Vec::new()))
        .collect();

    for record in records {
        if let Some(bucket) =
            effective_category(record, pending).and_then(|id| buckets.get_mut(id))
        {
            bucket.push(record);
        }
    }

    for bucket in buckets.values_mut() {
        sort_records(bucket, policy);
    }
    buckets
}

/// One rendered column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnView {
    pub category: Category,
    /// Ordered cards; `category_id` already reflects pending moves
    pub records: Vec<Record>,
    pub count: usize,
    /// Sum of every card's total value
    pub total_value: f64,
}

impl ColumnView {
    pub fn record_ids(&self) -> Vec<&RecordId> {
        self.records.iter().map(|r| &r.id).collect()
    }

    pub fn contains(&self, record: &RecordId) -> bool {
        self.records.iter().any(|r| &r.id == record)
    }
}

/// Per-column view model handed to the host renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub ordering: OrderingPolicy,
    pub columns: IndexMap<CategoryId, ColumnView>,
}

impl BoardView {
    pub fn column(&self, id: &CategoryId) -> Option<&ColumnView> {
        self.columns.get(id)
    }

    /// Ids of the records in a column, in render order
    pub fn record_ids(&self, id: &CategoryId) -> Vec<&RecordId> {
        self.columns
            .get(id)
            .map(ColumnView::record_ids)
            .unwrap_or_default()
    }

    /// The column a record is rendered in
    pub fn column_of(&self, record: &RecordId) -> Option<&CategoryId> {
        self.columns
            .iter()
            .find(|(_, column)| column.contains(record))
            .map(|(id, _)| id)
    }

    pub fn total_records(&self) -> usize {
        self.columns.values().map(|c| c.count).sum()
    }
}

/// Group and materialize the board view model
pub fn render_board(
    records: &[Record],
    categories: &CategoryStore,
    pending: &PendingMoves,
    policy: OrderingPolicy,
) -> BoardView {
    let grouped = group(records, categories, pending, policy);
    let columns = categories
        .iter()
        .map(|category| {
            let records: Vec<Record> = grouped
                .get(&category.id)
                .into_iter()
                .flatten()
                .map(|record| {
                    let mut card = (*record).clone();
                    card.category_id = Some(category.id.clone());
                    card
                })
                .collect();
            let view = ColumnView {
                category: category.clone(),
                count: records.len(),
                total_value: records.iter().map(Record::total_value).sum(),
                records,
            };
            (category.id.clone(), view)
        })
        .collect();

    BoardView {
        ordering: policy,
        columns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryOrigin, ValueMetrics};
    use chrono::{TimeZone, Utc};

    fn categories() -> CategoryStore {
        CategoryStore::new(vec![
            Category::new("lead", "Lead", CategoryOrigin::System, 0),
            Category::new("active", "Active", CategoryOrigin::Custom, 1),
            Category::new("won", "Won", CategoryOrigin::System, 2),
        ])
        .unwrap()
    }

    fn ids<'a>(bucket: &'a [&'a Record]) -> Vec<&'a str> {
        bucket.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_manual_orders_by_position_key_stably() {
        let records = vec![
            Record::new("c", "lead", 3.0),
            Record::new("a", "lead", 1.0),
            Record::new("b1", "lead", 2.0),
            Record::new("b2", "lead", 2.0),
        ];
        let grouped = group(
            &records,
            &categories(),
            &PendingMoves::new(),
            OrderingPolicy::Manual,
        );
        assert_eq!(ids(&grouped[&CategoryId::from("lead")]), vec!["a", "b1", "b2", "c"]);
    }

    #[test]
    fn test_value_ordering_uses_fresh_totals() {
        let mut records = vec![
            Record::new("small", "lead", 0.0).with_values(ValueMetrics::new(10.0, 0.0, 0.0)),
            Record::new("big", "lead", 1.0).with_values(ValueMetrics::new(0.0, 50.0, 50.0)),
            Record::new("mid", "lead", 2.0).with_values(ValueMetrics::new(20.0, 20.0, 10.0)),
        ];
        let cats = categories();
        let pending = PendingMoves::new();

        let desc = group(&records, &cats, &pending, OrderingPolicy::ValueDesc);
        assert_eq!(ids(&desc[&CategoryId::from("lead")]), vec!["big", "mid", "small"]);
        let asc = group(&records, &cats, &pending, OrderingPolicy::ValueAsc);
        assert_eq!(ids(&asc[&CategoryId::from("lead")]), vec!["small", "mid", "big"]);

        // Values change without a position change
        records[0].value_metrics.active_value = 500.0;
        let desc = group(&records, &cats, &pending, OrderingPolicy::ValueDesc);
        assert_eq!(ids(&desc[&CategoryId::from("lead")]), vec!["small", "big", "mid"]);
    }

    #[test]
    fn test_next_event_nulls_sort_last_in_original_order() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let records = vec![
            Record::new("null-a", "lead", 0.0),
            Record::new("t1", "lead", 1.0).with_next_event(t1),
            Record::new("null-b", "lead", 2.0),
            Record::new("t0", "lead", 3.0).with_next_event(t0),
        ];
        let grouped = group(
            &records,
            &categories(),
            &PendingMoves::new(),
            OrderingPolicy::NextEventAsc,
        );
        assert_eq!(
            ids(&grouped[&CategoryId::from("lead")]),
            vec!["t0", "t1", "null-a", "null-b"]
        );
    }

    #[test]
    fn test_unknown_and_missing_categories_are_dropped() {
        let records = vec![
            Record::new("kept", "won", 0.0),
            Record::new("orphan", "deleted", 0.0),
            Record::uncategorized("loose"),
        ];
        let grouped = group(
            &records,
            &categories(),
            &PendingMoves::new(),
            OrderingPolicy::Manual,
        );
        let total: usize = grouped.values().map(Vec::len).sum();
        assert_eq!(total, 1);
        assert_eq!(grouped.len(), 3);
        assert_eq!(ids(&grouped[&CategoryId::from("won")]), vec!["kept"]);
    }

    #[test]
    fn test_pending_move_overrides_fetched_category() {
        let records = vec![Record::new("x", "lead", 0.0), Record::new("y", "lead", 1.0)];
        let mut pending = PendingMoves::new();
        pending.begin("x".into(), "lead".into(), "won".into());

        let grouped = group(&records, &categories(), &pending, OrderingPolicy::Manual);
        assert_eq!(ids(&grouped[&CategoryId::from("lead")]), vec!["y"]);
        assert_eq!(ids(&grouped[&CategoryId::from("won")]), vec!["x"]);
        // Input untouched
        assert_eq!(records[0].category_id, Some(CategoryId::from("lead")));
    }

    #[test]
    fn test_pending_move_to_unknown_category_drops_record() {
        let records = vec![Record::new("x", "lead", 0.0)];
        let mut pending = PendingMoves::new();
        pending.begin("x".into(), "lead".into(), "gone".into());
        let view = render_board(&records, &categories(), &pending, OrderingPolicy::Manual);
        assert_eq!(view.total_records(), 0);
    }

    #[test]
    fn test_render_board_columns_and_totals() {
        let records = vec![
            Record::new("x", "lead", 0.0).with_values(ValueMetrics::new(1.0, 2.0, 3.0)),
            Record::new("y", "won", 0.0).with_values(ValueMetrics::new(10.0, 0.0, 0.0)),
            Record::new("z", "won", 1.0).with_values(ValueMetrics::new(0.0, 5.0, 0.0)),
        ];
        let mut pending = PendingMoves::new();
        pending.begin("x".into(), "lead".into(), "active".into());

        let view = render_board(&records, &categories(), &pending, OrderingPolicy::Manual);
        let order: Vec<&str> = view.columns.keys().map(|k| k.as_str()).collect();
        assert_eq!(order, vec!["lead", "active", "won"]);

        let active = view.column(&"active".into()).unwrap();
        assert_eq!(active.count, 1);
        assert_eq!(active.total_value, 6.0);
        assert_eq!(active.records[0].category_id, Some(CategoryId::from("active")));

        let won = view.column(&"won".into()).unwrap();
        assert_eq!(won.total_value, 15.0);
        assert_eq!(view.column_of(&"x".into()).unwrap().as_str(), "active");
        assert!(view.record_ids(&"lead".into()).is_empty());
    }
}
