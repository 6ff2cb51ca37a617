//! Filter composition for the filtered listing.
//!
//! The same [`RecordFilter`] renders to a store filter expression and
//! evaluates in process, so both backends agree on what matches.

use crate::record::{attr, Record};

/// Placeholder value bound into a filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    String(String),
    Bool(bool),
}

/// A rendered filter: `Feed = :feed AND IsProcessed = :status` plus its
/// placeholder bindings, in condition order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    pub expression: String,
    pub values: Vec<(String, FilterValue)>,
}

/// Optional equality conditions, AND-combined when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub feed: Option<String>,
    pub operation: Option<String>,
    pub status: Option<bool>,
    pub worker: Option<String>,
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl RecordFilter {
    /// Builds a filter from raw query-string values.
    ///
    /// Blank values are absent. Any supplied `status` other than `"true"`
    /// (case-insensitive) filters for unprocessed records.
    pub fn from_raw(
        feed: Option<&str>,
        operation: Option<&str>,
        status: Option<&str>,
        worker: Option<&str>,
    ) -> Self {
        Self {
            feed: present(feed),
            operation: present(operation),
            status: present(status).map(|s| s.eq_ignore_ascii_case("true")),
            worker: present(worker),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.feed.is_none()
            && self.operation.is_none()
            && self.status.is_none()
            && self.worker.is_none()
    }

    /// Renders the supplied conditions, or `None` when nothing was supplied.
    pub fn to_expression(&self) -> Option<FilterExpression> {
        let mut conditions = Vec::new();
        let mut values = Vec::new();

        if let Some(feed) = &self.feed {
            conditions.push(format!("{} = :feed", attr::FEED));
            values.push((":feed".to_string(), FilterValue::String(feed.clone())));
        }
        if let Some(operation) = &self.operation {
            conditions.push(format!("{} = :operation", attr::DML_OPERATION));
            values.push((
                ":operation".to_string(),
                FilterValue::String(operation.clone()),
            ));
        }
        if let Some(status) = self.status {
            conditions.push(format!("{} = :status", attr::IS_PROCESSED));
            values.push((":status".to_string(), FilterValue::Bool(status)));
        }
        if let Some(worker) = &self.worker {
            conditions.push(format!("{} = :worker", attr::WORKER_TYPE));
            values.push((":worker".to_string(), FilterValue::String(worker.clone())));
        }

        if conditions.is_empty() {
            return None;
        }

        Some(FilterExpression {
            expression: conditions.join(" AND "),
            values,
        })
    }

    /// Evaluates the filter against a record.
    pub fn matches(&self, record: &Record) -> bool {
        self.feed.as_deref().is_none_or(|f| record.feed == f)
            && self
                .operation
                .as_deref()
                .is_none_or(|op| record.dml_operation.as_str() == op)
            && self.status.is_none_or(|s| record.is_processed == s)
            && self.worker.as_deref().is_none_or(|w| record.worker_type == w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DmlOperation, CONSTANT_KEY_VALUE};
    use chrono::Utc;

    fn record(feed: &str, op: DmlOperation, processed: bool, worker: &str) -> Record {
        let now = Utc::now();
        Record {
            person_id: "1".to_string(),
            entry_id: "urn:uuid:00000000000000000000000000000001".to_string(),
            feed: feed.to_string(),
            dml_operation: op,
            is_processed: processed,
            worker_type: worker.to_string(),
            processed_message: String::new(),
            constant_key: CONSTANT_KEY_VALUE.to_string(),
            published_date_time: now,
            updated_date_time: now,
        }
    }

    #[test]
    fn test_no_filters_yields_no_expression() {
        let filter = RecordFilter::from_raw(None, Some(""), Some("  "), None);
        assert!(filter.is_empty());
        assert_eq!(filter.to_expression(), None);
    }

    #[test]
    fn test_only_supplied_conditions_are_joined() {
        let filter = RecordFilter::from_raw(Some("empassignment"), None, Some("true"), None);
        let expr = filter.to_expression().unwrap();

        assert_eq!(expr.expression, "Feed = :feed AND IsProcessed = :status");
        assert_eq!(
            expr.values,
            vec![
                (
                    ":feed".to_string(),
                    FilterValue::String("empassignment".to_string())
                ),
                (":status".to_string(), FilterValue::Bool(true)),
            ]
        );
    }

    #[test]
    fn test_all_conditions() {
        let filter =
            RecordFilter::from_raw(Some("person"), Some("DELETE"), Some("false"), Some("CWK"));
        let expr = filter.to_expression().unwrap();
        assert_eq!(
            expr.expression,
            "Feed = :feed AND DMLOperation = :operation AND IsProcessed = :status AND WorkerType = :worker"
        );
        assert_eq!(expr.values.len(), 4);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(RecordFilter::from_raw(None, None, Some("TRUE"), None).status, Some(true));
        assert_eq!(RecordFilter::from_raw(None, None, Some("false"), None).status, Some(false));
        assert_eq!(RecordFilter::from_raw(None, None, Some("yes"), None).status, Some(false));
        assert_eq!(RecordFilter::from_raw(None, None, None, None).status, None);
    }

    #[test]
    fn test_matches_agrees_with_conditions() {
        let filter = RecordFilter::from_raw(Some("salary"), Some("INSERT"), None, Some("EMP"));

        assert!(filter.matches(&record("salary", DmlOperation::Insert, true, "EMP")));
        assert!(filter.matches(&record("salary", DmlOperation::Insert, false, "EMP")));
        assert!(!filter.matches(&record("salary", DmlOperation::Update, true, "EMP")));
        assert!(!filter.matches(&record("person", DmlOperation::Insert, true, "EMP")));
        assert!(!filter.matches(&record("salary", DmlOperation::Insert, true, "CWK")));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = RecordFilter::default();
        assert!(filter.matches(&record("any", DmlOperation::Delete, false, "PEN")));
    }
}
