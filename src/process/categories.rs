use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

use super::raw_table::RawRecord;

/// Distinct values seen per categorical column.
pub type Categories = BTreeMap<&'static str, BTreeSet<String>>;

/// Collect and log the category levels of every categorical column.
/// Purely informational; the records are not touched.
#[instrument(level = "info", skip(records), fields(rows = records.len()))]
pub fn classify_columns(records: &[RawRecord]) -> Categories {
    let mut cats = Categories::new();
    for rec in records {
        for (column, value) in rec.categorical_fields() {
            cats.entry(column).or_default().insert(value.to_string());
        }
    }

    for (column, levels) in &cats {
        debug!(column, count = levels.len(), levels = ?levels, "categories");
    }
    info!(columns = cats.len(), "classified categorical columns");
    cats
}
