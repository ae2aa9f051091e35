use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use std::fmt;
use tracing::{info, instrument};

use super::areas::AreaLookup;
use super::raw_table::{RawRecord, RawValue};
use super::utils::pathify;

pub const UNIT: &str = "dwellings";

const COUNT_SUFFIX: &str = "(Number)";
const TOTAL_LABEL: &str = "All tenures (Number)";
const TOTAL_SLUG: &str = "total";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MeasureType {
    Count,
    Percentage,
}

impl MeasureType {
    /// `Count` iff the tenure label ends in `(Number)`.
    pub fn classify(tenure_label: &str) -> Self {
        if tenure_label.ends_with(COUNT_SUFFIX) {
            MeasureType::Count
        } else {
            MeasureType::Percentage
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureType::Count => "Count",
            MeasureType::Percentage => "Percentage",
        }
    }
}

impl fmt::Display for MeasureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output row. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    #[serde(rename = "Value")]
    pub value: i64,
    #[serde(rename = "Tenure")]
    pub tenure: String,
    #[serde(rename = "Unit")]
    pub unit: &'static str,
    #[serde(rename = "Period")]
    pub period: String,
    #[serde(rename = "Measure Type")]
    pub measure_type: MeasureType,
    #[serde(rename = "Geography")]
    pub geography: String,
}

/// `201920` → `gregorian-interval/2019-03-31T00:00:00/P1Y`.
///
/// Only the first four characters are used; nothing is checked beyond there being four.
pub fn period_from_year_code(year_code: &str) -> Result<String> {
    let year: String = year_code.chars().take(4).collect();
    if year.chars().count() < 4 {
        bail!("year code {:?} is shorter than four characters", year_code);
    }
    Ok(format!("gregorian-interval/{}-03-31T00:00:00/P1Y", year))
}

/// Normalize a tenure label into a slug: `Owner occupied (Number)` → `owner-occupied`.
pub fn tenure_slug(label: &str) -> String {
    if label == TOTAL_LABEL {
        return TOTAL_SLUG.to_string();
    }
    let stem = label
        .strip_suffix(" (Number)")
        .or_else(|| label.strip_suffix(" (%)"))
        .unwrap_or(label);
    pathify(stem).replace('/', "-")
}

/// Row with every derived column filled in but the value still raw.
#[derive(Debug)]
struct Derived<'a> {
    source: &'a RawRecord,
    tenure: String,
    measure_type: MeasureType,
    period: String,
    geography: String,
}

fn derive_row<'a>(rec: &'a RawRecord, areas: &AreaLookup) -> Result<Derived<'a>> {
    let period = period_from_year_code(&rec.year_code)?;
    let measure_type = MeasureType::classify(&rec.tenure_name);
    let tenure = tenure_slug(&rec.tenure_name);
    let geography = areas.geography(rec.area_key()?)?.to_string();
    Ok(Derived {
        source: rec,
        tenure,
        measure_type,
        period,
        geography,
    })
}

fn coerce_value(value: &RawValue) -> Result<i64> {
    value
        .as_integer()
        .ok_or_else(|| anyhow!("value {} is not an integer", value))
}

/// Raw table + area lookup → Count observations.
///
/// Every row is derived (so an unresolvable area fails even on a percentage
/// row), then percentage rows are dropped and the surviving values coerced.
#[instrument(level = "info", skip_all, fields(rows = records.len()))]
pub fn transform(records: &[RawRecord], areas: &AreaLookup) -> Result<Vec<Observation>> {
    let derived = records
        .iter()
        .map(|rec| derive_row(rec, areas).with_context(|| rec.describe()))
        .collect::<Result<Vec<_>>>()?;

    let observations = derived
        .into_iter()
        .filter(|d| d.measure_type == MeasureType::Count)
        .map(|d| {
            let value = coerce_value(&d.source.data).with_context(|| d.source.describe())?;
            Ok(Observation {
                value,
                tenure: d.tenure,
                unit: UNIT,
                period: d.period,
                measure_type: d.measure_type,
                geography: d.geography,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        kept = observations.len(),
        dropped = records.len() - observations.len(),
        "rows transformed"
    );
    Ok(observations)
}
