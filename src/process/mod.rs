// src/process/mod.rs
pub mod areas;
pub mod categories;
pub mod raw_table;
pub mod transform;
pub mod utils;

use anyhow::Result;
use tracing::info;

use areas::{resolve_areas, ReferenceTable};
use raw_table::RawRecord;
use transform::{transform, Observation};

/// Run the in-memory stages in order: classify, resolve areas, transform.
#[tracing::instrument(level = "info", skip_all, fields(rows = records.len()))]
pub fn normalize(records: &[RawRecord], reference: &ReferenceTable) -> Result<Vec<Observation>> {
    categories::classify_columns(records);
    let areas = resolve_areas(records, reference)?;
    let observations = transform(records, &areas)?;
    info!(observations = observations.len(), "normalized");
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    use transform::{MeasureType, UNIT};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,dwelling_stock::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    const REFERENCE: &str = "Label,Code\n\
        Isle of Anglesey,W06000001\n\
        Cardiff,W06000015\n\
        Newport,W06000022\n\
        Wales,W92000004\n";

    fn sample() -> Vec<RawRecord> {
        let areas = [
            ("512", "Isle of Anglesey"),
            ("584", "Cardiff"),
            ("592", "Newport"),
            ("596", "Wales"),
        ];
        let tenures = [
            ("1", "Owner occupied (Number)", json!(30000.0)),
            ("2", "Owner occupied (%)", json!(71.2)),
            ("3", "Social rented (Number)", json!(5000)),
            ("4", "Social rented (%)", json!(15.1)),
            ("5", "Privately rented/other (Number)", json!("6000")),
            ("6", "All tenures (Number)", json!(41000)),
            ("7", "All tenures (%)", json!(100.0)),
        ];
        let mut rows: Vec<RawRecord> = Vec::new();
        for (year_idx, year) in ["201819", "201920"].iter().enumerate() {
            for (area_code, area_name) in &areas {
                for (tenure_code, tenure, data) in &tenures {
                    let row_key = format!("{:016}", rows.len());
                    rows.push(
                        serde_json::from_value(json!({
                            "Data": data,
                            "Area_Code": area_code,
                            "Area_ItemName_ENG": area_name,
                            "Area_SortOrder": "1",
                            "Tenure_Code": tenure_code,
                            "Tenure_ItemName_ENG": tenure,
                            "Year_Code": year,
                            "Year_ItemName_ENG": format!("{}-{}", &year[..4], &year[4..]),
                            "Year_SortOrder": year_idx,
                            "RowKey": row_key,
                            "PartitionKey": "hous0501"
                        }))
                        .unwrap(),
                    );
                }
            }
        }
        rows
    }

    #[test]
    fn pipeline_properties_hold() -> Result<()> {
        init_test_logging();
        let reference = ReferenceTable::from_reader(REFERENCE.as_bytes())?;
        let rows = sample();
        let out = normalize(&rows, &reference)?;

        // 2 years × 4 areas × 4 count tenures
        assert_eq!(out.len(), 32);

        let codes: HashSet<&str> = reference.codes().collect();
        for obs in &out {
            assert_eq!(obs.measure_type, MeasureType::Count);
            assert_eq!(obs.unit, UNIT);
            assert!(!obs.tenure.contains("(Number)"));
            assert!(!obs.tenure.contains("(%)"));
            assert!(!obs.tenure.contains('/'));
            assert!(codes.contains(obs.geography.as_str()));
        }

        let totals: Vec<_> = out.iter().filter(|o| o.tenure == "total").collect();
        assert_eq!(totals.len(), 8);
        assert!(totals.iter().all(|o| o.value == 41000));

        assert!(out.iter().any(|o| o.tenure == "owner-occupied"
            && o.period == "gregorian-interval/2019-03-31T00:00:00/P1Y"
            && o.geography == "W06000015"
            && o.value == 30000));
        Ok(())
    }

    #[test]
    fn missing_reference_entry_fails() -> Result<()> {
        init_test_logging();
        let reference = ReferenceTable::from_reader("Label,Code\nCardiff,W06000015\n".as_bytes())?;
        assert!(normalize(&sample(), &reference).is_err());
        Ok(())
    }
}
