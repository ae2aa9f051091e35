use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::{fs::File, path::Path};
use tracing::{debug, warn};

use super::{Column, Datatype};
use crate::process::utils::pathify;

/// Rows read back from a written CSV when inferring column types.
pub const SAMPLE_LIMIT: usize = 10_000;

/// Read the header and up to `limit` data rows of a CSV file.
pub fn read_csv_sample<P: AsRef<Path>>(
    path: P,
    limit: usize,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().take(limit).enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {} at record {}", path.display(), idx))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok((headers, rows))
}

/// `Measure Type` → `measure_type`.
pub fn column_name(title: &str) -> String {
    pathify(title).replace(['-', '/'], "_")
}

/// For each column, scan the sample rows:
///  - empty cells make the column optional and are otherwise ignored
///  - integer and decimal samples widen to decimal
///  - any other mix, or no samples at all, falls back to string
pub fn derive_columns(header_names: &[String], sample_rows: &[Vec<String>]) -> Result<Vec<Column>> {
    if header_names.is_empty() {
        return Err(anyhow!("derive_columns: no headers"));
    }

    if sample_rows.iter().any(|r| r.len() > header_names.len()) {
        warn!(
            "derive_columns: some rows have more cells than headers ({} headers)",
            header_names.len()
        );
    }

    let mut cols = Vec::with_capacity(header_names.len());
    for (idx, raw_title) in header_names.iter().enumerate() {
        let title = raw_title.trim();
        if title.is_empty() {
            return Err(anyhow!("derive_columns: header at index {} is empty", idx));
        }

        let mut datatype: Option<Datatype> = None;
        let mut required = !sample_rows.is_empty();

        for row in sample_rows {
            let cell = row.get(idx).map(|s| s.trim()).unwrap_or("");
            if cell.is_empty() {
                required = false;
                continue;
            }
            let inferred = infer_datatype(cell);
            datatype = Some(match datatype {
                None => inferred,
                Some(prev) => widen(prev, inferred),
            });
        }

        let datatype = datatype.unwrap_or_else(|| {
            debug!("derive_columns: no samples for `{}`, defaulting to string", title);
            Datatype::String
        });

        cols.push(Column {
            titles: title.to_string(),
            name: column_name(title),
            datatype,
            required,
        });
    }

    Ok(cols)
}

fn infer_datatype(cell: &str) -> Datatype {
    if cell.parse::<i64>().is_ok() {
        Datatype::Integer
    } else if cell.parse::<f64>().is_ok() {
        Datatype::Decimal
    } else {
        Datatype::String
    }
}

fn widen(a: Datatype, b: Datatype) -> Datatype {
    use Datatype::*;
    match (a, b) {
        (x, y) if x == y => x,
        (Integer, Decimal) | (Decimal, Integer) => Decimal,
        _ => String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn infers_and_widens() -> Result<()> {
        let headers = strings(&["Value", "Rate", "Mixed", "Geography", "Notes"]);
        let rows = vec![
            strings(&["12", "1", "3", "W06000015", ""]),
            strings(&["7", "2.5", "x", "W06000022", ""]),
        ];
        let cols = derive_columns(&headers, &rows)?;
        let types: Vec<_> = cols.iter().map(|c| c.datatype).collect();
        assert_eq!(
            types,
            vec![
                Datatype::Integer,
                Datatype::Decimal,
                Datatype::String,
                Datatype::String,
                Datatype::String
            ]
        );
        assert!(cols[0].required);
        assert!(!cols[4].required);
        Ok(())
    }

    #[test]
    fn names_are_snake_case() {
        assert_eq!(column_name("Measure Type"), "measure_type");
        assert_eq!(column_name("Value"), "value");
    }

    #[test]
    fn empty_header_is_rejected() {
        assert!(derive_columns(&strings(&["Value", " "]), &[]).is_err());
        assert!(derive_columns(&[], &[]).is_err());
    }
}
