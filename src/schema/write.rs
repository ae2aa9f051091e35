use anyhow::{Context, Result};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

use super::derive::{derive_columns, read_csv_sample, SAMPLE_LIMIT};
use super::CsvwMetadata;

/// Describe the CSV at `csv_path` and write the CSVW document to `schema_path`.
///
/// - columns come from the file's own header, typed from a sample of its rows
/// - `url` is the CSV's file name, relative to the schema document
/// - `template`: base of the reference definitions the table conforms to
#[instrument(level = "info", skip_all, fields(csv = %csv_path.as_ref().display()))]
pub fn write_schema<P: AsRef<Path>, Q: AsRef<Path>>(
    csv_path: P,
    schema_path: Q,
    template: &str,
) -> Result<CsvwMetadata> {
    let csv_path = csv_path.as_ref();
    let schema_path = schema_path.as_ref();

    let (headers, rows) = read_csv_sample(csv_path, SAMPLE_LIMIT)?;
    let columns = derive_columns(&headers, &rows)
        .with_context(|| format!("deriving columns of {}", csv_path.display()))?;

    let url = csv_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", csv_path.display()))?;
    let meta = CsvwMetadata::new(url, template, columns);

    // write to a tmp file beside the target, then rename over it
    let dir = schema_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = schema_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "schema.json".into());
    let tmp_path: PathBuf = dir.join(format!(".{}.tmp", file_name));
    let mut tmp = fs::File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;

    // pretty-print with a trailing newline
    serde_json::to_writer_pretty(&mut tmp, &meta).context("serializing CSVW metadata")?;
    tmp.write_all(b"\n")?;
    drop(tmp);

    fs::rename(&tmp_path, schema_path).with_context(|| {
        format!(
            "renaming {} -> {}",
            tmp_path.display(),
            schema_path.display()
        )
    })?;

    info!(
        columns = meta.table_schema.columns.len(),
        path = %schema_path.display(),
        "schema written"
    );
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Datatype, SCHEMA_TEMPLATE};
    use serde_json::Value;

    #[test]
    fn writes_schema_for_csv() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let csv_path = dir.path().join("observations.csv");
        fs::write(
            &csv_path,
            "Value,Tenure,Unit,Period,Measure Type,Geography\n\
             85000,owner-occupied,dwellings,gregorian-interval/2019-03-31T00:00:00/P1Y,Count,W06000015\n",
        )?;
        let schema_path = dir.path().join("observations.csv-schema.json");

        let meta = write_schema(&csv_path, &schema_path, SCHEMA_TEMPLATE)?;
        assert_eq!(meta.url, "observations.csv");
        assert_eq!(meta.table_schema.columns[0].datatype, Datatype::Integer);
        assert_eq!(meta.table_schema.columns[4].name, "measure_type");

        let on_disk: Value = serde_json::from_str(&fs::read_to_string(&schema_path)?)?;
        assert_eq!(on_disk["@context"][0], "http://www.w3.org/ns/csvw");
        assert_eq!(on_disk["prov:wasDerivedFrom"], SCHEMA_TEMPLATE);
        assert_eq!(on_disk["tableSchema"]["columns"][1]["titles"], "Tenure");
        assert_eq!(on_disk["tableSchema"]["columns"][0]["datatype"], "integer");
        assert!(!dir.path().join(".observations.csv-schema.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn missing_csv_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = write_schema(
            dir.path().join("nope.csv"),
            dir.path().join("nope.json"),
            SCHEMA_TEMPLATE,
        );
        assert!(res.is_err());
    }
}
