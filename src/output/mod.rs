// src/output/mod.rs

use anyhow::{bail, Context, Result};
use arrow::array::{new_empty_array, ArrayRef, Int64Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{info, instrument};

use crate::metadata::{write_trig, DatasetMetadata};
use crate::process::transform::Observation;
use crate::schema::{build_arrow_schema, write_schema, Column, SCHEMA_TEMPLATE};

pub const OBSERVATIONS_CSV: &str = "observations.csv";
pub const OBSERVATIONS_SCHEMA: &str = "observations.csv-schema.json";
pub const OBSERVATIONS_PARQUET: &str = "observations.parquet";
pub const DATASET_TRIG: &str = "dataset.trig";

/// Paths of everything a run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub observations: PathBuf,
    pub schema: PathBuf,
    pub metadata: PathBuf,
    pub parquet: Option<PathBuf>,
}

/// Header row plus one record per observation, no index column.
pub fn write_observations_csv<P: AsRef<Path>>(path: P, observations: &[Observation]) -> Result<()> {
    let path = path.as_ref();
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    if observations.is_empty() {
        // serialize() only emits the header alongside the first record
        wtr.write_record(["Value", "Tenure", "Unit", "Period", "Measure Type", "Geography"])?;
    }
    for obs in observations {
        wtr.serialize(obs)
            .with_context(|| format!("writing row to {}", path.display()))?;
    }
    wtr.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

fn column_array(observations: &[Observation], col: &Column, dt: &DataType) -> Result<ArrayRef> {
    let strings = |f: fn(&Observation) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(observations.iter().map(f)))
    };
    Ok(match (col.titles.as_str(), dt) {
        // no rows to sample: every column was typed as string
        (_, dt) if observations.is_empty() => new_empty_array(dt),
        ("Value", DataType::Int64) => Arc::new(Int64Array::from_iter_values(
            observations.iter().map(|o| o.value),
        )),
        ("Tenure", DataType::Utf8) => strings(|o| o.tenure.as_str()),
        ("Unit", DataType::Utf8) => strings(|o| o.unit),
        ("Period", DataType::Utf8) => strings(|o| o.period.as_str()),
        ("Measure Type", DataType::Utf8) => strings(|o| o.measure_type.as_str()),
        ("Geography", DataType::Utf8) => strings(|o| o.geography.as_str()),
        (title, dt) => bail!("no {:?} mapping for column {:?}", dt, title),
    })
}

/// Same rows as the CSV, typed by the CSVW columns, SNAPPY-compressed.
pub fn write_observations_parquet<P: AsRef<Path>>(
    path: P,
    observations: &[Observation],
    columns: &[Column],
) -> Result<()> {
    let path = path.as_ref();
    let schema = build_arrow_schema(columns);
    let arrays = columns
        .iter()
        .zip(schema.fields().iter())
        .map(|(col, field)| column_array(observations, col, field.data_type()))
        .collect::<Result<Vec<_>>>()?;

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building observation batch")?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))
        .context("creating Arrow writer for observations")?;
    writer.write(&batch).context("writing observation batch")?;
    writer.close().context("closing observation writer")?;
    Ok(())
}

/// Write every output file into `out_dir`, creating it if absent.
#[instrument(level = "info", skip(observations, meta), fields(rows = observations.len()))]
pub fn write_outputs(
    out_dir: &Path,
    observations: &[Observation],
    meta: &DatasetMetadata,
    parquet: bool,
) -> Result<Written> {
    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let csv_path = out_dir.join(OBSERVATIONS_CSV);
    write_observations_csv(&csv_path, observations)?;
    info!(path = %csv_path.display(), "observations written");

    let schema_path = out_dir.join(OBSERVATIONS_SCHEMA);
    let csvw = write_schema(&csv_path, &schema_path, SCHEMA_TEMPLATE)?;

    let parquet_path = if parquet {
        let p = out_dir.join(OBSERVATIONS_PARQUET);
        write_observations_parquet(&p, observations, &csvw.table_schema.columns)?;
        info!(path = %p.display(), "parquet written");
        Some(p)
    } else {
        None
    };

    let trig_path = out_dir.join(DATASET_TRIG);
    write_trig(meta, &trig_path)?;

    Ok(Written {
        observations: csv_path,
        schema: schema_path,
        metadata: trig_path,
        parquet: parquet_path,
    })
}
