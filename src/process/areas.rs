use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::{
    collections::{hash_map::Entry, BTreeMap, HashMap},
    fs::File,
    io::Read,
    path::Path,
};
use tracing::{info, instrument, warn};

use super::raw_table::RawRecord;

/// One row of the reference CSV. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct ReferenceRow {
    #[serde(rename = "Label")]
    label: String,
    #[serde(rename = "Code")]
    code: String,
}

/// Area display name → canonical GSS code.
#[derive(Debug, Default, Clone)]
pub struct ReferenceTable {
    by_label: HashMap<String, String>,
}

impl ReferenceTable {
    #[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open reference file: {}", path.display()))?;
        let table = Self::from_reader(file)
            .with_context(|| format!("Failed to read reference file: {}", path.display()))?;
        info!(labels = table.len(), "reference table loaded");
        Ok(table)
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(rdr);
        let mut by_label = HashMap::new();
        for (idx, result) in rdr.deserialize::<ReferenceRow>().enumerate() {
            let row = result.with_context(|| format!("reference record {}", idx))?;
            match by_label.entry(row.label) {
                Entry::Vacant(slot) => {
                    slot.insert(row.code);
                }
                Entry::Occupied(slot) => {
                    warn!(label = %slot.key(), kept = %slot.get(), ignored = %row.code, "duplicate reference label");
                }
            }
        }
        Ok(Self { by_label })
    }

    pub fn code_for(&self, label: &str) -> Option<&str> {
        self.by_label.get(label).map(String::as_str)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.by_label.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub name: String,
    /// `None` until joined, or when the name has no reference entry.
    pub code: Option<String>,
}

/// Area code → name (+ canonical code once joined).
#[derive(Debug, Default, Clone)]
pub struct AreaLookup {
    areas: BTreeMap<i64, Area>,
}

impl AreaLookup {
    /// Deduplicate (area code, area name) pairs from the raw table.
    pub fn from_records(records: &[RawRecord]) -> Result<Self> {
        let mut areas: BTreeMap<i64, Area> = BTreeMap::new();
        for rec in records {
            let key = rec.area_key().with_context(|| rec.describe())?;
            match areas.get(&key) {
                None => {
                    areas.insert(
                        key,
                        Area {
                            name: rec.area_name.clone(),
                            code: None,
                        },
                    );
                }
                Some(existing) if existing.name != rec.area_name => {
                    warn!(area_code = key, kept = %existing.name, ignored = %rec.area_name, "area code has two names");
                }
                Some(_) => {}
            }
        }
        Ok(Self { areas })
    }

    /// Attach canonical codes by joining area names against the reference table.
    pub fn join(self, reference: &ReferenceTable) -> Self {
        let areas = self
            .areas
            .into_iter()
            .map(|(key, area)| {
                let code = reference.code_for(&area.name).map(str::to_string);
                if code.is_none() {
                    warn!(area_code = key, name = %area.name, "area name not in reference table");
                }
                (key, Area { code, ..area })
            })
            .collect();
        Self { areas }
    }

    pub fn get(&self, area_code: i64) -> Option<&Area> {
        self.areas.get(&area_code)
    }

    /// Canonical code for `area_code`; an unknown or unjoined area is an error.
    pub fn geography(&self, area_code: i64) -> Result<&str> {
        let area = self
            .areas
            .get(&area_code)
            .ok_or_else(|| anyhow!("area code {} is not in the area lookup", area_code))?;
        area.code.as_deref().ok_or_else(|| {
            anyhow!(
                "area {} ({:?}) has no canonical code in the reference table",
                area_code,
                area.name
            )
        })
    }

    /// Areas whose name found no reference entry.
    pub fn unresolved(&self) -> impl Iterator<Item = (i64, &Area)> {
        self.areas
            .iter()
            .filter(|(_, a)| a.code.is_none())
            .map(|(k, a)| (*k, a))
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}

/// Build the area lookup from the raw table and join it to the reference.
#[instrument(level = "info", skip_all, fields(rows = records.len()))]
pub fn resolve_areas(records: &[RawRecord], reference: &ReferenceTable) -> Result<AreaLookup> {
    let lookup = AreaLookup::from_records(records)?.join(reference);
    info!(
        areas = lookup.len(),
        unresolved = lookup.unresolved().count(),
        "areas resolved"
    );
    Ok(lookup)
}
