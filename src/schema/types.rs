// src/schema/types.rs

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const CSVW_CONTEXT: &str = "http://www.w3.org/ns/csvw";

/// Reference column/component definitions the observations are described against.
pub const SCHEMA_TEMPLATE: &str = "https://gss-cogs.github.io/ref_housing/";

/// CSVW datatype of a column, as inferred from its cells.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    Integer,
    Decimal,
    String,
}

/// A single column description.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct Column {
    pub titles: String,
    pub name: String,
    pub datatype: Datatype,
    pub required: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TableSchema {
    pub columns: Vec<Column>,
}

/// `<file>.csv-schema.json` document.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CsvwMetadata {
    #[serde(rename = "@context")]
    pub context: Value,
    pub url: String,
    #[serde(rename = "prov:wasDerivedFrom")]
    pub derived_from: String,
    #[serde(rename = "tableSchema")]
    pub table_schema: TableSchema,
}

impl CsvwMetadata {
    pub fn new(url: impl Into<String>, template: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            context: json!([CSVW_CONTEXT, { "@language": "en" }]),
            url: url.into(),
            derived_from: template.into(),
            table_schema: TableSchema { columns },
        }
    }
}
