// src/schema/arrow.rs

use arrow::datatypes::{DataType, Field as ArrowField, Schema as ArrowSchema};
use std::sync::Arc;

use super::types::{Column, Datatype};

/// Map a CSVW datatype onto an Arrow DataType.
///
/// - integer → Int64
/// - decimal → Float64
/// - string  → Utf8
pub fn map_to_arrow_type(datatype: Datatype) -> DataType {
    match datatype {
        Datatype::Integer => DataType::Int64,
        Datatype::Decimal => DataType::Float64,
        Datatype::String => DataType::Utf8,
    }
}

/// Build an ArrowSchema (inside an Arc) from column descriptions; titles become field names.
pub fn build_arrow_schema(cols: &[Column]) -> Arc<ArrowSchema> {
    let fields: Vec<ArrowField> = cols
        .iter()
        .map(|col| {
            ArrowField::new(
                &col.titles,
                map_to_arrow_type(col.datatype),
                !col.required,
            )
        })
        .collect();

    Arc::new(ArrowSchema::new(fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_columns_are_not_nullable() {
        let cols = vec![
            Column {
                titles: "Value".into(),
                name: "value".into(),
                datatype: Datatype::Integer,
                required: true,
            },
            Column {
                titles: "Notes".into(),
                name: "notes".into(),
                datatype: Datatype::String,
                required: false,
            },
        ];
        let schema = build_arrow_schema(&cols);
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert!(!schema.field(0).is_nullable());
        assert_eq!(schema.field(1).name(), "Notes");
        assert!(schema.field(1).is_nullable());
    }
}
