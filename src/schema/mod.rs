pub mod arrow;
pub mod derive;
pub mod types;
pub mod write;

pub use self::arrow::{build_arrow_schema, map_to_arrow_type};
pub use types::{Column, CsvwMetadata, Datatype, SCHEMA_TEMPLATE};
pub use write::write_schema;
