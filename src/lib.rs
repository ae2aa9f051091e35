pub mod config;
pub mod fetch;
pub mod metadata;
pub mod output;
pub mod process;
pub mod schema;
