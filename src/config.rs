// src/config.rs

use clap::Parser;
use std::path::PathBuf;
use url::Url;

use crate::fetch::DEFAULT_SOURCE_URL;

/// Where the raw table comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// OData endpoint, paged via `odata.nextLink`.
    Remote(Url),
    /// A saved OData page (or bare row array) on disk.
    Local(PathBuf),
}

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Dwelling stock estimates by local authority and tenure → observations CSV + metadata"
)]
pub struct Args {
    /// OData dataset endpoint.
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub source_url: Url,

    /// Read the raw table from a local JSON file instead of the endpoint.
    #[arg(long, conflicts_with = "source_url")]
    pub source_file: Option<PathBuf>,

    /// Reference CSV mapping area names (`Label`) to GSS codes (`Code`).
    #[arg(long, default_value = "wales-gss.csv")]
    pub reference: PathBuf,

    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// Also write `observations.parquet`.
    #[arg(long)]
    pub parquet: bool,
}

impl Args {
    pub fn source(&self) -> Source {
        match &self.source_file {
            Some(path) => Source::Local(path.clone()),
            None => Source::Remote(self.source_url.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_run() {
        let args = Args::parse_from(["dwelling-stock"]);
        assert_eq!(args.source(), Source::Remote(Url::parse(DEFAULT_SOURCE_URL).unwrap()));
        assert_eq!(args.reference, PathBuf::from("wales-gss.csv"));
        assert_eq!(args.out_dir, PathBuf::from("out"));
        assert!(!args.parquet);
    }

    #[test]
    fn source_file_selects_local() {
        let args = Args::parse_from(["dwelling-stock", "--source-file", "hous0501.json", "--parquet"]);
        assert_eq!(args.source(), Source::Local(PathBuf::from("hous0501.json")));
        assert!(args.parquet);
    }

    #[test]
    fn source_file_and_url_conflict() {
        let res = Args::try_parse_from([
            "dwelling-stock",
            "--source-file",
            "a.json",
            "--source-url",
            "http://example.com/",
        ]);
        assert!(res.is_err());
    }
}
