// src/fetch/mod.rs

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::process::raw_table::RawRecord;

/// StatsWales OData endpoint for HOUS0501.
pub const DEFAULT_SOURCE_URL: &str = "http://open.statswales.gov.wales/dataset/hous0501";

/// One page of an OData JSON response.
#[derive(Debug, Deserialize)]
pub struct ODataPage {
    #[serde(default)]
    pub value: Vec<RawRecord>,
    #[serde(rename = "odata.nextLink", alias = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// Parse a single page body into its rows and the link to the next page, if any.
pub fn parse_page(body: &str) -> Result<ODataPage> {
    serde_json::from_str(body).context("decoding OData page")
}

/// Module for pulling the table from the remote OData feed
pub mod odata {
    use super::*;
    use reqwest::Client;
    use std::collections::HashSet;
    use url::Url;

    async fn get_text(client: &Client, url: &Url) -> Result<String> {
        debug!("Fetching text from {}", url);
        client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .await
            .with_context(|| format!("Reading text from {}", url))
    }

    /// Fetch every row of the dataset, following `odata.nextLink` until the feed is exhausted.
    #[instrument(level = "info", skip(client, url), fields(url = %url))]
    pub async fn fetch_dataset(client: &Client, url: &Url) -> Result<Vec<RawRecord>> {
        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(url.clone());

        while let Some(page_url) = next.take() {
            if !seen.insert(page_url.to_string()) {
                bail!("OData paging loops back to {}", page_url);
            }
            let body = get_text(client, &page_url).await?;
            let page = parse_page(&body).with_context(|| format!("page {}", page_url))?;
            debug!(url = %page_url, rows = page.value.len(), "page fetched");
            rows.extend(page.value);

            next = match page.next_link {
                Some(link) => Some(
                    page_url
                        .join(&link)
                        .with_context(|| format!("resolving next link {:?}", link))?,
                ),
                None => None,
            };
        }

        info!(pages = seen.len(), rows = rows.len(), "dataset fetched");
        Ok(rows)
    }
}

/// Module for reading a saved copy of the feed from disk
pub mod local {
    use super::*;
    use std::{fs, path::Path};

    /// Load rows from a JSON file holding either an OData page or a bare array of rows.
    #[instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_dataset<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let doc: Value =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

        let rows: Vec<RawRecord> = match doc {
            Value::Array(_) => serde_json::from_value(doc)
                .with_context(|| format!("decoding rows in {}", path.display()))?,
            Value::Object(_) => {
                let page: ODataPage = serde_json::from_value(doc)
                    .with_context(|| format!("decoding OData page in {}", path.display()))?;
                if page.next_link.is_some() {
                    debug!("ignoring next link in local file");
                }
                page.value
            }
            other => {
                return Err(anyhow!(
                    "{}: expected an array or an OData object, found {}",
                    path.display(),
                    kind(&other)
                ))
            }
        };

        info!(rows = rows.len(), "dataset loaded");
        Ok(rows)
    }

    fn kind(v: &Value) -> &'static str {
        match v {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }
}
