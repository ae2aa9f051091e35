use anyhow::{bail, Context, Result};
use chrono::SecondsFormat;
use std::{fmt::Write as _, fs, path::Path};
use tracing::{info, instrument};

use super::DatasetMetadata;
use crate::process::utils::pathify;

const PREFIXES: &[(&str, &str)] = &[
    ("dcat", "http://www.w3.org/ns/dcat#"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("gdp", "http://gss-data.org.uk/def/gdp#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

/// `<iri>`, rejecting characters IRIREF does not allow.
fn iri(s: &str) -> Result<String> {
    if s.is_empty()
        || s
            .chars()
            .any(|c| c <= ' ' || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\'))
    {
        bail!("{:?} is not a valid IRI", s);
    }
    Ok(format!("<{}>", s))
}

/// Turtle string literal with the short escapes.
fn literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Serialize the metadata graph as TriG.
pub fn to_trig(meta: &DatasetMetadata) -> Result<String> {
    let mut out = String::new();
    for (prefix, ns) in PREFIXES {
        writeln!(out, "@prefix {}: {} .", prefix, iri(ns)?)?;
    }
    out.push('\n');

    let title = format!("{}@en", literal(&meta.title));
    let modified = format!(
        "{}^^xsd:dateTime",
        literal(&meta.modified.to_rfc3339_opts(SecondsFormat::Secs, true))
    );
    let family = pathify(&meta.family);
    if family.is_empty() {
        bail!("dataset family {:?} is empty", meta.family);
    }

    let mut props: Vec<(&str, String)> = vec![
        ("a", "dcat:Dataset".to_string()),
        ("rdfs:label", title.clone()),
        ("dcterms:title", title),
        ("dcat:landingPage", iri(&meta.landing_page)?),
        ("gdp:family", format!("gdp:{}", family)),
        ("dcat:theme", iri(&meta.theme_uri())?),
        ("dcterms:modified", modified),
        ("dcterms:publisher", iri(&meta.publisher)?),
    ];
    if let Some(creator) = &meta.creator {
        props.push(("dcterms:creator", iri(creator)?));
    }

    writeln!(out, "{} {{", iri(&meta.graph_uri())?)?;
    writeln!(out, "    {}", iri(&meta.uri)?)?;
    let last = props.len() - 1;
    for (i, (pred, obj)) in props.iter().enumerate() {
        let end = if i == last { "." } else { ";" };
        writeln!(out, "        {} {} {}", pred, obj, end)?;
    }
    out.push_str("}\n");
    Ok(out)
}

#[instrument(level = "info", skip(meta, path), fields(path = %path.as_ref().display()))]
pub fn write_trig<P: AsRef<Path>>(meta: &DatasetMetadata, path: P) -> Result<()> {
    let path = path.as_ref();
    let doc = to_trig(meta)?;
    fs::write(path, doc).with_context(|| format!("writing {}", path.display()))?;
    info!("metadata written");
    Ok(())
}
