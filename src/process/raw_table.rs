use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};
use std::fmt;

/// One row of the HOUS0501 feed, as published.
///
/// Codes and sort orders arrive as JSON strings or numbers depending on the
/// endpoint version; both are read into `String`. Missing fields are empty.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Data", default)]
    pub data: RawValue,
    #[serde(rename = "Area_Code", default, deserialize_with = "lenient_string")]
    pub area_code: String,
    #[serde(rename = "Area_ItemName_ENG", default, deserialize_with = "lenient_string")]
    pub area_name: String,
    #[serde(rename = "Area_SortOrder", default, deserialize_with = "lenient_string")]
    pub area_sort_order: String,
    #[serde(
        rename = "Area_Hierarchy",
        alias = "Area Hierarchy",
        default,
        deserialize_with = "lenient_string"
    )]
    pub area_hierarchy: String,
    #[serde(rename = "Area_ItemNotes_ENG", default, deserialize_with = "lenient_string")]
    pub area_notes: String,
    #[serde(rename = "Tenure_Code", default, deserialize_with = "lenient_string")]
    pub tenure_code: String,
    #[serde(rename = "Tenure_ItemName_ENG", default, deserialize_with = "lenient_string")]
    pub tenure_name: String,
    #[serde(rename = "Tenure_SortOrder", default, deserialize_with = "lenient_string")]
    pub tenure_sort_order: String,
    #[serde(rename = "Tenure_Hierarchy", default, deserialize_with = "lenient_string")]
    pub tenure_hierarchy: String,
    #[serde(rename = "Tenure_ItemNotes_ENG", default, deserialize_with = "lenient_string")]
    pub tenure_notes: String,
    #[serde(rename = "Year_Code", default, deserialize_with = "lenient_string")]
    pub year_code: String,
    #[serde(rename = "Year_ItemName_ENG", default, deserialize_with = "lenient_string")]
    pub year_name: String,
    #[serde(rename = "Year_SortOrder", default, deserialize_with = "lenient_string")]
    pub year_sort_order: String,
    #[serde(rename = "RowKey", default, deserialize_with = "lenient_string")]
    pub row_key: String,
    #[serde(rename = "PartitionKey", default, deserialize_with = "lenient_string")]
    pub partition_key: String,
}

impl RawRecord {
    /// Columns treated as categorical, paired with this row's value.
    /// Codes, sort orders, storage keys and the data cell are excluded.
    pub fn categorical_fields(&self) -> [(&'static str, &str); 8] {
        [
            ("Area_ItemName_ENG", &self.area_name),
            ("Area_Hierarchy", &self.area_hierarchy),
            ("Area_ItemNotes_ENG", &self.area_notes),
            ("Tenure_Code", &self.tenure_code),
            ("Tenure_ItemName_ENG", &self.tenure_name),
            ("Tenure_Hierarchy", &self.tenure_hierarchy),
            ("Tenure_ItemNotes_ENG", &self.tenure_notes),
            ("Year_ItemName_ENG", &self.year_name),
        ]
    }

    /// The area code as an integer key.
    pub fn area_key(&self) -> Result<i64> {
        parse_area_code(&self.area_code)
    }

    /// Short label for error messages.
    pub fn describe(&self) -> String {
        format!(
            "area {} / tenure {:?} / year {}",
            self.area_code, self.tenure_name, self.year_code
        )
    }
}

pub fn parse_area_code(code: &str) -> Result<i64> {
    code.trim()
        .parse::<i64>()
        .with_context(|| format!("area code {:?} is not an integer", code))
}

/// The `Data` cell: usually a JSON number, occasionally a string or null.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(Number),
    Text(String),
    #[default]
    Null,
}

impl RawValue {
    /// Strict integer view: integral numbers only, no rounding.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RawValue::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
            RawValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            RawValue::Null => None,
        }
    }
}

fn integral(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => write!(f, "{:?}", s),
            RawValue::Null => f.write_str("null"),
        }
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_strings_both_decode() -> Result<()> {
        let rec: RawRecord = serde_json::from_value(json!({
            "Data": 1200,
            "Area_Code": 512,
            "Area_ItemName_ENG": "Isle of Anglesey",
            "Area Hierarchy": "596",
            "Tenure_ItemName_ENG": "Owner occupied (Number)",
            "Tenure_ItemNotes_ENG": null,
            "Year_Code": "201920",
            "Unexpected": true
        }))?;
        assert_eq!(rec.area_code, "512");
        assert_eq!(rec.area_key()?, 512);
        assert_eq!(rec.area_hierarchy, "596");
        assert_eq!(rec.tenure_notes, "");
        assert_eq!(rec.data.as_integer(), Some(1200));
        Ok(())
    }

    #[test]
    fn integer_view_is_strict() {
        let v = |j: Value| serde_json::from_value::<RawValue>(j).unwrap();
        assert_eq!(v(json!(32115.0)).as_integer(), Some(32115));
        assert_eq!(v(json!("  77 ")).as_integer(), Some(77));
        assert_eq!(v(json!("12.0")).as_integer(), Some(12));
        assert_eq!(v(json!(71.3)).as_integer(), None);
        assert_eq!(v(json!("..")).as_integer(), None);
        assert_eq!(v(json!(null)).as_integer(), None);
    }

    #[test]
    fn missing_data_is_null() -> Result<()> {
        let rec: RawRecord = serde_json::from_value(json!({"Area_Code": "1"}))?;
        assert_eq!(rec.data, RawValue::Null);
        assert_eq!(rec.data.to_string(), "null");
        Ok(())
    }

    #[test]
    fn area_code_must_be_integer() {
        assert!(parse_area_code("W06000001").is_err());
        assert_eq!(parse_area_code(" 596 ").unwrap(), 596);
    }
}
