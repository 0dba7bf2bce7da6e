//! Raw API payloads
//!
//! The search endpoint is loosely typed: numbers arrive as strings, supplier
//! lists arrive as arrays or text, and any field may be absent or null. Rows
//! are therefore kept as JSON values until normalization.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Names of the columns extracted from each API item, in report order
pub const RAW_COLUMNS: [&str; 15] = [
    "id",
    "ocid",
    "date",
    "year",
    "month",
    "method",
    "internal_type",
    "buyer",
    "locality",
    "region",
    "suppliers",
    "amount",
    "title",
    "description",
    "budget",
];

/// One page of search results
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    /// Records on this page
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<RawRecord>,

    /// Total number of pages the server reports for this query
    #[serde(default = "default_pages", deserialize_with = "lenient_pages")]
    pub pages: u32,
}

fn default_pages() -> u32 {
    1
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RawRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_pages<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_i64(&value)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or_else(default_pages))
}

/// A single procurement item exactly as the API returned it
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub ocid: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub month: Option<Value>,
    #[serde(default)]
    pub method: Option<Value>,
    #[serde(default)]
    pub internal_type: Option<Value>,
    #[serde(default)]
    pub buyer: Option<Value>,
    #[serde(default)]
    pub locality: Option<Value>,
    #[serde(default)]
    pub region: Option<Value>,
    #[serde(default)]
    pub suppliers: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub budget: Option<Value>,
}

impl RawRecord {
    /// Returns the value of a column by name
    pub fn column(&self, name: &str) -> Option<&Value> {
        let value = match name {
            "id" => &self.id,
            "ocid" => &self.ocid,
            "date" => &self.date,
            "year" => &self.year,
            "month" => &self.month,
            "method" => &self.method,
            "internal_type" => &self.internal_type,
            "buyer" => &self.buyer,
            "locality" => &self.locality,
            "region" => &self.region,
            "suppliers" => &self.suppliers,
            "amount" => &self.amount,
            "title" => &self.title,
            "description" => &self.description,
            "budget" => &self.budget,
            _ => return None,
        };
        value.as_ref().filter(|v| !v.is_null())
    }
}

/// Renders a scalar as text; arrays are joined with ", "
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_as_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Object(map) => map
            .get("name")
            .and_then(value_as_text)
            .or_else(|| Some(value.to_string())),
    }
}

/// Coerces a number or numeric string into `f64`
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Coerces an integral number or numeric string into `i64`
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}
