use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::records::raw::{value_as_f64, value_as_i64, value_as_text, RawRecord};

/// A row after type coercion, before incomplete rows are dropped
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub id: Option<String>,
    pub ocid: Option<String>,
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub method: Option<String>,
    pub contract_type: Option<String>,
    pub buyer: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub suppliers: Option<String>,
    pub amount: Option<f64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
}

/// A cleaned procurement contract with an amount and a contract type
#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub id: Option<String>,
    pub ocid: Option<String>,
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub method: Option<String>,
    pub contract_type: String,
    pub buyer: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub suppliers: Option<String>,
    pub amount: f64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
}

impl NormalizedRecord {
    /// Coerces a raw API row into typed fields
    ///
    /// Year and month fall back to the parsed date when the API omits them.
    pub fn from_raw(raw: &RawRecord) -> Self {
        let text = |name: &str| raw.column(name).and_then(value_as_text);

        let date = raw.column("date").and_then(value_as_text).and_then(|s| parse_date(&s));

        let year = raw
            .column("year")
            .and_then(value_as_i64)
            .and_then(|y| i32::try_from(y).ok())
            .or_else(|| date.map(|d| d.year()));

        let month = raw
            .column("month")
            .and_then(value_as_i64)
            .and_then(|m| u32::try_from(m).ok())
            .filter(|m| (1..=12).contains(m))
            .or_else(|| date.map(|d| d.month()));

        Self {
            id: text("id"),
            ocid: text("ocid"),
            date,
            year,
            month,
            method: text("method"),
            contract_type: text("internal_type").map(|t| title_case(&t)),
            buyer: text("buyer").map(|b| b.to_uppercase()),
            locality: text("locality"),
            region: text("region"),
            suppliers: text("suppliers"),
            amount: raw.column("amount").and_then(value_as_f64),
            title: text("title"),
            description: text("description"),
            budget: raw.column("budget").and_then(value_as_f64),
        }
    }

    /// Converts into a contract; `None` if the amount or type is missing
    pub fn into_contract(self) -> Option<Contract> {
        Some(Contract {
            amount: self.amount?,
            contract_type: self.contract_type?,
            id: self.id,
            ocid: self.ocid,
            date: self.date,
            year: self.year,
            month: self.month,
            method: self.method,
            buyer: self.buyer,
            locality: self.locality,
            region: self.region,
            suppliers: self.suppliers,
            title: self.title,
            description: self.description,
            budget: self.budget,
        })
    }
}

/// Parses the API's date formats into a calendar date
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS` (optionally with fractional seconds) and plain
/// `YYYY-MM-DD`. Anything else yields `None`.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()
}

/// Title-cases text: the first letter after any non-letter is upper-cased,
/// every other letter is lower-cased
///
/// ```
/// use procurement_dashboard::records::title_case;
///
/// assert_eq!(title_case("SUBASTA inversa electrónica"), "Subasta Inversa Electrónica");
/// ```
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_is_letter = false;

    for c in input.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}
