use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::Result;

/// One awarded coupon, as delivered by the reporting collaborator.
///
/// Display-only text fields are never optional: missing or `null` values
/// become an empty string and the template substitutes a placeholder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherRecord {
    #[serde(deserialize_with = "de_code")]
    pub code: String,
    #[serde(default, deserialize_with = "de_text")]
    pub customer_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub customer_tax_id: String,
    #[serde(default, deserialize_with = "de_text")]
    pub store_name: String,
    #[serde(default, deserialize_with = "de_text")]
    pub mall_name: String,
    #[serde(deserialize_with = "de_timestamp", serialize_with = "ser_timestamp")]
    pub attribution_date: NaiveDateTime,
    #[serde(deserialize_with = "de_amount")]
    pub purchase_value: f64,
}

impl VoucherRecord {
    /// Record with only the mandatory fields set.
    pub fn new(code: impl Into<String>, attribution_date: NaiveDateTime, purchase_value: f64) -> Self {
        VoucherRecord {
            code: code.into(),
            customer_name: String::new(),
            customer_tax_id: String::new(),
            store_name: String::new(),
            mall_name: String::new(),
            attribution_date,
            purchase_value,
        }
    }
}

/// Parse a JSON array of voucher records, preserving input order.
pub fn parse_records(json: &str) -> Result<Vec<VoucherRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Accepts RFC 3339, naive ISO timestamps (with `T` or a space) and bare dates.
/// Offsets are dropped after conversion: the wall-clock date is what gets printed.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn de_code<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    let code = String::deserialize(d)?;
    if code.trim().is_empty() {
        return Err(de::Error::custom("voucher code must not be empty"));
    }
    Ok(code)
}

fn de_text<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn de_timestamp<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(d)?;
    parse_timestamp(&raw)
        .ok_or_else(|| de::Error::custom(format!("invalid attribution date: {raw:?}")))
}

fn ser_timestamp<S: Serializer>(v: &NaiveDateTime, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&v.format("%Y-%m-%dT%H:%M:%S").to_string())
}

/// Largest accepted purchase value. Amounts up to this keep exact cents.
pub const MAX_PURCHASE_VALUE: f64 = 1e13;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
}

fn de_amount<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    let v = match RawAmount::deserialize(d)? {
        RawAmount::Number(n) => n,
        RawAmount::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid purchase value: {s:?}")))?,
    };
    if !v.is_finite() || v < 0.0 {
        return Err(de::Error::custom(format!(
            "purchase value must be a non-negative amount, got {v}"
        )));
    }
    if v > MAX_PURCHASE_VALUE {
        return Err(de::Error::custom(format!(
            "purchase value {v} exceeds the maximum of {MAX_PURCHASE_VALUE}"
        )));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_and_fills_missing_text() {
        let json = r#"[{
            "code": "CP-0001",
            "customerName": "Ana Souza",
            "customerTaxId": null,
            "storeName": "Loja 12",
            "attributionDate": "2024-03-05T14:30:00Z",
            "purchaseValue": "1234.5"
        }]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.customer_tax_id, "");
        assert_eq!(r.mall_name, "");
        assert_eq!(r.purchase_value, 1234.5);
        assert_eq!(r.attribution_date.date(), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn accepts_several_timestamp_shapes() {
        let d = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        for raw in [
            "2023-12-31",
            "2023-12-31T08:00:00",
            "2023-12-31 08:00:00.123",
            "2023-12-31T23:00:00-03:00",
        ] {
            assert_eq!(parse_timestamp(raw).map(|t| t.date()), Some(d), "{raw}");
        }
        assert!(parse_timestamp("31/12/2023").is_none());
    }

    #[test]
    fn rejects_bad_values() {
        let negative = r#"[{"code":"A","attributionDate":"2024-01-01","purchaseValue":-1}]"#;
        assert!(parse_records(negative).is_err());
        let empty_code = r#"[{"code":"  ","attributionDate":"2024-01-01","purchaseValue":1}]"#;
        assert!(parse_records(empty_code).is_err());
        let bad_date = r#"[{"code":"A","attributionDate":"yesterday","purchaseValue":1}]"#;
        assert!(parse_records(bad_date).is_err());
    }

    #[test]
    fn purchase_value_upper_limit() {
        let at_limit = r#"[{"code":"A","attributionDate":"2024-01-01","purchaseValue":10000000000000}]"#;
        assert_eq!(parse_records(at_limit).unwrap()[0].purchase_value, MAX_PURCHASE_VALUE);
        let above = r#"[{"code":"A","attributionDate":"2024-01-01","purchaseValue":"10000000000000.01"}]"#;
        assert!(parse_records(above).is_err());
        let huge = r#"[{"code":"A","attributionDate":"2024-01-01","purchaseValue":1e20}]"#;
        assert!(parse_records(huge).is_err());
    }

    #[test]
    fn preserves_input_order() {
        let json = r#"[
            {"code":"B","attributionDate":"2024-02-01","purchaseValue":2},
            {"code":"A","attributionDate":"2024-01-01","purchaseValue":1}
        ]"#;
        let codes: Vec<_> = parse_records(json).unwrap().into_iter().map(|r| r.code).collect();
        assert_eq!(codes, ["B", "A"]);
    }
}
