use chrono::NaiveDate;
use serde_json::Value;

use crate::meta::{EpidataFieldInfo, EpidataFieldType, FieldRegistry};
use crate::temporal::{
    EpiTimeValue, EpiWeek, parse_api_date, parse_api_date_or_week, parse_api_week,
};

/// A decoded result cell.
///
/// `Raw` carries values the decoder leaves untouched: nested structures and
/// scalars that failed their declared temporal parse.
#[derive(Debug, Clone, PartialEq)]
pub enum EpiDataValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Week(EpiWeek),
    Raw(Value),
}

impl EpiDataValue {
    /// Scalar pass-through conversion from a wire value, with no metadata
    /// applied.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => EpiDataValue::Null,
            Value::Bool(b) => EpiDataValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    EpiDataValue::Int(i)
                } else {
                    EpiDataValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => EpiDataValue::Text(s.clone()),
            other => EpiDataValue::Raw(other.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, EpiDataValue::Null)
    }
}

/// One decoded row: `(name, value)` pairs in wire order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, EpiDataValue)>,
}

impl Row {
    pub(crate) fn from_pairs(fields: Vec<(String, EpiDataValue)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&EpiDataValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EpiDataValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Decodes one raw row against a field registry.
///
/// Row-local and stateless: unknown fields and nulls pass through, temporal
/// fields honor `disable_date_parsing`, and a value that fails its declared
/// parse is left in raw form. Decoding never fails a row.
pub fn decode_row(
    raw: &serde_json::Map<String, Value>,
    registry: &FieldRegistry,
    disable_date_parsing: bool,
) -> Row {
    let fields = raw
        .iter()
        .map(|(name, value)| {
            let decoded = decode_value(value, registry.by_name(name), disable_date_parsing);
            (name.clone(), decoded)
        })
        .collect();
    Row::from_pairs(fields)
}

fn decode_value(
    value: &Value,
    info: Option<&EpidataFieldInfo>,
    disable_date_parsing: bool,
) -> EpiDataValue {
    let Some(info) = info else {
        return EpiDataValue::from_json(value);
    };
    if value.is_null() {
        return EpiDataValue::Null;
    }
    match info.field_type {
        EpidataFieldType::Date if !disable_date_parsing => scalar_to_string(value)
            .and_then(|s| parse_api_date(&s))
            .map(EpiDataValue::Date)
            .unwrap_or_else(|| EpiDataValue::from_json(value)),
        EpidataFieldType::Epiweek if !disable_date_parsing => scalar_to_string(value)
            .and_then(|s| parse_api_week(&s))
            .map(EpiDataValue::Week)
            .unwrap_or_else(|| EpiDataValue::from_json(value)),
        EpidataFieldType::DateOrEpiweek if !disable_date_parsing => scalar_to_string(value)
            .and_then(|s| parse_api_date_or_week(&s))
            .map(|v| match v {
                EpiTimeValue::Day(d) => EpiDataValue::Date(d),
                EpiTimeValue::Week(w) => EpiDataValue::Week(w),
            })
            .unwrap_or_else(|| EpiDataValue::from_json(value)),
        EpidataFieldType::Bool => EpiDataValue::Bool(truthy(value)),
        _ => EpiDataValue::from_json(value),
    }
}

/// String form of a scalar wire value, for the length-based temporal
/// parsers. Non-scalars yield `None` so the caller falls back to raw.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Truthy coercion: numbers by `!= 0`, strings by non-emptiness,
/// collections by non-emptiness.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> FieldRegistry {
        FieldRegistry::new(vec![
            EpidataFieldInfo::new("date", EpidataFieldType::Date),
            EpidataFieldInfo::new("epiweek", EpidataFieldType::Epiweek),
            EpidataFieldInfo::new("time_value", EpidataFieldType::DateOrEpiweek),
            EpidataFieldInfo::new("is_metro_micro", EpidataFieldType::Bool),
            EpidataFieldInfo::new("value", EpidataFieldType::Float),
        ])
    }

    fn as_map(v: Value) -> serde_json::Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn decodes_typed_fields() {
        let raw = as_map(json!({
            "date": 20200405,
            "epiweek": "202015",
            "value": 1.5,
        }));
        let row = decode_row(&raw, &registry(), false);
        assert_eq!(
            row.get("date"),
            Some(&EpiDataValue::Date(
                NaiveDate::from_ymd_opt(2020, 4, 5).unwrap()
            ))
        );
        assert_eq!(
            row.get("epiweek"),
            Some(&EpiDataValue::Week(EpiWeek::new(2020, 15).unwrap()))
        );
        assert_eq!(row.get("value"), Some(&EpiDataValue::Float(1.5)));
    }

    #[test]
    fn date_or_epiweek_disambiguates_by_length() {
        let raw = as_map(json!({"time_value": "202015"}));
        let row = decode_row(&raw, &registry(), false);
        assert_eq!(
            row.get("time_value"),
            Some(&EpiDataValue::Week(EpiWeek::new(2020, 15).unwrap()))
        );

        let raw = as_map(json!({"time_value": "20200405"}));
        let row = decode_row(&raw, &registry(), false);
        assert_eq!(
            row.get("time_value"),
            Some(&EpiDataValue::Date(
                NaiveDate::from_ymd_opt(2020, 4, 5).unwrap()
            ))
        );
    }

    #[test]
    fn bool_applies_truthy_coercion() {
        let raw = as_map(json!({"is_metro_micro": "1"}));
        let row = decode_row(&raw, &registry(), false);
        assert_eq!(row.get("is_metro_micro"), Some(&EpiDataValue::Bool(true)));

        let raw = as_map(json!({"is_metro_micro": 0}));
        let row = decode_row(&raw, &registry(), false);
        assert_eq!(row.get("is_metro_micro"), Some(&EpiDataValue::Bool(false)));

        // The date-parsing toggle does not affect booleans.
        let raw = as_map(json!({"is_metro_micro": 1}));
        let row = decode_row(&raw, &registry(), true);
        assert_eq!(row.get("is_metro_micro"), Some(&EpiDataValue::Bool(true)));
    }

    #[test]
    fn disable_date_parsing_keeps_wire_form() {
        let raw = as_map(json!({"date": 20200405, "epiweek": "202015"}));
        let row = decode_row(&raw, &registry(), true);
        assert_eq!(row.get("date"), Some(&EpiDataValue::Int(20200405)));
        assert_eq!(
            row.get("epiweek"),
            Some(&EpiDataValue::Text("202015".to_string()))
        );
    }

    #[test]
    fn unknown_fields_and_nulls_pass_through() {
        let raw = as_map(json!({"mystery": "x", "date": null}));
        let row = decode_row(&raw, &registry(), false);
        assert_eq!(
            row.get("mystery"),
            Some(&EpiDataValue::Text("x".to_string()))
        );
        assert_eq!(row.get("date"), Some(&EpiDataValue::Null));
    }

    #[test]
    fn malformed_temporal_values_stay_raw() {
        let raw = as_map(json!({"date": "not-a-date", "epiweek": 999999}));
        let row = decode_row(&raw, &registry(), false);
        assert_eq!(
            row.get("date"),
            Some(&EpiDataValue::Text("not-a-date".to_string()))
        );
        assert_eq!(row.get("epiweek"), Some(&EpiDataValue::Int(999999)));
    }

    #[test]
    fn empty_registry_passes_rows_through() {
        let raw = as_map(json!({"date": 20200405, "nested": {"a": 1}}));
        let row = decode_row(&raw, &FieldRegistry::empty(), false);
        assert_eq!(row.get("date"), Some(&EpiDataValue::Int(20200405)));
        assert_eq!(
            row.get("nested"),
            Some(&EpiDataValue::Raw(json!({"a": 1})))
        );
    }

    #[test]
    fn row_preserves_wire_order() {
        let raw = as_map(json!({"value": 1.0, "date": 20200405, "epiweek": "202015"}));
        let row = decode_row(&raw, &registry(), false);
        let names: Vec<_> = row.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["value", "date", "epiweek"]);
    }
}
