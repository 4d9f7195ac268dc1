//! Structured extraction result as returned by the service.
//!
//! The service is loosely typed: any field may be missing, `null`, a string
//! or a number, and `line_items` may be absent or not even an array. Parsing
//! is therefore lenient. [`FieldValue`] keeps whatever scalar arrived and
//! decides at display time whether it counts as present.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A scalar field exactly as the service sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
    Other(Value),
}

impl FieldValue {
    /// Whether the value shows as content rather than a placeholder.
    ///
    /// Empty strings, zero and `false` count as absent, matching the
    /// service's web front end.
    pub fn is_present(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Number(n) => n.as_f64().is_some_and(|v| v != 0.0 && !v.is_nan()),
            FieldValue::Flag(b) => *b,
            FieldValue::Other(v) => !v.is_null(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(i), _, _) => write!(f, "{i}"),
                (_, Some(u), _) => write!(f, "{u}"),
                // Integral floats print without a trailing ".0".
                (_, _, Some(v)) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", v as i64),
                (_, _, Some(v)) => write!(f, "{v}"),
                _ => write!(f, "{n}"),
            },
            FieldValue::Flag(b) => write!(f, "{b}"),
            FieldValue::Other(v) => write!(f, "{v}"),
        }
    }
}

/// Display `value` when present, otherwise `fallback`.
pub fn display_or(value: Option<&FieldValue>, fallback: &str) -> String {
    match value {
        Some(v) if v.is_present() => v.to_string(),
        _ => fallback.to_string(),
    }
}

/// One invoice row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub item_name: Option<FieldValue>,
    #[serde(default)]
    pub quantity: Option<FieldValue>,
    #[serde(default)]
    pub rate: Option<FieldValue>,
    #[serde(default)]
    pub amount: Option<FieldValue>,
}

/// Parsed `data` object of a successful extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub vendor_name: Option<FieldValue>,
    pub invoice_number: Option<FieldValue>,
    pub gst_number: Option<FieldValue>,
    pub invoice_date: Option<FieldValue>,
    pub total_amount: Option<FieldValue>,
    pub line_items: Vec<LineItem>,
    raw: Map<String, Value>,
}

impl ExtractionResult {
    /// Build from the service's `data` object.
    ///
    /// Unknown keys are kept in [`Self::raw`]; a non-array `line_items` is
    /// treated as empty and malformed entries become blank rows.
    pub fn from_object(raw: Map<String, Value>) -> Self {
        let field = |key: &str| raw.get(key).and_then(scalar);
        let line_items = match raw.get("line_items") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::Object(_) => LineItem::deserialize(item).unwrap_or_default(),
                    // Only named keys fill cells; arrays and scalars are blank rows.
                    _ => LineItem::default(),
                })
                .collect(),
            _ => Vec::new(),
        };

        Self {
            vendor_name: field("vendor_name"),
            invoice_number: field("invoice_number"),
            gst_number: field("gst_number"),
            invoice_date: field("invoice_date"),
            total_amount: field("total_amount"),
            line_items,
            raw,
        }
    }

    /// The object as received, in the service's key order.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Pretty-printed JSON with two-space indentation.
    ///
    /// Integral floats are written as integers (`10.0` as `10`) so the block
    /// agrees with the summary and table cells.
    pub fn to_pretty_json(&self) -> String {
        let mut value = Value::Object(self.raw.clone());
        integral_floats_to_ints(&mut value);
        // Serialising a Value cannot fail.
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }
}

impl Serialize for ExtractionResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ExtractionResult {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::from_object)
    }
}

fn integral_floats_to_ints(value: &mut Value) {
    let integral = match value {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .filter(|v| v.fract() == 0.0 && v.abs() < 1e15),
        _ => None,
    };
    if let Some(v) = integral {
        *value = Value::from(v as i64);
        return;
    }
    match value {
        Value::Array(items) => items.iter_mut().for_each(integral_floats_to_ints),
        Value::Object(map) => map.values_mut().for_each(integral_floats_to_ints),
        _ => {}
    }
}

fn scalar(value: &Value) -> Option<FieldValue> {
    match value {
        Value::Null => None,
        other => FieldValue::deserialize(other).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> ExtractionResult {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn parses_full_invoice() {
        let r = parse(json!({
            "vendor_name": "Acme Supplies",
            "invoice_number": "INV-0042",
            "gst_number": "29ABCDE1234F1Z5",
            "invoice_date": "2024-03-01",
            "total_amount": 118.5,
            "line_items": [
                {"item_name": "Widget", "quantity": 2, "rate": 5, "amount": 10},
                {"item_name": "Gadget", "quantity": "1", "rate": "108.50", "amount": "108.50"}
            ]
        }));
        assert_eq!(r.vendor_name, Some(FieldValue::Text("Acme Supplies".into())));
        assert_eq!(r.line_items.len(), 2);
        assert_eq!(display_or(r.total_amount.as_ref(), "-"), "118.5");
        assert_eq!(display_or(r.line_items[1].rate.as_ref(), "-"), "108.50");
    }

    #[test]
    fn missing_and_null_fields_are_none() {
        let r = parse(json!({"vendor_name": null}));
        assert!(r.vendor_name.is_none());
        assert!(r.invoice_number.is_none());
        assert!(r.line_items.is_empty());
    }

    #[test]
    fn non_array_line_items_treated_as_empty() {
        let r = parse(json!({"line_items": "none"}));
        assert!(r.line_items.is_empty());
    }

    #[test]
    fn malformed_line_item_becomes_blank_row() {
        let r = parse(json!({"line_items": [42, {"item_name": "Bolt"}]}));
        assert_eq!(r.line_items.len(), 2);
        assert_eq!(r.line_items[0], LineItem::default());
        assert_eq!(display_or(r.line_items[1].item_name.as_ref(), "-"), "Bolt");
    }

    #[test]
    fn positional_line_item_is_blank_row() {
        let r = parse(json!({"line_items": [["Widget", 2, 5, 10]]}));
        assert_eq!(r.line_items, vec![LineItem::default()]);
        assert_eq!(display_or(r.line_items[0].item_name.as_ref(), "-"), "-");
    }

    #[test]
    fn integral_floats_match_between_cells_and_json() {
        let r = parse(json!({
            "total_amount": 118.0,
            "line_items": [{"item_name": "Widget", "quantity": 2.0, "rate": 2.5, "amount": 5.0}]
        }));
        assert_eq!(display_or(r.total_amount.as_ref(), "-"), "118");
        assert_eq!(display_or(r.line_items[0].amount.as_ref(), "-"), "5");

        let text = r.to_pretty_json();
        assert!(text.contains("\"total_amount\": 118,"), "got: {text}");
        assert!(text.contains("\"quantity\": 2,"), "got: {text}");
        assert!(text.contains("\"rate\": 2.5,"), "got: {text}");
        assert!(text.contains("\"amount\": 5\n"), "got: {text}");
    }

    #[test]
    fn falsy_values_fall_back() {
        for v in [json!(""), json!(0), json!(0.0), json!(false)] {
            let f: FieldValue = serde_json::from_value(v.clone()).unwrap();
            assert!(!f.is_present(), "{v} should count as absent");
            assert_eq!(display_or(Some(&f), "-"), "-");
        }
        assert_eq!(display_or(None, "Not Found"), "Not Found");
    }

    #[test]
    fn numbers_display_like_the_web_view() {
        let show = |v: Value| serde_json::from_value::<FieldValue>(v).unwrap().to_string();
        assert_eq!(show(json!(2)), "2");
        assert_eq!(show(json!(10.0)), "10");
        assert_eq!(show(json!(2.75)), "2.75");
        assert_eq!(show(json!(-3)), "-3");
    }

    #[test]
    fn pretty_json_preserves_key_order() {
        let r = parse(json!({"vendor_name": "Acme", "total_amount": "100.00", "line_items": []}));
        let text = r.to_pretty_json();
        let vendor = text.find("vendor_name").unwrap();
        let total = text.find("total_amount").unwrap();
        assert!(vendor < total);
        assert!(text.contains("\n  \"vendor_name\": \"Acme\""), "got: {text}");
    }

    #[test]
    fn serialises_back_to_raw_object() {
        let value = json!({"vendor_name": "Acme", "extra": {"currency": "USD"}});
        let r = parse(value.clone());
        assert_eq!(serde_json::to_value(&r).unwrap(), value);
    }
}
