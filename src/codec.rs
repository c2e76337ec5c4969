//! Persistence codecs: how a store's in-memory shape becomes stored text.
//!
//! Two strategies exist because the two priority workflows were persisted
//! differently, and both formats must keep loading existing user data:
//!
//! - [`JsonMapCodec`]: an id -> record mapping as a single JSON object.
//! - [`PrioCsvCodec`]: a priority list as CSV with a `key,label,weight` header.
//!
//! Decoding never fails. Absent or blank input yields the codec's empty value
//! and malformed input is logged and treated the same way.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::fields::{DefaultSlot, UNRANKED_WEIGHT};
use crate::prio_list::Prio;

/// A symmetric encoding between a value and its stored text.
pub trait Codec {
    type Value;

    fn encode(&self, value: &Self::Value) -> Result<String>;

    /// Decode stored text. `None` means the storage key does not exist.
    fn decode(&self, raw: Option<&str>) -> Self::Value;
}

/// Structured encoding of an identifier-keyed map of records.
#[derive(Debug)]
pub struct JsonMapCodec<T> {
    _record: PhantomData<T>,
}

impl<T> JsonMapCodec<T> {
    pub fn new() -> Self {
        Self { _record: PhantomData }
    }
}

impl<T> Default for JsonMapCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize + DeserializeOwned> Codec for JsonMapCodec<T> {
    type Value = BTreeMap<String, T>;

    fn encode(&self, value: &Self::Value) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, raw: Option<&str>) -> Self::Value {
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return BTreeMap::new();
        };
        let obj = match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(obj)) => obj,
            Ok(other) => {
                warn!(kind = json_kind(&other), "stored mapping is not an object, starting empty");
                return BTreeMap::new();
            }
            Err(e) => {
                warn!(error = %e, "could not parse stored mapping, starting empty");
                return BTreeMap::new();
            }
        };

        let mut out = BTreeMap::new();
        for (id, record) in obj {
            match serde_json::from_value::<T>(record) {
                Ok(r) => {
                    out.insert(id, r);
                }
                Err(e) => warn!(%id, error = %e, "skipping malformed stored record"),
            }
        }
        out
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Header of the tabular priority list.
pub const PRIO_HEADERS: [&str; 3] = ["key", "label", "weight"];

/// Tabular encoding of the key-keyed priority list.
#[derive(Debug, Default)]
pub struct PrioCsvCodec;

impl PrioCsvCodec {
    /// The list a blank or absent payload decodes to.
    pub fn defaults() -> Vec<Prio> {
        DefaultSlot::ALL
            .into_iter()
            .map(|slot| Prio {
                key: slot.key().to_string(),
                label: slot.label().to_string(),
                weight: slot.weight(),
            })
            .collect()
    }
}

impl Codec for PrioCsvCodec {
    type Value = Vec<Prio>;

    fn encode(&self, value: &Self::Value) -> Result<String> {
        let rows = value
            .iter()
            .map(|p| vec![p.key.clone(), p.label.clone(), p.weight.to_string()]);
        Ok(write_table(&PRIO_HEADERS, rows))
    }

    fn decode(&self, raw: Option<&str>) -> Self::Value {
        let Some(table) = raw.and_then(read_table) else {
            return Self::defaults();
        };
        table
            .rows
            .into_iter()
            .map(|mut row| {
                let weight = row.remove("weight").unwrap_or_default();
                Prio {
                    key: row.remove("key").unwrap_or_default(),
                    label: row.remove("label").unwrap_or_default(),
                    weight: coerce_weight(&weight),
                }
            })
            .collect()
    }
}

/// Coerce a stored weight cell to an integer.
///
/// Integral floats ("2.0") are accepted; anything else is unranked.
pub fn coerce_weight(cell: &str) -> i64 {
    let cell = cell.trim();
    if let Ok(n) = cell.parse::<i64>() {
        return n;
    }
    match cell.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
        _ => {
            warn!(cell, "priority weight is not an integer, treating as unranked");
            UNRANKED_WEIGHT
        }
    }
}

/// A decoded CSV table: its header and one column -> cell map per row.
#[derive(Debug, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

/// Quote a cell when it contains a delimiter, a quote or a line break.
pub fn escape_cell(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Render a header line followed by one line per row.
pub fn write_table<I>(headers: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut lines = vec![headers.iter().map(|h| escape_cell(h)).collect::<Vec<_>>().join(",")];
    for row in rows {
        lines.push(row.iter().map(|c| escape_cell(c)).collect::<Vec<_>>().join(","));
    }
    lines.join("\n")
}

/// Parse CSV text into a [`Table`]. Returns `None` for blank input.
///
/// Cells are matched to columns by header position; short rows get empty
/// cells and blank lines are skipped. Quoted cells may span lines.
pub fn read_table(text: &str) -> Option<Table> {
    if text.trim().is_empty() {
        return None;
    }
    let mut records = parse_records(text).into_iter();
    let headers = records.next().unwrap_or_default();
    let rows = records
        .map(|cells| {
            let mut row = BTreeMap::new();
            for (i, h) in headers.iter().enumerate() {
                row.insert(h.clone(), cells.get(i).cloned().unwrap_or_default());
            }
            row
        })
        .collect();
    Some(Table { headers, rows })
}

/// Split CSV text into records of cells, honouring quotes across line breaks.
fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current_field = String::new();
    let mut in_quotes = false;
    // Distinguishes `""` (one empty cell) from a blank line.
    let mut saw_content = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                saw_content = true;
                if in_quotes && chars.peek() == Some(&'"') {
                    // Escaped quote
                    current_field.push('"');
                    chars.next();
                } else {
                    in_quotes = !in_quotes;
                }
            }
            ',' if !in_quotes => {
                saw_content = true;
                fields.push(std::mem::take(&mut current_field));
            }
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                if saw_content {
                    fields.push(std::mem::take(&mut current_field));
                    records.push(std::mem::take(&mut fields));
                }
                saw_content = false;
            }
            _ => {
                saw_content = true;
                current_field.push(ch);
            }
        }
    }

    if saw_content {
        fields.push(current_field);
        records.push(fields);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;
    use serde::Deserialize;

    use crate::priority::Priority;
    use crate::task::Task;

    // Text with the characters that need escaping in either format.
    const TRICKY_TEXT: &str = "[a-zA-Z0-9 ,;:{}\"\\n\\r]{0,16}";

    fn stamp() -> impl Strategy<Value = DateTime<Utc>> {
        (0i64..4_000_000_000, 0u32..1_000_000_000).prop_map(|(secs, nanos)| Utc.timestamp_opt(secs, nanos).unwrap())
    }

    fn task_strategy() -> impl Strategy<Value = Task> {
        (
            TRICKY_TEXT,
            proptest::option::of(TRICKY_TEXT),
            any::<bool>(),
            proptest::option::of("[a-f0-9]{1,32}"),
            proptest::option::of(1i64..4),
            proptest::option::of(TRICKY_TEXT),
            stamp(),
        )
            .prop_map(
                |(title, description, done, priority_ref, legacy_priority_level, category_id, updated_at)| Task {
                    title,
                    description,
                    done,
                    priority_ref,
                    legacy_priority_level,
                    category_id,
                    updated_at,
                },
            )
    }

    fn priority_strategy() -> impl Strategy<Value = Priority> {
        (
            "[a-f0-9]{1,32}",
            TRICKY_TEXT,
            proptest::option::of(TRICKY_TEXT),
            any::<i64>(),
            stamp(),
            stamp(),
        )
            .prop_map(|(id, name, color, order, created_at, updated_at)| Priority {
                id,
                name,
                color,
                order,
                created_at,
                updated_at,
            })
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Rec {
        name: String,
        n: i64,
    }

    fn prio(key: &str, label: &str, weight: i64) -> Prio {
        Prio { key: key.into(), label: label.into(), weight }
    }

    #[test]
    fn test_json_decode_absent_empty_and_invalid() {
        let codec = JsonMapCodec::<Rec>::new();
        assert!(codec.decode(None).is_empty());
        assert!(codec.decode(Some("")).is_empty());
        assert!(codec.decode(Some("   ")).is_empty());
        assert!(codec.decode(Some("invalid json")).is_empty());
        assert!(codec.decode(Some("[1,2]")).is_empty());
    }

    #[test]
    fn test_json_decode_skips_malformed_records() {
        let codec = JsonMapCodec::<Rec>::new();
        let m = codec.decode(Some(r#"{"a":{"name":"x","n":1},"b":null,"c":{"name":3}}"#));
        assert_eq!(m.len(), 1);
        assert_eq!(m["a"], Rec { name: "x".into(), n: 1 });
    }

    #[test]
    fn test_csv_blank_decodes_to_defaults() {
        let codec = PrioCsvCodec;
        let expected = vec![prio("high", "Hoch", 1), prio("medium", "Mittel", 2), prio("low", "Niedrig", 3)];
        assert_eq!(codec.decode(None), expected);
        assert_eq!(codec.decode(Some("")), expected);
        assert_eq!(codec.decode(Some(" \n\t")), expected);
    }

    #[test]
    fn test_csv_header_only_is_empty_list() {
        let codec = PrioCsvCodec;
        let encoded = codec.encode(&Vec::new()).unwrap();
        assert_eq!(encoded, "key,label,weight");
        assert!(codec.decode(Some(&encoded)).is_empty());
    }

    #[test]
    fn test_csv_quoted_label_roundtrip() {
        let codec = PrioCsvCodec;
        let list = vec![prio("x", "Say \"hi\", bye", 4)];
        let encoded = codec.encode(&list).unwrap();
        assert_eq!(encoded, "key,label,weight\nx,\"Say \"\"hi\"\", bye\",4");
        assert_eq!(codec.decode(Some(&encoded)), list);
    }

    #[test]
    fn test_csv_multiline_label_roundtrip() {
        let codec = PrioCsvCodec;
        let list = vec![prio("a", "line one\nline two", 1), prio("b", "crlf\r\nhere", 2)];
        let encoded = codec.encode(&list).unwrap();
        assert_eq!(codec.decode(Some(&encoded)), list);
    }

    #[test]
    fn test_csv_reads_columns_in_header_order() {
        let codec = PrioCsvCodec;
        let decoded = codec.decode(Some("weight,label,key\r\n5,Later,later\r\n\r\n1,Now,now\r\n"));
        assert_eq!(decoded, vec![prio("later", "Later", 5), prio("now", "Now", 1)]);
    }

    #[test]
    fn test_csv_short_rows_and_bad_weights() {
        let codec = PrioCsvCodec;
        let decoded = codec.decode(Some("key,label,weight\nonly\nx,X,2.0\ny,Y,abc"));
        assert_eq!(decoded[0], prio("only", "", UNRANKED_WEIGHT));
        assert_eq!(decoded[1], prio("x", "X", 2));
        assert_eq!(decoded[2], prio("y", "Y", UNRANKED_WEIGHT));
    }

    #[test]
    fn test_coerce_weight() {
        assert_eq!(coerce_weight(" 7 "), 7);
        assert_eq!(coerce_weight("-2"), -2);
        assert_eq!(coerce_weight("3.0"), 3);
        assert_eq!(coerce_weight("3.5"), UNRANKED_WEIGHT);
        assert_eq!(coerce_weight(""), UNRANKED_WEIGHT);
    }

    #[test]
    fn test_read_table_empty_quoted_cell_is_not_blank_line() {
        let table = read_table("key\n\"\"\n").unwrap();
        assert_eq!(table.headers, vec!["key".to_string()]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["key"], "");
    }

    proptest! {
        #[test]
        fn prop_csv_roundtrip(rows in prop::collection::vec((".*", ".*", any::<i64>()), 0..8)) {
            let codec = PrioCsvCodec;
            let list: Vec<Prio> = rows
                .into_iter()
                .map(|(key, label, weight)| Prio { key, label, weight })
                .collect();
            let encoded = codec.encode(&list).unwrap();
            prop_assert_eq!(codec.decode(Some(&encoded)), list);
        }

        #[test]
        fn prop_json_roundtrip(m in prop::collection::btree_map(".*", (".*", any::<i64>()), 0..8)) {
            let codec = JsonMapCodec::<Rec>::new();
            let m: BTreeMap<String, Rec> = m
                .into_iter()
                .map(|(k, (name, n))| (k, Rec { name, n }))
                .collect();
            let encoded = codec.encode(&m).unwrap();
            prop_assert_eq!(codec.decode(Some(&encoded)), m);
        }

        #[test]
        fn prop_task_map_roundtrip(m in prop::collection::btree_map("[a-f0-9]{1,32}", task_strategy(), 0..6)) {
            let codec = JsonMapCodec::<Task>::new();
            let encoded = codec.encode(&m).unwrap();
            prop_assert_eq!(codec.decode(Some(&encoded)), m);
        }

        #[test]
        fn prop_priority_map_roundtrip(list in prop::collection::vec(priority_strategy(), 0..6)) {
            let codec = JsonMapCodec::<Priority>::new();
            let m: BTreeMap<String, Priority> = list.into_iter().map(|p| (p.id.clone(), p)).collect();
            let encoded = codec.encode(&m).unwrap();
            prop_assert_eq!(codec.decode(Some(&encoded)), m);
        }
    }

    #[test]
    fn test_task_map_keeps_commas_quotes_and_newlines() {
        let codec = JsonMapCodec::<Task>::new();
        let task = Task {
            title: "Say \"hi\", bye".into(),
            description: Some("line one\nline two,\r\nthree".into()),
            done: true,
            priority_ref: Some("abc".into()),
            legacy_priority_level: None,
            category_id: None,
            updated_at: Utc.timestamp_opt(1_700_000_000, 123_000_000).unwrap(),
        };
        let m = BTreeMap::from([("t1".to_string(), task)]);
        let encoded = codec.encode(&m).unwrap();
        assert_eq!(codec.decode(Some(&encoded)), m);
    }
}
