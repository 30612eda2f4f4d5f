use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::convert::{resolve, Construct, ConversionHook, Domain};
use crate::domain::ts::Ts;
use crate::domain::tsdiff::TsDiff;
use crate::utils::error::{Result, TsError};

/// What a [`TsObject`] can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conversion {
    Number,
    Int,
    Ts,
    TsDiff,
    Text,
}

/// Record of named fields with a table saying which field answers each
/// conversion.
///
/// A conversion entry naming a missing field is read as a literal value,
/// so `("ts", "20121124")` works without a field of that name.
///
/// ```
/// use serde_json::json;
/// use tslist::{Conversion, Ts, TsList, TsObject};
///
/// let release = TsObject::new()
///     .with_field("name", json!("tslist"))
///     .with_field("released", json!("2024-10-07"))
///     .with_conversion(Conversion::Ts, "released");
///
/// let list = TsList::from(vec![release]);
/// let start = Ts::from_yyyymmdd(20240101).unwrap();
/// assert_eq!(list.select(start..).unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TsObject {
    fields: Map<String, Value>,
    #[serde(default)]
    conversions: BTreeMap<Conversion, String>,
}

impl TsObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn with_conversion(mut self, conversion: Conversion, field: impl Into<String>) -> Self {
        self.conversions.insert(conversion, field.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn conversion_source(&self, conversion: Conversion) -> Option<Value> {
        self.conversions.get(&conversion).map(|name| {
            self.fields
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::String(name.clone()))
        })
    }

    pub fn to_number(&self) -> Result<f64> {
        match self.conversion_source(Conversion::Number) {
            Some(source) => resolve::<f64, Value>(&source),
            None => Ok(self.to_int()? as f64),
        }
    }

    pub fn to_int(&self) -> Result<i64> {
        match self.conversion_source(Conversion::Int) {
            Some(source) => resolve::<i64, Value>(&source),
            None => Ok(0),
        }
    }

    pub fn to_ts(&self) -> Result<Ts> {
        self.required(Conversion::Ts)
            .and_then(|source| resolve::<Ts, Value>(&source))
    }

    pub fn to_tsdiff(&self) -> Result<TsDiff> {
        self.required(Conversion::TsDiff)
            .and_then(|source| resolve::<TsDiff, Value>(&source))
    }

    fn required(&self, conversion: Conversion) -> Result<Value> {
        self.conversion_source(conversion).ok_or_else(|| TsError::Conversion {
            value: self.to_string(),
            target: match conversion {
                Conversion::Ts => Ts::NAME,
                Conversion::TsDiff => TsDiff::NAME,
                Conversion::Number => f64::NAME,
                Conversion::Int => i64::NAME,
                Conversion::Text => "text",
            },
            reason: format!("no {:?} conversion configured", conversion),
        })
    }
}

impl Display for TsObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.conversion_source(Conversion::Text) {
            Some(Value::String(text)) => f.write_str(&text),
            Some(other) => write!(f, "{}", other),
            None => {
                f.write_str("TsObject(")?;
                for (i, (name, value)) in self.fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", name, value)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl ConversionHook<f64> for TsObject {
    fn conversion_hook(&self) -> Option<Result<f64>> {
        Some(self.to_number())
    }
}

impl ConversionHook<i64> for TsObject {
    fn conversion_hook(&self) -> Option<Result<i64>> {
        Some(self.to_int())
    }
}

impl ConversionHook<Ts> for TsObject {
    fn conversion_hook(&self) -> Option<Result<Ts>> {
        Some(self.to_ts())
    }
}

impl ConversionHook<TsDiff> for TsObject {
    fn conversion_hook(&self) -> Option<Result<TsDiff>> {
        Some(self.to_tsdiff())
    }
}

impl Construct<TsObject> for f64 {}
impl Construct<TsObject> for i64 {}
impl Construct<TsObject> for Ts {}
impl Construct<TsObject> for TsDiff {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TsObject {
        TsObject::new()
            .with_field("a", json!(1))
            .with_field("c", json!(3))
            .with_field("d", json!(4))
            .with_field("e", json!("My Name"))
            .with_field("f", json!("20121124"))
            .with_conversion(Conversion::Int, "c")
            .with_conversion(Conversion::Number, "d")
            .with_conversion(Conversion::Ts, "f")
            .with_conversion(Conversion::Text, "e")
    }

    #[test]
    fn test_declared_conversions() {
        let obj = sample();
        assert_eq!(obj.to_int().unwrap(), 3);
        assert_eq!(obj.to_number().unwrap(), 4.0);
        assert_eq!(obj.to_ts().unwrap(), Ts::from_yyyymmdd(20121124).unwrap());
        assert_eq!(obj.to_string(), "My Name");
    }

    #[test]
    fn test_defaults_without_table() {
        let obj = TsObject::new().with_field("a", json!(1));
        assert_eq!(obj.to_int().unwrap(), 0);
        assert_eq!(obj.to_number().unwrap(), 0.0);
        assert!(matches!(obj.to_ts(), Err(TsError::Conversion { .. })));
        assert_eq!(obj.to_string(), "TsObject(a=1)");
    }

    #[test]
    fn test_literal_conversion_value() {
        let obj = TsObject::new().with_conversion(Conversion::TsDiff, "3d");
        assert_eq!(obj.to_tsdiff().unwrap().days(), 3);
    }

    #[test]
    fn test_hook_drives_resolution() {
        let obj = sample();
        assert_eq!(resolve::<f64, _>(&obj).unwrap(), 4.0);
        assert_eq!(resolve::<Ts, _>(&obj).unwrap().to_yyyymmdd(), 20121124);
    }

    #[test]
    fn test_serde_roundtrip_keeps_table() {
        let obj = sample();
        let json = serde_json::to_value(&obj).unwrap();
        assert_eq!(json["conversions"]["ts"], json!("f"));
        let back: TsObject = serde_json::from_value(json).unwrap();
        assert_eq!(back, obj);
    }
}
