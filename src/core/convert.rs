//! Conversion of container elements into a comparison domain.
//!
//! An element reaches a domain `D` in one of two ways. If it implements
//! [`ConversionHook<D>`] and the hook returns `Some`, that value is used.
//! Otherwise `D` is built directly through [`Construct<X>`]. Built-in
//! element types opt out of the hook with an empty impl, so only
//! construction applies to them.
//!
//! ```
//! use tslist::{resolve, Construct, ConversionHook, Result, Ts};
//!
//! struct Invoice {
//!     due: Ts,
//! }
//!
//! impl ConversionHook<Ts> for Invoice {
//!     fn conversion_hook(&self) -> Option<Result<Ts>> {
//!         Some(Ok(self.due))
//!     }
//! }
//!
//! // Invoices have no direct construction, the default reports an error.
//! impl Construct<Invoice> for Ts {}
//!
//! let invoice = Invoice { due: Ts::from_yyyymmdd(20240131).unwrap() };
//! assert_eq!(resolve::<Ts, _>(&invoice).unwrap().to_yyyymmdd(), 20240131);
//! ```

use std::any::type_name;
use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use serde_json::Value;

use crate::domain::ts::Ts;
use crate::domain::tsdiff::TsDiff;
use crate::utils::error::{Result, TsError};

/// A type slicing bounds can be expressed in.
pub trait Domain: PartialOrd + Clone + Debug {
    const NAME: &'static str;
}

impl Domain for f64 {
    const NAME: &'static str = "number";
}

impl Domain for i64 {
    const NAME: &'static str = "integer";
}

impl Domain for Ts {
    const NAME: &'static str = "timestamp";
}

impl Domain for TsDiff {
    const NAME: &'static str = "duration";
}

/// Element-defined conversion into `D`, tried before direct construction.
pub trait ConversionHook<D> {
    fn conversion_hook(&self) -> Option<Result<D>> {
        None
    }
}

/// Direct construction of a domain value from an element of type `X`.
pub trait Construct<X: ?Sized>: Sized {
    fn construct(_value: &X) -> Result<Self> {
        Err(TsError::Conversion {
            value: type_name::<X>().to_string(),
            target: type_name::<Self>(),
            reason: "no conversion hook or constructor".to_string(),
        })
    }
}

/// Brings `value` into the domain `D`, hook first, construction second.
pub fn resolve<D, X>(value: &X) -> Result<D>
where
    D: Domain + Construct<X>,
    X: ConversionHook<D> + ?Sized,
{
    match value.conversion_hook() {
        Some(converted) => converted,
        None => D::construct(value),
    }
}

impl<D, X: ConversionHook<D> + ?Sized> ConversionHook<D> for &X {
    fn conversion_hook(&self) -> Option<Result<D>> {
        (**self).conversion_hook()
    }
}

impl<'a, D: Construct<X>, X: ?Sized> Construct<&'a X> for D {
    fn construct(value: &&'a X) -> Result<Self> {
        D::construct(*value)
    }
}

macro_rules! without_hook {
    ($domain:ty: $($source:ty),+ $(,)?) => {
        $(impl ConversionHook<$domain> for $source {})+
    };
}

macro_rules! cast_construct {
    ($domain:ty: $($source:ty),+ $(,)?) => {
        $(
            impl Construct<$source> for $domain {
                fn construct(value: &$source) -> Result<Self> {
                    Ok(*value as $domain)
                }
            }
        )+
    };
}

// number

without_hook!(f64: f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
without_hook!(f64: str, String, Value, Ts, TsDiff);
cast_construct!(f64: f64, f32, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Construct<str> for f64 {
    fn construct(value: &str) -> Result<Self> {
        value
            .trim()
            .parse::<f64>()
            .map_err(|e| TsError::conversion(value, f64::NAME, e.to_string()))
    }
}

impl Construct<String> for f64 {
    fn construct(value: &String) -> Result<Self> {
        <f64 as Construct<str>>::construct(value)
    }
}

impl Construct<Ts> for f64 {
    fn construct(value: &Ts) -> Result<Self> {
        Ok(value.to_f64())
    }
}

impl Construct<TsDiff> for f64 {
    fn construct(value: &TsDiff) -> Result<Self> {
        Ok(value.year_fraction())
    }
}

impl Construct<Value> for f64 {
    fn construct(value: &Value) -> Result<Self> {
        match value {
            Value::Number(number) => number
                .as_f64()
                .ok_or_else(|| TsError::conversion(value, f64::NAME, "number out of range")),
            Value::String(text) => <f64 as Construct<str>>::construct(text),
            other => Err(TsError::conversion(
                other,
                f64::NAME,
                "expected a number or a numeric string",
            )),
        }
    }
}

// integer

without_hook!(i64: i8, i16, i32, i64, u8, u16, u32, u64, usize);
without_hook!(i64: str, String, Value, Ts);
cast_construct!(i64: i8, i16, i32, i64, u8, u16, u32);

impl Construct<u64> for i64 {
    fn construct(value: &u64) -> Result<Self> {
        i64::try_from(*value).map_err(|e| TsError::conversion(value, i64::NAME, e.to_string()))
    }
}

impl Construct<usize> for i64 {
    fn construct(value: &usize) -> Result<Self> {
        i64::try_from(*value).map_err(|e| TsError::conversion(value, i64::NAME, e.to_string()))
    }
}

impl Construct<str> for i64 {
    fn construct(value: &str) -> Result<Self> {
        value
            .trim()
            .parse::<i64>()
            .map_err(|e| TsError::conversion(value, i64::NAME, e.to_string()))
    }
}

impl Construct<String> for i64 {
    fn construct(value: &String) -> Result<Self> {
        <i64 as Construct<str>>::construct(value)
    }
}

impl Construct<Ts> for i64 {
    fn construct(value: &Ts) -> Result<Self> {
        Ok(value.to_yyyymmdd())
    }
}

impl Construct<Value> for i64 {
    fn construct(value: &Value) -> Result<Self> {
        match value {
            Value::Number(number) => number
                .as_i64()
                .ok_or_else(|| TsError::conversion(value, i64::NAME, "not an integer")),
            Value::String(text) => <i64 as Construct<str>>::construct(text),
            other => Err(TsError::conversion(
                other,
                i64::NAME,
                "expected an integer or an integer string",
            )),
        }
    }
}

// timestamp

without_hook!(Ts: Ts, NaiveDate, NaiveDateTime, i32, i64, u32, f64, str, String, Value);

impl<Tz: TimeZone> ConversionHook<Ts> for DateTime<Tz> {}

impl<Tz: TimeZone> Construct<DateTime<Tz>> for Ts {
    fn construct(value: &DateTime<Tz>) -> Result<Self> {
        Ok(Ts::from(value.clone()))
    }
}

impl Construct<Ts> for Ts {
    fn construct(value: &Ts) -> Result<Self> {
        Ok(*value)
    }
}

impl Construct<NaiveDate> for Ts {
    fn construct(value: &NaiveDate) -> Result<Self> {
        Ok(Ts::from(*value))
    }
}

impl Construct<NaiveDateTime> for Ts {
    fn construct(value: &NaiveDateTime) -> Result<Self> {
        Ok(Ts::from(*value))
    }
}

impl Construct<i32> for Ts {
    fn construct(value: &i32) -> Result<Self> {
        as_conversion(value, Ts::try_from(*value))
    }
}

impl Construct<i64> for Ts {
    fn construct(value: &i64) -> Result<Self> {
        as_conversion(value, Ts::try_from(*value))
    }
}

impl Construct<u32> for Ts {
    fn construct(value: &u32) -> Result<Self> {
        as_conversion(value, Ts::try_from(*value))
    }
}

impl Construct<f64> for Ts {
    fn construct(value: &f64) -> Result<Self> {
        as_conversion(value, Ts::from_f64(*value))
    }
}

impl Construct<str> for Ts {
    fn construct(value: &str) -> Result<Self> {
        as_conversion(value, Ts::parse(value))
    }
}

impl Construct<String> for Ts {
    fn construct(value: &String) -> Result<Self> {
        <Ts as Construct<str>>::construct(value)
    }
}

impl Construct<Value> for Ts {
    fn construct(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => <Ts as Construct<str>>::construct(text),
            Value::Number(number) => match (number.as_i64(), number.as_f64()) {
                (Some(int), _) => <Ts as Construct<i64>>::construct(&int),
                (None, Some(float)) => <Ts as Construct<f64>>::construct(&float),
                _ => Err(TsError::conversion(value, Ts::NAME, "number out of range")),
            },
            other => Err(TsError::conversion(
                other,
                Ts::NAME,
                "expected a date string or a YYYYMMDD number",
            )),
        }
    }
}

// duration

without_hook!(TsDiff: TsDiff, TimeDelta, str, String, Value);

impl Construct<TsDiff> for TsDiff {
    fn construct(value: &TsDiff) -> Result<Self> {
        Ok(*value)
    }
}

impl Construct<TimeDelta> for TsDiff {
    fn construct(value: &TimeDelta) -> Result<Self> {
        Ok(TsDiff::new(*value))
    }
}

impl Construct<str> for TsDiff {
    fn construct(value: &str) -> Result<Self> {
        as_conversion(value, TsDiff::parse(value))
    }
}

impl Construct<String> for TsDiff {
    fn construct(value: &String) -> Result<Self> {
        <TsDiff as Construct<str>>::construct(value)
    }
}

impl Construct<Value> for TsDiff {
    fn construct(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => <TsDiff as Construct<str>>::construct(text),
            other => Err(TsError::conversion(
                other,
                TsDiff::NAME,
                "expected a duration string such as '3d'",
            )),
        }
    }
}

// A malformed element is a conversion failure, not a bad argument.
fn as_conversion<X: Debug + ?Sized, D: Domain>(value: &X, result: Result<D>) -> Result<D> {
    result.map_err(|e| TsError::conversion(value, D::NAME, e.to_string()))
}
