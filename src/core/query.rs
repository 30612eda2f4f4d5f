use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::convert::{resolve, Construct, ConversionHook, Domain};
use crate::core::dict::TsDict;
use crate::core::list::TsList;
use crate::core::slice::Slice;
use crate::domain::ts::Ts;
use crate::utils::error::{Result, TsError};

/// Comparison domain picked by name in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainKind {
    #[default]
    Number,
    Timestamp,
}

impl DomainKind {
    pub const ALL: [Self; 2] = [Self::Number, Self::Timestamp];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Timestamp => "timestamp",
        }
    }
}

impl Display for DomainKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainKind {
    type Err = TsError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "number" | "float" => Ok(Self::Number),
            "timestamp" | "ts" | "date" => Ok(Self::Timestamp),
            other => Err(TsError::InvalidConfigValue {
                field: "domain".to_string(),
                value: other.to_string(),
                reason: "expected one of number, timestamp".to_string(),
            }),
        }
    }
}

/// Untyped bound as written in a TOML file or on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    pub fn to_number(&self, field: &str) -> Result<f64> {
        match self {
            Literal::Integer(value) => Ok(*value as f64),
            Literal::Float(value) => Ok(*value),
            Literal::Text(text) => {
                resolve::<f64, str>(text).map_err(|e| TsError::InvalidConfigValue {
                    field: field.to_string(),
                    value: text.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }

    pub fn to_ts(&self) -> Result<Ts> {
        match self {
            Literal::Integer(value) => Ts::from_yyyymmdd(*value),
            Literal::Float(value) => Ts::from_f64(*value),
            Literal::Text(text) => Ts::parse(text),
        }
    }
}

impl FromStr for Literal {
    type Err = TsError;

    fn from_str(value: &str) -> Result<Self> {
        if let Ok(int) = value.parse::<i64>() {
            return Ok(Literal::Integer(int));
        }
        if let Ok(float) = value.parse::<f64>() {
            return Ok(Literal::Float(float));
        }
        Ok(Literal::Text(value.to_string()))
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Integer(value) => write!(f, "{}", value),
            Literal::Float(value) => write!(f, "{}", value),
            Literal::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selection<D> {
    Range(Slice<D>),
    Exact(D),
}

impl<D: Domain> Selection<D> {
    fn build(
        start: Option<&Literal>,
        stop: Option<&Literal>,
        at: Option<&Literal>,
        step: Option<i64>,
        typed: impl Fn(&Literal, &str) -> Result<D>,
    ) -> Result<Self> {
        if let Some(at) = at {
            return typed(at, "at").map(Selection::Exact);
        }
        let start = start.map(|value| typed(value, "start")).transpose()?;
        let stop = stop.map(|value| typed(value, "stop")).transpose()?;
        let slice = Slice::new(start, stop);
        Ok(Selection::Range(match step {
            Some(step) => slice.with_step(step),
            None => slice,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Number(Selection<f64>),
    Timestamp(Selection<Ts>),
}

/// A typed filter ready to run over JSON input.
///
/// Arrays become a [`TsList`], objects a [`TsDict`] keyed by the member
/// names; `by_keys` filters objects on their keys instead of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    selector: Selector,
    by_keys: bool,
}

impl Query {
    pub fn new(selector: Selector, by_keys: bool) -> Self {
        Self { selector, by_keys }
    }

    pub fn build(
        domain: DomainKind,
        start: Option<&Literal>,
        stop: Option<&Literal>,
        at: Option<&Literal>,
        step: Option<i64>,
        by_keys: bool,
    ) -> Result<Self> {
        if at.is_some() && (start.is_some() || stop.is_some() || step.is_some()) {
            return Err(TsError::Config {
                message: "'at' cannot be combined with 'start', 'stop' or 'step'".to_string(),
            });
        }
        let selector = match domain {
            DomainKind::Number => Selector::Number(Selection::build(
                start,
                stop,
                at,
                step,
                |value, field| value.to_number(field),
            )?),
            DomainKind::Timestamp => Selector::Timestamp(Selection::build(
                start,
                stop,
                at,
                step,
                |value, _| value.to_ts(),
            )?),
        };
        Ok(Self::new(selector, by_keys))
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn apply(&self, input: Value) -> Result<Value> {
        match input {
            Value::Array(items) => {
                if self.by_keys {
                    return Err(TsError::Config {
                        message: "key filtering needs a JSON object as input".to_string(),
                    });
                }
                let list = TsList::from(items);
                let selected = match &self.selector {
                    Selector::Number(selection) => run_list(&list, selection)?,
                    Selector::Timestamp(selection) => run_list(&list, selection)?,
                };
                tracing::info!(total = list.len(), selected = selected.len(), "filtered array");
                Ok(Value::Array(selected.into_inner()))
            }
            Value::Object(members) => {
                let dict: TsDict<String, Value> = members.into_iter().collect();
                let selected = match &self.selector {
                    Selector::Number(selection) => run_dict(&dict, selection, self.by_keys)?,
                    Selector::Timestamp(selection) => run_dict(&dict, selection, self.by_keys)?,
                };
                tracing::info!(total = dict.len(), selected = selected.len(), "filtered object");
                Ok(serde_json::to_value(selected)?)
            }
            other => Err(TsError::Config {
                message: format!("expected a JSON array or object, got {}", other),
            }),
        }
    }
}

fn run_list<D>(list: &TsList<Value>, selection: &Selection<D>) -> Result<TsList<Value>>
where
    D: Domain + Construct<Value>,
    Value: ConversionHook<D>,
{
    match selection {
        Selection::Range(slice) => list.select(slice.clone()),
        Selection::Exact(value) => list.at(value),
    }
}

fn run_dict<D>(
    dict: &TsDict<String, Value>,
    selection: &Selection<D>,
    by_keys: bool,
) -> Result<TsDict<String, Value>>
where
    D: Domain + Construct<Value> + Construct<String>,
    Value: ConversionHook<D>,
    String: ConversionHook<D>,
{
    match (selection, by_keys) {
        (Selection::Range(slice), false) => dict.select(slice.clone()),
        (Selection::Exact(value), false) => dict.at(value),
        (Selection::Range(slice), true) => dict.select_keys(slice.clone()),
        (Selection::Exact(value), true) => dict.at_key(value),
    }
}
