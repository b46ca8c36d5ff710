//! Column specifiers and the ordered parameter schema.
//!
//! A column specifier has the form `"name:domain"`. The domain is either a
//! numeric range such as `[0,1]` (continuous or ordinal, values are floats)
//! or a discrete set such as `{0,1,2}` (categorical, values are integer
//! codes). The specifier text itself doubles as the column name on the wire,
//! so it is kept verbatim alongside the parsed form.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::str::FromStr;

use crate::errors::SchemaError;
use crate::params::{ParameterValue, Parameters};

/// The value domain of one parameter column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Domain {
    /// Numeric range `[low,high]`; values are floats.
    Continuous { low: f64, high: f64 },
    /// Discrete set `{c0,c1,...}`; values are integer codes.
    Categorical { codes: Vec<i64> },
}

impl Domain {
    /// Parse the domain half of a column specifier.
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        if let Some(inner) = text.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| "range domain is missing a closing ']'".to_string())?;
            let bounds: Vec<&str> = inner.split(',').map(str::trim).collect();
            if bounds.len() != 2 {
                return Err(format!("range domain needs two bounds, got {}", bounds.len()));
            }
            let low = parse_bound(bounds[0])?;
            let high = parse_bound(bounds[1])?;
            if low > high {
                return Err(format!("lower bound {low} exceeds upper bound {high}"));
            }
            Ok(Self::Continuous { low, high })
        } else if let Some(inner) = text.strip_prefix('{') {
            let inner = inner
                .strip_suffix('}')
                .ok_or_else(|| "set domain is missing a closing '}'".to_string())?;
            if inner.trim().is_empty() {
                return Err("set domain has no codes".to_string());
            }
            let codes = inner
                .split(',')
                .map(|code| {
                    let code = code.trim();
                    code.parse::<i64>()
                        .map_err(|e| format!("invalid code '{code}': {e}"))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Self::Categorical { codes })
        } else {
            Err("domain must start with '[' or '{'".to_string())
        }
    }

    /// Coerce a raw cell value into this domain's parameter type.
    pub fn decode(&self, name: &str, value: &Value) -> Result<ParameterValue, SchemaError> {
        let coercion = |message: &str| SchemaError::Coercion {
            name: name.to_string(),
            value: value.to_string(),
            message: message.to_string(),
        };

        match self {
            Self::Continuous { .. } => {
                let v = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => s.trim().parse::<f64>().ok(),
                    _ => None,
                };
                v.map(ParameterValue::Float)
                    .ok_or_else(|| coercion("expected a number"))
            }
            Self::Categorical { .. } => {
                let v = match value {
                    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
                    Value::String(s) => {
                        let s = s.trim();
                        s.parse::<i64>()
                            .ok()
                            .or_else(|| s.parse::<f64>().ok().and_then(integral))
                    }
                    _ => None,
                };
                v.map(ParameterValue::Int)
                    .ok_or_else(|| coercion("expected an integer code"))
            }
        }
    }

    /// Encode a parameter value as a row cell for this domain.
    pub fn encode(&self, name: &str, value: &ParameterValue) -> Result<Value, SchemaError> {
        match (self, value) {
            (Self::Continuous { .. }, v) => {
                let v = v.as_f64();
                if !v.is_finite() {
                    return Err(SchemaError::Coercion {
                        name: name.to_string(),
                        value: v.to_string(),
                        message: "expected a finite number".to_string(),
                    });
                }
                Ok(Value::from(v))
            }
            (Self::Categorical { .. }, ParameterValue::Int(v)) => Ok(Value::from(*v)),
            (Self::Categorical { .. }, ParameterValue::Float(v)) => integral(*v)
                .map(Value::from)
                .ok_or_else(|| SchemaError::Coercion {
                    name: name.to_string(),
                    value: v.to_string(),
                    message: "expected an integer code".to_string(),
                }),
        }
    }
}

fn parse_bound(text: &str) -> Result<f64, String> {
    let bound = text
        .parse::<f64>()
        .map_err(|e| format!("invalid bound '{text}': {e}"))?;
    if !bound.is_finite() {
        return Err(format!("bound '{text}' is not finite"));
    }
    Ok(bound)
}

/// Exact integer value of `v`, if it has one that fits in an `i64`.
fn integral(v: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    let in_range = v >= i64::MIN as f64 && v < i64::MAX as f64;
    (v.is_finite() && v.fract() == 0.0 && in_range).then(|| v as i64)
}

/// One parsed `"name:domain"` column specifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub domain: Domain,
    /// The specifier exactly as given; used as the wire column name.
    pub spec: String,
}

impl FromStr for ColumnSpec {
    type Err = SchemaError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |message: String| SchemaError::InvalidSpecifier {
            spec: spec.to_string(),
            message,
        };

        let mut parts = spec.split(':');
        let (name, domain) = match (parts.next(), parts.next(), parts.next()) {
            (Some(name), Some(domain), None) => (name, domain),
            _ => return Err(invalid("expected exactly one ':' separating name and domain".into())),
        };
        if name.is_empty() {
            return Err(invalid("parameter name is empty".into()));
        }

        Ok(Self {
            name: name.to_string(),
            domain: Domain::parse(domain).map_err(invalid)?,
            spec: spec.to_string(),
        })
    }
}

impl std::fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.spec)
    }
}

/// Ordered parameter schema. Column order defines the positional layout of
/// every measurement and design row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
}

impl Schema {
    pub fn parse<I, S>(specs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for spec in specs {
            let column: ColumnSpec = spec.as_ref().parse()?;
            if !seen.insert(column.name.clone()) {
                return Err(SchemaError::DuplicateName { name: column.name });
            }
            columns.push(column);
        }
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Parameter names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Wire column names (the specifiers) in schema order.
    pub fn specs(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.spec.clone()).collect()
    }

    /// Parameter dictionary → positional row.
    pub fn encode(&self, params: &Parameters) -> Result<Vec<Value>, SchemaError> {
        self.columns
            .iter()
            .map(|column| {
                let value = params
                    .get(&column.name)
                    .ok_or_else(|| SchemaError::MissingParameter {
                        name: column.name.clone(),
                    })?;
                column.domain.encode(&column.name, value)
            })
            .collect()
    }

    /// Positional row → parameter dictionary. Only the first `len()` cells
    /// are read; trailing cells (metrics, estimates) are ignored.
    pub fn decode(&self, row: &[Value]) -> Result<Parameters, SchemaError> {
        if row.len() < self.columns.len() {
            return Err(SchemaError::RowLength {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.columns
            .iter()
            .zip(row)
            .map(|(column, cell)| {
                let value = column.domain.decode(&column.name, cell)?;
                Ok((column.name.clone(), value))
            })
            .collect()
    }
}
