use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// A candidate record failed one or more field constraints
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{label} validation failed: {}", summarize(.field_errors))]
pub struct ValidationError {
    pub label: &'static str,
    pub field_errors: BTreeMap<String, String>,
}

fn summarize(field_errors: &BTreeMap<String, String>) -> String {
    field_errors
        .iter()
        .map(|(field, msg)| format!("{}: {}", field, msg))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Accumulates field errors so a draft reports every problem at once
pub(crate) struct Checker {
    label: &'static str,
    errors: BTreeMap<String, String>,
}

impl Checker {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            errors: BTreeMap::new(),
        }
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Required text: cast, trim, reject blank. `fallback` stands in when absent.
    pub fn required_text(
        &mut self,
        field: &str,
        value: Option<Value>,
        fallback: Option<&str>,
    ) -> Option<String> {
        let raw = match cast_text(value) {
            Ok(Some(s)) => s,
            Ok(None) => match fallback {
                Some(default) => default.to_string(),
                None => {
                    self.fail(field, format!("Path `{}` is required.", field));
                    return None;
                }
            },
            Err(got) => {
                self.fail(field, format!("Cast to string failed for value {}", got));
                return None;
            }
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.fail(field, format!("Path `{}` is required.", field));
            return None;
        }
        Some(trimmed.to_string())
    }

    /// Optional text, kept verbatim
    pub fn optional_text(&mut self, field: &str, value: Option<Value>) -> Option<String> {
        match cast_text(value) {
            Ok(s) => Some(s.unwrap_or_default()),
            Err(got) => {
                self.fail(field, format!("Cast to string failed for value {}", got));
                None
            }
        }
    }

    /// Required integer within `[min, max]`
    pub fn integer_in_range(
        &mut self,
        field: &str,
        value: Option<Value>,
        min: i64,
        max: i64,
    ) -> Option<i64> {
        let number = match value {
            None | Some(Value::Null) => {
                self.fail(field, format!("Path `{}` is required.", field));
                return None;
            }
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
            Some(_) => None,
        };

        let Some(number) = number.filter(|n| n.is_finite()) else {
            self.fail(field, format!("Cast to Number failed for path `{}`", field));
            return None;
        };

        if number.fract() != 0.0 {
            self.fail(
                field,
                format!("Path `{}` ({}) must be an integer.", field, display_number(number)),
            );
            return None;
        }

        // Range check stays in f64; `as i64` saturates
        if number < min as f64 {
            self.fail(
                field,
                format!(
                    "Path `{}` ({}) is less than minimum allowed value ({}).",
                    field,
                    display_number(number),
                    min
                ),
            );
            return None;
        }
        if number > max as f64 {
            self.fail(
                field,
                format!(
                    "Path `{}` ({}) is more than maximum allowed value ({}).",
                    field,
                    display_number(number),
                    max
                ),
            );
            return None;
        }
        Some(number as i64)
    }

    /// The assembled record, or every collected field error
    pub fn finish<T>(self, record: Option<T>) -> Result<T, ValidationError> {
        match record {
            Some(record) if self.errors.is_empty() => Ok(record),
            _ => Err(ValidationError {
                label: self.label,
                field_errors: self.errors,
            }),
        }
    }
}

/// Integral values print without a fraction; very large ones in exponent form
fn display_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else if n.abs() >= 1e15 {
        format!("{:e}", n)
    } else {
        n.to_string()
    }
}

/// Document-style string casting: `null`/absent is `None`, scalars become text
fn cast_text(value: Option<Value>) -> Result<Option<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(other.to_string()),
    }
}
