//! Sweep configuration: which search to run, and how.
//!
//! Loaded from a flat JSON object:
//!
//! ```json
//! {"max_depth": 6, "max_term": 100, "starting_prefix": "3,29",
//!  "guard_digits": 2, "magnitude_guard": false, "max_refinements": 4,
//!  "workers": 4, "fan_out_depth": 1}
//! ```
//!
//! `max_depth` and `max_term` are required. Unknown keys are rejected.
//! Without `workers` the sweep runs serially.
//!
//! The same module parses the nested policy snapshot (`policy.json`) that a
//! sweep bundle carries, so a bundle can be replayed from its own artifacts.

use std::num::NonZeroUsize;
use std::path::Path;

use serde_json::{Map, Value};
use trott_kernel::cf::term::TermSequence;
use trott_kernel::validity::GuardPolicy;
use trott_search::policy::{ParallelPolicy, SearchPolicy};

/// Schema tag of the policy snapshot artifact.
pub const POLICY_SCHEMA_VERSION: &str = "trott_policy.v1";

const KNOWN_KEYS: &[&str] = &[
    "max_depth",
    "max_term",
    "starting_prefix",
    "guard_digits",
    "magnitude_guard",
    "max_refinements",
    "workers",
    "fan_out_depth",
];

/// Error loading or validating a sweep configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { detail: String },
    Parse { detail: String },
    NotAnObject,
    UnknownKey { key: String },
    MissingField { field: String },
    InvalidField { field: String, detail: String },
    /// Fields parsed but describe an unusable search.
    InvalidPolicy { detail: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::Parse { detail } => write!(f, "config parse error: {detail}"),
            Self::NotAnObject => write!(f, "config must be a JSON object"),
            Self::UnknownKey { key } => write!(f, "unknown config key: {key}"),
            Self::MissingField { field } => write!(f, "missing required field: {field}"),
            Self::InvalidField { field, detail } => write!(f, "invalid {field}: {detail}"),
            Self::InvalidPolicy { detail } => write!(f, "invalid policy: {detail}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A complete sweep description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub search: SearchPolicy,
    /// `None` runs the serial engine.
    pub parallel: Option<ParallelPolicy>,
}

impl SweepConfig {
    #[must_use]
    pub fn serial(search: SearchPolicy) -> Self {
        Self {
            search,
            parallel: None,
        }
    }

    #[must_use]
    pub fn parallel(search: SearchPolicy, parallel: ParallelPolicy) -> Self {
        Self {
            search,
            parallel: Some(parallel),
        }
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`SweepConfig::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            detail: format!("read {}: {e}", path.display()),
        })?;
        Self::from_json_str(&text)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed JSON, unknown keys, missing
    /// bounds, or out-of-range values.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(text).map_err(|e| ConfigError::Parse {
            detail: e.to_string(),
        })?;
        Self::from_json_value(&value)
    }

    /// Parse the flat configuration object.
    ///
    /// # Errors
    ///
    /// See [`SweepConfig::from_json_str`].
    pub fn from_json_value(value: &Value) -> Result<Self, ConfigError> {
        let obj = value.as_object().ok_or(ConfigError::NotAnObject)?;
        if let Some(key) = obj.keys().find(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            return Err(ConfigError::UnknownKey { key: key.clone() });
        }

        let defaults = GuardPolicy::default();
        let guard = GuardPolicy {
            guard_digits: optional_usize(obj, "guard_digits")?.unwrap_or(defaults.guard_digits),
            magnitude_guard: optional_bool(obj, "magnitude_guard")?
                .unwrap_or(defaults.magnitude_guard),
            max_refinements: optional_u32(obj, "max_refinements")?
                .unwrap_or(defaults.max_refinements),
        };
        let search = SearchPolicy {
            max_depth: required_usize(obj, "max_depth")?,
            max_term: required_u64(obj, "max_term")?,
            starting_prefix: optional_prefix(obj, "starting_prefix")?.unwrap_or_default(),
            guard,
        };

        let workers = optional_usize(obj, "workers")?;
        let fan_out_depth = optional_usize(obj, "fan_out_depth")?;
        let parallel = match (workers, fan_out_depth) {
            (None, None) => None,
            (None, Some(_)) => {
                return Err(ConfigError::InvalidField {
                    field: "fan_out_depth".into(),
                    detail: "only meaningful together with workers".into(),
                })
            }
            (Some(n), fan_out) => {
                let workers = NonZeroUsize::new(n).ok_or_else(|| ConfigError::InvalidField {
                    field: "workers".into(),
                    detail: "must be at least 1".into(),
                })?;
                Some(ParallelPolicy::new(workers).with_fan_out_depth(fan_out.unwrap_or(1)))
            }
        };
        Ok(Self { search, parallel })
    }

    /// Structural validation of both policies.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPolicy`] with the search layer's reason.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |e: trott_search::error::SearchError| ConfigError::InvalidPolicy {
            detail: e.to_string(),
        };
        self.search.validate().map_err(invalid)?;
        if let Some(parallel) = &self.parallel {
            parallel.validate(&self.search).map_err(invalid)?;
        }
        Ok(())
    }

    /// Policy snapshot: the nested form stored as `policy.json`.
    #[must_use]
    pub fn to_json_value(&self) -> Value {
        serde_json::json!({
            "parallel": self.parallel.map_or(Value::Null, |p| p.to_json_value()),
            "schema_version": POLICY_SCHEMA_VERSION,
            "search": self.search.to_json_value(),
        })
    }

    /// Parse a policy snapshot produced by [`SweepConfig::to_json_value`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the schema tag, any field, or the nesting
    /// does not match.
    pub fn from_policy_snapshot(value: &Value) -> Result<Self, ConfigError> {
        let obj = value.as_object().ok_or(ConfigError::NotAnObject)?;
        let schema = obj.get("schema_version").and_then(Value::as_str);
        if schema != Some(POLICY_SCHEMA_VERSION) {
            return Err(ConfigError::InvalidField {
                field: "schema_version".into(),
                detail: format!("expected {POLICY_SCHEMA_VERSION}, found {schema:?}"),
            });
        }
        let search = nested_object(obj, "search")?;
        let guard = nested_object(search, "guard")?;
        let search = SearchPolicy {
            max_depth: required_usize(search, "max_depth")?,
            max_term: required_u64(search, "max_term")?,
            starting_prefix: optional_prefix(search, "starting_prefix")?.unwrap_or_default(),
            guard: GuardPolicy {
                guard_digits: required_usize(guard, "guard_digits")?,
                magnitude_guard: optional_bool(guard, "magnitude_guard")?.ok_or_else(|| {
                    ConfigError::MissingField {
                        field: "magnitude_guard".into(),
                    }
                })?,
                max_refinements: optional_u32(guard, "max_refinements")?.ok_or_else(|| {
                    ConfigError::MissingField {
                        field: "max_refinements".into(),
                    }
                })?,
            },
        };
        let parallel = match obj.get("parallel") {
            None | Some(Value::Null) => None,
            Some(Value::Object(p)) => {
                let workers = NonZeroUsize::new(required_usize(p, "workers")?).ok_or_else(|| {
                    ConfigError::InvalidField {
                        field: "workers".into(),
                        detail: "must be at least 1".into(),
                    }
                })?;
                Some(
                    ParallelPolicy::new(workers)
                        .with_fan_out_depth(required_usize(p, "fan_out_depth")?),
                )
            }
            Some(other) => {
                return Err(ConfigError::InvalidField {
                    field: "parallel".into(),
                    detail: format!("expected object or null, found {other}"),
                })
            }
        };
        Ok(Self { search, parallel })
    }
}

fn nested_object<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    match obj.get(field) {
        Some(Value::Object(inner)) => Ok(inner),
        Some(_) => Err(ConfigError::InvalidField {
            field: field.into(),
            detail: "expected an object".into(),
        }),
        None => Err(ConfigError::MissingField {
            field: field.into(),
        }),
    }
}

fn optional_u64(obj: &Map<String, Value>, field: &str) -> Result<Option<u64>, ConfigError> {
    match obj.get(field) {
        None => Ok(None),
        Some(v) => v.as_u64().map(Some).ok_or_else(|| ConfigError::InvalidField {
            field: field.into(),
            detail: format!("expected a non-negative integer, found {v}"),
        }),
    }
}

fn optional_usize(obj: &Map<String, Value>, field: &str) -> Result<Option<usize>, ConfigError> {
    optional_u64(obj, field)?
        .map(|n| {
            usize::try_from(n).map_err(|_| ConfigError::InvalidField {
                field: field.into(),
                detail: format!("{n} does not fit this platform"),
            })
        })
        .transpose()
}

fn optional_u32(obj: &Map<String, Value>, field: &str) -> Result<Option<u32>, ConfigError> {
    optional_u64(obj, field)?
        .map(|n| {
            u32::try_from(n).map_err(|_| ConfigError::InvalidField {
                field: field.into(),
                detail: format!("{n} is out of range"),
            })
        })
        .transpose()
}

fn required_u64(obj: &Map<String, Value>, field: &str) -> Result<u64, ConfigError> {
    optional_u64(obj, field)?.ok_or_else(|| ConfigError::MissingField {
        field: field.into(),
    })
}

fn required_usize(obj: &Map<String, Value>, field: &str) -> Result<usize, ConfigError> {
    optional_usize(obj, field)?.ok_or_else(|| ConfigError::MissingField {
        field: field.into(),
    })
}

fn optional_bool(obj: &Map<String, Value>, field: &str) -> Result<Option<bool>, ConfigError> {
    match obj.get(field) {
        None => Ok(None),
        Some(v) => v.as_bool().map(Some).ok_or_else(|| ConfigError::InvalidField {
            field: field.into(),
            detail: format!("expected a boolean, found {v}"),
        }),
    }
}

/// A prefix is either `"3,29"` or a JSON array of terms.
fn optional_prefix(
    obj: &Map<String, Value>,
    field: &str,
) -> Result<Option<TermSequence>, ConfigError> {
    let invalid = |e: trott_kernel::error::KernelError| ConfigError::InvalidField {
        field: field.into(),
        detail: e.to_string(),
    };
    match obj.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => s.parse().map(Some).map_err(invalid),
        Some(v @ Value::Array(_)) => TermSequence::from_json_value(v).map(Some).map_err(invalid),
        Some(v) => Err(ConfigError::InvalidField {
            field: field.into(),
            detail: format!("expected a string or an array, found {v}"),
        }),
    }
}
