//! This module defines the configuration of a pxl pipeline.
//! The configuration is a list of stages chained in order, each with its own key/value config,
//! plus the capacity of the queues connecting them.
//! The configuration is serialized in the RON format.

use pxl_traits::{PxError, PxResult};
use ron::extensions::Extensions;
use ron::value::{Number, Value as RonValue};
use ron::Options;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Display;
use std::fs::read_to_string;
use std::path::Path;

/// Queue capacity used when the configuration does not give one.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// This is the configuration of a component (a stage for example).
/// It is a map of key-value pairs.
/// It is given to the new method of the stage implementation.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ComponentConfig(pub HashMap<String, Value>);

impl Display for ComponentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // sorted so the output is stable
        let mut keys: Vec<&String> = self.0.keys().collect();
        keys.sort();
        write!(f, "{{")?;
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", key, self.0[*key])?;
        }
        write!(f, "}}")
    }
}

// forward map interface
impl ComponentConfig {
    pub fn new() -> Self {
        ComponentConfig(HashMap::new())
    }

    /// Typed lookup. A missing key is Ok(None), a value of the wrong type is an error.
    pub fn get<T>(&self, key: &str) -> PxResult<Option<T>>
    where
        T: TryFrom<Value, Error = PxError>,
    {
        match self.0.get(key) {
            Some(v) => T::try_from(v.clone())
                .map(Some)
                .map_err(|e| e.add_cause(&format!("while reading config key {:?}", key))),
            None => Ok(None),
        }
    }

    pub fn set<T: Into<Value>>(&mut self, key: &str, value: T) {
        self.0.insert(key.to_string(), value.into());
    }
}

/// Wrapper around the ron::Value to allow for custom conversions.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Value(RonValue);

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value(RonValue::Number(value.into()))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::from(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::from(value as i64)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::from(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value(RonValue::Bool(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value(RonValue::String(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value(RonValue::String(value.to_string()))
    }
}

/// ron may hand back unsigned literals as floats, accept those when they are integral.
fn integral(num: &Number) -> Option<i64> {
    if let Some(i) = num.as_i64() {
        return Some(i);
    }
    num.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f as i64)
}

impl TryFrom<Value> for i64 {
    type Error = PxError;

    fn try_from(value: Value) -> PxResult<Self> {
        if let RonValue::Number(num) = &value.0 {
            integral(num)
                .ok_or_else(|| format!("Expected an integer value but got {}", value).into())
        } else {
            Err(format!("Expected a Number variant but got {}", value).into())
        }
    }
}

impl TryFrom<Value> for u8 {
    type Error = PxError;

    fn try_from(value: Value) -> PxResult<Self> {
        let i = i64::try_from(value)?;
        u8::try_from(i).map_err(|_| format!("{} does not fit in 0..=255", i).into())
    }
}

impl TryFrom<Value> for u32 {
    type Error = PxError;

    fn try_from(value: Value) -> PxResult<Self> {
        let i = i64::try_from(value)?;
        u32::try_from(i).map_err(|_| format!("{} does not fit in a u32", i).into())
    }
}

impl TryFrom<Value> for bool {
    type Error = PxError;

    fn try_from(value: Value) -> PxResult<Self> {
        if let RonValue::Bool(b) = value.0 {
            Ok(b)
        } else {
            Err(format!("Expected a Bool variant but got {}", value).into())
        }
    }
}

impl TryFrom<Value> for String {
    type Error = PxError;

    fn try_from(value: Value) -> PxResult<Self> {
        if let RonValue::String(s) = value.0 {
            Ok(s)
        } else {
            Err(format!("Expected a String variant but got {}", value).into())
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            RonValue::Number(n) => match integral(n) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{:?}", n),
            },
            RonValue::String(s) => write!(f, "{}", s),
            RonValue::Bool(b) => write!(f, "{}", b),
            RonValue::Map(m) => write!(f, "{:?}", m),
            RonValue::Char(c) => write!(f, "{:?}", c),
            RonValue::Unit => write!(f, "unit"),
            RonValue::Option(o) => write!(f, "{:?}", o),
            RonValue::Seq(s) => write!(f, "{:?}", s),
        }
    }
}

/// A stage in the pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StageConfig {
    id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config: Option<ComponentConfig>,
}

impl StageConfig {
    pub fn new(id: &str, ptype: &str) -> Self {
        StageConfig {
            id: id.to_string(),
            type_: Some(ptype.to_string()),
            config: None,
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_type(&self) -> Option<&str> {
        self.type_.as_deref()
    }

    pub fn get_instance_config(&self) -> Option<&ComponentConfig> {
        self.config.as_ref()
    }

    pub fn set_param<T: Into<Value>>(&mut self, key: &str, value: T) {
        self.config
            .get_or_insert_with(ComponentConfig::new)
            .set(key, value);
    }
}

// The configuration Serialization format is as follows:
// (
//   queue_capacity: 1024,
//   stages : [ (id: "threshold", type: "pxl_threshold::PixThreshold", config: {...}),
//              (id: "other", type: "zorglub::MyStage", config: {...})]
// )

/// PxConfig is the programmatic representation of the pipeline configuration.
/// Stages are chained in the order they are listed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PxConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

impl Default for PxConfig {
    fn default() -> Self {
        PxConfig {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            stages: Vec::new(),
        }
    }
}

impl PxConfig {
    pub fn add_stage(&mut self, stage: StageConfig) {
        self.stages.push(stage);
    }

    pub fn find_stage(&self, id: &str) -> Option<&StageConfig> {
        self.stages.iter().find(|s| s.id == id)
    }

    fn get_options() -> Options {
        Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .with_default_extension(Extensions::UNWRAP_NEWTYPES)
            .with_default_extension(Extensions::UNWRAP_VARIANT_NEWTYPES)
    }

    pub fn serialize_ron(&self) -> PxResult<String> {
        let pretty = ron::ser::PrettyConfig::default();
        Self::get_options()
            .to_string_pretty(self, pretty)
            .map_err(|e| PxError::new_with_cause("Failed to serialize configuration", e))
    }

    pub fn deserialize_ron(ron: &str) -> PxResult<Self> {
        let config: PxConfig = Self::get_options()
            .from_str(ron)
            .map_err(|e| PxError::new_with_cause("Syntax Error in config", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> PxResult<()> {
        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].iter().any(|s| s.id == stage.id) {
                return Err(format!("Duplicate stage id {:?} in config", stage.id).into());
            }
        }
        Ok(())
    }
}

/// Read a pxl configuration from a file.
pub fn read_configuration(config_filename: &Path) -> PxResult<PxConfig> {
    let config_content = read_to_string(config_filename).map_err(|e| {
        PxError::from(format!(
            "Failed to read configuration file: {:?}",
            config_filename
        ))
        .add_cause(e.to_string().as_str())
    })?;
    PxConfig::deserialize_ron(&config_content)
}
