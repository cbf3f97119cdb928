use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingError};

/// A raw or cleaned setting value.
///
/// `None` at the call sites (`Option<Value>`) stands for "unset" and is never
/// validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl Value {
    /// Textual form used when a value is coerced into a string.
    pub(crate) fn to_text(&self) -> String {
        match self {
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => String::new(),
            Value::Int(int) => int.to_string(),
            Value::Text(text) => text.clone(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(int) => Some(*int),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(int) => write!(f, "{int}"),
            Value::Text(text) => write!(f, "{text:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// The validation applied to a setting's value. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Boolean,
    Integer,
    Filename,
    Path,
}

impl ValueKind {
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "bool" => Ok(Self::Boolean),
            "int" => Ok(Self::Integer),
            "file" => Ok(Self::Filename),
            "path" => Ok(Self::Path),
            other => Err(SettingError::InvalidKind(other.to_string())),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Boolean => "bool",
            Self::Integer => "int",
            Self::Filename => "file",
            Self::Path => "path",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    /// Missing codes fall back to [`Visibility::Visible`].
    pub fn from_code(code: Option<i64>) -> Result<Self> {
        match code {
            None | Some(1) => Ok(Self::Visible),
            Some(0) => Ok(Self::Hidden),
            Some(other) => Err(SettingError::InvalidVisibility(other)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Visible => 1,
            Self::Hidden => 0,
        }
    }
}

/// Lock state of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    NotLocked,
    LockedByConfig,
    LockedByHierarchy,
    LockedByPermission,
}

impl Status {
    /// Missing codes fall back to [`Status::NotLocked`].
    pub fn from_code(code: Option<i64>) -> Result<Self> {
        match code {
            None | Some(3) => Ok(Self::NotLocked),
            Some(5) => Ok(Self::LockedByConfig),
            Some(7) => Ok(Self::LockedByHierarchy),
            Some(9) => Ok(Self::LockedByPermission),
            Some(other) => Err(SettingError::InvalidStatus(other)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::NotLocked => 3,
            Self::LockedByConfig => 5,
            Self::LockedByHierarchy => 7,
            Self::LockedByPermission => 9,
        }
    }

    pub fn is_locked(self) -> bool {
        self != Self::NotLocked
    }
}

/// Suggested input widget, orthogonal to [`ValueKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiKind {
    None,
    Checkbox,
    Radio,
    #[default]
    Dropdown,
    Textfield,
}

impl UiKind {
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::None),
            10 => Ok(Self::Checkbox),
            20 => Ok(Self::Radio),
            30 => Ok(Self::Dropdown),
            40 => Ok(Self::Textfield),
            other => Err(SettingError::InvalidUiType(other)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::None => 0,
            Self::Checkbox => 10,
            Self::Radio => 20,
            Self::Dropdown => 30,
            Self::Textfield => 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    ChangedValue,
    ChangedVisibility,
    ChangedStatus,
}
