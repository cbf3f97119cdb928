use serde::Serialize;

use crate::clean::{clean, clean_alphaext, loose_eq};
use crate::core::{Status, UiKind, Value, ValueKind, Visibility};
use crate::error::{Result, SettingError};

/// Rendering hints for a setting. Purely descriptive, nothing in this crate
/// reads them back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiMeta {
    pub kind: UiKind,
    pub label: String,
    /// Raw value to display label, in display order.
    pub values: Vec<(Value, String)>,
    /// Free form hints for the renderer.
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl UiMeta {
    fn new(label: &str) -> Self {
        Self {
            kind: UiKind::Dropdown,
            label: label.to_string(),
            values: Vec::new(),
            options: serde_json::Map::new(),
        }
    }
}

/// One named, typed and validated configuration value.
///
/// A `Setting` on its own only knows how to validate and store its state.
/// Wiring settings together and notifying dependents is the job of
/// [`SettingsTree`](crate::SettingsTree), which owns every setting.
#[derive(Debug, Clone)]
pub struct Setting {
    name: String,
    kind: ValueKind,
    value: Option<Value>,
    visibility: Visibility,
    status: Status,
    ui: UiMeta,
}

impl Setting {
    pub fn new(name: impl Into<String>, kind: ValueKind, value: Option<Value>) -> Result<Self> {
        let name = name.into();
        let value = validate_value(kind, value)?;

        Ok(Self {
            ui: UiMeta::new(&name),
            name,
            kind,
            value,
            visibility: Visibility::default(),
            status: Status::default(),
        })
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn ui(&self) -> &UiMeta {
        &self.ui
    }

    /// Replaces all UI metadata at once. The kind must be one of the four
    /// widget kinds and the label a non-empty identifier.
    pub fn set_ui(
        &mut self,
        kind: UiKind,
        label: &str,
        values: Vec<(Value, String)>,
        options: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let kind = validate_ui_kind(kind)?;
        let label = validate_ui_label(label)?;

        self.ui.kind = kind;
        self.ui.label = label;
        self.set_ui_values(values);
        self.set_ui_options(options);
        Ok(())
    }

    pub fn set_ui_values(&mut self, values: Vec<(Value, String)>) {
        self.ui.values = values;
    }

    pub fn set_ui_options(&mut self, options: serde_json::Map<String, serde_json::Value>) {
        self.ui.options = options;
    }

    /// Validates and stores a new value, returning the previous one when the
    /// value actually changed.
    ///
    /// `LockedByConfig` does not block the write, only permission and
    /// hierarchy locks do.
    pub(crate) fn replace_value(&mut self, value: Option<Value>) -> Result<Option<Option<Value>>> {
        self.write_value(value, false)
    }

    /// Like [`Setting::replace_value`], but a hierarchy lock does not block
    /// the write. Only the hierarchy that placed the lock may use this.
    pub(crate) fn replace_value_within_hierarchy(
        &mut self,
        value: Option<Value>,
    ) -> Result<Option<Option<Value>>> {
        self.write_value(value, true)
    }

    fn write_value(
        &mut self,
        value: Option<Value>,
        within_hierarchy: bool,
    ) -> Result<Option<Option<Value>>> {
        let value = validate_value(self.kind, value)?;

        match self.status {
            Status::LockedByPermission => {
                return Err(SettingError::LockedByPermission(self.name.clone()));
            }
            Status::LockedByHierarchy if !within_hierarchy => {
                return Err(SettingError::LockedByHierarchy(self.name.clone()));
            }
            Status::NotLocked | Status::LockedByConfig | Status::LockedByHierarchy => {}
        }

        if value == self.value {
            return Ok(None);
        }

        Ok(Some(std::mem::replace(&mut self.value, value)))
    }

    pub(crate) fn replace_visibility(&mut self, visibility: Visibility) -> Option<Visibility> {
        if visibility == self.visibility {
            return None;
        }
        Some(std::mem::replace(&mut self.visibility, visibility))
    }

    pub(crate) fn replace_status(&mut self, status: Status) -> Option<Status> {
        if status == self.status {
            return None;
        }
        Some(std::mem::replace(&mut self.status, status))
    }
}

/// Cleans a value for `kind`, rejecting it when cleaning had to alter it.
/// Booleans are only ever coerced. `None` passes through untouched.
pub fn validate_value(kind: ValueKind, value: Option<Value>) -> Result<Option<Value>> {
    let Some(raw) = value else {
        return Ok(None);
    };

    let cleaned = clean(&raw, kind);

    match kind {
        ValueKind::Boolean => Ok(Some(cleaned)),
        _ if loose_eq(&cleaned, &raw) => Ok(Some(cleaned)),
        ValueKind::Integer => Err(SettingError::InvalidInteger(raw)),
        ValueKind::Filename => Err(SettingError::InvalidFilename(raw)),
        ValueKind::Path => Err(SettingError::InvalidPath(raw)),
    }
}

fn validate_ui_kind(kind: UiKind) -> Result<UiKind> {
    match kind {
        UiKind::None => Err(SettingError::InvalidUiType(kind.code())),
        _ => Ok(kind),
    }
}

fn validate_ui_label(label: &str) -> Result<String> {
    // "0" counts as empty for the upstream form layer.
    if label.is_empty() || label == "0" || clean_alphaext(label) != label {
        return Err(SettingError::InvalidUiLabel(label.to_string()));
    }
    Ok(label.to_string())
}
