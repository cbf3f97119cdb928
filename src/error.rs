use thiserror::Error;

use crate::core::Value;

/// Everything that can go wrong while building or mutating settings.
///
/// Every variant maps to a stable code (see [`SettingError::code`]) which the
/// surrounding backup system translates into a user facing message.
#[derive(Debug, Error)]
pub enum SettingError {
    #[error("Unknown value kind '{0}'")]
    InvalidKind(String),

    #[error("Value {0} is not a valid integer")]
    InvalidInteger(Value),

    #[error("Value {0} is not a valid filename")]
    InvalidFilename(Value),

    #[error("Value {0} is not a valid path")]
    InvalidPath(Value),

    #[error("Invalid visibility code {0}")]
    InvalidVisibility(i64),

    #[error("Invalid status code {0}")]
    InvalidStatus(i64),

    #[error("Invalid UI type code {0}")]
    InvalidUiType(i64),

    #[error("Invalid UI label '{0}'")]
    InvalidUiLabel(String),

    #[error("Setting '{0}' is locked by permission")]
    LockedByPermission(String),

    #[error("Setting '{0}' is locked by hierarchy")]
    LockedByHierarchy(String),

    #[error("Adding '{main}' as a dependency of '{already_dependent}' would create a cycle")]
    CircularReference {
        already_dependent: String,
        main: String,
    },

    #[error("Setting '{dependent}' is already a dependency of '{setting}'")]
    AlreadyAdded { setting: String, dependent: String },

    #[error("Setting '{0}' already exists")]
    DuplicateName(String),

    #[error("Setting '{0}' not found")]
    NotFound(String),

    #[error("Invalid setting declaration:\n{0}")]
    Declaration(#[from] serde_json::Error),

    #[error("Dependent '{dependent}':\n{error}")]
    Reaction {
        dependent: String,
        error: anyhow::Error,
    },
}

impl SettingError {
    /// Stable error code, independent of the message wording.
    pub fn code(&self) -> &'static str {
        match self {
            SettingError::InvalidKind(_) => "setting_invalid_type",
            SettingError::InvalidInteger(_) => "setting_invalid_integer",
            SettingError::InvalidFilename(_) => "setting_invalid_filename",
            SettingError::InvalidPath(_) => "setting_invalid_path",
            SettingError::InvalidVisibility(_) => "setting_invalid_visibility",
            SettingError::InvalidStatus(_) => "setting_invalid_status",
            SettingError::InvalidUiType(_) => "setting_invalid_ui_type",
            SettingError::InvalidUiLabel(_) => "setting_invalid_ui_label",
            SettingError::LockedByPermission(_) => "setting_locked_by_permission",
            SettingError::LockedByHierarchy(_) => "setting_locked_by_hierarchy",
            SettingError::CircularReference { .. } => "setting_circular_reference",
            SettingError::AlreadyAdded { .. } => "setting_already_added",
            SettingError::DuplicateName(_) => "setting_duplicate_name",
            SettingError::NotFound(_) => "setting_not_found",
            SettingError::Declaration(_) => "setting_invalid_declaration",
            SettingError::Reaction { .. } => "setting_reaction_failed",
        }
    }
}

pub type Result<T, E = SettingError> = std::result::Result<T, E>;
