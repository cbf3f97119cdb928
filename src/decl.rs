//! Declarative construction from the raw form used by backup plan builders.
//!
//! Codes are validated exactly like the typed API would, so a declaration
//! with an unknown kind fails with [`SettingError::InvalidKind`], an
//! unknown status with [`SettingError::InvalidStatus`] and so on.

use serde::Deserialize;

use crate::core::{Status, UiKind, Value, ValueKind, Visibility};
use crate::error::Result;
use crate::reaction::{Hierarchy, Inert};
use crate::setting::Setting;
use crate::tree::{SettingId, SettingsTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    #[default]
    Inert,
    Hierarchy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiDecl {
    pub kind: i64,
    pub label: String,
    #[serde(default)]
    pub values: Vec<(Value, String)>,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

/// A setting in raw form.
///
/// ```json
/// { "name": "users", "kind": "bool", "value": true, "status": 5,
///   "dependents": ["anonymize"] }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SettingDecl {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub visibility: Option<i64>,
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub ui: Option<UiDecl>,
    #[serde(default)]
    pub reaction: ReactionKind,
    /// Names of the settings observing this one.
    #[serde(default)]
    pub dependents: Vec<String>,
}

impl SettingsTree {
    /// Validates and registers a single declaration. Its `dependents` are
    /// not wired, see [`SettingsTree::from_json`].
    pub fn declare(&mut self, decl: &SettingDecl) -> Result<SettingId> {
        let kind = ValueKind::from_code(&decl.kind)?;
        let visibility = Visibility::from_code(decl.visibility)?;
        let status = Status::from_code(decl.status)?;

        let mut setting = Setting::new(decl.name.clone(), kind, decl.value.clone())?
            .with_visibility(visibility)
            .with_status(status);

        if let Some(ui) = &decl.ui {
            setting.set_ui(
                UiKind::from_code(ui.kind)?,
                &ui.label,
                ui.values.clone(),
                ui.options.clone(),
            )?;
        }

        match decl.reaction {
            ReactionKind::Inert => self.insert(setting, Inert),
            ReactionKind::Hierarchy => self.insert(setting, Hierarchy),
        }
    }

    /// Builds a whole tree from a JSON array of [`SettingDecl`]s. Every
    /// setting is registered first, then the dependency edges are added in
    /// declaration order.
    pub fn from_json(json: &str) -> Result<Self> {
        let decls: Vec<SettingDecl> = serde_json::from_str(json)?;
        let mut tree = SettingsTree::new();

        for decl in &decls {
            tree.declare(decl)?;
        }

        for decl in &decls {
            let id = tree.require(&decl.name)?;
            for name in &decl.dependents {
                let dependent = tree.require(name)?;
                tree.add_dependency(id, dependent)?;
            }
        }

        tracing::debug!(settings = tree.len(), "declared settings tree");

        Ok(tree)
    }
}
