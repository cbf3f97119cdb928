#![forbid(unsafe_code)]
//! Validated backup settings wired together in a dependency graph.
//!
//! A [`Setting`] is one named value with a fixed [`ValueKind`], a
//! [`Visibility`], a lock [`Status`] and UI metadata. Settings live in a
//! [`SettingsTree`], which also stores who observes whom. Whenever a value,
//! visibility or status actually changes, every direct dependent receives
//! the change through its [`Reaction`]. Reactions may update their own
//! setting, which propagates further; the tree refuses edges that would
//! close a cycle, so propagation always terminates.
//!
//! ```rust
//! use backup_settings::{SettingsTree, Value, ValueKind, Visibility};
//!
//! let mut tree = SettingsTree::new();
//! let users = tree.setting("users", ValueKind::Boolean).value(true).add()?;
//! let comments = tree
//!     .setting("comments", ValueKind::Boolean)
//!     .value(true)
//!     .on_change(|dependent, change| {
//!         if dependent.source(change).value() == Some(&Value::Bool(false)) {
//!             dependent.set_visibility(Visibility::Hidden)?;
//!         }
//!         Ok(())
//!     })
//!     .add()?;
//! tree.add_dependency(users, comments)?;
//!
//! tree.set_value(users, Some(false.into()))?;
//! assert_eq!(tree.get(comments).visibility(), Visibility::Hidden);
//! # Ok::<(), backup_settings::SettingError>(())
//! ```

pub mod clean;
mod core;
mod decl;
mod error;
pub mod reaction;
mod setting;
mod tree;
mod utils;

pub use crate::core::{ChangeKind, Status, UiKind, Value, ValueKind, Visibility};
pub use crate::decl::{ReactionKind, SettingDecl, UiDecl};
pub use crate::error::{Result, SettingError};
pub use crate::reaction::{Change, Dependent, Previous, Reaction};
pub use crate::setting::{Setting, UiMeta, validate_value};
pub use crate::tree::{SettingDef, SettingId, SettingSnapshot, SettingsTree};
#[cfg(feature = "logging")]
pub use crate::utils::init_logging;
