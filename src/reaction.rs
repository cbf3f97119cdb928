//! The observer side of the settings graph.
//!
//! Every setting carries a [`Reaction`], invoked whenever one of the settings
//! it depends on changes value, visibility or status. A reaction only sees
//! the setting it belongs to mutably, through [`Dependent`]. Any change it
//! makes there is in turn propagated to its own dependents.

use crate::core::{ChangeKind, Status, Value, ValueKind, Visibility};
use crate::error::Result;
use crate::setting::Setting;
use crate::tree::{SettingId, SettingsTree};

/// State of the source setting before the change.
#[derive(Debug, Clone, PartialEq)]
pub enum Previous {
    Value(Option<Value>),
    Visibility(Visibility),
    Status(Status),
}

/// A single notification delivered to a dependent.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub source: SettingId,
    pub previous: Previous,
}

impl Change {
    pub fn kind(&self) -> ChangeKind {
        match self.previous {
            Previous::Value(_) => ChangeKind::ChangedValue,
            Previous::Visibility(_) => ChangeKind::ChangedVisibility,
            Previous::Status(_) => ChangeKind::ChangedStatus,
        }
    }
}

/// Reaction of a dependent setting to a change in one of its sources.
///
/// Changes the reaction does not care about must be ignored, not rejected.
/// Returning an error stops the propagation and surfaces from the mutator
/// that started it.
pub trait Reaction {
    fn process_change(&self, dependent: &mut Dependent<'_>, change: &Change) -> anyhow::Result<()>;
}

impl<F> Reaction for F
where
    F: Fn(&mut Dependent<'_>, &Change) -> anyhow::Result<()>,
{
    fn process_change(&self, dependent: &mut Dependent<'_>, change: &Change) -> anyhow::Result<()> {
        self(dependent, change)
    }
}

/// The receiving end of a notification.
pub struct Dependent<'a> {
    pub(crate) tree: &'a mut SettingsTree,
    pub(crate) id: SettingId,
}

impl Dependent<'_> {
    pub fn id(&self) -> SettingId {
        self.id
    }

    /// The setting being notified.
    pub fn setting(&self) -> &Setting {
        self.tree.get(self.id)
    }

    /// The setting that changed.
    pub fn source(&self, change: &Change) -> &Setting {
        self.tree.get(change.source)
    }

    pub fn tree(&self) -> &SettingsTree {
        &*self.tree
    }

    pub fn set_value(&mut self, value: Option<Value>) -> Result<()> {
        self.tree.set_value(self.id, value)
    }

    pub(crate) fn set_value_within_hierarchy(&mut self, value: Option<Value>) -> Result<()> {
        self.tree.set_value_within_hierarchy(self.id, value)
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> Result<()> {
        self.tree.set_visibility(self.id, visibility)
    }

    pub fn set_status(&mut self, status: Status) -> Result<()> {
        self.tree.set_status(self.id, status)
    }
}

/// Ignores every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inert;

impl Reaction for Inert {
    fn process_change(&self, _: &mut Dependent<'_>, _: &Change) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Parent/child behaviour of backup settings.
///
/// * a locked parent locks the child by hierarchy, unlocking releases it
/// * a hidden parent hides the child
/// * a boolean parent switched off switches a boolean child off and locks it,
///   switching it back on releases the lock
///
/// A child locked by permission is never touched. A child locked by config
/// keeps its lock, though its value still follows a parent switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hierarchy;

impl Reaction for Hierarchy {
    fn process_change(&self, dependent: &mut Dependent<'_>, change: &Change) -> anyhow::Result<()> {
        let (status, visibility, disabled) = {
            let source = dependent.source(change);
            let disabled = source.kind() == ValueKind::Boolean
                && source.value() == Some(&Value::Bool(false));
            (source.status(), source.visibility(), disabled)
        };
        let (own_kind, own_status) = {
            let own = dependent.setting();
            (own.kind(), own.status())
        };

        if own_status == Status::LockedByPermission {
            return Ok(());
        }
        let keeps_lock = own_status == Status::LockedByConfig;

        match change.kind() {
            ChangeKind::ChangedStatus if !keeps_lock => {
                if status.is_locked() {
                    dependent.set_status(Status::LockedByHierarchy)?;
                } else if own_status == Status::LockedByHierarchy && !disabled {
                    dependent.set_status(Status::NotLocked)?;
                }
            }
            ChangeKind::ChangedStatus => {}
            ChangeKind::ChangedVisibility => {
                if visibility == Visibility::Hidden {
                    dependent.set_visibility(Visibility::Hidden)?;
                }
            }
            ChangeKind::ChangedValue => {
                if disabled {
                    // The child may already carry a hierarchy lock from an
                    // earlier parent lock; that lock must not stop this write.
                    if own_kind == ValueKind::Boolean {
                        dependent.set_value_within_hierarchy(Some(Value::Bool(false)))?;
                    }
                    if !keeps_lock {
                        dependent.set_status(Status::LockedByHierarchy)?;
                    }
                } else if own_status == Status::LockedByHierarchy && !status.is_locked() {
                    dependent.set_status(Status::NotLocked)?;
                }
            }
        }

        Ok(())
    }
}
