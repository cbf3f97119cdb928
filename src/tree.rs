use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use petgraph::Direction;
use petgraph::Graph;
use petgraph::graph::NodeIndex;
use petgraph::visit::{Dfs, EdgeRef};
use serde::Serialize;

use crate::core::{Status, UiKind, Value, ValueKind, Visibility};
use crate::error::{Result, SettingError};
use crate::reaction::{Change, Dependent, Inert, Previous, Reaction};
use crate::setting::Setting;

/// Stable handle to a setting registered in a [`SettingsTree`].
///
/// Handles are only meaningful for the tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SettingId(NodeIndex);

impl SettingId {
    pub fn index(self) -> usize {
        self.0.index()
    }
}

impl Serialize for SettingId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0.index() as u64)
    }
}

pub(crate) struct Node {
    pub setting: Setting,
    pub reaction: Arc<dyn Reaction>,
}

/// Owner of every setting and of the dependency edges between them.
///
/// An edge `a -> b` means `b` depends on `a`: every change of `a` is
/// delivered to the reaction of `b`. The edge weight is the registration
/// sequence number, which fixes the notification order.
///
/// # Example
///
/// ```rust
/// use backup_settings::{SettingsTree, Status, Value, ValueKind, reaction::Hierarchy};
///
/// let mut tree = SettingsTree::new();
/// let users = tree.setting("users", ValueKind::Boolean).value(true).add()?;
/// let anonymize = tree
///     .setting("anonymize", ValueKind::Boolean)
///     .value(true)
///     .reaction(Hierarchy)
///     .add()?;
/// tree.add_dependency(users, anonymize)?;
///
/// tree.set_value(users, Some(Value::Bool(false)))?;
/// assert_eq!(tree.get(anonymize).status(), Status::LockedByHierarchy);
/// # Ok::<(), backup_settings::SettingError>(())
/// ```
#[derive(Default)]
pub struct SettingsTree {
    pub(crate) graph: Graph<Node, usize>,
    names: HashMap<String, NodeIndex>,
    edges: usize,
}

impl SettingsTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the definition of a new setting.
    pub fn setting(&mut self, name: impl Into<String>, kind: ValueKind) -> SettingDef<'_> {
        SettingDef {
            tree: self,
            name: name.into(),
            kind,
            value: None,
            visibility: Visibility::default(),
            status: Status::default(),
            reaction: Arc::new(Inert),
        }
    }

    /// Registers an already constructed setting.
    pub fn insert(&mut self, setting: Setting, reaction: impl Reaction + 'static) -> Result<SettingId> {
        self.insert_node(setting, Arc::new(reaction))
    }

    fn insert_node(&mut self, setting: Setting, reaction: Arc<dyn Reaction>) -> Result<SettingId> {
        if self.names.contains_key(setting.name()) {
            return Err(SettingError::DuplicateName(setting.name().to_string()));
        }

        let name = setting.name().to_string();
        let index = self.graph.add_node(Node { setting, reaction });
        self.names.insert(name, index);

        Ok(SettingId(index))
    }

    pub fn get(&self, id: SettingId) -> &Setting {
        &self.graph[id.0].setting
    }

    pub fn find(&self, name: &str) -> Option<SettingId> {
        self.names.get(name).copied().map(SettingId)
    }

    pub(crate) fn require(&self, name: &str) -> Result<SettingId> {
        self.find(name)
            .ok_or_else(|| SettingError::NotFound(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SettingId, &Setting)> {
        self.graph
            .node_indices()
            .map(|index| (SettingId(index), &self.graph[index].setting))
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn set_value(&mut self, id: SettingId, value: Option<Value>) -> Result<()> {
        self.write_value(id, value, false)
    }

    /// Value write issued by a hierarchy reaction, which may pass the
    /// hierarchy lock it placed itself.
    pub(crate) fn set_value_within_hierarchy(
        &mut self,
        id: SettingId,
        value: Option<Value>,
    ) -> Result<()> {
        self.write_value(id, value, true)
    }

    fn write_value(&mut self, id: SettingId, value: Option<Value>, within_hierarchy: bool) -> Result<()> {
        let setting = &mut self.graph[id.0].setting;
        let replaced = if within_hierarchy {
            setting.replace_value_within_hierarchy(value)?
        } else {
            setting.replace_value(value)?
        };
        let Some(previous) = replaced else {
            return Ok(());
        };

        tracing::debug!(
            setting = setting.name(),
            ?previous,
            current = ?setting.value(),
            "value changed"
        );

        self.inform_dependencies(id, Previous::Value(previous))
    }

    /// Visibility changes are never blocked by the lock status.
    pub fn set_visibility(&mut self, id: SettingId, visibility: Visibility) -> Result<()> {
        let setting = &mut self.graph[id.0].setting;
        let Some(previous) = setting.replace_visibility(visibility) else {
            return Ok(());
        };

        tracing::debug!(setting = setting.name(), ?previous, current = ?visibility, "visibility changed");

        self.inform_dependencies(id, Previous::Visibility(previous))
    }

    pub fn set_status(&mut self, id: SettingId, status: Status) -> Result<()> {
        let setting = &mut self.graph[id.0].setting;
        let Some(previous) = setting.replace_status(status) else {
            return Ok(());
        };

        tracing::debug!(setting = setting.name(), ?previous, current = ?status, "status changed");

        self.inform_dependencies(id, Previous::Status(previous))
    }

    pub fn set_ui(
        &mut self,
        id: SettingId,
        kind: UiKind,
        label: &str,
        values: Vec<(Value, String)>,
        options: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        self.graph[id.0].setting.set_ui(kind, label, values, options)
    }

    pub fn set_ui_values(&mut self, id: SettingId, values: Vec<(Value, String)>) {
        self.graph[id.0].setting.set_ui_values(values);
    }

    pub fn set_ui_options(
        &mut self,
        id: SettingId,
        options: serde_json::Map<String, serde_json::Value>,
    ) {
        self.graph[id.0].setting.set_ui_options(options);
    }

    /// Makes `dependent` observe `id`.
    ///
    /// Fails if `id` is already reachable from `dependent` (or is the same
    /// setting), and if the edge already exists.
    pub fn add_dependency(&mut self, id: SettingId, dependent: SettingId) -> Result<()> {
        let name = self.get(id).name();
        let candidate = self.get(dependent).name();

        if id == dependent || self.all_dependents(dependent).contains(name) {
            return Err(SettingError::CircularReference {
                already_dependent: name.to_string(),
                main: candidate.to_string(),
            });
        }

        if self.graph.find_edge(id.0, dependent.0).is_some() {
            return Err(SettingError::AlreadyAdded {
                setting: name.to_string(),
                dependent: candidate.to_string(),
            });
        }

        tracing::debug!(setting = name, dependent = candidate, "dependency added");

        self.graph.add_edge(id.0, dependent.0, self.edges);
        self.edges += 1;
        Ok(())
    }

    /// Direct dependents of `id`, in registration order.
    pub fn dependents(&self, id: SettingId) -> Vec<SettingId> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(id.0, Direction::Outgoing)
            .map(|edge| (*edge.weight(), SettingId(edge.target())))
            .collect();

        edges.sort_unstable_by_key(|(sequence, _)| *sequence);
        edges.into_iter().map(|(_, id)| id).collect()
    }

    /// Names of every setting reachable from `id`, excluding `id` itself.
    pub fn all_dependents(&self, id: SettingId) -> BTreeSet<&str> {
        let mut dfs = Dfs::new(&self.graph, id.0);
        let mut names = BTreeSet::new();

        while let Some(index) = dfs.next(&self.graph) {
            if index != id.0 {
                names.insert(self.graph[index].setting.name());
            }
        }

        names
    }

    /// Delivers `previous` to every direct dependent of `source`. The first
    /// reaction error stops the fan-out; the change of `source` stays.
    fn inform_dependencies(&mut self, source: SettingId, previous: Previous) -> Result<()> {
        let change = Change { source, previous };

        for id in self.dependents(source) {
            let reaction = self.graph[id.0].reaction.clone();

            tracing::trace!(
                source = self.get(source).name(),
                dependent = self.get(id).name(),
                kind = ?change.kind(),
                "notifying dependent"
            );

            let mut dependent = Dependent { tree: self, id };
            if let Err(error) = reaction.process_change(&mut dependent, &change) {
                let name = self.get(id).name().to_string();
                tracing::warn!(dependent = %name, "reaction failed: {error:#}");
                return Err(SettingError::Reaction {
                    dependent: name,
                    error,
                });
            }
        }

        Ok(())
    }

    /// Current state of every setting, for whoever consumes the final plan.
    pub fn snapshot(&self) -> Vec<SettingSnapshot> {
        self.iter()
            .map(|(id, setting)| SettingSnapshot {
                id,
                name: setting.name().to_string(),
                kind: setting.kind(),
                value: setting.value().cloned(),
                visibility: setting.visibility(),
                status: setting.status(),
                label: setting.ui().label.clone(),
                dependents: self
                    .dependents(id)
                    .into_iter()
                    .map(|dependent| self.get(dependent).name().to_string())
                    .collect(),
            })
            .collect()
    }
}

impl std::fmt::Display for SettingsTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "graph LR")?;

        for (id, setting) in self.iter() {
            let name = setting.name().replace('"', "\\\"");
            writeln!(f, "    {}[\"{}\"]", id.index(), name)?;
        }

        for (id, _) in self.iter() {
            for dependent in self.dependents(id) {
                writeln!(f, "    {} --> {}", id.index(), dependent.index())?;
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for SettingsTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(_, setting)| setting))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettingSnapshot {
    pub id: SettingId,
    pub name: String,
    pub kind: ValueKind,
    pub value: Option<Value>,
    pub visibility: Visibility,
    pub status: Status,
    pub label: String,
    pub dependents: Vec<String>,
}

/// Builder returned by [`SettingsTree::setting`].
pub struct SettingDef<'a> {
    tree: &'a mut SettingsTree,
    name: String,
    kind: ValueKind,
    value: Option<Value>,
    visibility: Visibility,
    status: Status,
    reaction: Arc<dyn Reaction>,
}

impl SettingDef<'_> {
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn hidden(self) -> Self {
        self.visibility(Visibility::Hidden)
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn reaction(mut self, reaction: impl Reaction + 'static) -> Self {
        self.reaction = Arc::new(reaction);
        self
    }

    /// Same as [`SettingDef::reaction`], but lets closures infer their
    /// argument types.
    pub fn on_change<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Dependent<'_>, &Change) -> anyhow::Result<()> + 'static,
    {
        self.reaction(callback)
    }

    /// Validates the definition and registers the setting.
    pub fn add(self) -> Result<SettingId> {
        let setting = Setting::new(self.name, self.kind, self.value)?
            .with_visibility(self.visibility)
            .with_status(self.status);

        self.tree.insert_node(setting, self.reaction)
    }
}
