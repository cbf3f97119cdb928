use std::cell::Cell;
use std::rc::Rc;

use backup_settings::{
    ChangeKind, SettingError, SettingsTree, Status, Value, ValueKind, Visibility,
};

/// c -> b -> a: `b` mirrors `c` and `a` counts how often it hears from `b`.
#[test]
fn chained_reactions_propagate_once_per_change() {
    let heard = Rc::new(Cell::new(0));
    let mut tree = SettingsTree::new();

    let c = tree.setting("c", ValueKind::Integer).value(0).add().unwrap();
    let b = tree
        .setting("b", ValueKind::Integer)
        .value(0)
        .on_change(|dependent, change| {
            if change.kind() == ChangeKind::ChangedValue {
                let value = dependent.source(change).value().cloned();
                dependent.set_value(value)?;
            }
            Ok(())
        })
        .add()
        .unwrap();
    let a = {
        let heard = heard.clone();
        tree.setting("a", ValueKind::Integer)
            .on_change(move |_, _| {
                heard.set(heard.get() + 1);
                Ok(())
            })
            .add()
            .unwrap()
    };

    tree.add_dependency(c, b).unwrap();
    tree.add_dependency(b, a).unwrap();

    tree.set_value(c, Some(Value::Int(7))).unwrap();
    assert_eq!(tree.get(b).value(), Some(&Value::Int(7)));
    assert_eq!(heard.get(), 1);

    tree.set_value(c, Some(Value::Int(7))).unwrap();
    assert_eq!(heard.get(), 1);

    tree.set_value(c, Some(Value::Int(8))).unwrap();
    assert_eq!(heard.get(), 2);

    // Closing the loop is refused, so the chain above can never recurse.
    assert!(matches!(
        tree.add_dependency(a, c),
        Err(SettingError::CircularReference { .. })
    ));
}

#[test]
fn failed_mutations_change_nothing() {
    let notified = Rc::new(Cell::new(false));
    let mut tree = SettingsTree::new();

    let count = tree.setting("count", ValueKind::Integer).value(3).add().unwrap();
    let file = tree
        .setting("filename", ValueKind::Filename)
        .value("backup.mbz")
        .add()
        .unwrap();
    let watcher = {
        let notified = notified.clone();
        tree.setting("watcher", ValueKind::Boolean)
            .on_change(move |_, _| {
                notified.set(true);
                Ok(())
            })
            .add()
            .unwrap()
    };
    tree.add_dependency(count, watcher).unwrap();
    tree.add_dependency(file, watcher).unwrap();

    assert!(tree.set_value(count, Some("5abc".into())).is_err());
    assert!(tree.set_value(file, Some("../backup.mbz".into())).is_err());
    assert!(tree.add_dependency(count, watcher).is_err());

    assert_eq!(tree.get(count).value(), Some(&Value::Int(3)));
    assert_eq!(tree.get(file).value(), Some(&Value::from("backup.mbz")));
    assert_eq!(tree.dependents(count), vec![watcher]);
    assert!(!notified.get());
}

#[test]
fn hierarchy_lock_blocks_values_but_not_visibility() {
    let mut tree = SettingsTree::new();
    let id = tree
        .setting("activities", ValueKind::Boolean)
        .value(true)
        .status(Status::LockedByHierarchy)
        .add()
        .unwrap();

    for value in [true, false] {
        let err = tree.set_value(id, Some(value.into())).unwrap_err();
        assert_eq!(err.code(), "setting_locked_by_hierarchy");
    }
    assert_eq!(tree.get(id).value(), Some(&Value::Bool(true)));

    tree.set_visibility(id, Visibility::Hidden).unwrap();
    assert_eq!(tree.get(id).visibility(), Visibility::Hidden);
}

/// `LockedByConfig` is a lock in name only as far as value writes go: it is
/// enforced by the form layer upstream, not here.
#[test]
fn config_lock_does_not_block_value_writes() {
    let mut tree = SettingsTree::new();
    let id = tree
        .setting("users", ValueKind::Boolean)
        .value(true)
        .status(Status::LockedByConfig)
        .add()
        .unwrap();

    tree.set_value(id, Some(false.into())).unwrap();
    assert_eq!(tree.get(id).value(), Some(&Value::Bool(false)));
}

#[test]
fn declared_hierarchy_cascades() {
    let mut tree = SettingsTree::from_json(
        r#"[
            { "name": "users", "kind": "bool", "value": 1,
              "dependents": ["role_assignments", "comments"] },
            { "name": "role_assignments", "kind": "bool", "value": 1, "reaction": "hierarchy",
              "dependents": ["anonymize"] },
            { "name": "comments", "kind": "bool", "value": 1, "reaction": "hierarchy" },
            { "name": "anonymize", "kind": "bool", "value": 0, "reaction": "hierarchy" }
        ]"#,
    )
    .unwrap();

    let users = tree.find("users").unwrap();
    tree.set_value(users, Some(false.into())).unwrap();

    for name in ["role_assignments", "comments", "anonymize"] {
        let setting = tree.get(tree.find(name).unwrap());
        assert_eq!(setting.value(), Some(&Value::Bool(false)), "{name}");
        assert_eq!(setting.status(), Status::LockedByHierarchy, "{name}");
    }
}
