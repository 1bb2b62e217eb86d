//! Record migration.
//!
//! Early project records stored a single flat `nodes`/`edges` pair. The
//! current schema keeps a bounded list of timestamped snapshots instead.
//! Migration operates on raw JSON so records written by any prior version
//! can be upgraded without a typed intermediate.

use serde_json::{Value, json};

/// Current record schema. Bumped when [`upgrade_record`] learns a new shape.
pub const SCHEMA_VERSION: u64 = 2;

/// Upgrade a raw project record in place. Returns whether anything changed.
/// Idempotent: running it on an already-current record is a no-op.
pub fn upgrade_record(record: &mut Value) -> bool {
    let Some(obj) = record.as_object_mut() else {
        return false;
    };
    let mut changed = false;

    // v1 records kept the graph flat on the project itself.
    if !obj.contains_key("snapshots") {
        let nodes = obj.remove("nodes").unwrap_or_else(|| json!([]));
        let edges = obj.remove("edges").unwrap_or_else(|| json!([]));
        let timestamp = obj
            .get("createdAt")
            .and_then(Value::as_u64)
            .unwrap_or_default();
        obj.insert(
            "snapshots".to_string(),
            json!([{
                "timestamp": timestamp,
                "nodes": nodes,
                "edges": edges,
                "suggestions": [],
            }]),
        );
        changed = true;
    }

    if !obj.contains_key("type") {
        obj.insert("type".to_string(), json!("Monolithic"));
        changed = true;
    }
    if !obj.contains_key("createdAt") {
        obj.insert("createdAt".to_string(), json!(0));
        changed = true;
    }

    // Snapshots written before suggestions were persisted lack the field.
    if let Some(snapshots) = obj.get_mut("snapshots").and_then(Value::as_array_mut) {
        if snapshots.is_empty() {
            snapshots.push(json!({
                "timestamp": 0,
                "nodes": [],
                "edges": [],
                "suggestions": [],
            }));
            changed = true;
        }
        for snapshot in snapshots.iter_mut() {
            if let Some(s) = snapshot.as_object_mut()
                && !s.contains_key("suggestions")
            {
                s.insert("suggestions".to_string(), json!([]));
                changed = true;
            }
        }
    }

    changed
}
