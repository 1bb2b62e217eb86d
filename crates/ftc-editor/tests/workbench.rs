//! End-to-end workbench scenarios over a real store.

use ftc_core::id::Uid;
use ftc_core::model::{ConnectionKind, MarkerKind, Position};
use ftc_core::project::{
    ActionKind, ProjectKind, SNAPSHOT_RETENTION, Suggestion, SuggestionAction, SuggestionKind,
};
use ftc_editor::canvas::{Connection, EdgePatch};
use ftc_editor::workbench::Workbench;
use ftc_store::ProjectStore;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn workbench() -> (Workbench, TempDir) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new().unwrap();
    let store = Arc::new(ProjectStore::open(dir.path().join("projects.redb")).unwrap());
    let wb = Workbench::with_store_and_window(store, Duration::from_millis(20)).unwrap();
    (wb, dir)
}

fn connection(source: &Uid, target: &Uid) -> Connection {
    Connection {
        source: Some(source.clone()),
        target: Some(target.clone()),
        source_handle: Some("right-source".into()),
        target_handle: Some("left-target".into()),
    }
}

#[test]
fn design_a_backend_with_a_database() {
    let (mut wb, _dir) = workbench();
    wb.create_project("P", ProjectKind::Microservices).unwrap();

    let backend = wb
        .add_node_from_catalog("backend-express", Position::new(100.0, 100.0))
        .unwrap();
    let postgres = wb
        .add_node_from_catalog("db-postgres", Position::new(400.0, 100.0))
        .unwrap();

    let dropped = &wb.canvas.nodes[0];
    assert_eq!(
        dropped.data.requirements.as_deref(),
        Some("A standard Express API.")
    );
    assert_eq!(dropped.style.width, Some(256.0));
    assert_eq!(dropped.style.height, Some(160.0));

    let edge_id = wb.connect(connection(&backend, &postgres)).unwrap();
    assert_eq!(wb.canvas.edges[0].label, ConnectionKind::Rest);
    assert!(!wb.canvas.edges[0].data.is_animated);

    wb.update_edge_data(
        &edge_id,
        &EdgePatch {
            label: Some(ConnectionKind::Db),
            ..EdgePatch::default()
        },
    );
    assert_eq!(wb.canvas.edges[0].marker_end, MarkerKind::Arrow);
}

#[test]
fn snapshot_history_stays_bounded_across_bursts() {
    let (mut wb, _dir) = workbench();
    let id = wb.create_project("P", ProjectKind::Monolithic).unwrap();

    for i in 0..10 {
        wb.add_node_from_catalog("backend-express", Position::new(i as f32, 0.0))
            .unwrap();
        wb.flush_autosave();
    }

    let stored = wb
        .open_project(&id)
        .map(|_| wb.active_project.clone().unwrap())
        .unwrap();
    assert_eq!(stored.snapshots.len(), SNAPSHOT_RETENTION);
    // The last snapshot is the most recently committed state.
    assert_eq!(stored.latest_snapshot().nodes.len(), 10);
}

#[test]
fn reopening_a_project_hydrates_the_last_snapshot() {
    let (mut wb, _dir) = workbench();
    let id = wb.create_project("P", ProjectKind::Monolithic).unwrap();
    wb.add_node_from_catalog("frontend-react", Position::new(10.0, 10.0))
        .unwrap();
    wb.flush_autosave();

    // Simulate a fresh session over the same store.
    assert!(wb.open_project(&id).unwrap());
    assert_eq!(wb.canvas.nodes.len(), 1);
    assert_eq!(wb.canvas.nodes[0].data.name, "React");
    assert!(wb.canvas.current_flow_id.is_none());
    assert!(wb.canvas.selected_node.is_none());
}

#[test]
fn subflow_edits_survive_the_autosave_roundtrip() {
    let (mut wb, _dir) = workbench();
    let id = wb.create_project("P", ProjectKind::Microservices).unwrap();
    let host = wb
        .add_node_from_catalog("backend-nestjs", Position::default())
        .unwrap();

    assert!(wb.enter_subflow(&host));
    wb.add_node_from_catalog("db-redis", Position::new(50.0, 50.0))
        .unwrap();
    wb.exit_subflow();
    wb.flush_autosave();

    assert!(wb.open_project(&id).unwrap());
    let sub = wb.canvas.nodes[0].data.subflow.as_ref().unwrap();
    assert_eq!(sub.nodes.len(), 1);
    assert_eq!(sub.nodes[0].data.name, "Redis");
}

#[test]
fn file_roundtrip_preserves_graph_content() {
    let (mut wb, dir) = workbench();
    wb.create_project("Shop", ProjectKind::Monolithic).unwrap();
    let a = wb
        .add_node_from_catalog("backend-express", Position::new(0.0, 0.0))
        .unwrap();
    let b = wb
        .add_node_from_catalog("db-postgres", Position::new(300.0, 0.0))
        .unwrap();
    wb.connect(connection(&a, &b)).unwrap();
    let exported_nodes = wb.canvas.nodes.clone();
    let exported_edges = wb.canvas.edges.clone();

    let path = dir.path().join("shop.ftc");
    wb.save_to_file(&path).unwrap();
    let imported_id = wb.load_from_file(&path).unwrap();

    assert_ne!(&imported_id, &wb.projects[1].id);
    assert_eq!(wb.canvas.nodes, exported_nodes);
    assert_eq!(wb.canvas.edges, exported_edges);
}

#[test]
fn suggestion_application_is_gated_by_the_applied_flag() {
    let (mut wb, _dir) = workbench();
    wb.create_project("P", ProjectKind::Monolithic).unwrap();

    let suggestion = Suggestion {
        id: Uid::from("s1"),
        kind: SuggestionKind::Node,
        title: "Add a cache".into(),
        description: "Reads are hot".into(),
        actions: vec![SuggestionAction {
            label: "Add Redis".into(),
            action: ActionKind::Add,
            payload: json!({ "type": "db-redis", "name": "Session Cache" }),
        }],
        applied: false,
    };
    wb.set_suggestions(vec![suggestion]);

    assert!(wb.apply_suggestion_action(&Uid::from("s1"), 0));
    assert_eq!(wb.canvas.nodes.len(), 1);
    assert_eq!(wb.canvas.nodes[0].data.name, "Session Cache");

    // Second application is rejected; the graph delta happens once.
    assert!(!wb.apply_suggestion_action(&Uid::from("s1"), 0));
    assert_eq!(wb.canvas.nodes.len(), 1);
}

#[test]
fn suggestion_actions_cover_remove_update_and_architecture() {
    let (mut wb, _dir) = workbench();
    wb.create_project("P", ProjectKind::Monolithic).unwrap();
    let a = wb
        .add_node_from_catalog("backend-express", Position::default())
        .unwrap();
    let b = wb
        .add_node_from_catalog("db-postgres", Position::new(300.0, 0.0))
        .unwrap();
    wb.connect(connection(&a, &b)).unwrap();

    let suggestions = vec![
        Suggestion {
            id: Uid::from("rm"),
            kind: SuggestionKind::Node,
            title: "Drop the database".into(),
            description: String::new(),
            actions: vec![SuggestionAction {
                label: "Remove".into(),
                action: ActionKind::Remove,
                payload: json!({ "nodeId": b.as_str() }),
            }],
            applied: false,
        },
        Suggestion {
            id: Uid::from("up"),
            kind: SuggestionKind::Node,
            title: "Rename the API".into(),
            description: String::new(),
            actions: vec![SuggestionAction {
                label: "Rename".into(),
                action: ActionKind::Update,
                payload: json!({ "nodeId": a.as_str(), "data": { "name": "Gateway API" } }),
            }],
            applied: false,
        },
        Suggestion {
            id: Uid::from("arch"),
            kind: SuggestionKind::Architectural,
            title: "Split it".into(),
            description: String::new(),
            actions: vec![SuggestionAction {
                label: "Microservices".into(),
                action: ActionKind::Update,
                payload: json!({ "architecture": "Microservices" }),
            }],
            applied: false,
        },
        Suggestion {
            id: Uid::from("junk"),
            kind: SuggestionKind::Edge,
            title: "Bad verb".into(),
            description: String::new(),
            actions: vec![SuggestionAction {
                label: "???".into(),
                action: ActionKind::Unknown,
                payload: json!({}),
            }],
            applied: false,
        },
    ];
    wb.set_suggestions(suggestions);

    assert!(wb.apply_suggestion_action(&Uid::from("rm"), 0));
    // Cascade removed the edge with its node.
    assert_eq!(wb.canvas.nodes.len(), 1);
    assert!(wb.canvas.edges.is_empty());

    assert!(wb.apply_suggestion_action(&Uid::from("up"), 0));
    assert_eq!(wb.canvas.nodes[0].data.name, "Gateway API");

    assert!(wb.apply_suggestion_action(&Uid::from("arch"), 0));
    assert_eq!(
        wb.active_project.as_ref().unwrap().kind,
        ProjectKind::Microservices
    );

    // Unknown verbs are logged and skipped, never marked applied.
    assert!(!wb.apply_suggestion_action(&Uid::from("junk"), 0));
    assert!(
        !wb.suggestions
            .find(&Uid::from("junk"))
            .unwrap()
            .applied
    );
}

#[test]
fn generated_files_persist_on_the_project_record() {
    let (mut wb, _dir) = workbench();
    let id = wb.create_project("P", ProjectKind::Monolithic).unwrap();

    let files = std::collections::BTreeMap::from([
        ("src/main.rs".to_string(), "fn main() {}".to_string()),
        ("Cargo.toml".to_string(), "[package]".to_string()),
    ]);
    wb.set_generated_files(files.clone()).unwrap();
    assert!(wb.editor.open);

    assert!(wb.open_project(&id).unwrap());
    assert_eq!(wb.editor.generated_files.as_ref(), Some(&files));
}

#[test]
fn project_management_keeps_list_store_and_active_in_sync() {
    let (mut wb, _dir) = workbench();
    let first = wb.create_project("First", ProjectKind::Monolithic).unwrap();
    let second = wb
        .create_project("Second", ProjectKind::Microservices)
        .unwrap();
    assert_eq!(wb.projects.len(), 2);
    assert_eq!(wb.active_project.as_ref().unwrap().id, second);

    wb.rename_project(&second, "Renamed").unwrap();
    assert_eq!(wb.active_project.as_ref().unwrap().name, "Renamed");
    assert!(wb.projects.iter().any(|p| p.name == "Renamed"));

    assert!(wb.delete_project(&second).unwrap());
    assert!(wb.active_project.is_none());
    assert!(wb.canvas.nodes.is_empty());
    assert_eq!(wb.projects.len(), 1);

    assert!(wb.open_project(&first).unwrap());
    assert_eq!(wb.active_project.as_ref().unwrap().name, "First");
}

#[test]
fn ai_payload_reflects_the_working_graph() {
    let (mut wb, _dir) = workbench();
    wb.create_project("Shop", ProjectKind::Microservices).unwrap();
    wb.add_node_from_catalog("backend-express", Position::default())
        .unwrap();
    wb.add_node_from_catalog("text-note", Position::new(10.0, 10.0))
        .unwrap();

    let payload = wb.ai_payload().unwrap();
    assert_eq!(payload.name, "Shop");
    // The annotation never crosses the AI boundary.
    assert_eq!(payload.nodes.len(), 1);
    assert_eq!(payload.nodes[0].node_type, "backend-express");
}
