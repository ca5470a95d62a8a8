use pretty_assertions::assert_eq;
use tabfeed_model::{Bundle, SuggestedBundle, TabItem};
use tabfeed_store::{JsonFileGateway, PersistedState, SnapshotGateway, STATE_SCHEMA_VERSION};
use tempfile::TempDir;

fn sample_state() -> PersistedState {
    let item = TabItem::new(1, 1, 0, "https://a.example/", 1_000);
    let bundle = Bundle {
        id: "b-1".to_string(),
        title: "Japan trip".to_string(),
        tab_ids: vec![1],
        created_at: 1_000,
        summary: Some("- planning notes".to_string()),
        tips: Vec::new(),
        chat: Vec::new(),
        items: None,
        archived: false,
    };
    let suggestion = SuggestedBundle {
        title: "Rust reading".to_string(),
        tab_ids: vec![1, 2, 3],
    };
    PersistedState::new(vec![item], vec![bundle], vec![suggestion])
}

#[tokio::test]
async fn persist_then_hydrate_round_trips() {
    let temp = TempDir::new().expect("tempdir");
    let gateway = JsonFileGateway::new(temp.path().join("state.json"));

    let state = sample_state();
    gateway.persist(&state).await.expect("persist");

    let loaded = gateway.hydrate().await.expect("hydrate").expect("present");
    assert_eq!(loaded, state);
    assert_eq!(loaded.schema_version, STATE_SCHEMA_VERSION);
}

#[tokio::test]
async fn missing_file_hydrates_as_none() {
    let temp = TempDir::new().expect("tempdir");
    let gateway = JsonFileGateway::new(temp.path().join("missing.json"));
    assert_eq!(gateway.hydrate().await.expect("hydrate"), None);
}

#[tokio::test]
async fn corrupt_file_hydrates_as_none() {
    let temp = TempDir::new().expect("tempdir");
    let path = temp.path().join("state.json");
    tokio::fs::write(&path, b"{ this is not json")
        .await
        .expect("write corrupt");

    let gateway = JsonFileGateway::new(&path);
    assert_eq!(gateway.hydrate().await.expect("hydrate"), None);
}

#[tokio::test]
async fn persist_overwrites_fully() {
    let temp = TempDir::new().expect("tempdir");
    let gateway = JsonFileGateway::new(temp.path().join("state.json"));

    gateway.persist(&sample_state()).await.expect("first");
    let empty = PersistedState::default();
    gateway.persist(&empty).await.expect("second");

    let loaded = gateway.hydrate().await.expect("hydrate").expect("present");
    assert!(loaded.items.is_empty());
    assert!(loaded.bundles.is_empty());
}
