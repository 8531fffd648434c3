use dashboard_core::db::open_db_in_memory;
use dashboard_core::repo::content_repo::{dashboard_key, widget_key};
use dashboard_core::{
    ContentRepository, DashboardBuilder, DatasetBuilder, ImportLedger, Item, ItemRepository,
    RepoError, SqliteImportLedger, SqliteItemRepository, TopicAreaBuilder, WidgetBuilder,
    WidgetType,
};
use serde_json::json;

fn item(pk: &str, sk: &str, item_type: &str) -> Item {
    Item {
        pk: pk.to_string(),
        sk: sk.to_string(),
        item_type: item_type.to_string(),
        data: json!({ "pk": pk, "sk": sk }),
    }
}

#[test]
fn put_item_upserts_on_same_key() {
    let conn = open_db_in_memory().unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    items.put_item(&item("A", "A", "Thing")).unwrap();
    let mut replaced = item("A", "A", "Thing");
    replaced.data = json!({ "version": 2 });
    items.put_item(&replaced).unwrap();

    let loaded = items.get_item("A", "A").unwrap().unwrap();
    assert_eq!(loaded.data, json!({ "version": 2 }));
    assert_eq!(items.list_by_type("Thing").unwrap().len(), 1);
}

#[test]
fn query_filters_by_sort_key_prefix() {
    let conn = open_db_in_memory().unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    items.put_item(&item("P", "P", "Parent")).unwrap();
    items.put_item(&item("P", "Child#2", "Child")).unwrap();
    items.put_item(&item("P", "Child#1", "Child")).unwrap();
    items.put_item(&item("Q", "Child#3", "Child")).unwrap();

    let children = items.query("P", Some("Child#")).unwrap();
    let sort_keys: Vec<&str> = children.iter().map(|item| item.sk.as_str()).collect();
    assert_eq!(sort_keys, vec!["Child#1", "Child#2"]);

    assert_eq!(items.query("P", None).unwrap().len(), 3);
}

#[test]
fn delete_missing_item_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let err = items.delete_item("nope", "nope").unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn corrupted_item_data_surfaces_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO items (pk, sk, item_type, data) VALUES ('X', 'X', 'Dashboard', 'not json');",
        [],
    )
    .unwrap();
    let items = SqliteItemRepository::try_new(&conn).unwrap();

    let err = items.get_item("X", "X").unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn widgets_live_under_their_dashboard_partition() {
    let conn = open_db_in_memory().unwrap();
    let repo = ContentRepository::new(SqliteItemRepository::try_new(&conn).unwrap());

    let topic_area = TopicAreaBuilder::new()
        .name("Health")
        .created_by("admin")
        .save(&repo)
        .unwrap();
    let dashboard = DashboardBuilder::new()
        .name("Cases")
        .topic_area(&topic_area)
        .created_by("admin")
        .save(&repo)
        .unwrap();
    let text = WidgetBuilder::new()
        .name("Intro")
        .dashboard_id(dashboard.id.as_str())
        .widget_type(WidgetType::Text)
        .order(1)
        .save(&repo)
        .unwrap();
    let header = WidgetBuilder::new()
        .name("Header")
        .dashboard_id(dashboard.id.as_str())
        .widget_type(WidgetType::Text)
        .order(0)
        .save(&repo)
        .unwrap();

    let stored = repo
        .items()
        .get_item(&dashboard_key(&dashboard.id), &widget_key(&text.id))
        .unwrap()
        .unwrap();
    assert_eq!(stored.item_type, "Widget");

    let widgets = repo.list_widgets(&dashboard.id).unwrap();
    let ids: Vec<&str> = widgets.iter().map(|widget| widget.id.as_str()).collect();
    assert_eq!(ids, vec![header.id.as_str(), text.id.as_str()]);

    repo.delete_dashboard(&dashboard.id).unwrap();
    assert!(repo.get_dashboard(&dashboard.id).unwrap().is_none());
    assert!(repo.list_widgets(&dashboard.id).unwrap().is_empty());
}

#[test]
fn topic_area_lookup_ignores_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = ContentRepository::new(SqliteItemRepository::try_new(&conn).unwrap());

    let saved = TopicAreaBuilder::new()
        .name("Public Health")
        .created_by("admin")
        .save(&repo)
        .unwrap();

    let found = repo
        .find_topic_area_by_name("  public health ")
        .unwrap()
        .unwrap();
    assert_eq!(found.id, saved.id);
    assert!(repo.find_topic_area_by_name("Economy").unwrap().is_none());
}

#[test]
fn invalid_records_are_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    let repo = ContentRepository::new(SqliteItemRepository::try_new(&conn).unwrap());

    let key = dashboard_key("broken");
    repo.items()
        .put_item(&Item {
            pk: key.clone(),
            sk: key,
            item_type: "Dashboard".to_string(),
            data: json!({ "id": "broken", "name": "Broken", "topicAreaId": "" }),
        })
        .unwrap();

    let err = repo.get_dashboard("broken").unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn dataset_roundtrip_keeps_keys() {
    let conn = open_db_in_memory().unwrap();
    let repo = ContentRepository::new(SqliteItemRepository::try_new(&conn).unwrap());

    let dataset = DatasetBuilder::new()
        .name("cases")
        .created_by("admin")
        .save(&repo)
        .unwrap();

    let loaded = repo.get_dataset(&dataset.id).unwrap().unwrap();
    assert_eq!(loaded.s3_key.json, format!("{}.json", dataset.id));
    assert_eq!(loaded.s3_key.raw, format!("{}.csv", dataset.id));
    assert_eq!(repo.list_datasets().unwrap().len(), 1);
}

#[test]
fn import_ledger_records_each_pair_once() {
    let conn = open_db_in_memory().unwrap();
    let ledger = SqliteImportLedger::new(&conn);

    ledger.record_import("english/covid/", "d1").unwrap();
    ledger.record_import("english/covid/", "d1").unwrap();
    ledger.record_import("english/covid/", "d2").unwrap();
    ledger.record_import("english/jobs/", "d3").unwrap();

    let records = ledger.imports_for("english/covid/").unwrap();
    let mut ids: Vec<&str> = records
        .iter()
        .map(|record| record.dashboard_id.as_str())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["d1", "d2"]);
    assert!(ledger.imports_for("english/missing/").unwrap().is_empty());
}
