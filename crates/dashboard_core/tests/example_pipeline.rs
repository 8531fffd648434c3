use dashboard_core::db::open_db_in_memory;
use dashboard_core::{
    BuilderError, ContentRepository, DashboardState, ExampleError, ExampleService, ImportLedger,
    MemoryObjectStore, ObjectStore, PipelineConfig, SqliteImportLedger, SqliteItemRepository,
    WidgetType,
};
use rusqlite::Connection;
use serde_json::json;

const EXAMPLES: &str = "examples";
const DATASETS: &str = "datasets";
const CASES_CSV: &[u8] = b"day,cases\n2020-03-01,12\n2020-03-02,31\n";
const CASES_JSON: &[u8] = br#"[{"day":"2020-03-01","cases":12},{"day":"2020-03-02","cases":31}]"#;

type Service<'a> =
    ExampleService<SqliteItemRepository<'a>, &'a MemoryObjectStore, SqliteImportLedger<'a>>;

fn service<'a>(conn: &'a Connection, store: &'a MemoryObjectStore) -> Service<'a> {
    ExampleService::new(
        ContentRepository::new(SqliteItemRepository::try_new(conn).unwrap()),
        store,
        SqliteImportLedger::new(conn),
        PipelineConfig::default(),
    )
}

fn put_json(store: &MemoryObjectStore, key: &str, value: serde_json::Value) {
    store
        .put_object(EXAMPLES, key, value.to_string().as_bytes())
        .unwrap();
}

fn put_covid_example(store: &MemoryObjectStore) {
    put_json(
        store,
        "english/covid/dashboard.json",
        json!({
            "id": "dash-old",
            "name": "COVID Cases",
            "topicAreaName": "Health",
            "description": "Daily confirmed cases",
            "displayTableOfContents": true,
            "tableOfContents": { "w-section": true },
            "state": "Published",
            "friendlyUrl": "covid-cases",
            "parentDashboardId": "dash-older",
            "releaseNotes": "third revision"
        }),
    );
    put_json(
        store,
        "english/covid/widgets/w-section.json",
        json!({
            "id": "w-section",
            "name": "Overview",
            "widgetType": "Section",
            "order": 0,
            "content": { "widgetIds": ["w-chart"] }
        }),
    );
    put_json(
        store,
        "english/covid/widgets/w-chart.json",
        json!({
            "id": "w-chart",
            "name": "Cases by day",
            "widgetType": "Chart",
            "order": 1,
            "section": "w-section",
            "content": {
                "chartType": "LineChart",
                "s3Key": { "raw": "uploads/cases.csv", "json": "cases.json" }
            }
        }),
    );
    put_json(
        store,
        "english/covid/widgets/w-text.json",
        json!({
            "id": "w-text",
            "name": "Notes",
            "widgetType": "Text",
            "order": 2,
            "content": { "text": "see w-chart above" }
        }),
    );
    put_json(
        store,
        "english/covid/datasets/ds-cases.json",
        json!({
            "id": "ds-cases",
            "name": "cases",
            "fileName": "cases.csv",
            "s3Key": { "raw": "uploads/cases.csv", "json": "cases.json" }
        }),
    );
    store
        .put_object(EXAMPLES, "english/covid/data/cases.csv", CASES_CSV)
        .unwrap();
    store
        .put_object(EXAMPLES, "english/covid/data/cases.json", CASES_JSON)
        .unwrap();
}

fn put_jobs_example(store: &MemoryObjectStore) {
    put_json(
        store,
        "english/jobs/dashboard.json",
        json!({ "name": "Jobs report" }),
    );
}

#[test]
fn list_examples_groups_layouts_by_directory() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_covid_example(&store);
    put_jobs_example(&store);
    put_json(&store, "english/drafts/widgets/x.json", json!({}));
    put_json(&store, "spanish/empleo/dashboard.json", json!({ "name": "Empleo" }));

    let catalog = service(&conn, &store).list_examples("english").unwrap();

    let dirs: Vec<&str> = catalog
        .layouts
        .iter()
        .map(|layout| layout.dashboard_dir.as_str())
        .collect();
    assert_eq!(dirs, vec!["covid", "drafts", "jobs"]);
    let covid = catalog.layout("covid").unwrap();
    assert_eq!(covid.widget_keys.len(), 3);
    assert_eq!(covid.dataset_keys.len(), 1);
    assert_eq!(covid.data_keys.len(), 2);
    assert!(!catalog.layout("drafts").unwrap().is_complete());
}

#[test]
fn import_rewrites_every_id_consistently() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_covid_example(&store);
    let service = service(&conn, &store);

    let report = service.import_by_dir("english", "covid").unwrap();

    assert_eq!(report.source_prefix, "english/covid/");
    assert_eq!(report.widget_count, 3);
    assert_eq!(report.dataset_count, 1);
    assert_ne!(report.dashboard_id, "dash-old");
    assert_eq!(report.ids.get("dash-old"), Some(report.dashboard_id.as_str()));

    let repo = service.repository();
    let dashboard = repo.get_dashboard(&report.dashboard_id).unwrap().unwrap();
    assert_eq!(dashboard.name, "COVID Cases");
    assert_eq!(dashboard.state, DashboardState::Draft);
    assert_eq!(dashboard.version, 1);
    assert_eq!(dashboard.parent_dashboard_id, None);
    assert_eq!(dashboard.friendly_url, None);
    assert_eq!(dashboard.release_notes, None);
    assert_eq!(dashboard.topic_area_name, "Health");
    assert_eq!(dashboard.topic_area_id, report.topic_area_id);
    assert_eq!(dashboard.language, "english");
    assert_eq!(dashboard.created_by, "examples-pipeline");

    let section_id = report.ids.get("w-section").unwrap();
    let chart_id = report.ids.get("w-chart").unwrap();
    let dataset_id = report.ids.get("ds-cases").unwrap();
    assert_eq!(
        dashboard.table_of_contents.keys().collect::<Vec<_>>(),
        vec![section_id]
    );

    let widgets = repo.list_widgets(&report.dashboard_id).unwrap();
    assert_eq!(widgets.len(), 3);
    assert!(widgets
        .iter()
        .all(|widget| widget.dashboard_id == report.dashboard_id));

    let section = widgets.iter().find(|w| w.id == section_id).unwrap();
    assert_eq!(section.widget_type, WidgetType::Section);
    assert_eq!(section.child_widget_ids(), vec![chart_id]);

    let chart = widgets.iter().find(|w| w.id == chart_id).unwrap();
    assert_eq!(chart.section.as_deref(), Some(section_id));
    assert_eq!(chart.dataset_id(), Some(dataset_id));
    assert_eq!(chart.dataset_json_key(), Some(format!("{dataset_id}.json").as_str()));
    assert_eq!(chart.content["chartType"], json!("LineChart"));

    let text = widgets.iter().find(|w| w.widget_type == WidgetType::Text).unwrap();
    assert_eq!(text.content["text"], json!("see w-chart above"));

    let dataset = repo.get_dataset(dataset_id).unwrap().unwrap();
    assert_eq!(dataset.s3_key.raw, format!("{dataset_id}.csv"));
    assert_eq!(dataset.s3_key.json, format!("{dataset_id}.json"));
    assert_eq!(dataset.created_by, "examples-pipeline");
}

#[test]
fn import_copies_data_files_to_new_dataset_keys() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_covid_example(&store);
    let service = service(&conn, &store);

    let report = service.import_by_dir("english", "covid").unwrap();
    let dataset_id = report.ids.get("ds-cases").unwrap();

    let json_key = format!("{dataset_id}.json");
    let raw_key = format!("{dataset_id}.csv");
    assert_eq!(store.get_object(DATASETS, &json_key).unwrap(), CASES_JSON);
    assert_eq!(store.get_object(DATASETS, &raw_key).unwrap(), CASES_CSV);
    assert_eq!(report.copied_keys, vec![json_key, raw_key]);
}

#[test]
fn importing_twice_never_reuses_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_covid_example(&store);
    let service = service(&conn, &store);

    let first = service.import_by_dir("english", "covid").unwrap();
    let second = service.import_by_dir("english", "covid").unwrap();

    assert_ne!(first.dashboard_id, second.dashboard_id);
    assert_ne!(first.ids.get("w-chart"), second.ids.get("w-chart"));
    assert_eq!(first.topic_area_id, second.topic_area_id);
    assert_eq!(service.repository().list_dashboards().unwrap().len(), 2);
    assert_eq!(service.repository().list_topic_areas().unwrap().len(), 1);
}

#[test]
fn example_without_topic_area_uses_configured_default() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_jobs_example(&store);
    let service = service(&conn, &store);

    let report = service.import_by_dir("english", "jobs").unwrap();

    let dashboard = service
        .repository()
        .get_dashboard(&report.dashboard_id)
        .unwrap()
        .unwrap();
    assert_eq!(dashboard.topic_area_name, "Example Topic Area");
    assert_eq!(report.widget_count, 0);
    assert!(report.ids.get("jobs").is_some());
}

#[test]
fn missing_data_file_aborts_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_covid_example(&store);
    put_json(
        &store,
        "english/covid/datasets/ds-deaths.json",
        json!({ "id": "ds-deaths", "name": "deaths", "s3Key": { "json": "deaths.json" } }),
    );
    let service = service(&conn, &store);

    let err = service.import_by_dir("english", "covid").unwrap_err();

    match err {
        ExampleError::MissingDataFile {
            dataset_id,
            reference,
        } => {
            assert_eq!(dataset_id, "ds-deaths");
            assert_eq!(reference, "deaths.json");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(service.repository().list_dashboards().unwrap().is_empty());
    assert!(store.list_keys(DATASETS, "").unwrap().is_empty());
}

#[test]
fn invalid_widget_aborts_before_any_write() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_covid_example(&store);
    put_json(
        &store,
        "english/covid/widgets/w-blank.json",
        json!({ "id": "w-blank", "name": "", "widgetType": "Text", "order": 3 }),
    );
    let service = service(&conn, &store);

    let err = service.seed_examples("english", false).unwrap_err();
    assert!(matches!(
        err,
        ExampleError::Builder(BuilderError::MissingField("name"))
    ));

    let repo = service.repository();
    assert!(repo.list_dashboards().unwrap().is_empty());
    assert!(repo.list_datasets().unwrap().is_empty());
    assert!(repo.list_topic_areas().unwrap().is_empty());
    assert!(store.list_keys(DATASETS, "").unwrap().is_empty());
    let ledger = SqliteImportLedger::new(&conn);
    assert!(ledger.imports_for("english/covid/").unwrap().is_empty());
}

#[test]
fn widget_with_unknown_dataset_fails() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_jobs_example(&store);
    put_json(
        &store,
        "english/jobs/widgets/w1.json",
        json!({
            "id": "w1",
            "name": "Openings",
            "widgetType": "Table",
            "content": { "s3Key": { "json": "openings.json" } }
        }),
    );
    let service = service(&conn, &store);

    let err = service.import_by_dir("english", "jobs").unwrap_err();
    assert!(matches!(err, ExampleError::UnresolvedDataset { .. }));
}

#[test]
fn unknown_example_directory_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();

    let err = service(&conn, &store)
        .import_by_dir("english", "missing")
        .unwrap_err();
    assert!(matches!(err, ExampleError::ExampleNotFound(prefix) if prefix == "english/missing/"));
}

#[test]
fn seed_skips_examples_that_are_still_imported() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_covid_example(&store);
    put_jobs_example(&store);
    put_json(&store, "english/drafts/widgets/x.json", json!({}));
    let service = service(&conn, &store);

    let first = service.seed_examples("english", false).unwrap();
    assert_eq!(first.imported.len(), 2);
    assert!(first.skipped.is_empty());

    let second = service.seed_examples("english", false).unwrap();
    assert!(second.imported.is_empty());
    assert_eq!(second.skipped, vec!["english/covid/", "english/jobs/"]);

    let covid_id = first
        .imported
        .iter()
        .find(|import| import.source_prefix == "english/covid/")
        .map(|import| import.dashboard_id.clone())
        .unwrap();
    service.repository().delete_dashboard(&covid_id).unwrap();

    let third = service.seed_examples("english", false).unwrap();
    assert_eq!(third.imported.len(), 1);
    assert_eq!(third.imported[0].source_prefix, "english/covid/");
    assert_eq!(third.skipped, vec!["english/jobs/"]);

    let ledger = SqliteImportLedger::new(&conn);
    assert_eq!(ledger.imports_for("english/covid/").unwrap().len(), 2);
}

#[test]
fn forced_seed_imports_everything_again() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_covid_example(&store);
    let service = service(&conn, &store);

    service.seed_examples("english", false).unwrap();
    let forced = service.seed_examples("english", true).unwrap();

    assert_eq!(forced.imported.len(), 1);
    assert!(forced.skipped.is_empty());
    assert_eq!(service.repository().list_dashboards().unwrap().len(), 2);
}

#[test]
fn export_writes_layout_that_imports_again() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();
    put_covid_example(&store);
    let service = service(&conn, &store);
    let imported = service.import_by_dir("english", "covid").unwrap();
    let dataset_id = imported.ids.get("ds-cases").unwrap().to_string();

    let export = service
        .export_dashboard(&imported.dashboard_id, "english")
        .unwrap();

    assert_eq!(export.prefix, "english/covid-cases/");
    assert_eq!(export.written_keys.len(), 7);
    assert!(export
        .written_keys
        .contains(&"english/covid-cases/dashboard.json".to_string()));
    assert_eq!(
        store
            .get_object(EXAMPLES, &format!("english/covid-cases/data/{dataset_id}.csv"))
            .unwrap(),
        CASES_CSV
    );

    let reimported = service.import_by_dir("english", "covid-cases").unwrap();
    assert_eq!(reimported.widget_count, 3);
    assert_eq!(reimported.dataset_count, 1);
    assert_ne!(reimported.dashboard_id, imported.dashboard_id);

    let dashboard = service
        .repository()
        .get_dashboard(&reimported.dashboard_id)
        .unwrap()
        .unwrap();
    assert_eq!(dashboard.name, "COVID Cases");
    assert_eq!(dashboard.topic_area_id, imported.topic_area_id);
}

#[test]
fn export_of_unknown_dashboard_fails() {
    let conn = open_db_in_memory().unwrap();
    let store = MemoryObjectStore::new();

    let err = service(&conn, &store)
        .export_dashboard("nope", "english")
        .unwrap_err();
    assert!(matches!(err, ExampleError::DashboardNotFound(id) if id == "nope"));
}
