use dashboard_core::model::ModelValidationError;
use dashboard_core::{Dashboard, DashboardState, Dataset, SourceType, Widget, WidgetType};
use serde_json::json;

#[test]
fn example_assets_deserialize_with_defaults() {
    let dashboard: Dashboard = serde_json::from_value(json!({
        "name": "Jobs",
        "topicAreaName": "Economy",
        "tableOfContents": { "s1": true }
    }))
    .unwrap();
    assert_eq!(dashboard.id, "");
    assert_eq!(dashboard.version, 1);
    assert_eq!(dashboard.state, DashboardState::Draft);
    assert_eq!(dashboard.table_of_contents.get("s1"), Some(&true));

    let widget: Widget = serde_json::from_value(json!({
        "name": "Intro",
        "widgetType": "Text"
    }))
    .unwrap();
    assert!(widget.show_title);
    assert_eq!(widget.content, json!({}));

    let dataset: Dataset = serde_json::from_value(json!({ "name": "cases" })).unwrap();
    assert_eq!(dataset.source_type, SourceType::FileUpload);
    assert!(dataset.s3_key.json.is_empty());
}

#[test]
fn records_serialize_with_camel_case_fields() {
    let widget: Widget = serde_json::from_value(json!({
        "id": "w1",
        "name": "Intro",
        "dashboardId": "d1",
        "widgetType": "Chart",
        "showTitle": false,
        "content": { "datasetId": "ds1" }
    }))
    .unwrap();

    let value = serde_json::to_value(&widget).unwrap();
    assert_eq!(value["dashboardId"], json!("d1"));
    assert_eq!(value["widgetType"], json!("Chart"));
    assert_eq!(value["showTitle"], json!(false));
    assert!(value.get("section").is_none());
}

#[test]
fn chart_widget_without_dataset_reference_is_invalid() {
    let widget: Widget = serde_json::from_value(json!({
        "id": "w1",
        "name": "Cases",
        "dashboardId": "d1",
        "widgetType": "Chart",
        "content": { "chartType": "LineChart" }
    }))
    .unwrap();

    let err = widget.validate().unwrap_err();
    assert!(matches!(err, ModelValidationError::InvalidContent { .. }));
    assert!(WidgetType::Chart.uses_dataset());
    assert!(!WidgetType::Section.uses_dataset());
}

#[test]
fn section_listing_itself_is_rejected() {
    let mut section: Widget = serde_json::from_value(json!({
        "id": "s1",
        "name": "Overview",
        "dashboardId": "d1",
        "widgetType": "Section"
    }))
    .unwrap();
    section.push_child_widget_id("w1");
    section.push_child_widget_id("w1");
    assert_eq!(section.child_widget_ids(), vec!["w1"]);
    assert!(section.validate().is_ok());

    section.push_child_widget_id("s1");
    assert!(matches!(
        section.validate(),
        Err(ModelValidationError::SelfReference { .. })
    ));
}

#[test]
fn dashboard_validation_rejects_bad_version_and_parent() {
    let mut dashboard: Dashboard = serde_json::from_value(json!({
        "id": "d1",
        "name": "Jobs",
        "topicAreaId": "t1"
    }))
    .unwrap();
    assert!(dashboard.validate().is_ok());

    dashboard.version = 0;
    assert_eq!(
        dashboard.validate(),
        Err(ModelValidationError::InvalidVersion(0))
    );

    dashboard.version = 2;
    dashboard.parent_dashboard_id = Some("d1".to_string());
    assert!(matches!(
        dashboard.validate(),
        Err(ModelValidationError::SelfReference { .. })
    ));
}

#[test]
fn lifecycle_allows_only_listed_transitions() {
    use DashboardState::*;

    assert!(Draft.can_transition_to(PublishPending));
    assert!(PublishPending.can_transition_to(Published));
    assert!(PublishPending.can_transition_to(Draft));
    assert!(Published.can_transition_to(Archived));
    assert!(Published.can_transition_to(Inactive));
    assert!(Archived.can_transition_to(Published));

    assert!(!Draft.can_transition_to(Published));
    assert!(!Archived.can_transition_to(Draft));
    assert!(!Inactive.can_transition_to(Published));
    assert!(!Draft.can_transition_to(Draft));
}
