//! Pump CRUD, listing, bulk, import/export and statistics against the fake backend
//!
//! Run with: cargo test --package pumpmaster-e2e --test api_pumps

mod support;

use futures::future::try_join_all;
use pumpmaster_common::{BulkUpdate, ExportFormat, PumpStatus, PumpType, PumpUpdate};
use pumpmaster_e2e::api::{
    assert_page_limit, assert_paginated, assert_pump_fields, assert_pump_matches, ExportPayload,
    PageRequest,
};
use pumpmaster_e2e::utils::cleanup_test_data;
use serde_json::json;

use support::{factory, logged_in, named_pump};

#[tokio::test]
async fn test_create_then_read_back() {
    let (_backend, api) = logged_in().await;
    let pump = named_pump("Test Pump API");

    let created = api.create_pump(&pump).await.unwrap();

    let id = created.id.clone().expect("created pump has an id");
    assert_eq!(created.name, pump.name);
    assert_eq!(created.pump_type, pump.pump_type);
    assert_eq!(created.status.as_deref(), Some("Active"));
    assert!(created.created_at.is_some());

    let fetched = api.assert_pump_exists(&id).await.unwrap();
    assert_pump_matches(&fetched, &pump).unwrap();
}

#[tokio::test]
async fn test_update_applies_only_sent_fields() {
    let (_backend, api) = logged_in().await;
    let created = api
        .create_pump(&named_pump("Test Pump for Update"))
        .await
        .unwrap();
    let id = created.id_str().to_string();

    let update = PumpUpdate {
        name: Some("Updated Test Pump".to_string()),
        status: Some(PumpStatus::Maintenance.as_str().to_string()),
        flow_rate: Some("2000 GPM".to_string()),
        ..PumpUpdate::default()
    };
    let updated = api.update_pump(&id, &update).await.unwrap();

    assert_pump_fields(&updated, &update).unwrap();
    assert_eq!(updated.area, created.area);
    assert_eq!(updated.max_pressure, created.max_pressure);

    let fetched = api.get_pump(&id).await.unwrap();
    assert_pump_fields(&fetched, &update).unwrap();
}

#[tokio::test]
async fn test_delete_removes_pump() {
    let (backend, api) = logged_in().await;
    let created = api
        .create_pump(&named_pump("Test Pump for Deletion"))
        .await
        .unwrap();
    let id = created.id_str().to_string();

    api.delete_pump(&id).await.unwrap();

    api.assert_pump_does_not_exist(&id).await.unwrap();
    let second = api.delete_pump(&id).await.unwrap_err();
    assert!(second.is_not_found());
    assert_eq!(backend.pump_count(), 0);
}

#[tokio::test]
async fn test_unknown_id_is_not_found() {
    let (_backend, api) = logged_in().await;

    let err = api.get_pump("non-existent-id").await.unwrap_err();
    assert!(err.is_not_found());

    let err = api
        .update_pump("999", &PumpUpdate::default())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_is_paginated() {
    let (_backend, api) = logged_in().await;
    let mut factory = factory("page");
    for pump in factory.create_pumps(15) {
        api.create_pump(&pump).await.unwrap();
    }

    let first = api.get_all_pumps(PageRequest::default()).await.unwrap();
    assert_paginated(&first, Some(15), Some(1)).unwrap();
    assert_page_limit(&first, 10).unwrap();
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.total_pages, 2);

    let second = api.get_all_pumps(PageRequest::new(2, 10)).await.unwrap();
    assert_paginated(&second, Some(15), Some(2)).unwrap();
    assert_page_limit(&second, 10).unwrap();
    assert_eq!(second.data.len(), 5);

    let beyond = api.get_all_pumps(PageRequest::new(5, 10)).await.unwrap();
    assert!(beyond.data.is_empty());
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let (_backend, api) = logged_in().await;
    let mut factory = factory("search");
    for pump in factory.create_search_test_pumps() {
        api.create_pump(&pump).await.unwrap();
    }

    let results = api
        .search_pumps("centrifugal", PageRequest::default())
        .await
        .unwrap();

    assert!(!results.data.is_empty());
    assert!(results.data.iter().all(|p| {
        p.name.to_lowercase().contains("centrifugal")
            || p.pump_type.eq_ignore_ascii_case("centrifugal")
            || p.area.to_lowercase().contains("centrifugal")
    }));
    assert!(results.data.iter().any(|p| p.name.contains("Centrifugal")));

    let none = api
        .search_pumps("no such pump anywhere", PageRequest::default())
        .await
        .unwrap();
    assert_eq!(none.total, 0);
}

#[tokio::test]
async fn test_filter_by_type_and_status() {
    let (_backend, api) = logged_in().await;
    let mut factory = factory("filter");
    for pump in factory.create_filter_test_pumps() {
        api.create_pump(&pump).await.unwrap();
    }

    let centrifugal = api
        .filter_pumps_by_type("Centrifugal", PageRequest::new(1, 50))
        .await
        .unwrap();
    assert!(centrifugal.total >= 3);
    assert!(centrifugal
        .data
        .iter()
        .all(|p| p.has_type(PumpType::Centrifugal)));

    let active = api
        .filter_pumps_by_status("Active", PageRequest::new(1, 50))
        .await
        .unwrap();
    assert!(active.total >= 4);
    assert!(active.data.iter().all(|p| p.has_status(PumpStatus::Active)));
}

#[tokio::test]
async fn test_invalid_bodies_are_captured_as_400() {
    let (backend, api) = logged_in().await;
    let factory = factory("invalid");

    for body in [
        json!({ "description": "Missing required fields" }),
        factory.create_invalid_pump(),
        factory.create_incomplete_pump(),
    ] {
        let failure = api.create_pump_with_invalid_data(&body).await.unwrap();
        assert_eq!(failure.status, 400, "body {}", body);
        assert!(failure.error.get("message").is_some() || failure.error.get("errors").is_some());
    }
    assert_eq!(backend.pump_count(), 0);

    let created = api.create_pump(&named_pump("Test Pump")).await.unwrap();
    let failure = api
        .update_pump_with_invalid_data(created.id_str(), &json!({ "latitude": "north" }))
        .await
        .unwrap();
    assert_eq!(failure.status, 400);
}

#[tokio::test]
async fn test_boundary_pumps_are_accepted() {
    let (_backend, api) = logged_in().await;
    let mut factory = factory("edge");

    for pump in factory.create_boundary_test_pumps() {
        let created = api.create_pump(&pump).await.unwrap();
        assert_pump_matches(&created, &pump).unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_creates_all_succeed() {
    let (_backend, api) = logged_in().await;
    let pumps: Vec<_> = (0..10)
        .map(|i| named_pump(&format!("Concurrent Test Pump {}", i)))
        .collect();

    let created = try_join_all(pumps.iter().map(|p| api.create_pump(p)))
        .await
        .unwrap();

    assert_eq!(created.len(), 10);
    for (i, pump) in created.iter().enumerate() {
        assert!(pump.id.is_some());
        assert_eq!(pump.name, format!("Concurrent Test Pump {}", i));
    }
}

#[tokio::test]
async fn test_bulk_create_update_delete() {
    let (backend, api) = logged_in().await;
    let mut factory = factory("bulk");

    let created = api.bulk_create_pumps(&factory.create_pumps(3)).await.unwrap();
    assert_eq!(created.len(), 3);

    let updates: Vec<BulkUpdate> = created
        .iter()
        .map(|p| BulkUpdate {
            id: p.id_str().to_string(),
            data: PumpUpdate {
                status: Some("Inactive".to_string()),
                ..PumpUpdate::default()
            },
        })
        .collect();
    let updated = api.bulk_update_pumps(&updates).await.unwrap();
    assert!(updated.iter().all(|p| p.status.as_deref() == Some("Inactive")));

    let ids: Vec<String> = created.iter().map(|p| p.id_str().to_string()).collect();
    api.bulk_delete_pumps(&ids).await.unwrap();
    assert_eq!(backend.pump_count(), 0);
}

#[tokio::test]
async fn test_export_formats() {
    let (_backend, api) = logged_in().await;
    api.create_pump(&named_pump("Test Pump Export")).await.unwrap();

    match api.export_pumps(ExportFormat::Json).await.unwrap() {
        ExportPayload::Json(value) => {
            assert_eq!(value.as_array().map(Vec::len), Some(1));
            assert_eq!(value[0]["name"], "Test Pump Export");
        }
        other => panic!("expected JSON export, got {:?}", other),
    }

    match api.export_pumps(ExportFormat::Csv).await.unwrap() {
        ExportPayload::Bytes(bytes) => {
            let text = String::from_utf8(bytes.to_vec()).unwrap();
            assert!(text.starts_with("name,type,area"));
            assert!(text.contains("Test Pump Export"));
        }
        other => panic!("expected CSV bytes, got {:?}", other),
    }

    match api.export_pumps(ExportFormat::Xlsx).await.unwrap() {
        ExportPayload::Bytes(bytes) => assert!(bytes.starts_with(b"PK")),
        other => panic!("expected XLSX bytes, got {:?}", other),
    }
}

#[tokio::test]
async fn test_import_json_and_csv() {
    let (backend, api) = logged_in().await;
    let mut factory = factory("import");

    let json_body = serde_json::to_vec(&factory.create_pumps(2)).unwrap();
    let summary = api.import_pumps(json_body, ExportFormat::Json).await.unwrap();
    assert_eq!(summary.imported, 2);
    assert!(summary.errors.is_empty());

    let csv = "name,type,area,latitude,longitude,flowRate,offset,currentPressure,minPressure,maxPressure\n\
               Test Pump CSV,Turbine,Yard 1,40.7,-74.0,800 GPM,1,120,80,220\n\
               ,Turbine,Yard 2,40.7,-74.0,800 GPM,1,120,80,220\n";
    let summary = api.import_pumps(csv, ExportFormat::Csv).await.unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.errors.len(), 1);

    assert_eq!(backend.pump_count(), 3);
}

#[tokio::test]
async fn test_statistics_count_by_status_and_type() {
    let (_backend, api) = logged_in().await;
    for (name, pump_type, status) in [
        ("Stats Test 1", "Centrifugal", "Active"),
        ("Stats Test 2", "Centrifugal", "Inactive"),
        ("Stats Test 3", "Submersible", "Active"),
    ] {
        let mut pump = named_pump(name);
        pump.pump_type = pump_type.to_string();
        pump.status = Some(status.to_string());
        api.create_pump(&pump).await.unwrap();
    }

    let stats = api.get_pump_statistics().await.unwrap();
    assert!(stats.is_object());
    assert_eq!(stats["total"], 3);

    let by_status = api.get_pumps_by_status_count().await.unwrap();
    assert_eq!(by_status.get("Active"), Some(&2));
    assert_eq!(by_status.get("Inactive"), Some(&1));

    let by_type = api.get_pumps_by_type_count().await.unwrap();
    assert_eq!(by_type.get("Centrifugal"), Some(&2));
    assert_eq!(by_type.get("Submersible"), Some(&1));
}

#[tokio::test]
async fn test_cleanup_removes_only_test_data() {
    let (backend, api) = logged_in().await;
    api.create_pump(&named_pump("Test Pump Cleanup")).await.unwrap();
    let mut keeper = named_pump("North Intake");
    keeper.area = "Plant Room".to_string();
    api.create_pump(&keeper).await.unwrap();

    let removed = cleanup_test_data(&api).await;

    assert_eq!(removed, 1);
    assert_eq!(backend.pump_count(), 1);
}
