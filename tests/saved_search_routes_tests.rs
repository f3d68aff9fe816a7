mod common;

use axum::http::StatusCode;
use common::{TestApp, listing};
use serde_json::{Value, json};

#[tokio::test]
async fn saved_search_lifecycle() {
    let app = TestApp::spawn().await;
    app.seed_properties(vec![
        listing("cheap", "Austin", 250_000, 2),
        listing("mid", "Austin", 400_000, 3),
        listing("far", "Dallas", 380_000, 3),
    ])
    .await;
    let household_id = app.household("alice", &[]).await;

    let (status, created) = app
        .call(
            "POST",
            "/api/saved-searches",
            Some("alice"),
            Some(json!({
                "name": "Austin 3br",
                "filters": {"city": "Austin", "bedroomsMin": 3},
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["householdId"], household_id.as_str());
    assert_eq!(created["isActive"], true);
    assert_eq!(created["notifyOnNewMatches"], true);
    assert_eq!(created["filters"], json!({"city": "Austin", "bedroomsMin": 3}));
    assert_eq!(created["lastViewedAt"], Value::Null);

    let (status, matches) = app
        .call("GET", &format!("/api/saved-searches/{id}/matches"), Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = matches["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["mid"]);

    let (_, list) = app.call("GET", "/api/saved-searches", Some("alice"), None).await;
    let list = list["savedSearches"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert!(list[0]["lastViewedAt"].is_string());

    let (status, updated) = app
        .call(
            "PATCH",
            &format!("/api/saved-searches/{id}"),
            Some("alice"),
            Some(json!({"name": "Renamed", "isActive": false})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["isActive"], false);
    assert_eq!(updated["notifyOnNewMatches"], true);

    // other users cannot see, change or delete it
    let (status, _) = app
        .call("GET", &format!("/api/saved-searches/{id}/matches"), Some("bob"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .call(
            "PATCH",
            &format!("/api/saved-searches/{id}"),
            Some("bob"),
            Some(json!({"name": "Mine now"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .call("DELETE", &format!("/api/saved-searches/{id}"), Some("bob"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call("DELETE", &format!("/api/saved-searches/{id}"), Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
    let (status, _) = app
        .call("DELETE", &format!("/api/saved-searches/{id}"), Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn saved_search_validation() {
    let app = TestApp::spawn().await;

    let (status, _) = app
        .call(
            "POST",
            "/api/saved-searches",
            Some("alice"),
            Some(json!({"name": "   ", "filters": {}})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            "/api/saved-searches",
            Some("alice"),
            Some(json!({"name": "Bad", "filters": {"priceMin": 10, "priceMax": 5}})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app
        .call(
            "POST",
            "/api/saved-searches",
            Some("alice"),
            Some(json!({"name": "Anything", "notifyOnNewMatches": false})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["householdId"], Value::Null);
    assert_eq!(created["notifyOnNewMatches"], false);
    assert_eq!(created["filters"], json!({}));

    let id = created["id"].as_str().unwrap();
    let (status, _) = app
        .call(
            "GET",
            &format!("/api/saved-searches/{id}/matches?limit=500"),
            Some("alice"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
