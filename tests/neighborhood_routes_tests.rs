mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{SERVICE_KEY, TestApp, listing};
use homematch::db::NewNeighborhood;
use homematch::error::HomeMatchError;
use serde_json::{Value, json};

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]],
    })
}

async fn import(app: &TestApp, neighborhoods: Value) -> (StatusCode, Value) {
    app.admin(
        "POST",
        "/api/admin/neighborhoods",
        json!({"city": "Austin", "state": "TX", "neighborhoods": neighborhoods}),
    )
    .await
}

#[tokio::test]
async fn admin_routes_require_service_key() {
    let app = TestApp::spawn().await;
    let body = json!({"city": "Austin", "state": "TX", "neighborhoods": []});

    let (status, _) = app
        .call("POST", "/api/admin/neighborhoods", Some("alice"), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = Request::builder()
        .method("PUT")
        .uri("/api/admin/properties")
        .header("authorization", format!("Bearer {SERVICE_KEY}"))
        .header("content-type", "application/json")
        .body(Body::from(json!({"properties": []}).to_string()))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ids": []}));

    let (status, _) = app
        .call("PUT", "/api/admin/properties/p1/vibes", None, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn overlapping_boundaries_are_clipped() {
    let app = TestApp::spawn().await;

    let (status, body) = import(
        &app,
        json!([
            {"name": "Downtown", "bounds": square(0.0, 0.0, 0.01, 0.01)},
            {"name": "East Side", "bounds": square(0.005, 0.0, 0.015, 0.01)},
            {"name": "Inner Core", "bounds": square(0.002, 0.002, 0.004, 0.004)},
            {"name": "downtown", "bounds": square(1.0, 1.0, 1.01, 1.01)},
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let inserted = body["inserted"].as_array().unwrap();
    assert_eq!(inserted.len(), 2);
    assert_eq!(inserted[0]["name"], "Downtown");
    assert_eq!(inserted[0]["areaRetained"], 1.0);
    assert_eq!(inserted[1]["name"], "East Side");
    assert!((inserted[1]["areaRetained"].as_f64().unwrap() - 0.5).abs() < 1e-6);

    assert_eq!(
        body["skipped"],
        json!([
            {"name": "Inner Core", "reason": "fully_overlapped"},
            {"name": "downtown", "reason": "duplicate_name"},
        ])
    );

    // a later batch is clipped against what is already stored
    let (status, body) = import(
        &app,
        json!([{"name": "Eastern Edge", "bounds": square(0.01, 0.0, 0.02, 0.01)}]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let retained = body["inserted"][0]["areaRetained"].as_f64().unwrap();
    assert!((retained - 0.5).abs() < 1e-6, "{retained}");

    let (status, list) = app
        .call("GET", "/api/neighborhoods?city=austin&state=tx", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let list = list["neighborhoods"].as_array().unwrap();
    let names: Vec<&str> = list.iter().map(|n| n["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Downtown", "East Side", "Eastern Edge"]);
    assert_eq!(list[0]["bounds"]["type"], "MultiPolygon");
    assert_eq!(list[0]["city"], "Austin");

    let (status, _) = app
        .call("GET", "/api/neighborhoods?city=Austin", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_geometry_rejects_the_batch() {
    let app = TestApp::spawn().await;

    let bad = [
        json!({"type": "Point", "coordinates": [0.0, 0.0]}),
        json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]}),
        json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [0.01, 0.0], [0.0, 0.01]]]}),
        square(0.0, 0.0, 200.0, 1.0),
        json!({"type": "Polygon"}),
        json!("not geometry"),
    ];
    for bounds in bad {
        let (status, body) = import(
            &app,
            json!([
                {"name": "Fine", "bounds": square(0.0, 0.0, 0.01, 0.01)},
                {"name": "Broken", "bounds": bounds},
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    let (_, list) = app
        .call("GET", "/api/neighborhoods?city=Austin&state=TX", Some("alice"), None)
        .await;
    assert_eq!(list["neighborhoods"], json!([]));
}

#[tokio::test]
async fn names_are_unique_per_city_ignoring_case() {
    let app = TestApp::spawn().await;
    let (status, _) = import(
        &app,
        json!([{"name": "Downtown", "bounds": square(0.0, 0.0, 0.01, 0.01)}]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let bounds = square(1.0, 1.0, 1.01, 1.01).to_string();
    let clash = app
        .storage
        .insert_neighborhoods(
            "austin",
            "tx",
            vec![
                NewNeighborhood {
                    name: "Uptown".to_string(),
                    bounds: bounds.clone(),
                },
                NewNeighborhood {
                    name: "DOWNTOWN".to_string(),
                    bounds: bounds.clone(),
                },
            ],
        )
        .await;
    assert!(matches!(clash, Err(HomeMatchError::Conflict(_))), "{clash:?}");

    // the failed batch left nothing behind
    let stored = app.storage.list_neighborhoods("Austin", "TX").await.unwrap();
    let names: Vec<&str> = stored.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Downtown"]);

    let other_city = app
        .storage
        .insert_neighborhoods(
            "Dallas",
            "TX",
            vec![NewNeighborhood {
                name: "downtown".to_string(),
                bounds,
            }],
        )
        .await
        .unwrap();
    assert_eq!(other_city.len(), 1);
}

#[tokio::test]
async fn feed_filters_by_neighborhood() {
    let app = TestApp::spawn().await;
    let (_, body) = import(
        &app,
        json!([{"name": "Downtown", "bounds": square(0.0, 0.0, 0.01, 0.01)}]),
    )
    .await;
    let hood = body["inserted"][0]["id"].as_str().unwrap().to_string();

    let mut inside = listing("in", "Austin", 300_000, 2);
    inside["neighborhoodId"] = json!(hood);
    app.seed_properties(vec![inside, listing("out", "Austin", 300_000, 2)])
        .await;

    let (_, feed) = app
        .call(
            "GET",
            &format!("/api/properties?neighborhoodId={hood}"),
            Some("alice"),
            None,
        )
        .await;
    let ids: Vec<&str> = feed["properties"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["in"]);

    let mut orphan = listing("orphan", "Austin", 300_000, 2);
    orphan["neighborhoodId"] = json!("no-such-hood");
    let (status, _) = app
        .admin("PUT", "/api/admin/properties", json!({"properties": [orphan]}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .admin(
            "PUT",
            "/api/admin/properties/missing/vibes",
            json!({"tagline": "x", "vibeJustification": "y"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
