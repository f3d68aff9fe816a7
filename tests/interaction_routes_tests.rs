mod common;

use axum::http::StatusCode;
use common::{TestApp, listing};
use serde_json::{Value, json};

fn ids(body: &Value, key: &str) -> Vec<String> {
    body[key]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn feed_filters_and_hides_decided_listings() {
    let app = TestApp::spawn().await;
    app.seed_properties(vec![
        listing("p1", "Austin", 300_000, 2),
        listing("p2", "austin", 450_000, 3),
        listing("p3", "Dallas", 500_000, 4),
    ])
    .await;

    let (status, feed) = app
        .call("GET", "/api/properties?city=AUSTIN", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let mut got = ids(&feed, "properties");
    got.sort();
    assert_eq!(got, vec!["p1", "p2"]);

    let (_, feed) = app
        .call(
            "GET",
            "/api/properties?priceMin=400000&bedroomsMin=3&propertyTypes=house,condo",
            Some("alice"),
            None,
        )
        .await;
    let mut got = ids(&feed, "properties");
    got.sort();
    assert_eq!(got, vec!["p2", "p3"]);

    let (status, _) = app
        .call("GET", "/api/properties?priceMin=5&priceMax=1", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .call("GET", "/api/properties?limit=0", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // a view does not hide a listing, a decision does
    app.interact("alice", "p1", "view").await;
    app.interact("alice", "p2", "skip").await;
    let (_, feed) = app.call("GET", "/api/properties", Some("alice"), None).await;
    let mut got = ids(&feed, "properties");
    got.sort();
    assert_eq!(got, vec!["p1", "p3"]);

    // other users still see everything
    let (_, feed) = app.call("GET", "/api/properties", Some("bob"), None).await;
    assert_eq!(ids(&feed, "properties").len(), 3);
}

#[tokio::test]
async fn property_detail_and_vibes() {
    let app = TestApp::spawn().await;
    app.seed_properties(vec![listing("p1", "Austin", 300_000, 2)]).await;

    let (status, property) = app.call("GET", "/api/properties/p1", Some("alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(property["zipCode"], "78701");
    assert_eq!(property["listingStatus"], "active");
    assert_eq!(property["isActive"], true);

    let (status, _) = app.call("GET", "/api/properties/zzz", Some("alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call("GET", "/api/properties/p1/vibes", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, vibes) = app
        .admin(
            "PUT",
            "/api/admin/properties/p1/vibes",
            json!({
                "tagline": "Sunny bungalow",
                "vibeJustification": "Big windows",
                "primaryVibes": ["cozy"],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{vibes}");

    let (status, vibes) = app
        .call("GET", "/api/properties/p1/vibes", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(vibes["tagline"], "Sunny bungalow");
    assert_eq!(vibes["primaryVibes"], json!(["cozy"]));
    assert_eq!(vibes["lifestyleFits"], json!([]));
}

#[tokio::test]
async fn record_validates_input() {
    let app = TestApp::spawn().await;
    app.seed_properties(vec![listing("p1", "Austin", 300_000, 2)]).await;

    let cases = [
        (json!({"type": "like"}), StatusCode::BAD_REQUEST),
        (json!({"propertyId": "p1"}), StatusCode::BAD_REQUEST),
        (json!({"propertyId": "p1", "type": "love"}), StatusCode::BAD_REQUEST),
        (json!({"propertyId": "missing", "type": "like"}), StatusCode::NOT_FOUND),
    ];
    for (body, expected) in cases {
        let (status, resp) = app
            .call("POST", "/api/interactions", Some("alice"), Some(body.clone()))
            .await;
        assert_eq!(status, expected, "{body} -> {resp}");
    }

    let (status, created) = app
        .call(
            "POST",
            "/api/interactions",
            Some("alice"),
            Some(json!({"propertyId": "p1", "type": "like", "scoreData": {"score": 0.9}})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["interaction"]["interactionType"], "like");
    assert_eq!(created["interaction"]["scoreData"]["score"], 0.9);
    assert_eq!(created["interaction"]["householdId"], Value::Null);
    assert_eq!(created["mutualLike"], Value::Null);
}

#[tokio::test]
async fn history_summary_and_undo() {
    let app = TestApp::spawn().await;
    app.seed_properties(vec![
        listing("p1", "Austin", 300_000, 2),
        listing("p2", "Austin", 350_000, 2),
        listing("p3", "Austin", 400_000, 2),
    ])
    .await;

    app.interact("alice", "p1", "view").await;
    app.interact("alice", "p1", "like").await;
    app.interact("alice", "p2", "dislike").await;
    app.interact("alice", "p3", "skip").await;
    app.interact("alice", "p3", "skip").await;

    let (status, summary) = app
        .call("GET", "/api/interactions/summary", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary, json!({"viewed": 1, "liked": 1, "passed": 2}));

    let (_, likes) = app
        .call("GET", "/api/interactions?type=like", Some("alice"), None)
        .await;
    let likes = likes["interactions"].as_array().unwrap();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0]["propertyId"], "p1");
    assert_eq!(likes[0]["property"]["id"], "p1");

    let (_, page) = app
        .call("GET", "/api/interactions?limit=2&offset=0", Some("alice"), None)
        .await;
    let page = page["interactions"].as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["propertyId"], "p3");

    let (status, _) = app
        .call("GET", "/api/interactions?type=bogus", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, undone) = app
        .call("DELETE", "/api/interactions/p3", Some("alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(undone, json!({"deleted": 2}));

    let (_, feed) = app.call("GET", "/api/properties", Some("alice"), None).await;
    assert_eq!(ids(&feed, "properties"), vec!["p3"]);
}

#[tokio::test]
async fn second_like_in_household_reports_mutual_like() {
    let app = TestApp::spawn().await;
    app.seed_properties(vec![
        listing("p1", "Austin", 300_000, 2),
        listing("p2", "Austin", 320_000, 2),
    ])
    .await;
    app.household("alice", &["bob"]).await;
    app.call(
        "PATCH",
        "/api/users/me",
        Some("alice"),
        Some(json!({"displayName": "Alice"})),
    )
    .await;

    let first = app.interact("alice", "p1", "like").await;
    assert_eq!(first["mutualLike"], Value::Null);

    let second = app.interact("bob", "p1", "like").await;
    let mutual = &second["mutualLike"];
    assert_eq!(mutual["propertyId"], "p1");
    let partners = mutual["partners"].as_array().unwrap();
    assert_eq!(partners.len(), 1);
    assert_eq!(partners[0]["userId"], "alice");
    assert_eq!(partners[0]["displayName"], "Alice");

    // a like the partner has since taken back does not count
    app.interact("alice", "p2", "like").await;
    app.interact("alice", "p2", "dislike").await;
    let later = app.interact("bob", "p2", "like").await;
    assert_eq!(later["mutualLike"], Value::Null);
}
