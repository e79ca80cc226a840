//! Integration tests for GeocodingClient using wiremock.

use herenow_core::{Coordinates, GeocodingClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn place(name: &str, lat: &str, lon: &str) -> serde_json::Value {
    serde_json::json!({
        "place_id": 1,
        "lat": lat,
        "lon": lon,
        "display_name": name,
        "importance": 0.5,
        "address": { "country": "somewhere" }
    })
}

#[tokio::test]
async fn search_sends_expected_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("format", "json"))
        .and(query_param("q", "London Bridge"))
        .and(query_param("addressdetails", "1"))
        .and(query_param("limit", "10"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([place("London Bridge", "51.5079", "-0.0877")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GeocodingClient::new(&mock_server.uri(), "herenow-tests").unwrap();
    let places = client.search("London Bridge", None).await;

    assert_eq!(places.len(), 1);
    assert_eq!(places[0].display_name, "London Bridge");
    assert_eq!(places[0].lat, "51.5079");
    assert!(places[0].distance_km.is_none());
}

#[tokio::test]
async fn search_ranks_by_distance_from_reference() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            place("London, Ontario", "42.9849", "-81.2453"),
            place("London, England", "51.5073", "-0.1276"),
        ])))
        .mount(&mock_server)
        .await;

    let client = GeocodingClient::new(&mock_server.uri(), "herenow-tests").unwrap();
    let paris = Coordinates::new(48.8566, 2.3522);
    let places = client.search("London", Some(paris)).await;

    assert_eq!(places[0].display_name, "London, England");
    assert_eq!(places[1].display_name, "London, Ontario");
    let nearest = places[0].distance_km.expect("distance computed");
    assert!((nearest - 343.5).abs() < 3.0);
}

#[tokio::test]
async fn search_failure_is_empty_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = GeocodingClient::new(&mock_server.uri(), "herenow-tests").unwrap();
    assert!(client.search("London", None).await.is_empty());
}

#[tokio::test]
async fn search_malformed_body_is_empty_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
        .mount(&mock_server)
        .await;

    let client = GeocodingClient::new(&mock_server.uri(), "herenow-tests").unwrap();
    assert!(client.search("London", None).await.is_empty());
}

#[tokio::test]
async fn short_query_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = GeocodingClient::new(&mock_server.uri(), "herenow-tests").unwrap();
    assert!(client.search("Lo", None).await.is_empty());
}

#[tokio::test]
async fn reverse_returns_display_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("format", "json"))
        .and(query_param("lat", "12.9"))
        .and(query_param("lon", "77.6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "display_name": "Bengaluru, Karnataka, India"
        })))
        .mount(&mock_server)
        .await;

    let client = GeocodingClient::new(&mock_server.uri(), "herenow-tests").unwrap();
    let name = client.reverse(Coordinates::new(12.9, 77.6)).await;

    assert_eq!(name.as_deref(), Some("Bengaluru, Karnataka, India"));
}

#[tokio::test]
async fn reverse_failure_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = GeocodingClient::new(&mock_server.uri(), "herenow-tests").unwrap();
    assert!(client.reverse(Coordinates::new(12.9, 77.6)).await.is_none());
}
