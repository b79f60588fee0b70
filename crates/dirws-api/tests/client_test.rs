// Integration tests for `WsClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dirws_api::{Error, WsClient, WsPath};

async fn setup() -> (MockServer, WsClient) {
    let server = MockServer::start().await;
    let base = server.uri().parse().expect("mock server URI");
    let client = WsClient::from_reqwest(base, reqwest::Client::new());
    (server, client)
}

#[tokio::test]
async fn get_json_returns_parsed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "alice", "directory_name": "Built-in" },
            { "name": "bob", "directory_name": "Built-in" },
        ])))
        .mount(&server)
        .await;

    let value = client.get_json(&WsPath::new(["user"])).await.expect("fetch");
    let items = value.as_array().expect("array body");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "alice");
}

#[tokio::test]
async fn path_segments_are_percent_encoded_on_the_wire() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/group/host/My%20Directory/lab%20hosts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "lab hosts" })))
        .mount(&server)
        .await;

    let group = WsPath::new(["group", "host"])
        .join("My Directory")
        .join("lab hosts");
    let value = client.get_json(&group).await.expect("fetch");
    assert_eq!(value["name"], "lab hosts");
}

#[tokio::test]
async fn non_success_status_maps_to_status_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/host/missing/none"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such host"))
        .mount(&server)
        .await;

    let err = client
        .get_json(&WsPath::new(["host", "missing", "none"]))
        .await
        .expect_err("should fail");

    match err {
        Error::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "no such host");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn gateway_errors_classify_as_unavailable() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/switch"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client
        .get_json(&WsPath::new(["switch"]))
        .await
        .expect_err("should fail");
    assert!(err.is_unavailable());
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn malformed_body_surfaces_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/nwaddr"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client
        .get_json(&WsPath::new(["nwaddr"]))
        .await
        .expect_err("should fail");
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
        other => panic!("unexpected error: {other:?}"),
    }
}
