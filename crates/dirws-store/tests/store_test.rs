// Store fetch behavior: unpacking, ordering, in-memory querying, and
// cache retention across failures.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dirws_api::{WsClient, WsPath};
use dirws_store::{EntityExt, FetchQuery, Host, Store, StoreError};

async fn setup() -> (MockServer, Arc<WsClient>) {
    let server = MockServer::start().await;
    let base = server.uri().parse().expect("mock server URI");
    let client = Arc::new(WsClient::from_reqwest(base, reqwest::Client::new()));
    (server, client)
}

fn record(value: serde_json::Value) -> dirws_store::JsonMap {
    value.as_object().cloned().expect("object literal")
}

#[tokio::test]
async fn fetch_preserves_response_order() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "carol", "directory_name": "Built-in" },
            { "name": "alice", "directory_name": "Built-in" },
            { "name": "bob", "directory_name": "Built-in" },
        ])))
        .mount(&server)
        .await;

    let store = Store::users(&service);
    let users = store.fetch(&FetchQuery::all()).await.expect("fetch");

    let names: Vec<_> = users.iter().filter_map(|u| u.name()).collect();
    assert_eq!(names, vec!["carol", "alice", "bob"]);
    assert_eq!(store.cached().len(), 3);
}

#[tokio::test]
async fn filter_sort_and_page_apply_in_memory() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/host"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "zeta", "directory_name": "Built-in", "active": true },
            { "name": "alpha", "directory_name": "Built-in", "active": true },
            { "name": "mid", "directory_name": "Built-in", "active": false },
            { "name": "beta", "directory_name": "Built-in", "active": true },
        ])))
        .expect(3)
        .mount(&server)
        .await;

    let store = Store::hosts(&service);

    let active = store
        .fetch(&FetchQuery::all().filter("active", true).sort_by("name"))
        .await
        .expect("fetch");
    let names: Vec<_> = active.iter().filter_map(|h| h.name()).collect();
    assert_eq!(names, vec!["alpha", "beta", "zeta"]);

    let page = store
        .fetch(&FetchQuery::all().sort_by("name").page(1, 2))
        .await
        .expect("fetch");
    let names: Vec<_> = page.iter().filter_map(|h| h.name()).collect();
    assert_eq!(names, vec!["beta", "mid"]);

    // Paging past the end yields an empty page, not an error.
    let empty = store
        .fetch(&FetchQuery::all().page(10, 5))
        .await
        .expect("fetch");
    assert!(empty.is_empty());
    // The cache always holds the full unqueried result set.
    assert_eq!(store.cached().len(), 4);
}

#[tokio::test]
async fn scalar_listing_unpacks_into_one_entity_per_address() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/host/Built-in/host1/nwaddr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "10.0.0.1", "10.0.0.2", "10.0.0.3",
        ])))
        .mount(&server)
        .await;

    let url = WsPath::new(["host", "Built-in", "host1", "nwaddr"]);
    let store = Store::nw_addrs_at(&service, url);
    let addrs = store.fetch(&FetchQuery::all()).await.expect("fetch");

    let ips: Vec<_> = addrs.iter().filter_map(|a| a.ip_str()).collect();
    assert_eq!(ips, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
}

#[tokio::test]
async fn failed_fetch_retains_previous_results() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "alice", "directory_name": "Built-in" },
            { "name": "bob", "directory_name": "Built-in" },
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ws.v1/user"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let store = Store::users(&service);
    let users = store.fetch(&FetchQuery::all()).await.expect("first fetch");
    assert_eq!(users.len(), 2);

    let err = store
        .fetch(&FetchQuery::all())
        .await
        .expect_err("second fetch should fail");
    assert!(matches!(err, StoreError::ServiceUnavailable { .. }));

    // Last-good results survive the failure: no flicker to empty.
    let cached = store.cached();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0].name().as_deref(), Some("alice"));
}

#[tokio::test]
async fn directory_listing_stamps_search_order() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/directory/instance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "name": "Built-in" },
                { "name": "LDAP" },
            ]
        })))
        .mount(&server)
        .await;

    let store = Store::directories(&service);
    let directories = store.fetch(&FetchQuery::all()).await.expect("fetch");

    assert_eq!(directories[0].get_value("search_order"), Some(json!(0)));
    assert_eq!(directories[1].get_value("search_order"), Some(json!(1)));
    assert_eq!(directories[1].name().as_deref(), Some("LDAP"));
}

#[tokio::test]
async fn interface_store_is_scoped_under_its_host() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/host/Built-in/host1/interface"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "eth0" },
            { "name": "eth1" },
        ])))
        .mount(&server)
        .await;

    let host = Host::new(
        Arc::clone(&service),
        record(json!({ "name": "host1", "directory_name": "Built-in" })),
    )
    .expect("host");

    let store = Host::interface_store(&host).expect("host has a path");
    assert_eq!(
        store.url().to_string(),
        "/ws.v1/host/Built-in/host1/interface"
    );

    let interfaces = store.fetch(&FetchQuery::all()).await.expect("fetch");
    assert_eq!(interfaces.len(), 2);
    assert_eq!(interfaces[0].host().name().as_deref(), Some("host1"));

    // A placeholder host has no path, so no scoped store.
    let placeholder = Host::new(Arc::clone(&service), record(json!({}))).expect("host");
    assert!(Host::interface_store(&placeholder).is_none());
}
