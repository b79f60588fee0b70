// Entity load behavior against a mock service: lazy group loads,
// coalescing, relation construction order, and classification.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dirws_api::WsClient;
use dirws_store::{
    Entity, EntityExt, Host, HostInterface, JsonMap, StoreError, User, load,
};

async fn setup() -> (MockServer, Arc<WsClient>) {
    let server = MockServer::start().await;
    let base = server.uri().parse().expect("mock server URI");
    let client = Arc::new(WsClient::from_reqwest(base, reqwest::Client::new()));
    (server, client)
}

fn record(value: serde_json::Value) -> JsonMap {
    value.as_object().cloned().expect("object literal")
}

fn interface_on_host(
    service: &Arc<WsClient>,
    interface_name: &str,
) -> Arc<HostInterface> {
    let host = Host::new(
        Arc::clone(service),
        record(json!({ "name": "host1", "directory_name": "Built-in" })),
    )
    .expect("host");
    HostInterface::new(
        Arc::clone(service),
        host,
        record(json!({ "name": interface_name })),
    )
    .expect("interface")
}

#[tokio::test]
async fn load_populates_group_and_fields() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/user/Built-in/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "alice",
            "user_real_name": "Alice A.",
            "user_id": 7,
        })))
        .mount(&server)
        .await;

    let user = User::new(
        Arc::clone(&service),
        record(json!({ "name": "alice", "directory_name": "Built-in" })),
    )
    .expect("user");

    assert!(!user.is_loaded("info"));
    assert_eq!(user.get_value("user_real_name"), None);

    load(&user, "info").await.expect("load");

    assert!(user.is_loaded("info"));
    assert_eq!(user.get_value("user_real_name"), Some(json!("Alice A.")));
    assert_eq!(user.get_value("user_id"), Some(json!(7)));
    // Initial fields survive the merge.
    assert_eq!(user.get_value("directory_name"), Some(json!("Built-in")));
}

#[tokio::test]
async fn concurrent_loads_of_same_group_coalesce() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/user/Built-in/bob"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "name": "bob", "user_id": 3 }))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let user = User::new(
        Arc::clone(&service),
        record(json!({ "name": "bob", "directory_name": "Built-in" })),
    )
    .expect("user");

    let (first, second) = tokio::join!(load(&user, "info"), load(&user, "info"));
    first.expect("first load");
    second.expect("second load");

    assert_eq!(user.get_value("user_id"), Some(json!(3)));
    // `.expect(1)` on the mock verifies the single round trip on drop.
}

#[tokio::test]
async fn unregistered_update_type_is_a_configuration_error() {
    let (_server, service) = setup().await;

    let user = User::new(
        Arc::clone(&service),
        record(json!({ "name": "alice", "directory_name": "Built-in" })),
    )
    .expect("user");

    let err = load(&user, "nonesuch").await.expect_err("should fail");
    assert!(matches!(err, StoreError::Configuration { .. }));
}

#[tokio::test]
async fn load_on_placeholder_entity_is_an_invalid_state_error() {
    let (_server, service) = setup().await;

    // No directory name: no canonical path.
    let user = User::new(Arc::clone(&service), record(json!({ "name": "alice" })))
        .expect("user");
    assert_eq!(user.canonical_path(), None);

    let err = load(&user, "info").await.expect_err("should fail");
    assert!(matches!(err, StoreError::InvalidState { .. }));
}

#[tokio::test]
async fn interface_with_switch_only_sets_no_port_or_location() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/host/Built-in/host1/interface/eth0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "eth0",
            "switch_name": "sw-lab-1",
            "gateway": false,
            "router": false,
        })))
        .mount(&server)
        .await;

    let interface = interface_on_host(&service, "eth0");
    load(&interface, "info").await.expect("load");

    let switch = interface.switch_obj().expect("switch set");
    assert_eq!(switch.name().as_deref(), Some("sw-lab-1"));
    assert!(interface.switch_port_obj().is_none());
    assert!(interface.location().is_none());
}

#[tokio::test]
async fn interface_with_full_attachment_sets_all_three_in_order() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/host/Built-in/host1/interface/eth1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "eth1",
            "switch_name": "sw-lab-1",
            "port_name": "ge-0/0/7",
            "location_name": "closet-b",
        })))
        .mount(&server)
        .await;

    let interface = interface_on_host(&service, "eth1");
    load(&interface, "info").await.expect("load");

    let switch = interface.switch_obj().expect("switch set");
    let port = interface.switch_port_obj().expect("port set");
    let location = interface.location().expect("location set");

    // Port is owned by the same switch; location carries both refs.
    assert_eq!(port.switch().name(), switch.name());
    assert_eq!(location.switch().expect("attached").name(), switch.name());
    assert_eq!(
        location.switch_port().expect("attached").name(),
        port.name()
    );
}

#[tokio::test]
async fn interface_classification_prefers_gateway_then_router() {
    let cases = [
        (json!({ "gateway": true, "router": true }), "Gateway"),
        (json!({ "gateway": false, "router": true }), "Router"),
        (json!({ "gateway": false, "router": false }), "End-Host"),
    ];

    for (flags, expected) in cases {
        let (server, service) = setup().await;
        let mut body = flags.as_object().cloned().expect("object");
        body.insert("name".to_owned(), json!("eth0"));

        Mock::given(method("GET"))
            .and(path("/ws.v1/host/Built-in/host1/interface/eth0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let interface = interface_on_host(&service, "eth0");
        load(&interface, "info").await.expect("load");
        assert_eq!(
            interface.get_value("intftype"),
            Some(json!(expected)),
            "flags {flags}"
        );
    }
}

#[tokio::test]
async fn derived_attributes_follow_loaded_state() {
    let (server, service) = setup().await;

    Mock::given(method("GET"))
        .and(path("/ws.v1/host/Built-in/host1/interface/eth0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "eth0",
            "switch_name": "sw-lab-1",
        })))
        .mount(&server)
        .await;

    let interface = interface_on_host(&service, "eth0");

    // Before the load: registered, but inputs unknown.
    assert_eq!(
        interface.derived_value("switch_monitor_path").expect("registered"),
        None
    );
    // Unregistered derived attribute fails fast.
    assert!(matches!(
        interface.derived_value("nonesuch"),
        Err(StoreError::Configuration { .. })
    ));

    load(&interface, "info").await.expect("load");

    let link = interface
        .derived_value("switch_monitor_path")
        .expect("registered")
        .expect("computed");
    assert_eq!(
        link,
        json!("/Monitors/Switches/SwitchInfo?name=sw-lab-1")
    );
    // Port never loaded: null-propagating derived stays unknown.
    assert_eq!(
        interface
            .derived_value("switch_port_monitor_path")
            .expect("registered"),
        None
    );
}
