//! Integration tests for the HTTP-backed license API client.
//!
//! The client is blocking, so every call (including construction and drop of
//! the client) runs inside `spawn_blocking`, outside the Tokio worker that
//! drives the wiremock server.

use chrono::NaiveDate;
use license_client::config::methods;
use license_client::{
    ActivateModel, ApiResult, BasicResult, ClientConfig, GetKeyModel, KeyResult, LicenseApiClient,
    LicenseError,
};
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LICENSE_BODY: &str = r#"{
    "result": 0,
    "message": "",
    "licenseKey": {
        "ProductId": 3349,
        "ID": 7,
        "Key": "ICVLD-VVSZR-ZTICT-YKGXL",
        "Created": 1682900000,
        "Expires": 4102444800,
        "F2": true,
        "MaxNoOfMachines": 1,
        "ActivatedMachines": [
            {"Mid": "abc", "IP": "203.0.113.9", "Time": "2023-05-01T12:30:00"}
        ]
    }
}"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client_for(uri: &str) -> LicenseApiClient {
    let config = ClientConfig::default()
        .with_base_url(uri)
        .expect("valid mock URL")
        .with_timeout_secs(5);
    LicenseApiClient::with_config(config).expect("client build")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn activate_posts_form_and_decodes_license() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/key/Activate"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("token=access-token"))
        .and(body_string_contains("ProductId=3349"))
        .and(body_string_contains("MachineCode=abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LICENSE_BODY))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let client = client_for(&uri);
        client.activate(
            "access-token",
            &ActivateModel::new(3349, "ICVLD-VVSZR-ZTICT-YKGXL", "abc"),
        )
    })
    .await
    .expect("task")
    .expect("activate");

    assert!(result.is_success());
    assert_eq!(result.raw_response(), LICENSE_BODY);

    let license = result.license_key.expect("license in response");
    assert_eq!(license.id, Some(7));
    assert!(license.f2);
    let machine = &license.activated_machines.expect("machines")[0];
    assert_eq!(machine.mid, "abc");
    assert_eq!(
        machine.time,
        NaiveDate::from_ymd_opt(2023, 5, 1).and_then(|d| d.and_hms_opt(12, 30, 0))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn business_failure_is_returned_as_result() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/key/GetKey"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"result":1,"message":"Unable to find the license key."}"#),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        client_for(&uri).get_key("access-token", &GetKeyModel::new(3349, "missing"))
    })
    .await
    .expect("task")
    .expect("decoded result");

    assert!(!result.is_success());
    assert_eq!(result.message(), Some("Unable to find the license key."));
    assert!(result.license_key.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn json_error_on_non_2xx_status_is_decoded() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/key/Deactivate"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"result":1,"message":"Access denied."}"#),
        )
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let model = license_client::DeactivateModel::new(3349, "k", "abc");
        client_for(&uri).deactivate("bad-token", &model)
    })
    .await
    .expect("task")
    .expect("decoded result");

    assert!(!result.is_success());
    assert_eq!(result.message(), Some("Access denied."));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_error_page_is_an_http_status_error() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (typed, none) = tokio::task::spawn_blocking(move || {
        let client = client_for(&uri);
        let model = GetKeyModel::new(3349, "k");
        let typed: Result<KeyResult, _> = client.send(methods::GET_KEY, &model, None);
        let none: Option<KeyResult> = client.send_or_none(methods::GET_KEY, &model, None);
        (typed, none)
    })
    .await
    .expect("task");

    match typed {
        Err(LicenseError::HttpStatus { status, body }) => {
            assert_eq!(status, 502);
            assert!(body.contains("Bad Gateway"));
        }
        other => panic!("expected HttpStatus error, got {:?}", other),
    }
    assert!(none.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn offset_qualified_datetime_fails_to_decode() {
    init_tracing();
    let server = MockServer::start().await;

    let body = r#"{"result":0,"licenseKey":{"Expires":0,"ActivatedMachines":[{"Mid":"abc","Time":"2023-05-01T12:30:00+02:00"}]}}"#;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        client_for(&uri).get_key("access-token", &GetKeyModel::new(3349, "k"))
    })
    .await
    .expect("task");

    assert!(matches!(result, Err(LicenseError::Decode(_))));
}

#[test]
fn unreachable_server_is_a_network_error() {
    init_tracing();
    let client = client_for("http://127.0.0.1:1");
    let result: Result<BasicResult, _> =
        client.send(methods::GET_KEY, &GetKeyModel::new(3349, "k"), None);
    assert!(matches!(result, Err(LicenseError::Network(_))));
}
