//! Contract tests for the immediate request/response modules: bank-account
//! verification and closedown checks, plus remote-error envelope mapping.

use popbill_client::accountcheck::IdentityNumType;
use popbill_client::{PartnerIdentity, PopbillClient, PopbillConfig, PopbillError};
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PopbillClient {
    let base: Url = server.uri().parse().unwrap();
    PopbillClient::new(PopbillConfig::new(
        base.clone(),
        base,
        "TESTER",
        "test-secret-key",
    ))
    .unwrap()
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/Token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "session_token": "tok",
            "expiration": (chrono::Utc::now() + chrono::Duration::hours(1)).to_rfc3339(),
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn account_name_lookup() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/EasyFin/AccountCheck"))
        .and(query_param("c", "0004"))
        .and(query_param("n", "9999999999999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "SUCCESS",
            "bankCode": "0004",
            "accountNumber": "9999999999999",
            "accountName": "홍길동",
            "checkDate": "20250115"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let identity = PartnerIdentity::new("1234567890").unwrap();

    let info = client
        .account_check()
        .check_account_info(&identity, "0004", "9999999999999")
        .await
        .unwrap();
    assert_eq!(info.account_name.as_deref(), Some("홍길동"));
    assert_eq!(info.result.as_deref(), Some("SUCCESS"));
}

#[tokio::test]
async fn depositor_check_sends_type_and_number() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/EasyFin/DepositorCheck"))
        .and(query_param("c", "0004"))
        .and(query_param("n", "9999999999999"))
        .and(query_param("t", "B"))
        .and(query_param("p", "1234567890"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "MATCH",
            "identityNumType": "B",
            "identityNum": "1234567890"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let identity = PartnerIdentity::new("1234567890").unwrap();

    let info = client
        .account_check()
        .check_depositor_info(
            &identity,
            "0004",
            "9999999999999",
            IdentityNumType::Business,
            "1234567890",
        )
        .await
        .unwrap();
    assert_eq!(info.result.as_deref(), Some("MATCH"));
}

#[tokio::test]
async fn non_digit_registration_number_fails_before_any_request() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let identity = PartnerIdentity::new("1234567890").unwrap();

    let err = client
        .account_check()
        .check_depositor_info(
            &identity,
            "0004",
            "9999999999999",
            IdentityNumType::Personal,
            "900101-1234567",
        )
        .await
        .unwrap_err();
    match err {
        PopbillError::Input { field, .. } => assert_eq!(field, "IdentityNum"),
        other => panic!("expected Input, got {other:?}"),
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn single_closedown_check() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/CloseDown"))
        .and(query_param("CN", "6798700433"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "corpNum": "6798700433",
            "state": "1",
            "type": "1",
            "checkDate": "20250115"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let identity = PartnerIdentity::new("1234567890").unwrap();

    let state = client
        .closedown()
        .check_corp_num(&identity, "679-87-00433")
        .await
        .unwrap();
    assert_eq!(state.state.as_deref(), Some("1"));
    assert_eq!(state.corp_type.as_deref(), Some("1"));
}

#[tokio::test]
async fn bulk_closedown_posts_json_array_and_preserves_order() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("POST"))
        .and(path("/CloseDown"))
        .and(body_json(serde_json::json!(["6798700433", "1234567890"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"corpNum": "6798700433", "state": "1"},
            {"corpNum": "1234567890", "state": "3", "stateDate": "20240801"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let identity = PartnerIdentity::new("1234567890").unwrap();

    let states = client
        .closedown()
        .check_corp_nums(&identity, &["6798700433", "123-45-67890"])
        .await
        .unwrap();
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].corp_num.as_deref(), Some("6798700433"));
    assert_eq!(states[1].state.as_deref(), Some("3"));
    assert_eq!(states[1].state_date.as_deref(), Some("20240801"));
}

#[tokio::test]
async fn invalid_bulk_target_fails_before_any_request() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let identity = PartnerIdentity::new("1234567890").unwrap();

    let err = client
        .closedown()
        .check_corp_nums(&identity, &["6798700433", "not-a-number"])
        .await
        .unwrap_err();
    match err {
        PopbillError::Input { field, .. } => assert_eq!(field, "CorpNum"),
        other => panic!("expected Input, got {other:?}"),
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn remote_error_envelope_is_carried_verbatim() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/CloseDown"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": -11000005,
            "message": "조회 권한이 없습니다."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let identity = PartnerIdentity::new("1234567890").unwrap();

    let err = client
        .closedown()
        .check_corp_num(&identity, "6798700433")
        .await
        .unwrap_err();
    match err {
        PopbillError::Remote {
            status,
            code,
            message,
            ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(code, Some(-11000005));
            assert_eq!(message, "조회 권한이 없습니다.");
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn non_envelope_error_body_maps_to_remote_without_code() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/CloseDown/UnitCost"))
        .respond_with(ResponseTemplate::new(500).set_body_string("gateway exploded"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let identity = PartnerIdentity::new("1234567890").unwrap();

    let err = client.closedown().unit_cost(&identity).await.unwrap_err();
    match err {
        PopbillError::Remote { status, code, .. } => {
            assert_eq!(status, 500);
            assert_eq!(code, None);
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}
