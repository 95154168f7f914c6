//! Tests for the dispatcher

use super::request::compose_url;
use super::response::{check_media_type, check_status};
use super::*;
use crate::http::ApiResponse;
use crate::identifier::{Describe, Fields, Identifier};
use crate::object::{
    Endpoint, RequestFilterHook, RequestUrlHook, ResponseFilterHook,
};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use test_case::test_case;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RECORDS: &str = "/api/v1/record.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Record {
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    name: String,
}

impl Record {
    fn named(identifier: &str, name: &str) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
        }
    }
}

impl Describe for Record {
    fn fields(&self) -> Fields<'_> {
        Fields::new().identifier("identifier", &self.identifier)
    }
}

impl Object for Record {
    fn endpoint_url(&self, _ctx: &OperationContext) -> Result<Endpoint> {
        Ok(Endpoint::new(RECORDS))
    }
}

/// No serde defaults: every key must be present when decoding from scratch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Port {
    identifier: String,
    speed: u32,
}

impl Describe for Port {
    fn fields(&self) -> Fields<'_> {
        Fields::new().identifier("identifier", &self.identifier)
    }
}

impl Object for Port {
    fn endpoint_url(&self, _ctx: &OperationContext) -> Result<Endpoint> {
        Ok(Endpoint::new("/ports"))
    }
}

/// Exercises every request/response hook
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Hooked {
    #[serde(default)]
    identifier: String,
    #[serde(default)]
    seen: String,
}

impl Describe for Hooked {
    fn fields(&self) -> Fields<'_> {
        Fields::new().identifier("identifier", &self.identifier)
    }
}

impl Object for Hooked {
    fn endpoint_url(&self, ctx: &OperationContext) -> Result<Endpoint> {
        assert!(ctx.url().is_none());
        Ok(Endpoint::new("/hooked").query("zone", "a"))
    }

    fn as_request_url_hook(&self) -> Option<&dyn RequestUrlHook> {
        Some(self)
    }

    fn as_request_filter_hook(&self) -> Option<&dyn RequestFilterHook> {
        Some(self)
    }

    fn as_response_filter_hook(&self) -> Option<&dyn ResponseFilterHook> {
        Some(self)
    }
}

impl RequestUrlHook for Hooked {
    fn request_url(&self, ctx: &OperationContext, mut url: Url) -> Result<Url> {
        assert!(ctx.endpoint().is_some());
        url.query_pairs_mut().append_pair("via", "hook");
        Ok(url)
    }
}

impl RequestFilterHook for Hooked {
    fn filter_request(&self, ctx: &OperationContext, mut request: Request) -> Result<Request> {
        assert_eq!(ctx.url(), Some(request.url()));
        request
            .headers_mut()
            .insert("X-Filtered", HeaderValue::from_static("yes"));
        Ok(request)
    }
}

impl ResponseFilterHook for Hooked {
    fn filter_response(
        &self,
        _ctx: &OperationContext,
        response: ApiResponse,
    ) -> Result<ApiResponse> {
        // The API answers 202 with a plain text ack; turn it into JSON
        if response.status == StatusCode::ACCEPTED {
            return Ok(ApiResponse::json(&json!({
                "identifier": self.identifier,
                "seen": response.text(),
            })));
        }
        Ok(response)
    }
}

fn api(server: &MockServer) -> Api {
    Api::new(server.uri().parse().unwrap(), HttpClient::new().unwrap())
}

// ============================================================================
// URL composition
// ============================================================================

#[test]
fn test_compose_url_joins_paths_and_identifier() {
    let base: Url = "https://api.example.com/v2/".parse().unwrap();
    let endpoint = Endpoint::new("/vlan.json");
    let id = Identifier::from("abc");

    let url = compose_url(&base, &endpoint, Some(&id), None).unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v2/vlan.json/abc");

    let url = compose_url(&base, &endpoint, None, None).unwrap();
    assert_eq!(url.as_str(), "https://api.example.com/v2/vlan.json");
}

#[test]
fn test_compose_url_accumulates_query_pairs() {
    let base: Url = "https://api.example.com/?token=t&tag=base".parse().unwrap();
    let endpoint = Endpoint::new("/things").query("tag", "a").query("location", "x");

    let url = compose_url(&base, &endpoint, None, Some(Paging::new(3, 25))).unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert_eq!(
        pairs,
        vec![
            ("token".to_string(), "t".to_string()),
            ("tag".to_string(), "base".to_string()),
            ("tag".to_string(), "a".to_string()),
            ("location".to_string(), "x".to_string()),
            ("page".to_string(), "3".to_string()),
            ("limit".to_string(), "25".to_string()),
        ]
    );
}

#[test]
fn test_compose_url_formats_uuid_identifier() {
    let base: Url = "http://localhost:8080".parse().unwrap();
    let id = Identifier::from(Uuid::nil());
    let url = compose_url(&base, &Endpoint::new("items"), Some(&id), None).unwrap();
    assert_eq!(
        url.path(),
        "/items/00000000-0000-0000-0000-000000000000"
    );
    assert_eq!(url.query(), None);
}

// ============================================================================
// Response classification
// ============================================================================

#[test_case(404 ; "not found")]
#[test_case(403 ; "access denied")]
#[test_case(301 ; "redirect")]
#[test_case(409 ; "conflict")]
#[test_case(502 ; "bad gateway")]
fn test_check_status_rejects(status: u16) {
    let response = ApiResponse::new(StatusCode::from_u16(status).unwrap(), "nope");
    let err = check_status("GET", "http://x/y", &response).unwrap_err();
    match status {
        404 => assert!(err.is_not_found()),
        403 => assert!(err.is_access_denied()),
        _ => {
            assert_eq!(err.status(), Some(status));
            assert!(err.to_string().contains("nope"));
            assert!(err.to_string().contains("GET http://x/y"));
        }
    }
}

#[test_case(200 ; "ok")]
#[test_case(201 ; "created")]
#[test_case(204 ; "no content")]
#[test_case(300 ; "multiple choices")]
fn test_check_status_accepts(status: u16) {
    let response = ApiResponse::new(StatusCode::from_u16(status).unwrap(), "");
    assert!(check_status("GET", "http://x", &response).is_ok());
}

#[test]
fn test_error_message_is_truncated_or_reason() {
    let long = "x".repeat(500);
    let response = ApiResponse::new(StatusCode::BAD_REQUEST, long);
    let message = check_status("POST", "http://x", &response)
        .unwrap_err()
        .to_string();
    assert!(message.contains("[truncated, 500 bytes total]"));
    assert!(message.len() < 400);

    let empty = ApiResponse::new(StatusCode::SERVICE_UNAVAILABLE, "  ");
    let message = check_status("GET", "http://x", &empty).unwrap_err().to_string();
    assert!(message.ends_with("Service Unavailable"), "{message}");
}

#[test]
fn test_check_media_type() {
    let html = ApiResponse::new(StatusCode::OK, "<html/>").with_header(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    match check_media_type(&html).unwrap_err() {
        Error::UnsupportedResponseFormat { content_type } => assert_eq!(content_type, "text/html"),
        other => panic!("unexpected error: {other}"),
    }

    let json = ApiResponse::new(StatusCode::OK, "{}").with_header(
        CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    assert!(check_media_type(&json).is_ok());
    assert!(check_media_type(&ApiResponse::new(StatusCode::OK, "{}")).is_ok());
}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_dispatch_requires_context() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = api(&mock_server)
        .dispatch(
            None,
            &Record::named("r1", ""),
            &OptionsBag::new(),
            Operation::Get,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ContextRequired));
}

#[tokio::test]
async fn test_dispatch_refuses_cancelled_context() {
    let mock_server = MockServer::start().await;
    let (ctx, cancel) = Context::background().with_cancel();
    cancel.cancel();

    let err = api(&mock_server)
        .get(&ctx, &mut Record::named("r1", ""), GetOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}

#[tokio::test]
async fn test_single_object_operations_need_identifier() {
    let mock_server = MockServer::start().await;
    let api = api(&mock_server);
    let ctx = Context::background();

    let err = api
        .get(&ctx, &mut Record::default(), GetOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnidentifiedObject { .. }));

    let err = api
        .destroy(&ctx, &mut Record::default(), DestroyOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnidentifiedObject { .. }));
}

#[tokio::test]
async fn test_get_decodes_into_object() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{RECORDS}/r1")))
        .and(header("Accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"identifier": "r1", "name": "first"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut record = Record::named("r1", "");
    api(&mock_server)
        .get(&Context::background(), &mut record, GetOptions::new())
        .await
        .unwrap();
    assert_eq!(record, Record::named("r1", "first"));
}

#[tokio::test]
async fn test_create_posts_serialized_object() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RECORDS))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({"identifier": "", "name": "new"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"identifier": "r9", "name": "new"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut record = Record::named("", "new");
    api(&mock_server)
        .create(&Context::background(), &mut record, CreateOptions::new())
        .await
        .unwrap();
    assert_eq!(record.identifier, "r9");
}

#[tokio::test]
async fn test_update_puts_to_identifier() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("{RECORDS}/r1")))
        .and(body_json(json!({"identifier": "r1", "name": "renamed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "identifier": "r1", "name": "renamed"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut record = Record::named("r1", "renamed");
    api(&mock_server)
        .update(&Context::background(), &mut record, UpdateOptions::new())
        .await
        .unwrap();
    assert_eq!(record.name, "renamed");
}

#[tokio::test]
async fn test_destroy_with_no_content_leaves_object() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{RECORDS}/r1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut record = Record::named("r1", "keep");
    api(&mock_server)
        .destroy(&Context::background(), &mut record, DestroyOptions::new())
        .await
        .unwrap();
    assert_eq!(record, Record::named("r1", "keep"));
}

#[tokio::test]
async fn test_destroy_with_status_body_keeps_object() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/ports/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "deleted"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut port = Port {
        identifier: "p1".into(),
        speed: 10,
    };
    api(&mock_server)
        .destroy(&Context::background(), &mut port, DestroyOptions::new())
        .await
        .unwrap();
    assert_eq!(port.identifier, "p1");
    assert_eq!(port.speed, 10);
}

#[tokio::test]
async fn test_partial_get_keeps_missing_fields() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{RECORDS}/r1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "fresh"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut record = Record::named("r1", "old");
    api(&mock_server)
        .get(&Context::background(), &mut record, GetOptions::new())
        .await
        .unwrap();
    assert_eq!(record, Record::named("r1", "fresh"));
}

#[tokio::test]
async fn test_not_found_can_be_ignored() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let result = api(&mock_server)
        .destroy(
            &Context::background(),
            &mut Record::named("gone", ""),
            DestroyOptions::new(),
        )
        .await;
    match &result {
        Err(Error::NotFound { method, url }) => {
            assert_eq!(method, "DELETE");
            assert!(url.ends_with("/api/v1/record.json/gone"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(crate::error::ignore_not_found(result).is_ok());
}

#[tokio::test]
async fn test_non_json_response_is_rejected() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .insert_header("Content-Type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let err = api(&mock_server)
        .get(
            &Context::background(),
            &mut Record::named("r1", ""),
            GetOptions::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedResponseFormat { .. }));
}

#[tokio::test]
async fn test_hooks_shape_request_and_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hooked/h1"))
        .and(query_param("zone", "a"))
        .and(query_param("via", "hook"))
        .and(header("X-Filtered", "yes"))
        .respond_with(ResponseTemplate::new(202).set_body_string("queued"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut hooked = Hooked {
        identifier: "h1".into(),
        seen: String::new(),
    };
    api(&mock_server)
        .get(&Context::background(), &mut hooked, GetOptions::new())
        .await
        .unwrap();
    assert_eq!(hooked.seen, "queued");
}

#[tokio::test]
async fn test_dispatch_exposes_operation_context() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let mut options = OptionsBag::new();
    options.set("tenant", "acme".to_string(), false).unwrap();

    let dispatched = api(&mock_server)
        .dispatch(
            Some(&Context::background()),
            &Record::default(),
            &options,
            Operation::List,
        )
        .await
        .unwrap();

    let ctx = dispatched.context();
    assert_eq!(ctx.operation(), Operation::List);
    assert_eq!(ctx.options().get::<String>("tenant").unwrap(), "acme");
    assert_eq!(ctx.endpoint().map(Endpoint::path), Some(RECORDS));
    assert!(ctx.url().unwrap().as_str().ends_with(RECORDS));
    assert_eq!(dispatched.status(), StatusCode::OK);
    assert_eq!(dispatched.body().map(|b| &b[..]), Some(&b"[]"[..]));
}

#[tokio::test]
async fn test_cancel_during_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"identifier": "slow"}))
                .set_delay(std::time::Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let (ctx, cancel) = Context::background().with_cancel();
    let api = api(&mock_server);
    let call = tokio::spawn(async move {
        let mut record = Record::named("slow", "");
        api.get(&ctx, &mut record, GetOptions::new()).await
    });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    cancel.cancel();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), call)
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(result, Err(Error::Cancelled)));
}
