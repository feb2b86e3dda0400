//! End-to-end fetcher tests against a wiremock server.

mod support;

use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use typical_fetch::error::{ErrorKind, error_kind};
use typical_fetch::prelude::*;
use typical_fetch::{HttpResponse, RedirectPolicy};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn no_parser_yields_empty_payload() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .and(path("/boop"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let boop = build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/boop")
        .build()
        .unwrap();

    let result: CallResult<()> = boop.send().await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn parse_json_feeds_the_parsed_value() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .and(path("/boop"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"name": "Rune"}})))
        .mount(&server)
        .await;

    let shout = build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/boop")
        .parse_json(|json, _| {
            json["user"]["name"]
                .as_str()
                .map(str::to_uppercase)
                .ok_or("missing user name")
        })
        .build()
        .unwrap();

    assert_eq!(shout.send().await.unwrap(), "RUNE");
}

#[tokio::test]
async fn query_sets_are_appended_in_order() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .and(path("/boop"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/boop")
        .query([("foo", "bar")])
        .query([("baz", "x")])
        .build()
        .unwrap()
        .send()
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("foo=bar&baz=x"));
}

#[tokio::test]
async fn server_error_is_an_http_error() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("kaboom"))
        .mount(&server)
        .await;

    let err = build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/broken")
        .parse_json_as::<Value>()
        .build()
        .unwrap()
        .send()
        .await
        .unwrap_err();

    let http = err.as_http().expect("expected an HTTP error");
    assert_eq!(http.status().as_u16(), 500);
    assert_eq!(http.status_text(), "Internal Server Error");
    assert_eq!(http.text(), "kaboom");
    assert_eq!(http.request().method, HttpMethod::Get);
    assert_eq!(error_kind(&err), ErrorKind::Server);
}

#[tokio::test]
async fn malformed_json_is_a_pipeline_error() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let err = build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/data")
        .parse_json_as::<Value>()
        .build()
        .unwrap()
        .send()
        .await
        .unwrap_err();

    let pipeline = err.as_pipeline().expect("expected a pipeline error");
    let cause = pipeline
        .downcast_ref::<serde_json::Error>()
        .expect("cause should be a JSON error");
    assert!(cause.is_syntax());
    assert_eq!(pipeline.body_text(), Some("{not json"));
    assert_eq!(pipeline.response().map(|r| r.status().as_u16()), Some(200));
}

#[tokio::test]
async fn failing_parser_is_a_pipeline_error() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;

    let err = build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/greeting")
        .parse_text(|_, _| Err::<String, _>("parser rejected the body"))
        .build()
        .unwrap()
        .send()
        .await
        .unwrap_err();

    assert!(err.is_pipeline());
    assert_eq!(unwrap_error(&err).to_string(), "parser rejected the body");
}

#[tokio::test]
async fn error_mappers_run_left_to_right() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/")
        .map_error(|error, _| vec![format!("1:{}", error.status().map_or(0, |s| s.as_u16()))])
        .map_error_async(|mut trail: Vec<String>, _| async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trail.push("2".to_string());
            trail
        })
        .map_error(|mut trail, _| {
            trail.push("3".to_string());
            trail
        })
        .build()
        .unwrap()
        .send()
        .await
        .unwrap_err();

    assert_eq!(err, vec!["1:500", "2", "3"]);
}

#[tokio::test]
async fn error_mapper_can_read_the_error_body() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct ApiError {
        code: String,
    }

    let server = support::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"code": "invalid_id"})))
        .mount(&server)
        .await;

    let err = build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/users/x")
        .map_error(|error, _| {
            error
                .as_http()
                .and_then(|http| http.response().json::<ApiError>().ok())
        })
        .build()
        .unwrap()
        .send()
        .await
        .unwrap_err();

    assert_eq!(
        err,
        Some(ApiError {
            code: "invalid_id".to_string()
        })
    );
}

#[tokio::test]
async fn forks_do_not_share_suffixes() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .and(path("/things"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"n": 1})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/things"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "new"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"n": 2})))
        .mount(&server)
        .await;

    let things = build_call()
        .base_url(&server.uri())
        .path("/things")
        .parse_json_as::<Value>();
    let list = things
        .method(HttpMethod::Get)
        .map(|value, _| format!("get:{}", value["n"]))
        .build()
        .unwrap();
    let create = things
        .method(HttpMethod::Post)
        .json_body_with(|_| json!({"name": "new"}))
        .build()
        .unwrap();

    assert_eq!(list.send().await.unwrap(), "get:1");
    assert_eq!(create.send().await.unwrap(), json!({"n": 2}));
}

#[tokio::test]
async fn call_at_supplies_the_base_url() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .and(path("/api/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;

    let ping = build_call()
        .method(HttpMethod::Get)
        .path("ping")
        .parse_text(|text, _| Ok::<_, BoxError>(text))
        .build()
        .unwrap();

    let base = format!("{}/api/", server.uri());
    assert_eq!(ping.call_at(&base, ()).await.unwrap(), "pong");
}

#[tokio::test]
async fn manual_redirects_surface_as_http_errors() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("here"))
        .mount(&server)
        .await;

    let old = build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/old")
        .parse_text(|text, _| Ok::<_, BoxError>(text));

    assert_eq!(old.build().unwrap().send().await.unwrap(), "here");

    let err = old
        .fetch_options(TransportOptions::new().redirect(RedirectPolicy::Manual))
        .build()
        .unwrap()
        .send()
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(302));
    assert_eq!(error_kind(&err), ErrorKind::Redirect);
}

#[tokio::test]
async fn timeouts_are_pipeline_errors() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let err = build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/slow")
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap()
        .send()
        .await
        .unwrap_err();

    assert!(err.is_pipeline());
    assert_eq!(error_kind(&err), ErrorKind::Timeout);
}

#[tokio::test]
async fn concurrent_calls_do_not_interfere() {
    #[derive(Clone)]
    struct Lookup {
        id: u32,
    }

    let server = support::start().await;
    for id in [1u32, 2] {
        Mock::given(method("GET"))
            .and(path(format!("/items/{id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(20 * u64::from(id)))
                    .set_body_json(json!({"id": id})),
            )
            .mount(&server)
            .await;
    }

    let item = build_call()
        .base_url(&server.uri())
        .args::<Lookup>()
        .method(HttpMethod::Get)
        .path_with(|args: &Lookup| format!("/items/{}", args.id))
        .parse_json(|json, args: &Lookup| {
            Ok::<_, BoxError>((args.id, json["id"].as_u64().unwrap_or_default()))
        })
        .build()
        .unwrap();

    let first = item.clone();
    let handle = tokio::spawn(async move { first.call(Lookup { id: 2 }).await.unwrap() });
    let one = item.call(Lookup { id: 1 }).await.unwrap();

    assert_eq!(one, (1, 1));
    assert_eq!(handle.await.unwrap(), (2, 2));
}

#[tokio::test]
async fn response_parser_reads_the_live_response_and_arguments() {
    struct Tenant {
        name: &'static str,
    }

    let server = support::start().await;
    Mock::given(method("GET"))
        .and(path("/acme/report"))
        .respond_with(
            ResponseTemplate::new(203)
                .insert_header("etag", "\"v7\"")
                .set_body_string("rows"),
        )
        .mount(&server)
        .await;

    let report = build_call()
        .base_url(&server.uri())
        .args::<Tenant>()
        .method(HttpMethod::Get)
        .path_with(|tenant: &Tenant| format!("/{}/report", tenant.name))
        .parse_response(|response: HttpResponse, tenant: std::sync::Arc<Tenant>| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            let etag = response
                .headers()
                .get("etag")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-")
                .to_string();
            Ok::<_, BoxError>(format!(
                "{}:{}:{}:{}",
                tenant.name,
                response.status().as_u16(),
                etag,
                response.text()
            ))
        })
        .map(|summary, tenant: &Tenant| format!("{summary}|{}", tenant.name.len()))
        .build()
        .unwrap();

    assert_eq!(
        report.call(Tenant { name: "acme" }).await.unwrap(),
        "acme:203:\"v7\":rows|4"
    );
}

#[tokio::test]
async fn failing_response_parser_keeps_the_response() {
    let server = support::start().await;
    Mock::given(method("GET"))
        .and(path("/report"))
        .respond_with(ResponseTemplate::new(200).set_body_string("partial rows"))
        .mount(&server)
        .await;

    let err = build_call()
        .base_url(&server.uri())
        .method(HttpMethod::Get)
        .path("/report")
        .parse_response(|response: HttpResponse, _| async move {
            tokio::task::yield_now().await;
            if response.headers().contains_key("etag") {
                Ok(response.text())
            } else {
                Err("report is not versioned")
            }
        })
        .map(|text, _| text.len())
        .build()
        .unwrap()
        .send()
        .await
        .unwrap_err();

    assert!(err.is_pipeline());
    assert_eq!(unwrap_error(&err).to_string(), "report is not versioned");
    let pipeline = err.as_pipeline().unwrap();
    assert_eq!(pipeline.response().map(|r| r.status().as_u16()), Some(200));
    assert_eq!(pipeline.body_text(), Some("partial rows"));
    assert_eq!(error_kind(&err), ErrorKind::Callback);
}
