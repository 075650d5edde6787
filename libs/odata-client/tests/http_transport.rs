#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end tests against a mock `OData` service: bootstrap, query rendering on the
//! wire, payload unwrapping, `$count` handling and error mapping.

use std::sync::Arc;

use futures_util::StreamExt;
use httpmock::prelude::*;
use odata_client::{ClientConfig, ClientError, HttpTransport, Operator, Service, Transport};
use serde_json::json;

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.base_url()).allow_insecure_http()
}

fn transport(server: &MockServer) -> Arc<HttpTransport> {
    Arc::new(HttpTransport::new(&config(server)).unwrap())
}

fn mock_service_root(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET).path("/");
        then.status(200)
            .header("content-type", "application/json; odata.metadata=minimal")
            .json_body(json!({
                "@odata.context": "$metadata",
                "value": [
                    { "name": "Students", "url": "Students", "kind": "EntitySet" },
                    { "name": "ClassSections", "url": "ClassSections", "kind": "EntitySet" }
                ]
            }));
    })
}

#[tokio::test]
async fn bootstrap_and_filtered_fetch() {
    let server = MockServer::start();
    let root = mock_service_root(&server);
    let students = server.mock(|when, then| {
        when.method(GET)
            .path("/Students")
            .query_param("$filter", "Code eq 'LAM'")
            .header("accept", "application/json,text/plain");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "value": [{ "Id": 1, "Code": "LAM" }] }));
    });

    let service = Service::from_config(&config(&server)).await.unwrap();
    let mut query = service.resource("students").unwrap();
    query.filter("Code", Operator::Eq, "LAM");
    let data = query.fetch().await.unwrap();

    assert_eq!(data, json!([{ "Id": 1, "Code": "LAM" }]));
    root.assert_calls(1);
    students.assert_calls(1);
}

#[tokio::test]
async fn unknown_resource_is_rejected_without_request() {
    let server = MockServer::start();
    mock_service_root(&server);

    let service = Service::connect(transport(&server)).await.unwrap();
    let err = service.resource("professors").unwrap_err();

    assert!(matches!(err, ClientError::UnknownResource(ref name) if name == "professors"));
    assert_eq!(err.to_string(), "invalid resource name professors");
}

#[tokio::test]
async fn count_accepts_plain_text() {
    let server = MockServer::start();
    let count = server.mock(|when, then| {
        when.method(GET)
            .path("/Students/$count")
            .query_param("$filter", "Age gt 18");
        then.status(200).header("content-type", "text/plain").body("42");
    });

    let service = Service::from_entity_sets(
        transport(&server),
        [odata_client::EntitySet {
            name: "Students".to_owned(),
            url: "Students".to_owned(),
            kind: None,
        }],
    );
    let mut query = service.resource("students").unwrap();
    query.filter("Age", Operator::Gt, 18);

    assert_eq!(query.count().await.unwrap(), 42);
    count.assert_calls(1);
}

#[tokio::test]
async fn count_rejects_html() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Students/$count");
        then.status(200).header("content-type", "text/html").body("<p>5</p>");
    });

    let err = transport(&server).get("/Students/$count").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid content type for $count request text/html"
    );
}

#[tokio::test]
async fn non_json_payload_is_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Students");
        then.status(200).header("content-type", "text/plain").body("Students");
    });

    let err = transport(&server).get("/Students").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidContentType(ref ct) if ct == "text/plain"));
}

#[tokio::test]
async fn service_error_message_is_surfaced() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Students");
        then.status(400)
            .header("content-type", "application/json")
            .json_body(json!({ "error": { "code": "", "message": "Invalid URL query" } }));
    });

    let err = transport(&server).get("/Students").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid URL query");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
}

#[tokio::test]
async fn status_code_message_without_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/Students");
        then.status(500);
    });

    let err = transport(&server).get("/Students").await.unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status code 500");
}

#[tokio::test]
async fn configured_headers_are_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/Students")
            .header("authorization", "Bearer token");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "value": [] }));
    });

    let config = config(&server).with_header("Authorization", "Bearer token");
    let transport = HttpTransport::new(&config).unwrap();
    let response = transport.get("/Students").await.unwrap();

    assert_eq!(response.data, json!([]));
    mock.assert_calls(1);
}

#[tokio::test]
async fn pages_walk_the_collection() {
    let server = MockServer::start();
    let count = server.mock(|when, then| {
        when.method(GET).path("/Students/$count");
        then.status(200).header("content-type", "text/plain").body("3");
    });
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/Students")
            .query_param("$top", "2")
            .query_param_missing("$skip");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "value": [{ "Id": 1 }, { "Id": 2 }] }));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/Students")
            .query_param("$top", "2")
            .query_param("$skip", "2");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "value": [{ "Id": 3 }] }));
    });

    let mut query = odata_client::ResourceQuery::new(transport(&server), "Students");
    query.top(2).unwrap();
    let ids: Vec<_> = query
        .items()
        .map(|item| item.unwrap()["Id"].as_u64().unwrap())
        .collect()
        .await;

    assert_eq!(ids, vec![1, 2, 3]);
    count.assert_calls(1);
    first.assert_calls(1);
    second.assert_calls(1);
}

#[tokio::test]
async fn reserved_characters_in_literals_stay_inside_the_filter() {
    let server = MockServer::start();
    let products = server.mock(|when, then| {
        when.method(GET)
            .path("/Products")
            .query_param("$filter", "Name eq 'Fish & Chips' and Discount eq '50%'")
            .query_param("$top", "2");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "value": [{ "Name": "Fish & Chips" }] }));
    });

    let mut query = odata_client::ResourceQuery::new(transport(&server), "Products");
    query
        .filter("Name", Operator::Eq, "Fish & Chips")
        .and("Discount", Operator::Eq, "50%");
    query.top(2).unwrap();
    let data = query.fetch().await.unwrap();

    assert_eq!(data, json!([{ "Name": "Fish & Chips" }]));
    products.assert_calls(1);
}
