#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Builder behavior observed through a recording transport.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use odata_client::{
    ClientError, EntityKey, EntitySet, Field, Operator, ResourceQuery, Service, SortDir,
    Transport, TransportResponse, func,
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Replays canned responses in order and records every requested path.
#[derive(Default)]
struct Recorder {
    responses: Mutex<VecDeque<Result<Value, ClientError>>>,
    paths: Mutex<Vec<String>>,
}

impl Recorder {
    fn replying<I>(responses: I) -> Arc<Self>
    where
        I: IntoIterator<Item = Result<Value, ClientError>>,
    {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            paths: Mutex::default(),
        })
    }

    fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn get(&self, path: &str) -> Result<TransportResponse, ClientError> {
        self.paths.lock().unwrap().push(path.to_owned());
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Null));
        next.map(TransportResponse::new)
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
struct Student {
    id: u64,
    code: String,
}

fn service(recorder: &Arc<Recorder>) -> Service {
    let sets = ["Students", "Courses"].map(|name| EntitySet {
        name: name.to_owned(),
        url: name.to_owned(),
        kind: Some("EntitySet".to_owned()),
    });
    Service::from_entity_sets(recorder.clone(), sets)
}

#[tokio::test]
async fn fetch_sends_rendered_query() {
    let recorder = Recorder::replying([Ok(json!([]))]);
    let mut students = service(&recorder).resource("students").unwrap();
    students
        .filter(["Campus", "Code"], Operator::Eq, "LAM")
        .order_by([("LastName", SortDir::Asc)])
        .select(["FirstName", "LastName"]);
    students.top(2).unwrap().skip(4).unwrap();

    students.fetch().await.unwrap();

    assert_eq!(
        recorder.paths(),
        vec![
            "/Students?$top=2&$skip=4&$filter=Campus/Code eq 'LAM'&$select=FirstName,LastName&$orderby=LastName asc"
        ]
    );
}

#[test]
fn custom_parameters_precede_query_options() {
    let recorder = Arc::new(Recorder::default());
    let mut students = service(&recorder).resource("students").unwrap();
    students
        .custom_params([("format", "json"), ("key", "6aggf62gf6")])
        .custom("format", "atom");

    assert_eq!(students.query(), "/Students?format=atom&key=6aggf62gf6");
    students.top(1).unwrap();
    assert_eq!(students.query(), "/Students?format=atom&key=6aggf62gf6&$top=1");
}

#[tokio::test]
async fn entity_by_key() {
    let recorder = Recorder::replying([Ok(json!({ "Id": 134, "Code": "LAM" }))]);
    let service = service(&recorder);

    let mut student = service.entity("students", &EntityKey::value(134)).unwrap();
    student.expand([Field::new("Campus").select(["Code"]).unwrap()]);

    let fetched: Student = student.fetch_as().await.unwrap();
    assert_eq!(
        fetched,
        Student {
            id: 134,
            code: "LAM".to_owned()
        }
    );
    assert_eq!(recorder.paths(), vec!["/Students(134)?$expand=Campus($select=Code)"]);

    let named = service
        .entity("students", &EntityKey::named("acmeId", 1234))
        .unwrap();
    assert_eq!(named.query(), "/Students(acmeId=1234)");
}

#[tokio::test]
async fn fetch_as_reports_shape_mismatch() {
    let recorder = Recorder::replying([Ok(json!("not a list"))]);
    let courses = service(&recorder).resource("courses").unwrap();
    let result = courses.fetch_as::<Vec<Value>>().await;
    assert!(matches!(result, Err(ClientError::Json(_))));
}

#[tokio::test]
async fn count_uses_current_filter() {
    let recorder = Recorder::replying([Ok(json!(7))]);
    let mut courses = service(&recorder).resource("courses").unwrap();
    courses
        .filter_expr(func("contains").field("Name").arg("Math"))
        .and("Credits", Operator::Ge, 3);

    assert_eq!(courses.count().await.unwrap(), 7);
    assert_eq!(
        recorder.paths(),
        vec!["/Courses/$count?$filter=contains(Name,'Math') and Credits ge 3"]
    );
}

#[tokio::test]
async fn page_error_is_yielded_once() {
    let recorder = Recorder::replying([
        Ok(json!("4")),
        Ok(json!([{ "Id": 1 }, { "Id": 2 }])),
        Err(ClientError::from_status(http::StatusCode::BAD_GATEWAY, None)),
        Ok(json!([{ "Id": 3 }, { "Id": 4 }])),
    ]);
    let mut students = service(&recorder).resource("students").unwrap();
    students.top(2).unwrap();

    let pages: Vec<_> = students.pages().collect().await;

    assert_eq!(pages.len(), 2);
    assert!(pages[0].is_ok());
    assert_eq!(
        pages[1].as_ref().unwrap_err().to_string(),
        "Request failed with status code 502"
    );
    assert_eq!(recorder.paths().len(), 3);
}

#[tokio::test]
async fn pagination_leaves_builder_on_last_page() {
    let recorder = Recorder::replying([
        Ok(json!(3)),
        Ok(json!([1])),
        Ok(json!([2])),
        Ok(json!([3])),
    ]);
    let mut students = service(&recorder).resource("students").unwrap();
    students.top(1).unwrap();

    let items: Vec<_> = students.items().map(Result::unwrap).collect().await;

    assert_eq!(items, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(students.top_value(), Some(1));
    assert_eq!(students.skip_value(), Some(2));
    assert_eq!(
        recorder.paths()[1..],
        ["/Students?$top=1", "/Students?$top=1&$skip=1", "/Students?$top=1&$skip=2"]
    );
}

#[test]
fn query_builder_rejects_invalid_paging() {
    let mut query = ResourceQuery::new(Arc::new(Recorder::default()), "Students");
    assert_eq!(
        query.top(0).unwrap_err().to_string(),
        "a $top clause must use a number strictly greater than 0, got 0"
    );
    assert!(query.skip(-3).is_err());
    assert_eq!(query.query(), "/Students");
}
