mod common;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};

use common::{parse_body, TestApp};

fn job(name: &str, email: &str) -> Value {
    json!({
        "category": "Eng",
        "name": name,
        "email": email,
        "job_title": "Backend Engineer",
        "job_posting_date": "2024-05-01",
        "application_deadline": "2024-06-01",
        "salary_range": "1000-2000",
        "job_applicants_number": 0,
        "image": "https://img.example/x.png",
        "job_description": "Build things"
    })
}

async fn create(app: &TestApp, cookie: &str, body: Value) -> Result<String> {
    let (status, ack) = app.call(Method::POST, "/jobs", Some(cookie), Some(body)).await?;
    assert_eq!(status, StatusCode::OK, "{}", ack);
    assert_eq!(ack["acknowledged"], true);
    Ok(ack["insertedId"].as_str().expect("insertedId").to_string())
}

#[tokio::test]
async fn create_then_get_by_id() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;

    let id = create(&app, &cookie, job("X", "a@b.com")).await?;
    let (status, body) = app
        .call(Method::GET, &format!("/jobs?id={}", id), Some(&cookie), None)
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], id);
    assert_eq!(body["name"], "X");
    assert_eq!(body["job_applicants_number"], 0);
    Ok(())
}

#[tokio::test]
async fn create_stores_unknown_fields_as_posted() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;

    let id = create(&app, &cookie, json!({ "name": "X", "remote": true })).await?;
    let (_, body) = app
        .call(Method::GET, &format!("/jobs?id={}", id), Some(&cookie), None)
        .await?;

    assert_eq!(body, json!({ "_id": id, "name": "X", "remote": true }));
    Ok(())
}

#[tokio::test]
async fn list_without_filters_returns_everything_in_order() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;

    for (name, email) in [("A", "a@b.com"), ("B", "c@d.com"), ("C", "a@b.com")] {
        create(&app, &cookie, job(name, email)).await?;
    }

    let (status, body) = app.call(Method::GET, "/jobs", Some(&cookie), None).await?;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body.as_array().unwrap().iter().map(|j| j["name"].clone()).collect();
    assert_eq!(names, vec![json!("A"), json!("B"), json!("C")]);
    Ok(())
}

#[tokio::test]
async fn email_filter_wins_over_id() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;

    create(&app, &cookie, job("A", "a@b.com")).await?;
    let other = create(&app, &cookie, job("B", "c@d.com")).await?;
    create(&app, &cookie, job("C", "a@b.com")).await?;

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/jobs?email=a@b.com&id={}", other),
            Some(&cookie),
            None,
        )
        .await?;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body.as_array().unwrap().iter().map(|j| j["name"].clone()).collect();
    assert_eq!(names, vec![json!("A"), json!("C")]);
    Ok(())
}

#[tokio::test]
async fn unknown_id_returns_null() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;

    let (status, body) = app
        .call(
            Method::GET,
            "/jobs?id=7b0c5f0e-3a1d-4c61-9a43-2f3c2b8e1a11",
            Some(&cookie),
            None,
        )
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
    Ok(())
}

#[tokio::test]
async fn malformed_id_is_a_bad_request() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;

    let (status, body) = app
        .call(Method::GET, "/jobs?id=not-an-id", Some(&cookie), None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = app
        .call(Method::DELETE, "/jobs?id=zzz", Some(&cookie), None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn deleting_twice_is_not_an_error() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;
    let id = create(&app, &cookie, job("X", "a@b.com")).await?;

    let uri = format!("/jobs?id={}", id);
    let (status, first) = app.call(Method::DELETE, &uri, Some(&cookie), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, json!({ "acknowledged": true, "deletedCount": 1 }));

    let (status, second) = app.call(Method::DELETE, &uri, Some(&cookie), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second, json!({ "acknowledged": true, "deletedCount": 0 }));

    let (_, body) = app.call(Method::GET, &uri, Some(&cookie), None).await?;
    assert_eq!(body, Value::Null);
    Ok(())
}

#[tokio::test]
async fn update_scopes_to_fixed_fields() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;
    let id = create(&app, &cookie, job("X", "a@b.com")).await?;

    let mut replacement = job("Y", "a@b.com");
    let fields = replacement.as_object_mut().unwrap();
    fields.remove("salary_range");
    fields.insert("featured".into(), json!(true));

    let (status, ack) = app
        .call(Method::PUT, &format!("/jobs/{}", id), Some(&cookie), Some(replacement))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["matchedCount"], 1);
    assert_eq!(ack["modifiedCount"], 1);

    let (_, stored) = app
        .call(Method::GET, &format!("/jobs?id={}", id), Some(&cookie), None)
        .await?;
    assert_eq!(stored["name"], "Y");
    assert!(stored.get("featured").is_none(), "unknown field persisted: {}", stored);
    assert!(stored.get("salary_range").is_none(), "missing field kept: {}", stored);
    assert_eq!(stored["_id"], id);
    Ok(())
}

#[tokio::test]
async fn update_of_unknown_job_matches_nothing() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;

    let (status, ack) = app
        .call(
            Method::PUT,
            "/jobs/7b0c5f0e-3a1d-4c61-9a43-2f3c2b8e1a11",
            Some(&cookie),
            Some(job("Y", "a@b.com")),
        )
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["matchedCount"], 0);
    assert_eq!(ack["modifiedCount"], 0);
    Ok(())
}

#[tokio::test]
async fn bodies_are_stored_without_type_checks() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;

    let posted = json!({ "name": "X", "salary_range": 5000, "job_applicants_number": "0" });
    let id = create(&app, &cookie, posted).await?;

    let (_, stored) = app
        .call(Method::GET, &format!("/jobs?id={}", id), Some(&cookie), None)
        .await?;
    assert_eq!(
        stored,
        json!({ "_id": id, "name": "X", "salary_range": 5000, "job_applicants_number": "0" })
    );

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/jobs/{}", id),
            Some(&cookie),
            Some(json!({ "salary_range": ["low", "high"], "job_applicants_number": null })),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, stored) = app
        .call(Method::GET, &format!("/jobs?id={}", id), Some(&cookie), None)
        .await?;
    assert_eq!(
        stored,
        json!({ "_id": id, "salary_range": ["low", "high"], "job_applicants_number": null })
    );
    Ok(())
}

#[tokio::test]
async fn non_object_body_is_rejected() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;

    let (status, body) = app
        .call(Method::POST, "/jobs", Some(&cookie), Some(json!([job("X", "a@b.com")])))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (_, listed) = app.call(Method::GET, "/jobs", Some(&cookie), None).await?;
    assert_eq!(listed, json!([]));
    Ok(())
}

#[tokio::test]
async fn delete_without_id_deletes_nothing() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;
    create(&app, &cookie, job("X", "a@b.com")).await?;
    let calls = app.store.calls();

    for uri in ["/jobs", "/jobs?id="] {
        let (status, ack) = app.call(Method::DELETE, uri, Some(&cookie), None).await?;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert_eq!(ack, json!({ "acknowledged": true, "deletedCount": 0 }));
    }
    assert_eq!(app.store.calls(), calls);

    let (_, listed) = app.call(Method::GET, "/jobs", Some(&cookie), None).await?;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn padded_id_does_not_match() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;
    let id = create(&app, &cookie, job("X", "a@b.com")).await?;

    let (status, _) = app
        .call(Method::GET, &format!("/jobs?id=%20{}", id), Some(&cookie), None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_reported() -> Result<()> {
    let app = TestApp::new();
    let cookie = app.login(json!({ "email": "a@b.com" })).await?;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/jobs")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))?;
    let response = app.send(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response).await?["code"], "INVALID_JSON");
    Ok(())
}
