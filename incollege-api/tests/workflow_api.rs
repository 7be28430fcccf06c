mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{error_kind, TestApp};
use incollege_api::config::AppConfig;
use incollege_shared::middleware::issue_jwt;
use incollege_shared::types::auth::Claims;

fn job(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Help the team ship",
        "employer": "Acme",
        "location": "Tampa, FL",
        "salary": "$45,000",
    })
}

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"][0]["name"], "database");
}

#[tokio::test]
async fn signup_login_and_profile() {
    let app = TestApp::new();
    let token = app.register("alice", "standard").await;

    let (status, body) = app.get("/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["university"], "University Of South Florida");
    assert_eq!(body["data"]["tier"], "standard");

    let (status, _) = app.post("/edit-profile", Some(&token), json!({ "years_attended": 2 })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app
        .post("/edit-profile", Some(&token), json!({ "bio": "hi", "major": "art" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&body), "invalid_input");

    let (_, body) = app.get("/profile", Some(&token)).await;
    assert_eq!(body["data"]["years_attended"], 2);

    let (_, body) = app.get("/list-users", None).await;
    assert_eq!(body["data"][0]["firstname"], "Alice");
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let app = TestApp::new();
    app.register("alice", "standard").await;

    let (status, body) = app
        .post(
            "/add-user",
            None,
            json!({
                "username": "alice",
                "firstname": "Other",
                "lastname": "Person",
                "passwordHash": "x",
                "tier": "plus",
                "university": "ucf",
                "major": "math",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "E2001");

    let (_, body) = app.get("/list-users", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn signup_cap_and_bad_tier() {
    let app = TestApp::with_config(AppConfig { max_users: 1, ..AppConfig::default() });
    app.register("alice", "standard").await;

    let mut body = json!({
        "username": "bob",
        "firstname": "Bob",
        "lastname": "B",
        "passwordHash": "x",
        "tier": "gold",
        "university": "ucf",
        "major": "math",
    });
    let (status, _) = app.post("/add-user", None, body.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    body["tier"] = json!("plus");
    let (status, resp) = app.post("/add-user", None, body).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(error_kind(&resp), "resource_exhausted");
}

#[tokio::test]
async fn credentials_are_checked_before_the_store() {
    let app = TestApp::new();
    app.register("alice", "standard").await;

    let (status, _) = app
        .post("/login", None, json!({ "username": "alice", "passwordHash": "wrong" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/connections", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/connections", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // well-signed token for an account that does not exist
    let ghost = issue_jwt(&Claims::new(999, "ghost", 3600), &app.config.jwt_secret).unwrap();
    let (status, _) = app.get("/profile", Some(&ghost)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_bodies_are_invalid_input() {
    let app = TestApp::new();
    let token = app.register("alice", "standard").await;

    let (status, body) = app
        .post("/make-connection-request", Some(&token), json!({ "username": "bob", "extra": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&body), "invalid_input");

    let (status, _) = app.post("/mark", Some(&token), json!({ "job_id": "seven" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/post-job", Some(&token), json!({ "title": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn connection_request_accept_and_disconnect() {
    let app = TestApp::new();
    let alice = app.register("alice", "standard").await;
    let bob = app.register("bob", "standard").await;
    let carol = app.register("carol", "standard").await;

    let (status, _) = app.post("/make-connection-request", Some(&alice), json!({ "username": "bob" })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/make-connection-request", Some(&bob), json!({ "username": "alice" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app.post("/make-connection-request", Some(&carol), json!({ "username": "bob" })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/pending-requests", Some(&bob)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = app
        .post(
            "/accept-requests",
            Some(&bob),
            json!({
                "users-to-accept": [{ "username": "alice" }],
                "users-to-deny": [{ "username": "alice" }, { "username": "carol" }, { "username": "zed" }],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["accepted"], json!([{ "username": "alice" }]));
    assert_eq!(body["data"]["denied"], json!([{ "username": "carol" }]));
    assert_eq!(body["data"]["ignored"], json!([{ "username": "alice" }, { "username": "zed" }]));

    let (_, body) = app.get("/connections", Some(&alice)).await;
    assert_eq!(body["data"][0]["username"], "bob");
    let (_, body) = app.get("/connections", Some(&bob)).await;
    assert_eq!(body["data"][0]["username"], "alice");

    // friend profile follows the connection
    let bob_id = body["data"][0]["id"].as_i64().unwrap();
    let (status, _) = app.post("/friend-profile", Some(&carol), json!({ "id": bob_id })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post("/disconnect", Some(&carol), json!({ "username": "bob" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.post("/disconnect", Some(&bob), json!({ "username": "carol" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post("/disconnect", Some(&bob), json!({ "username": "alice" })).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/connections", Some(&alice)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn alice_bob_expired_application_scenario() {
    let app = TestApp::new();
    let alice = app.register("alice", "standard").await;
    let bob = app.register("bob", "standard").await;

    let (status, body) = app.post("/post-job", Some(&alice), job("Intern")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["salary"], 45000);
    let job_id = body["data"]["id"].as_i64().unwrap();

    let application = json!({
        "job_id": job_id,
        "graduation_date": "05/01/2026",
        "ideal_start_date": "06/01/2026",
        "cover_letter": "I would love to intern",
    });

    let (status, _) = app.post("/apply", Some(&alice), application.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/apply", Some(&bob), application.clone()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/apply", Some(&bob), application).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = app.get("/applications", Some(&bob)).await;
    assert_eq!(body["data"][0]["title"], "Intern");

    let (status, _) = app.post("/delete-job", Some(&bob), json!({ "job_id": job_id })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.post("/delete-job", Some(&alice), json!({ "job_id": job_id })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/job-postings", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = app.get("/expired-applications", Some(&bob)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{ "job_id": job_id, "title": "Intern" }]));

    let (_, body) = app.get("/expired-applications", Some(&bob)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn posting_cap_and_marks() {
    let app = TestApp::new();
    let alice = app.register("alice", "standard").await;
    let bob = app.register("bob", "plus").await;

    let mut ids = Vec::new();
    for i in 0..10 {
        let (status, body) = app.post("/post-job", Some(&alice), job(&format!("Job {i}"))).await;
        assert_eq!(status, StatusCode::OK);
        ids.push(body["data"]["id"].as_i64().unwrap());
    }

    let (status, body) = app.post("/post-job", Some(&bob), job("One too many")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "E4003");

    let (status, _) = app.post("/mark", Some(&bob), json!({ "job_id": ids[1] })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/mark", Some(&bob), json!({ "job_id": ids[1] })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, body) = app.get("/marked", Some(&bob)).await;
    assert_eq!(body["data"], json!([ids[1]]));

    let (status, _) = app.post("/unmark", Some(&bob), json!({ "job_id": ids[2] })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.post("/delete-job", Some(&alice), json!({ "job_id": ids[0] })).await;
    let (status, _) = app.post("/post-job", Some(&bob), job("Now it fits")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/unapplied", Some(&bob)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 9);
    let (_, body) = app.get("/jobs-posted", Some(&bob)).await;
    assert_eq!(body["data"][0]["title"], "Now it fits");

    let (status, _) = app.post("/post-job", Some(&bob), json!({
        "title": "Bad pay", "description": "d", "employer": "e", "location": "l", "salary": "45000",
    })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn messaging_gate_and_read_tracking() {
    let app = TestApp::new();
    let alice = app.register("alice", "standard").await;
    let bob = app.register("bob", "standard").await;
    let pat = app.register("pat", "plus").await;

    let (status, body) = app
        .post("/start-conversation", Some(&alice), json!({ "username": "bob", "content": "hi" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_kind(&body), "forbidden");

    let (status, _) = app
        .post("/start-conversation", Some(&pat), json!({ "username": "bob", "content": "hello bob" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post("/start-conversation", Some(&bob), json!({ "username": "pat", "content": "again" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .post("/message", Some(&pat), json!({ "username": "bob", "content": "are you there?" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/unread-messages", Some(&bob)).await;
    assert_eq!(body["data"][0]["username"], "pat");
    assert_eq!(body["data"][0]["num_unread"], 2);

    let (_, first) = app.post("/messages", Some(&bob), json!({ "username": "pat" })).await;
    assert_eq!(first["data"][0]["read"], false);
    assert_eq!(first["data"][0]["firstname"], "Pat");
    assert_eq!(first["data"][1]["content"], "are you there?");

    let (_, second) = app.post("/messages", Some(&bob), json!({ "username": "pat" })).await;
    assert_eq!(second["data"][0]["read"], true);
    assert_eq!(second["data"][1]["read"], true);

    let (_, body) = app.get("/unread-messages", Some(&bob)).await;
    assert_eq!(body["data"][0]["num_unread"], 0);

    let (status, _) = app.post("/delete-conversation", Some(&bob), json!({ "username": "pat" })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/messages", Some(&bob), json!({ "username": "pat" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn notifications_are_delivered_once_per_menu() {
    let app = TestApp::new();
    let alice = app.register("alice", "standard").await;
    let bob = app.register("bob", "standard").await;
    app.post("/post-job", Some(&bob), job("Barista")).await;

    let (status, body) = app.post("/notifications", Some(&alice), json!({ "context": "main" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([
            { "content": "Bob Tester has joined InCollege." },
            { "content": "A new job \"Barista\" has been posted" },
        ])
    );

    let (_, body) = app.post("/notifications", Some(&alice), json!({ "context": "main" })).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (_, body) = app
        .post("/notifications", Some(&alice), json!({ "menu": "job search/internship" }))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app.post("/notifications", Some(&bob), json!({ "context": "main" })).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = app.post("/notifications", Some(&bob), json!({ "context": "settings" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn job_history_and_preferences() {
    let app = TestApp::new();
    let token = app.register("alice", "standard").await;

    for _ in 0..3 {
        let (status, _) = app
            .post(
                "/add-job-history",
                Some(&token),
                json!({ "title": "Tutor", "employer": "USF", "start_date": "01/10/2023", "end_date": "05/01/2023" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = app
        .post(
            "/add-job-history",
            Some(&token),
            json!({ "title": "Tutor", "employer": "USF", "start_date": "01/10/2023", "end_date": "05/01/2023" }),
        )
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (_, body) = app.get("/job-history", Some(&token)).await;
    let id = body["data"][0]["id"].as_i64().unwrap();
    assert_eq!(body["data"][0]["start_date"], "2023-01-10");

    let (status, _) = app
        .post("/edit-job-history", Some(&token), json!({ "id": id, "location": "Tampa" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post("/remove-job-history", Some(&token), json!({ "id": id })).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app.get("/job-history", Some(&token)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app.get("/user-preferences", Some(&token)).await;
    assert_eq!(body["data"]["language"], "english");
    let (status, _) = app
        .post("/set-user-preferences", Some(&token), json!({ "language": "spanish" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .post("/set-user-preferences", Some(&token), json!({ "language": "klingon" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = app.get("/user-preferences", Some(&token)).await;
    assert_eq!(body["data"]["language"], "spanish");
}

#[tokio::test]
async fn lookup_filters_directory() {
    let app = TestApp::new();
    app.register("alice", "standard").await;
    app.register("bob", "standard").await;

    let (status, body) = app.post("/lookup-user", None, json!({ "firstname": "Bob" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["matches"], json!([{ "username": "bob", "firstname": "Bob", "lastname": "Tester" }]));

    let (status, _) = app.post("/lookup-user", None, json!({ "username": "bob" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
