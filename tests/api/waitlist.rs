use wiremock::matchers::any;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

use crate::helpers::assert_is_redirect_to;
use crate::helpers::mount_email_failure;
use crate::helpers::mount_email_ok;
use crate::helpers::spawn_app;
use crate::helpers::spawn_app_with;

#[tokio::test]
async fn join_records_entry_and_sends_one_email() {
    let app = spawn_app().await;
    mount_email_ok(&app.email_server, 1).await;

    let resp = app.join_waitlist("user@example.com").await;
    assert_is_redirect_to(&resp, "/");

    assert_eq!(app.store.emails(), vec!["user@example.com"]);
    let html = app.get_home_html().await;
    assert!(html.contains("Successfully joined the waitlist!"));
}

#[tokio::test]
async fn join_twice_is_duplicate() {
    let app = spawn_app().await;
    // only the first submission sends anything
    mount_email_ok(&app.email_server, 1).await;

    let resp = app.join_waitlist("User@Example.com").await;
    assert_is_redirect_to(&resp, "/");
    assert_eq!(app.store.emails(), vec!["user@example.com"]);
    app.get_home_html().await;

    let resp = app.join_waitlist("User@Example.com").await;
    assert_is_redirect_to(&resp, "/");

    assert_eq!(app.store.emails(), vec!["user@example.com"]);
    let html = app.get_home_html().await;
    assert!(html.contains("This email is already on the waitlist!"));
    assert!(!html.contains("Successfully joined the waitlist!"));
}

#[tokio::test]
async fn invalid_email_has_no_side_effects() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for email in ["bad-email", "", "john@localhost", "@example.com"] {
        let resp = app.join_waitlist(email).await;
        assert_is_redirect_to(&resp, "/");
        let html = app.get_home_html().await;
        assert!(html.contains("Please enter a valid email address."), "{email:?}");
    }

    assert!(app.store.emails().is_empty());
}

#[tokio::test]
async fn missing_field_is_400() {
    let app = spawn_app().await;

    for (body, msg) in [("", "empty body"), ("name=john", "no email field")] {
        let resp = app.post_waitlist(body).await;
        assert_eq!(resp.status().as_u16(), 400, "{msg}");
    }
    assert!(app.store.emails().is_empty());
}

#[tokio::test]
async fn delivery_failure_keeps_entry() {
    let app = spawn_app().await;
    mount_email_failure(&app.email_server, 1).await;

    let resp = app.join_waitlist("user@example.com").await;
    assert_is_redirect_to(&resp, "/");

    // no compensating delete
    assert_eq!(app.store.emails(), vec!["user@example.com"]);
    let html = app.get_home_html().await;
    assert!(html.contains("Something went wrong. Please try again."));
}

#[tokio::test]
async fn flash_message_is_shown_once() {
    let app = spawn_app().await;
    mount_email_ok(&app.email_server, 1).await;

    app.join_waitlist("user@example.com").await;

    let html = app.get_home_html().await;
    assert!(html.contains("Successfully joined the waitlist!"));
    let html = app.get_home_html().await;
    assert!(!html.contains("Successfully joined the waitlist!"));
}

#[tokio::test]
async fn remote_dispatcher_is_called_over_http() {
    let dispatcher = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": "abc" })))
        .expect(1)
        .mount(&dispatcher)
        .await;

    let dispatcher_url = dispatcher.uri();
    let app = spawn_app_with(|cfg| cfg.application.dispatcher_url = Some(dispatcher_url)).await;
    // the in-process dispatcher is bypassed
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let resp = app.join_waitlist("user@example.com").await;
    assert_is_redirect_to(&resp, "/");

    let request = &dispatcher.received_requests().await.unwrap()[0];
    let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(body, serde_json::json!({ "email": "user@example.com" }));
    assert!(app
        .get_home_html()
        .await
        .contains("Successfully joined the waitlist!"));
}

#[tokio::test]
async fn remote_dispatcher_failure_keeps_entry() {
    let dispatcher = MockServer::start().await;
    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(500).set_body_json(serde_json::json!({ "error": "Failed to send email" })),
        )
        .expect(1)
        .mount(&dispatcher)
        .await;

    let dispatcher_url = dispatcher.uri();
    let app = spawn_app_with(|cfg| cfg.application.dispatcher_url = Some(dispatcher_url)).await;

    app.join_waitlist("user@example.com").await;

    assert_eq!(app.store.emails(), vec!["user@example.com"]);
    assert!(app
        .get_home_html()
        .await
        .contains("Something went wrong. Please try again."));
}

#[tokio::test]
async fn accepted_email_with_unusual_payload_is_success() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": { "id": "abc" } })))
        .expect(1)
        .mount(&app.email_server)
        .await;

    app.join_waitlist("user@example.com").await;

    assert_eq!(app.store.emails(), vec!["user@example.com"]);
    let html = app.get_home_html().await;
    assert!(html.contains("Successfully joined the waitlist!"));
}
