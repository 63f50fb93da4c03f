use crate::helpers::spawn_app;

#[tokio::test]
async fn home_serves_waitlist_form() {
    let app = spawn_app().await;

    let resp = app
        .api_client
        .get(format!("{}/", app.addr))
        .send()
        .await
        .expect("execute request");

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers().get("Content-Type").unwrap(),
        "text/html; charset=utf-8"
    );
    let html = resp.text().await.unwrap();
    assert!(html.contains(r#"action="/waitlist""#));
    assert!(html.contains(r#"method="post""#));
    assert!(html.contains(r#"name="email""#));
    // no flash message without a prior submission
    assert!(!html.contains("class=\"error\""));
    assert!(!html.contains("class=\"success\""));
}

#[tokio::test]
async fn submit_button_is_disabled_while_joining() {
    let app = spawn_app().await;

    let html = app.get_home_html().await;

    assert!(html.contains("b.disabled = true"));
    assert!(html.contains("Joining..."));
}
