use super::*;
use serde_json::json;
use stock_watcher::{Notifier, NotifyError, StockNotification, TrackedProduct};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v10/users/@me"))
        .and(header("authorization", format!("Bot {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "42",
            "username": "stockbot"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_connect_logs_in_and_resolves_channel() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v10/channels/{}", TEST_CHANNEL)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": TEST_CHANNEL,
            "name": "restocks"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = test_notifier(&server);
    assert_ok!(notifier.connect().await);
    server.verify().await;
}

#[tokio::test]
async fn test_connect_rejects_bad_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v10/users/@me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "401: Unauthorized",
            "code": 0
        })))
        .mount(&server)
        .await;

    let err = assert_err!(test_notifier(&server).connect().await);
    assert!(matches!(err, NotifyError::Unauthorized));
}

#[tokio::test]
async fn test_connect_reports_missing_channel() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v10/channels/{}", TEST_CHANNEL)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    match test_notifier(&server).connect().await {
        Err(NotifyError::ChannelNotFound(channel)) => assert_eq!(channel, TEST_CHANNEL),
        other => panic!("expected missing channel, got {:?}", other),
    }
}

#[tokio::test]
async fn test_send_posts_message_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(messages_path()))
        .and(header("authorization", format!("Bot {}", TEST_TOKEN).as_str()))
        .and(body_json(json!({ "content": "Widget is in stock: https://shop.example.com/widget" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1" })))
        .expect(1)
        .mount(&server)
        .await;

    let product = TrackedProduct::new("Widget", "https://shop.example.com/widget", ADD_TO_CART);
    let notifier = test_notifier(&server);
    assert_ok!(notifier.notify(&StockNotification::for_product(&product)).await);

    server.verify().await;
}

#[tokio::test]
async fn test_send_surfaces_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(messages_path()))
        .respond_with(ResponseTemplate::new(403).set_body_string("Missing Permissions"))
        .expect(1)
        .mount(&server)
        .await;

    match test_notifier(&server).send("hello").await {
        Err(NotifyError::Rejected { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "Missing Permissions");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    server.verify().await;
}

#[tokio::test]
async fn test_send_gives_up_on_unresponsive_discord() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(messages_path()))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let notifier = test_notifier_with_timeout(&server, 1);
    let started = tokio::time::Instant::now();

    let err = assert_err!(notifier.send("hello").await);
    match err {
        NotifyError::Http(e) => assert!(e.is_timeout(), "expected a timeout, got {}", e),
        other => panic!("expected transport timeout, got {:?}", other),
    }
    assert!(started.elapsed() < Duration::from_secs(4));
}
