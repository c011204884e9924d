use super::*;
use serde_json::json;
use std::sync::Arc;
use stock_watcher::{StockMonitor, TrackedProduct, Transition};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

async fn mount_page(server: &MockServer, route: &str, html: &str, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

#[tokio::test]
async fn test_widget_restock_end_to_end() -> anyhow::Result<()> {
    let shop = MockServer::start().await;
    let discord = MockServer::start().await;
    let widget_url = format!("{}/widget", shop.uri());

    // Tick 1 sees the sold-out page, every later tick the in-stock page
    mount_page(&shop, "/widget", SOLD_OUT_PAGE, Some(1)).await;
    mount_page(&shop, "/widget", IN_STOCK_PAGE, None).await;

    Mock::given(method("POST"))
        .and(path(messages_path()))
        .and(body_json(json!({ "content": format!("Widget is in stock: {}", widget_url) })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1" })))
        .expect(1)
        .mount(&discord)
        .await;

    let mut monitor = StockMonitor::new(
        vec![TrackedProduct::new("Widget", widget_url.clone(), ADD_TO_CART)],
        Arc::new(test_fetcher(3)),
        Arc::new(test_notifier(&discord)),
    );

    let tick1 = monitor.tick().await;
    assert_eq!(tick1.notifications_sent, 0);
    assert_eq!(tick1.transitions(), vec![("Widget".to_string(), Transition::Unchanged)]);
    assert!(!monitor.store().is_in_stock("Widget"));

    let tick2 = monitor.tick().await;
    assert_eq!(tick2.notifications_sent, 1);
    assert_eq!(tick2.transitions(), vec![("Widget".to_string(), Transition::BecameInStock)]);
    assert!(monitor.store().is_in_stock("Widget"));

    let tick3 = monitor.tick().await;
    assert_eq!(tick3.notifications_sent, 0);
    assert_eq!(tick3.transitions(), vec![("Widget".to_string(), Transition::Unchanged)]);

    discord.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_failing_product_does_not_block_sibling() -> anyhow::Result<()> {
    let shop = MockServer::start().await;
    let discord = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&shop)
        .await;
    mount_page(&shop, "/widget", IN_STOCK_PAGE, None).await;

    Mock::given(method("POST"))
        .and(path(messages_path()))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&discord)
        .await;

    let mut monitor = StockMonitor::new(
        vec![
            TrackedProduct::new("Broken", format!("{}/broken", shop.uri()), ADD_TO_CART),
            TrackedProduct::new("Widget", format!("{}/widget", shop.uri()), ADD_TO_CART),
        ],
        Arc::new(test_fetcher(3)),
        Arc::new(test_notifier(&discord)),
    );

    let report = monitor.tick().await;

    assert_eq!(report.checked, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.notifications_sent, 1);

    let broken = &report.results[0];
    assert_eq!(broken.product_name, "Broken");
    assert!(!broken.success);
    assert!(broken.error.as_ref().unwrap().contains("all 3 attempts failed"));
    assert!(monitor.store().get("Broken").unwrap().last_checked.is_none());

    let widget = &report.results[1];
    assert!(widget.success);
    assert_eq!(widget.transition, Some(Transition::BecameInStock));

    shop.verify().await;
    discord.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_discord_outage_does_not_resend() -> anyhow::Result<()> {
    let shop = MockServer::start().await;
    let discord = MockServer::start().await;

    mount_page(&shop, "/widget", IN_STOCK_PAGE, None).await;
    Mock::given(method("POST"))
        .and(path(messages_path()))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&discord)
        .await;

    let mut monitor = StockMonitor::new(
        vec![TrackedProduct::new("Widget", format!("{}/widget", shop.uri()), ADD_TO_CART)],
        Arc::new(test_fetcher(1)),
        Arc::new(test_notifier(&discord)),
    );

    let first = monitor.tick().await;
    assert_eq!(first.notify_failures, 1);

    let second = monitor.tick().await;
    assert_eq!(second.notify_failures, 0);
    assert_eq!(second.notifications_sent, 0);

    discord.verify().await;
    Ok(())
}
