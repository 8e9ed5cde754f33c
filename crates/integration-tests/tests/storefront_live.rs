//! Live regions over server-sent events.

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use threadline_integration_tests::TestContext;

/// Read SSE frames named `event` until `count` have arrived.
async fn frames(response: &mut reqwest::Response, event: &str, count: usize) -> Vec<String> {
    let marker = format!("event: {event}\n");
    let mut buffer = String::new();
    loop {
        let complete = buffer.rsplit_once("\n\n").map_or("", |(done, _)| done);
        let found: Vec<String> = complete
            .split("\n\n")
            .filter(|block| block.starts_with(&marker) || block.contains(&format!("\n{marker}")))
            .map(str::to_string)
            .collect();
        if found.len() >= count {
            return found;
        }
        let chunk = response.chunk().await.unwrap().expect("stream ended early");
        buffer.push_str(&String::from_utf8_lossy(&chunk));
    }
}

#[tokio::test]
async fn test_hero_rotates_and_wraps_around() {
    let ctx = TestContext::storefront().await;
    Mock::given(method("GET"))
        .and(path("/api/banners"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": 1, "image": "/img/1.jpg", "title": "Sale"},
            {"_id": 2, "image": "/img/2.jpg", "title": "New"}
        ])))
        .mount(&ctx.api)
        .await;

    let mut response = ctx.browser.get(ctx.url("/live/hero")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");

    let received = tokio::time::timeout(Duration::from_secs(15), frames(&mut response, "hero", 2))
        .await
        .expect("two rotations within fifteen seconds");
    assert!(received[0].contains(r#"data-index="1""#));
    assert!(received[1].contains(r#"data-index="0""#));
}

#[tokio::test]
async fn test_unreachable_api_fails_the_region_with_a_message() {
    let ctx = TestContext::storefront().await;
    Mock::given(method("GET"))
        .and(path("/api/sales"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Sales are offline"})),
        )
        .mount(&ctx.api)
        .await;

    let response = ctx
        .browser
        .get(ctx.url("/live/sales"))
        .header("hx-request", "true")
        .send()
        .await
        .unwrap();
    assert!(response.text().await.unwrap().contains("Sales are offline"));
}
