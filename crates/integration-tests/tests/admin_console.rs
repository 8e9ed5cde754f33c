//! Admin console against the mock API.

use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use threadline_integration_tests::TestContext;

#[tokio::test]
async fn test_signed_out_operator_is_sent_to_login() {
    let ctx = TestContext::admin().await;
    let response = ctx.browser.get(ctx.url("/coupons")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/login");
}

#[tokio::test]
async fn test_percentage_coupon_of_150_reaches_the_api_unchanged() {
    let ctx = TestContext::admin().await;
    ctx.sign_in_admin().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/coupons"))
        .and(header("authorization", "Bearer admin-token"))
        .and(body_partial_json(json!({
            "code": "BIG150", "type": "percentage", "discount": 150.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": 12})))
        .expect(1)
        .mount(&ctx.api)
        .await;

    let response = ctx
        .browser
        .post(ctx.url("/coupons"))
        .header("hx-request", "true")
        .form(&[
            ("code", "big150"),
            ("type", "percentage"),
            ("discount", "150"),
            ("active", "on"),
        ])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-trigger"], "resourceChanged");
    assert!(response.text().await.unwrap().contains("Coupon saved"));
}

#[tokio::test]
async fn test_rejected_coupon_shows_the_server_message() {
    let ctx = TestContext::admin().await;
    ctx.sign_in_admin().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/coupons"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Code already exists"})),
        )
        .mount(&ctx.api)
        .await;

    let response = ctx
        .browser
        .post(ctx.url("/coupons"))
        .header("hx-request", "true")
        .form(&[("code", "spring"), ("type", "fixed"), ("discount", "10")])
        .send()
        .await
        .unwrap();

    let html = response.text().await.unwrap();
    assert!(html.contains("Code already exists"));
    assert!(html.contains(r#"value="spring""#));
}

#[tokio::test]
async fn test_non_admin_account_is_refused() {
    let ctx = TestContext::admin().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "shopper-token",
            "user": {"_id": 7, "email": "ada@example.com", "isAdmin": false}
        })))
        .mount(&ctx.api)
        .await;

    let response = ctx
        .browser
        .post(ctx.url("/login"))
        .form(&[("email", "ada@example.com"), ("password", "secret")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("not an administrator"));

    let after = ctx.browser.get(ctx.url("/products")).send().await.unwrap();
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
}
