//! Integration tests for the Telegram notifier

use crate::test_utils::{http_client, mock_telegram_ok, sent_messages, telegram_settings, CHAT_ID};
use pricewatch::error::NotifyError;
use pricewatch::models::{AlertNotification, AlertRule};
use pricewatch::services::{Notifier, TelegramNotifier};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn alert() -> AlertNotification {
    AlertNotification::new(&AlertRule::new("AAPL", ">= 150", "take profit"), 152.3)
}

#[tokio::test]
async fn send_posts_html_message_to_configured_chat() {
    let server = MockServer::start().await;
    mock_telegram_ok(&server).await;

    let notifier = TelegramNotifier::new(http_client(), telegram_settings(&server));
    notifier.send(&alert()).await.expect("delivered");

    let messages = sent_messages(&server).await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["chat_id"], CHAT_ID);
    assert_eq!(messages[0]["parse_mode"], "HTML");

    let text = messages[0]["text"].as_str().expect("text");
    assert!(text.contains("<b>AAPL</b>"));
    assert!(text.contains("$152.30"));
    assert!(text.contains("&gt;= 150"));
    assert!(text.contains("take profit"));
}

#[tokio::test]
async fn rejected_request_surfaces_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::new(http_client(), telegram_settings(&server));
    let err = notifier.send(&alert()).await.unwrap_err();

    assert!(matches!(
        err,
        NotifyError::Status { status: 400, ref body } if body == "Bad Request: chat not found"
    ));
}

#[tokio::test]
async fn ok_false_reply_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "description": "bot was blocked" })),
        )
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::new(http_client(), telegram_settings(&server));
    let err = notifier.send(&alert()).await.unwrap_err();

    assert!(matches!(err, NotifyError::Rejected(ref reason) if reason == "bot was blocked"));
}
