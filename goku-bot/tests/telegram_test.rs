//! Telegram client and update handling against a mock Bot API.

mod common;

use common::{default_pipeline, test_config};
use goku_bot::handlers::commands::main_keyboard;
use goku_bot::handlers::updates::{UpdateHandler, APOLOGY_REPLY};
use goku_bot::services::classifier::CREATOR_REPLY;
use goku_bot::services::telegram::{BotError, TelegramClient, TelegramConfig, Update};
use goku_bot::startup::Application;
use secrecy::Secret;
use serde_json::json;
use service_core::error::AppError;
use service_core::retry::RetryConfig;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123456:test-token";

fn client_for(server: &MockServer) -> TelegramClient {
    let mut config = TelegramConfig::new(Secret::new(TOKEN.to_string()));
    config.base_url = server.uri();
    TelegramClient::new(config).unwrap()
}

fn api_path(method_name: &str) -> String {
    format!("/bot{}/{}", TOKEN, method_name)
}

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": result }))
}

fn sent_message(chat_id: i64) -> serde_json::Value {
    json!({ "message_id": 1, "chat": { "id": chat_id, "type": "private" }, "date": 0 })
}

fn text_update(chat_id: i64, text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 1,
        "message": {
            "message_id": 10,
            "chat": { "id": chat_id, "type": "private" },
            "from": { "id": 42, "is_bot": false, "first_name": "Amel" },
            "date": 0,
            "text": text
        }
    }))
    .unwrap()
}

async fn mount_get_me(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(api_path("getMe")))
        .respond_with(ok(json!({ "id": 1, "is_bot": true, "first_name": "Goku", "username": "goku_bot" })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn get_me_returns_bot_identity() {
    let server = MockServer::start().await;
    mount_get_me(&server).await;

    let me = client_for(&server).get_me().await.unwrap();

    assert!(me.is_bot);
    assert_eq!(me.username.as_deref(), Some("goku_bot"));
}

#[tokio::test]
async fn api_errors_carry_code_and_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("getMe")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_me().await.unwrap_err();

    match err {
        BotError::Api { code, description } => {
            assert_eq!(code, 401);
            assert_eq!(description, "Unauthorized");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn get_updates_sends_offset_and_parses_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("getUpdates")))
        .and(body_partial_json(json!({ "offset": 5, "timeout": 0 })))
        .respond_with(ok(json!([
            { "update_id": 5, "message": { "message_id": 1, "chat": { "id": 9 }, "text": "hi" } },
            { "update_id": 6, "callback_query": {
                "id": "cb1",
                "from": { "id": 3, "first_name": "Yanis" },
                "data": "help"
            } }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let updates = client_for(&server).get_updates(5, 0).await.unwrap();

    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].message.as_ref().and_then(|m| m.text.as_deref()), Some("hi"));
    assert_eq!(
        updates[1].callback_query.as_ref().and_then(|c| c.data.as_deref()),
        Some("help")
    );
}

#[tokio::test]
async fn send_message_attaches_keyboard() {
    let server = MockServer::start().await;
    let keyboard = main_keyboard();
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .and(body_partial_json(json!({
            "chat_id": 100,
            "text": "hi",
            "reply_markup": serde_json::to_value(&keyboard).unwrap()
        })))
        .respond_with(ok(sent_message(100)))
        .expect(1)
        .mount(&server)
        .await;

    let message = client_for(&server)
        .send_message(100, "hi", Some(&keyboard))
        .await
        .unwrap();

    assert_eq!(message.chat.id, 100);
}

#[tokio::test]
async fn creator_question_is_answered_over_telegram() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("sendChatAction")))
        .and(body_partial_json(json!({ "chat_id": 100, "action": "typing" })))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .and(body_partial_json(json!({ "chat_id": 100, "text": CREATOR_REPLY })))
        .respond_with(ok(sent_message(100)))
        .expect(1)
        .mount(&server)
        .await;

    let handler = UpdateHandler::new(client_for(&server), Arc::new(default_pipeline().pipeline));
    handler.handle_update(text_update(100, "قوكو من صنعك")).await;
}

#[tokio::test]
async fn keyboard_callback_runs_command() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("answerCallbackQuery")))
        .and(body_partial_json(json!({ "callback_query_id": "cb1" })))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .and(body_partial_json(json!({
            "chat_id": 100,
            "text": "📊 لم تقم بأي ترجمة بعد. أرسل نصاً لتبدأ!"
        })))
        .respond_with(ok(sent_message(100)))
        .expect(1)
        .mount(&server)
        .await;

    let update: Update = serde_json::from_value(json!({
        "update_id": 2,
        "callback_query": {
            "id": "cb1",
            "from": { "id": 42, "first_name": "Amel" },
            "message": { "message_id": 10, "chat": { "id": 100 } },
            "data": "stats"
        }
    }))
    .unwrap();

    let handler = UpdateHandler::new(client_for(&server), Arc::new(default_pipeline().pipeline));
    handler.handle_update(update).await;
}

#[tokio::test]
async fn start_command_sends_keyboard_without_typing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("sendChatAction")))
        .respond_with(ok(json!(true)))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .and(body_partial_json(json!({
            "chat_id": 100,
            "reply_markup": serde_json::to_value(main_keyboard()).unwrap()
        })))
        .respond_with(ok(sent_message(100)))
        .expect(1)
        .mount(&server)
        .await;

    let handler = UpdateHandler::new(client_for(&server), Arc::new(default_pipeline().pipeline));
    handler.handle_update(text_update(100, "/start@goku_bot")).await;
}

#[tokio::test]
async fn failed_send_is_followed_by_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("sendChatAction")))
        .respond_with(ok(json!(true)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .and(body_partial_json(json!({ "text": CREATOR_REPLY })))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "ok": false,
            "error_code": 500,
            "description": "Internal Server Error"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path("sendMessage")))
        .and(body_partial_json(json!({ "chat_id": 100, "text": APOLOGY_REPLY })))
        .respond_with(ok(sent_message(100)))
        .expect(1)
        .mount(&server)
        .await;

    let handler = UpdateHandler::new(client_for(&server), Arc::new(default_pipeline().pipeline));
    handler.handle_update(text_update(100, "goku who created you")).await;
}

#[tokio::test]
async fn application_starts_after_token_check() {
    let server = MockServer::start().await;
    mount_get_me(&server).await;

    let app = Application::build_with_providers(
        test_config(&[]),
        client_for(&server),
        None,
        None,
        RetryConfig::no_retry(),
    )
    .await
    .expect("application should build");

    assert_ne!(app.port(), 0);
}

#[tokio::test]
async fn token_check_is_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("getMe")))
        .respond_with(ResponseTemplate::new(502).set_body_json(json!({
            "ok": false,
            "error_code": 502,
            "description": "Bad Gateway"
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_get_me(&server).await;

    let result = Application::build_with_providers(
        test_config(&[]),
        client_for(&server),
        None,
        None,
        RetryConfig::once(Duration::from_millis(10)),
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn invalid_token_prevents_startup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path("getMe")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false,
            "error_code": 401,
            "description": "Unauthorized"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = Application::build_with_providers(
        test_config(&[]),
        client_for(&server),
        None,
        None,
        RetryConfig::no_retry(),
    )
    .await;

    assert!(matches!(result, Err(AppError::BadGateway(_))));
}
