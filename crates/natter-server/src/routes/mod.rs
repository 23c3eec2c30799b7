//! HTTP surface: per-resource routers merged into one app router.

pub mod chats;
pub mod contacts;
pub mod demo;
pub mod members;
pub mod weather;

use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use natter_store::Store;

use crate::weather::WeatherClient;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub weather: Arc<WeatherClient>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .merge(chats::router())
        .merge(contacts::router())
        .merge(members::router())
        .merge(demo::router())
        .merge(weather::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::auth::CALLER_HEADER;

    async fn test_app() -> (Router, Store) {
        let store = Store::open_in_memory().await.unwrap();
        // Points at nothing; the weather tests below never reach the network.
        let weather =
            Arc::new(WeatherClient::new("http://127.0.0.1:1".into(), "natter-tests").unwrap());
        let state = AppState {
            store: store.clone(),
            weather,
        };
        (build_router(state), store)
    }

    fn request(method: &str, uri: &str, caller: Option<i64>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(caller) = caller {
            builder = builder.header(CALLER_HEADER, caller.to_string());
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn seed_member(store: &Store, email: &str) -> i64 {
        store
            .insert_member(email, email, "Test", "Member")
            .await
            .unwrap()
            .member_id
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _store) = test_app().await;

        let response = app
            .oneshot(request("GET", "/health", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn chat_lifecycle_over_http() {
        let (app, store) = test_app().await;
        let a = seed_member(&store, "a@example.com").await;
        let b = seed_member(&store, "b@example.com").await;

        // Create a chat.
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/chats",
                None,
                Some(json!({ "name": "weekend plans" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let chat = response_json(response).await;
        let chat_id = chat["chat_id"].as_i64().unwrap();

        // Add both members.
        let response = app
            .clone()
            .oneshot(request(
                "PUT",
                &format!("/chats/{chat_id}/members"),
                None,
                Some(json!({ "member_ids": [a, b] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = response_json(response).await;
        assert_eq!(outcome["added"].as_array().unwrap().len(), 2);

        // Roster lists both profiles.
        let response = app
            .clone()
            .oneshot(request(
                "GET",
                &format!("/chats/{chat_id}/members"),
                None,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let roster = response_json(response).await;
        assert_eq!(roster.as_array().unwrap().len(), 2);

        // Remove one member by email.
        let response = app
            .clone()
            .oneshot(request(
                "DELETE",
                &format!("/chats/{chat_id}/members/a@example.com"),
                None,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = response_json(response).await;
        assert_eq!(outcome["member_id"].as_i64().unwrap(), a);

        // Lookup: the remaining member is in exactly one chat.
        let response = app
            .clone()
            .oneshot(request("GET", &format!("/chats/member/{b}"), None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let chats = response_json(response).await;
        assert_eq!(chats.as_array().unwrap().len(), 1);
        assert_eq!(chats[0]["chat_id"].as_i64().unwrap(), chat_id);
    }

    #[tokio::test]
    async fn malformed_chat_id_is_invalid_input() {
        let (app, _store) = test_app().await;

        let response = app
            .oneshot(request(
                "PUT",
                "/chats/abc/members",
                None,
                Some(json!({ "member_ids": [1] })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["error"]["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn removing_an_unknown_email_is_not_found() {
        let (app, store) = test_app().await;
        let chat = store.create_chat("lounge").await.unwrap();

        let response = app
            .oneshot(request(
                "DELETE",
                &format!("/chats/{}/members/nobody@example.com", chat.chat_id),
                None,
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response_json(response).await;
        assert_eq!(body["error"]["kind"], "not_found");
    }

    #[tokio::test]
    async fn contact_flow_over_http() {
        let (app, store) = test_app().await;
        let a = seed_member(&store, "a@example.com").await;
        let b = seed_member(&store, "b@example.com").await;

        // Without the caller header the request is rejected.
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/contacts",
                None,
                Some(json!({ "member_id": a })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // B requests A.
        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/contacts",
                Some(b),
                Some(json!({ "member_id": a })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let outcome = response_json(response).await;
        assert_eq!(outcome["verified"], false);

        // A sees the pending request and confirms it.
        let response = app
            .clone()
            .oneshot(request("GET", "/contacts/incoming", Some(a), None))
            .await
            .unwrap();
        let incoming = response_json(response).await;
        assert_eq!(incoming.as_array().unwrap().len(), 1);
        assert_eq!(incoming[0]["member_id"].as_i64().unwrap(), b);

        let response = app
            .clone()
            .oneshot(request(
                "POST",
                "/contacts",
                Some(a),
                Some(json!({ "member_id": b, "confirm": true })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = response_json(response).await;
        assert_eq!(outcome["verified"], true);

        // Both sides now list each other as verified.
        let response = app
            .clone()
            .oneshot(request("GET", "/contacts", Some(b), None))
            .await
            .unwrap();
        let contacts = response_json(response).await;
        assert_eq!(contacts.as_array().unwrap().len(), 1);
        assert_eq!(contacts[0]["verified"], true);
    }

    #[tokio::test]
    async fn duplicate_demo_note_is_a_conflict() {
        let (app, _store) = test_app().await;
        let body = json!({ "name": "greeting", "message": "hello" });

        let response = app
            .clone()
            .oneshot(request("POST", "/demo", None, Some(body.clone())))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(request("POST", "/demo", None, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = response_json(response).await;
        assert_eq!(body["error"]["kind"], "conflict");
    }

    #[tokio::test]
    async fn member_profile_contract() {
        let (app, store) = test_app().await;
        let a = seed_member(&store, "a@example.com").await;

        let response = app
            .clone()
            .oneshot(request("GET", &format!("/members/{a}"), None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let profile = response_json(response).await;
        assert_eq!(profile["email"], "a@example.com");

        let response = app
            .clone()
            .oneshot(request("GET", "/members/99", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .clone()
            .oneshot(request("GET", "/members/abc", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn weather_rejects_malformed_coordinates() {
        let (app, _store) = test_app().await;

        let response = app
            .oneshot(request("GET", "/weather/abc/-122.4", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response_json(response).await;
        assert_eq!(body["error"]["kind"], "invalid_input");
    }
}
