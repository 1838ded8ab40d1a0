use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use rent_a_goalie_back::{
    AppConfig,
    dao::{
        models::{ProfileEntity, UserEntity},
        store::MemoryStore,
    },
    routes,
    services::{
        auth_service::{hash_password, issue_token},
        notifier::MemoryNotifier,
    },
    state::{AppState, SharedState},
};

const SECRET: &str = "integration-secret";

struct TestApp {
    router: Router,
    state: SharedState,
    outbox: MemoryNotifier,
}

impl TestApp {
    async fn new() -> Self {
        let outbox = MemoryNotifier::new();
        let state = AppState::with_notifier(
            AppConfig::default().with_secret_key(SECRET),
            Arc::new(outbox.clone()),
        );
        state.set_store(Arc::new(MemoryStore::new())).await;
        Self {
            router: routes::router(state.clone()),
            state,
            outbox,
        }
    }

    /// Active user with a goalie profile and an API token.
    async fn user(&self, username: &str, is_staff: bool) -> (Uuid, String) {
        let store = self.state.require_store().await.unwrap();
        let user = UserEntity {
            id: Uuid::new_v4(),
            username: username.into(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: hash_password(SECRET, "testpassword"),
            is_staff,
            is_superuser: false,
            is_active: true,
            date_joined: std::time::SystemTime::now(),
        };
        let token = issue_token(user.id);
        let key = token.key.clone();
        let id = user.id;
        store.save_user(user).await.unwrap();
        store.save_profile(ProfileEntity::for_user(id)).await.unwrap();
        store.save_token(token).await.unwrap();
        (id, key)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let res = self.router.clone().oneshot(request).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }

    /// Renter with a rink and a published game. Returns the renter token and the game id.
    async fn game(&self, two_goalies_needed: bool) -> (String, String) {
        let (_, staff) = self.user("staff", true).await;
        let (status, location) = self
            .send(
                Method::POST,
                "/location/",
                Some(&staff),
                Some(json!({ "name": "Downtown Rink", "latitude": 45.5, "longitude": -73.6 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, renter) = self.user("renter", false).await;
        let (status, game) = self
            .send(
                Method::POST,
                "/game/",
                Some(&renter),
                Some(json!({
                    "location": location["id"],
                    "game_time": "2018-05-16T20:00:00Z",
                    "two_goalies_needed": two_goalies_needed,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        (renter, game["id"].as_str().unwrap().to_owned())
    }
}

#[tokio::test]
async fn apply_and_release_over_http() {
    let app = TestApp::new().await;
    let (renter, game) = app.game(true).await;
    let (seven, _) = app.user("seven", false).await;
    let (nine, _) = app.user("nine", false).await;
    let (three, _) = app.user("three", false).await;

    let slot = |goalie: Uuid| Some(json!({ "game": game, "goalie": goalie }));

    let (status, body) = app
        .send(Method::POST, "/apply/", Some(&renter), slot(seven))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["result"], "assigned");
    assert_eq!(body["slot"], 1);
    assert_eq!(body["message"], "Goalie saved");

    let (status, body) = app
        .send(Method::POST, "/apply/", Some(&renter), slot(nine))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["slot"], 2);

    let (status, body) = app
        .send(Method::POST, "/apply/", Some(&renter), slot(three))
        .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["result"], "full");

    let (status, body) = app
        .send(Method::POST, "/release/", Some(&renter), slot(seven))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["result"], "released");

    let (status, body) = app
        .send(Method::POST, "/release/", Some(&renter), slot(seven))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["result"], "not_assigned");

    let (status, body) = app
        .send(Method::POST, "/apply/", Some(&renter), slot(three))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["slot"], 1);

    let (status, body) = app
        .send(Method::GET, &format!("/game/{game}/"), Some(&renter), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["goalie_one"], three.to_string());
    assert_eq!(body["goalie_two"], nine.to_string());
}

#[tokio::test]
async fn apply_reports_missing_fields_and_unknown_games() {
    let app = TestApp::new().await;
    let (goalie, token) = app.user("goalie", false).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/apply/",
            Some(&token),
            Some(json!({ "goalie": goalie })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("'game'"));

    let (status, _) = app
        .send(
            Method::POST,
            "/apply/",
            Some(&token),
            Some(json!({ "game": Uuid::new_v4(), "goalie": goalie })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::POST,
            "/release/",
            Some(&token),
            Some(json!({ "game": Uuid::new_v4(), "goalie": goalie })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.state.game_locks().is_empty());
}

#[tokio::test]
async fn non_string_and_undecodable_bodies_are_bad_requests() {
    let app = TestApp::new().await;
    let (_, token) = app.user("goalie", false).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/apply/",
            Some(&token),
            Some(json!({ "game": 7, "goalie": 9 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("'game'"));

    let (status, body) = app
        .send(
            Method::POST,
            "/release/",
            Some(&token),
            Some(json!({ "game": "", "goalie": 9 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("'game'"));

    let (status, body) = app
        .send(Method::POST, "/apply/", Some(&token), Some(json!([1, 2])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = TestApp::new().await;

    let (status, _) = app.send(Method::GET, "/game/", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::GET, "/game/", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["games"], "http://localhost:8000/game/");
}

#[tokio::test]
async fn registration_activation_and_login() {
    let app = TestApp::new().await;
    let credentials = json!({ "username": "testuser", "password": "testpassword" });

    let (status, user) = app
        .send(
            Method::POST,
            "/user/",
            None,
            Some(json!({
                "username": "testuser",
                "email": "test@example.com",
                "password": "testpassword",
                "first_name": "Hannah",
                "last_name": "Test",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["is_active"], false);
    assert!(user.get("password_hash").is_none());

    let (status, _) = app
        .send(Method::POST, "/api-token-auth/", None, Some(credentials.clone()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let sent = app.outbox.sent();
    assert_eq!(sent.len(), 1);
    let start = sent[0].body.find("/activate/").unwrap();
    let link = sent[0].body[start..].split_whitespace().next().unwrap().to_owned();

    let (status, body) = app.send(Method::GET, &link, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().starts_with("Thank you"));

    let (status, body) = app.send(Method::GET, &link, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Activation link is invalid!");

    let (status, body) = app
        .send(Method::POST, "/api-token-auth/", None, Some(credentials))
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_owned();
    assert_eq!(token.len(), 40);

    let (status, profile) = app
        .send(
            Method::GET,
            &format!("/profile/{}/", user["id"].as_str().unwrap()),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["is_goalie"], true);
    assert!(profile.get("access_token").is_none());
    assert!(profile.get("reset_token").is_none());
}

#[tokio::test]
async fn uniqueness_checks_are_public() {
    let app = TestApp::new().await;
    app.user("taken", false).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/check-username/",
            None,
            Some(json!({ "username": "taken" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unique"], false);

    let (status, body) = app
        .send(
            Method::POST,
            "/check-email/",
            None,
            Some(json!({ "email": "free@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["unique"], true);

    let (status, _) = app
        .send(Method::POST, "/check-email/", None, Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_the_renter_edits_a_game() {
    let app = TestApp::new().await;
    let (renter, game) = app.game(false).await;
    let (_, stranger) = app.user("stranger", false).await;
    let uri = format!("/game/{game}/");

    let (status, _) = app
        .send(
            Method::PATCH,
            &uri,
            Some(&stranger),
            Some(json!({ "skill_level": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::PATCH, &uri, Some(&renter), Some(json!({ "skill_level": 9 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .send(Method::PATCH, &uri, Some(&renter), Some(json!({ "skill_level": 1 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["skill_level"], 1);

    let (status, _) = app.send(Method::DELETE, &uri, Some(&renter), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.send(Method::GET, &uri, Some(&renter), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn messages_follow_the_visibility_rule() {
    let app = TestApp::new().await;
    let (renter, game) = app.game(false).await;
    let (goalie, goalie_token) = app.user("goalie", false).await;
    let (_, stranger) = app.user("stranger", false).await;

    let (status, _) = app
        .send(
            Method::POST,
            "/apply/",
            Some(&goalie_token),
            Some(json!({ "game": game, "goalie": goalie })),
        )
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let (status, message) = app
        .send(
            Method::POST,
            "/message/",
            Some(&goalie_token),
            Some(json!({ "game": game, "body": "On my way" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["sender_is_goalie"], true);

    let (_, listed) = app
        .send(Method::GET, "/message/", Some(&goalie_token), None)
        .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (_, listed) = app.send(Method::GET, "/message/", Some(&stranger), None).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, _) = app
        .send(
            Method::POST,
            "/message/",
            Some(&stranger),
            Some(json!({ "game": game, "body": "Hi" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::DELETE, &format!("/game/{game}/"), Some(&renter), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, listed) = app
        .send(Method::GET, "/message/", Some(&goalie_token), None)
        .await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn degraded_mode_answers_503() {
    let app = TestApp::new().await;
    let (_, token) = app.user("goalie", false).await;

    app.state.update_degraded(true);

    let (status, _) = app.send(Method::GET, "/game/", Some(&token), None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = app.send(Method::GET, "/healthcheck", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
}
