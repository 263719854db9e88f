use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{AppState, routes};

pub mod auth;

pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .merge(routes::auth::session_router())
        .merge(routes::chores::router(&state))
        .merge(routes::grocery::router(&state))
        .merge(routes::exercises::router(&state))
        .merge(routes::routines::router(&state))
        .merge(routes::stats::router())
        .layer(from_fn_with_state(state.clone(), auth::require_auth));

    let api_routes = Router::new()
        .merge(routes::auth::public_router())
        .merge(protected_routes);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{AppState, test_support::TestEnvGuard};

    async fn setup_state() -> (TestEnvGuard, AppState) {
        let temp_root = std::env::temp_dir().join(format!("hearth-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_root).unwrap();

        let db_path = temp_root.join("db.sqlite");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.to_string_lossy());
        let env_guard = TestEnvGuard::new(&temp_root, db_url);

        let state = AppState::new().await.unwrap();

        (env_guard, state)
    }

    fn json_request(
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn signup(
        app: &Router,
        name: &str,
        email: &str,
        team_option: &str,
        team_name_or_code: &str,
    ) -> Value {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": "hunter2",
                    "team_option": team_option,
                    "team_name_or_code": team_name_or_code,
                })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    async fn create_chore(app: &Router, token: &str, body: Value) -> Value {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/chores", Some(token), Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    async fn toggle_chore(app: &Router, token: &str, chore_id: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/chores/{chore_id}/toggle"),
                Some(token),
                None,
            ))
            .await
            .unwrap();
        let status = response.status();
        (status, body_json(response).await)
    }

    #[tokio::test]
    async fn health_is_public() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let response = app
            .oneshot(json_request("GET", "/health", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(
            json.pointer("/data/status").and_then(Value::as_str),
            Some("healthy")
        );
    }

    #[tokio::test]
    async fn api_requires_session_token() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let response = app
            .oneshot(json_request("GET", "/api/chores", None, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json.get("success").and_then(Value::as_bool), Some(false));
        assert_eq!(
            json.get("message").and_then(Value::as_str),
            Some("Not authenticated")
        );
    }

    #[tokio::test]
    async fn signup_login_me_flow() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let signup_json = signup(&app, "Alex", "alex@example.com", "create", "Our Home").await;
        let invite_code = signup_json
            .pointer("/data/team/invite_code")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();
        assert_eq!(invite_code.len(), 6);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "alex@example.com", "password": "hunter2" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let login_json = body_json(response).await;
        let token = login_json
            .pointer("/data/token")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();

        let response = app
            .clone()
            .oneshot(json_request("GET", "/api/auth/me", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me_json = body_json(response).await;
        assert_eq!(
            me_json.pointer("/data/user/email").and_then(Value::as_str),
            Some("alex@example.com")
        );
        assert_eq!(
            me_json
                .pointer("/data/team_members")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(1)
        );

        // Wrong password is rejected.
        let response = app
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": "alex@example.com", "password": "wrong" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chore_toggle_awards_points_once_and_reverses() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let signup_json = signup(&app, "Alex", "alex@example.com", "create", "Our Home").await;
        let token = signup_json
            .pointer("/data/token")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();

        let chore_json = create_chore(
            &app,
            &token,
            json!({ "title": "Dishes", "frequency": "daily" }),
        )
        .await;
        let chore_id = chore_json
            .pointer("/data/id")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();
        assert_eq!(
            chore_json.pointer("/data/points").and_then(Value::as_i64),
            Some(10)
        );

        // First completion of the day awards points and the first badge.
        let (status, json) = toggle_chore(&app, &token, &chore_id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json.pointer("/data/points_earned").and_then(Value::as_i64),
            Some(10)
        );
        assert_eq!(
            json.pointer("/data/user_stats/total_points")
                .and_then(Value::as_i64),
            Some(10)
        );
        assert_eq!(
            json.pointer("/data/user_stats/current_streak")
                .and_then(Value::as_i64),
            Some(1)
        );
        let badge_ids: Vec<&str> = json
            .pointer("/data/new_badges")
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .filter_map(|badge| badge.get("id").and_then(Value::as_str))
            .collect();
        assert!(badge_ids.contains(&"first_chore"));

        // Un-completing the same day reverses the points but not the streak.
        let (status, json) = toggle_chore(&app, &token, &chore_id).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json.pointer("/data/points_earned").and_then(Value::as_i64),
            Some(-10)
        );
        assert_eq!(
            json.pointer("/data/user_stats/total_points")
                .and_then(Value::as_i64),
            Some(0)
        );
        assert_eq!(
            json.pointer("/data/user_stats/current_streak")
                .and_then(Value::as_i64),
            Some(1)
        );
        assert_eq!(
            json.pointer("/data/chore/is_completed")
                .and_then(Value::as_bool),
            Some(false)
        );
    }

    #[tokio::test]
    async fn only_the_responsible_member_may_toggle() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let signup_json = signup(&app, "Alex", "alex@example.com", "create", "Our Home").await;
        let owner_token = signup_json
            .pointer("/data/token")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();
        let invite_code = signup_json
            .pointer("/data/team/invite_code")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();

        let other_json = signup(&app, "Sam", "sam@example.com", "join", &invite_code).await;
        let other_token = other_json
            .pointer("/data/token")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();

        let chore_json = create_chore(
            &app,
            &owner_token,
            json!({ "title": "Dishes", "frequency": "daily" }),
        )
        .await;
        let chore_id = chore_json
            .pointer("/data/id")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();

        let (status, _) = toggle_chore(&app, &other_token, &chore_id).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = toggle_chore(&app, &owner_token, &chore_id).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn chores_not_due_today_are_filtered_unless_all() {
        let (_env_guard, state) = setup_state().await;
        let app = super::router(state);

        let signup_json = signup(&app, "Alex", "alex@example.com", "create", "Our Home").await;
        let token = signup_json
            .pointer("/data/token")
            .and_then(Value::as_str)
            .unwrap()
            .to_string();

        // Schedule a weekly chore for tomorrow's weekday only.
        use chrono::Datelike;
        let tomorrow = (chrono::Utc::now().date_naive() + chrono::Duration::days(1))
            .weekday()
            .num_days_from_sunday() as i64;
        create_chore(
            &app,
            &token,
            json!({ "title": "Laundry", "frequency": "weekly", "days_of_week": [tomorrow] }),
        )
        .await;

        let response = app
            .clone()
            .oneshot(json_request("GET", "/api/chores", Some(&token), None))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(
            json.pointer("/data").and_then(Value::as_array).map(Vec::len),
            Some(0)
        );

        let response = app
            .oneshot(json_request(
                "GET",
                "/api/chores?all=true",
                Some(&token),
                None,
            ))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(
            json.pointer("/data").and_then(Value::as_array).map(Vec::len),
            Some(1)
        );
    }
}
