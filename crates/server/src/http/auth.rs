use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use db::models::user::User;
use utils::response::ApiResponse;

use crate::AppState;

pub const SESSION_COOKIE: &str = "hearth_session";

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn parse_session_cookie(value: &str) -> Option<&str> {
    for pair in value.split(';') {
        let (name, token) = pair.trim().split_once('=')?;
        if name.trim() == SESSION_COOKIE {
            let token = token.trim();
            if token.is_empty() {
                return None;
            }
            return Some(token);
        }
    }
    None
}

fn extract_request_token(req: &Request) -> Option<String> {
    // 1) Authorization: Bearer <token>
    if let Some(value) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
    {
        return Some(value.to_string());
    }

    // 2) Session cookie set at signup/login
    if let Some(value) = req
        .headers()
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_session_cookie)
    {
        return Some(value.to_string());
    }

    None
}

/// The authenticated user, inserted into request extensions by
/// [`require_auth`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn unauthorized(req: &Request, reason: &'static str) -> Response {
    tracing::warn!(
        path = %req.uri().path(),
        method = %req.method(),
        reason,
        "Unauthorized API request"
    );

    let response = ApiResponse::<()>::error("Not authenticated");
    (StatusCode::UNAUTHORIZED, Json(response)).into_response()
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_request_token(&req) else {
        return unauthorized(&req, "missing_token");
    };

    let claims = match state.auth().verify_token(&token) {
        Ok(claims) => claims,
        Err(_) => return unauthorized(&req, "invalid_token"),
    };

    let user = match User::find_by_id(&state.db().pool, claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized(&req, "unknown_user"),
        Err(err) => {
            tracing::error!("Failed to load authenticated user: {}", err);
            let response = ApiResponse::<()>::error("Internal server error");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    };

    req.extensions_mut().insert(CurrentUser(user));
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_parsing_ignores_case_and_padding() {
        assert_eq!(parse_authorization_bearer("Bearer abc"), Some("abc"));
        assert_eq!(parse_authorization_bearer("bearer  abc "), Some("abc"));
        assert_eq!(parse_authorization_bearer("Basic abc"), None);
        assert_eq!(parse_authorization_bearer("Bearer "), None);
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        assert_eq!(
            parse_session_cookie("theme=dark; hearth_session=tok123; lang=en"),
            Some("tok123")
        );
        assert_eq!(parse_session_cookie("theme=dark"), None);
        assert_eq!(parse_session_cookie("hearth_session="), None);
    }
}
