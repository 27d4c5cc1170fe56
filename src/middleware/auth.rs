use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::decode_jwt;
use crate::error::ApiError;
use crate::schemas::UserRecord;
use crate::services::IdentityUser;
use crate::state::AppState;

/// Authenticated user, loaded from the users table
#[derive(Clone, Debug)]
pub struct AuthUser(pub UserRecord);

/// Caller on routes where authentication is optional
#[derive(Clone, Debug, Default)]
pub struct OptionalUser(pub Option<UserRecord>);

impl OptionalUser {
    pub fn is_pro(&self) -> bool {
        self.0.as_ref().is_some_and(UserRecord::is_pro)
    }
}

/// JWT authentication middleware that validates tokens and loads the user row
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(request.headers()).map_err(ApiError::unauthorized)?;

    let identity = verify_token(&state, &token)
        .await
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    let user = resolve_user(&state, identity, true).await;
    request.extensions_mut().insert(AuthUser(user));

    Ok(next.run(request).await)
}

/// Like `jwt_auth_middleware`, but a missing or invalid token yields an
/// anonymous caller instead of a 401. Unknown users are not created here.
pub async fn optional_auth_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let user = match extract_jwt_from_headers(request.headers()) {
        Ok(token) => match verify_token(&state, &token).await {
            Some(identity) => Some(resolve_user(&state, identity, false).await),
            None => None,
        },
        Err(_) => None,
    };

    request.extensions_mut().insert(OptionalUser(user));
    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = token.trim();
            if token.is_empty() {
                return Err("Empty JWT token".to_string());
            }
            Ok(token.to_string())
        }
        _ => Err("Authorization header must use Bearer token format".to_string()),
    }
}

/// The identity provider gets the first look at the token; locally signed
/// tokens are accepted as a fallback.
pub async fn verify_token(state: &AppState, token: &str) -> Option<IdentityUser> {
    match state.identity.get_user(token).await {
        Ok(Some(user)) => return Some(user),
        Ok(None) => {}
        Err(e) => tracing::debug!("Identity provider could not verify token: {}", e),
    }

    decode_jwt(token, &state.config.security)
        .ok()
        .filter(|claims| !claims.sub.is_empty())
        .map(|claims| IdentityUser { id: claims.sub, email: claims.email })
}

/// Loads the users row for an authenticated identity. With `create_missing`
/// a row is created when the identity carries an email. Falls back to a basic
/// free-tier record whenever the store cannot supply one.
pub async fn resolve_user(state: &AppState, identity: IdentityUser, create_missing: bool) -> UserRecord {
    match state.store.get_user_by_id(&identity.id).await {
        Ok(Some(user)) => return user,
        Ok(None) => {}
        Err(e) => tracing::warn!("Failed to load user {}: {}", identity.id, e),
    }

    let email = identity.email.unwrap_or_default();
    if create_missing && !email.is_empty() {
        match state.store.create_user(&identity.id, &email).await {
            Ok(user) => return user,
            Err(e) => tracing::warn!("Failed to create user {}: {}", identity.id, e),
        }
    }

    UserRecord::basic(identity.id, email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extracts_bearer_token() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(extract_jwt_from_headers(&headers("bearer abc")).unwrap(), "abc");
    }

    #[test]
    fn test_rejects_malformed_headers() {
        assert_eq!(extract_jwt_from_headers(&HeaderMap::new()).unwrap_err(), "Missing Authorization header");
        assert_eq!(
            extract_jwt_from_headers(&headers("Basic dXNlcjpwYXNz")).unwrap_err(),
            "Authorization header must use Bearer token format"
        );
        assert_eq!(extract_jwt_from_headers(&headers("Bearer   ")).unwrap_err(), "Empty JWT token");
    }
}
