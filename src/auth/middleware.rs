use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthenticatedUser, JwtService};

/// Resolves the bearer token if one is present; anonymous requests pass
/// through so public operations (login, health) keep working.
pub async fn optional_auth_middleware(
    State(jwt_service): State<JwtService>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "));

    if let Some(token) = auth_header {
        match jwt_service.verify_token(token) {
            Ok(claims) => {
                let user = AuthenticatedUser::from(claims);
                request.extensions_mut().insert(Some(user));
            }
            Err(_) => {
                // Invalid token - continue without auth
                request.extensions_mut().insert(None::<AuthenticatedUser>);
            }
        }
    } else {
        request.extensions_mut().insert(None::<AuthenticatedUser>);
    }

    Ok(next.run(request).await)
}
