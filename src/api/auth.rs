use actix_web::dev::Payload;
use actix_web::{web, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::errors::ApiError;
use crate::AppState;

/// Guard for mutating endpoints. Extraction succeeds only when the request
/// carries the configured admin bearer token; an empty configured token
/// rejects everything.
pub struct AdminAuth;

impl FromRequest for AdminAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let configured = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.admin_token.clone())
            .unwrap_or_default();

        let presented = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let authorized = !configured.is_empty() && presented == Some(configured.as_str());
        if authorized {
            ready(Ok(AdminAuth))
        } else {
            ready(Err(
                ApiError::Unauthorized("Требуется авторизация".to_string()).into()
            ))
        }
    }
}
