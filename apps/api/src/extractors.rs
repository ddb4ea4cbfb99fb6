use actix_web::Error;
use actix_web::{FromRequest, HttpMessage};
use application::auth::dtos::Claims;
use futures::future::{ready, Ready};

/// Extractor for handlers that require an authenticated caller. The auth
/// middleware puts verified claims into request extensions; absence here
/// means the request carried no valid token.
pub struct AuthUser(pub Claims);

impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthUser(claims.clone()))),
            None => ready(Err(actix_web::error::ErrorUnauthorized("Unauthorized"))),
        }
    }
}

impl std::ops::Deref for AuthUser {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
