use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorUnauthorized,
    http::header,
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::task::{Context, Poll};

use crate::config::Config;
use application::auth::tokens;

pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // A missing Authorization header passes through (routes that need
        // auth reject via the AuthUser extractor); a present-but-invalid
        // header is a 401 outright.
        if let Some(auth_header_value) = req.headers().get(header::AUTHORIZATION) {
            if let Ok(auth_str) = auth_header_value.to_str() {
                if let Some(token) = auth_str
                    .strip_prefix("Bearer ")
                    .or_else(|| auth_str.strip_prefix("bearer "))
                {
                    if let Some(config) = req.app_data::<web::Data<Config>>() {
                        match tokens::verify_token(&config.jwt_secret, token) {
                            Ok(claims) => {
                                req.extensions_mut().insert(claims);
                            }
                            Err(_) => {
                                return Box::pin(async move {
                                    Err(ErrorUnauthorized("Invalid or expired token"))
                                });
                            }
                        }
                    }
                }
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res)
        })
    }
}
