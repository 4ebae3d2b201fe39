//! Bearer-token middleware for Actix Web.
//!
//! Wrap any route or scope with this middleware to require a valid access token. It reads the
//! `Authorization: Bearer <token>` header, validates the token, and inserts the resulting
//! [`JwtClaims`] into the request extensions for handlers (via the `FromRequest` impl on
//! `JwtClaims`) and downstream middleware to consume.
//!
//! Requests without a valid token never reach the wrapped service, and no partially-validated
//! claims are ever attached.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::{debug, trace};

use crate::{
    auth::TokenIssuer,
    errors::{AuthError, ServerError},
};

pub struct JwtMiddlewareFactory {
    verifier: TokenIssuer,
}

impl JwtMiddlewareFactory {
    pub fn new(verifier: TokenIssuer) -> Self {
        JwtMiddlewareFactory { verifier }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService { verifier: self.verifier.clone(), service: Rc::new(service) }))
    }
}

pub struct JwtMiddlewareService<S> {
    verifier: TokenIssuer,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let verifier = self.verifier.clone();
        Box::pin(async move {
            trace!("🔐️ Checking bearer token for {}", req.path());
            let token = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|t| !t.is_empty());
            let token = match token {
                Some(t) => t,
                None => {
                    debug!("🔐️ No bearer token found in request. Denying access.");
                    return Err(ServerError::Unauthenticated(AuthError::MissingToken).into());
                },
            };
            match verifier.validate_token(token) {
                Ok(claims) => {
                    trace!("🔐️ Bearer token check for request ✅️");
                    req.extensions_mut().insert(claims);
                    service.call(req).await
                },
                Err(cause) => Err(ServerError::Unauthenticated(cause).into()),
            }
        })
    }
}
