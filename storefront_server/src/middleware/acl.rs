//! Access control middleware for the storefront server.
//! This middleware can be placed on any route or service.
//!
//! It reads the bearer token from the `Authorization` header, validates it with the [`JwtAuthority`] registered as
//! app data, and checks the token's roles against the roles required by the route. Valid claims are stored in the
//! request extensions, where the [`JwtClaims`] extractor picks them up.
//!
//! A missing or invalid token gets a 401 response. A valid token without the required roles gets a 403.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web,
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::{
    auth::{bearer_token, JwtAuthority, JwtClaims, Role},
    errors::{AuthError, ServerError},
};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AclMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let claims = match authenticate(&req) {
                Ok(claims) => claims,
                Err(e) => {
                    debug!("💻️ Rejecting request to {}. {e}", req.path());
                    return Ok(req.error_response(e).map_into_right_body());
                },
            };
            if !claims.has_roles(&required_roles) {
                let roles = required_roles.iter().map(|r| r.to_string()).collect::<Vec<_>>().join(", ");
                info!("💻️ {} does not have the roles [{roles}] required for {}", claims.username, req.path());
                let err = ServerError::AuthenticationError(AuthError::InsufficientPermissions(format!(
                    "This endpoint requires the roles [{roles}]"
                )));
                return Ok(req.error_response(err).map_into_right_body());
            }
            req.extensions_mut().insert(claims);
            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

fn authenticate(req: &ServiceRequest) -> Result<JwtClaims, ServerError> {
    let authority = req.app_data::<web::Data<JwtAuthority>>().ok_or_else(|| {
        error!("💻️ No JwtAuthority has been registered with the app. Authenticated routes will not work.");
        ServerError::Unspecified("Authentication is not configured".into())
    })?;
    let header = req.headers().get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let header = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let token = bearer_token(header).ok_or(AuthError::MissingToken)?;
    let claims = authority.validate(token)?;
    Ok(claims)
}
