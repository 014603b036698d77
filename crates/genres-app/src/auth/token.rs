use std::task::{Context, Poll};

use crate::{error::ApiError, state::AppState};
use axum::{
    extract::{FromRequestParts, Request},
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use axum_extra::TypedHeader;
use futures::future::BoxFuture;
use headers::{authorization::Bearer, Authorization};
use genres_types::claim::ApiClaim;
use http::request::Parts;
use tower::{Layer, Service};
use tracing::debug;

impl FromRequestParts<AppState> for ApiClaim {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(claim) = parts.extensions.get::<ApiClaim>() {
            return Ok(claim.clone());
        }

        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|e| {
                debug!("No bearer token: {e}");
                ApiError::Unauthorized
            })?;

        state
            .tokens()
            .validate::<ApiClaim>(bearer.token())
            .map_err(|e| {
                if e.is_expired() {
                    debug!("Token expired");
                } else {
                    debug!("Failed to validate token: {e}");
                }
                ApiError::Unauthorized
            })
    }
}

/// Requires valid bearer token for all wrapped routes,
/// validated claim is then available in request extensions
#[derive(Clone)]
pub struct TokenLayer {
    state: AppState,
}

impl TokenLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for TokenLayer {
    type Service = TokenService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TokenService {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct TokenService<S> {
    inner: S,
    state: AppState,
}

impl<S> Service<Request> for TokenService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // the clone may not be ready, keep the one polled above
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let state = self.state.clone();
        Box::pin(async move {
            let (mut parts, body) = request.into_parts();
            match ApiClaim::from_request_parts(&mut parts, &state).await {
                Ok(claim) => {
                    parts.extensions.insert(claim);
                    inner.call(Request::from_parts(parts, body)).await
                }
                Err(rejection) => Ok(rejection.into_response()),
            }
        })
    }
}
