//! Request instrumentation.
//!
//! Cross-cutting concern shared by every route: each request gets a UUID
//! trace id that scopes a log span, rides task-local storage so error
//! payloads can pick it up, and is echoed back in a `trace-id` response
//! header.

use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::Error;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tokio::task_local;
use tracing::{info_span, Instrument};
use uuid::Uuid;

task_local! {
    static TRACE_ID: String;
}

/// Retrieve the trace identifier for the current task if one is in scope.
pub fn current_trace_id() -> Option<String> {
    TRACE_ID.try_with(Clone::clone).ok()
}

/// Middleware factory attaching a request-scoped UUID.
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, request: ServiceRequest) -> Self::Future {
        let id = Uuid::new_v4().to_string();
        // UUIDs are ASCII, so the header value is built up front and the
        // response path cannot fail.
        let echoed = HeaderValue::from_str(&id).expect("UUIDs are valid header values");
        let span = info_span!(
            "request",
            trace_id = %id,
            method = %request.method(),
            path = %request.path()
        );
        let handled = self.service.call(request).instrument(span);

        Box::pin(TRACE_ID.scope(id, async move {
            let mut response = handled.await?;
            response
                .response_mut()
                .headers_mut()
                .insert(HeaderName::from_static("trace-id"), echoed);
            Ok(response)
        }))
    }
}
