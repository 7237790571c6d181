//! Gateway subsystem.
//!
//! # Data Flow
//! ```text
//! Transport (RawRequest, start callback)
//!     → context.rs (Request snapshot + fresh Response + principal)
//!     → RouteTable lookup (matched handler, static file, or not-found)
//!     → InterceptorChain dispatch (terminal = the lookup result)
//!     → realize payload into a wire body
//!     → start(status line, headers) exactly once
//!     → Return: ResponseBody (bytes or lazy chunks)
//!
//! Errors at any point short-circuit to the error path, which renders
//! HTML or JSON by route flavor and still calls start exactly once.
//! ```
//!
//! # Design Decisions
//! - Every dispatch calls the start callback exactly once, on success
//!   and on every error path; nothing escapes the gateway
//! - Redirects reuse the accumulated response headers, so cookies set
//!   before the raise still reach the client; other errors carry their
//!   own minimal header list
//! - Payloads are realized before start, so a template failure can
//!   still become a clean 500

mod builder;
mod context;

pub use builder::{ComposeError, GatewayBuilder};
pub use context::RequestContext;

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{powered_by_header, DispatchError};
use crate::http::status;
use crate::http::{Payload, RawRequest, Request, Response, ResponseBody};
use crate::interceptor::InterceptorChain;
use crate::routing::{Flavor, Lookup, RouteTable};
use crate::session::PrincipalResolver;
use crate::template::TemplateEngine;

/// Response-start callback per the gateway calling convention: status
/// line plus the externally visible header list.
pub type StartResponse<'a> = dyn FnMut(&str, &[(String, String)]) + 'a;

/// The composed dispatch engine. Immutable once built; shared freely
/// across worker threads.
pub struct Gateway {
    routes: RouteTable,
    chain: InterceptorChain,
    engine: Arc<dyn TemplateEngine>,
    resolver: Option<Arc<dyn PrincipalResolver>>,
    debug: bool,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    pub(crate) fn assemble(
        routes: RouteTable,
        chain: InterceptorChain,
        engine: Arc<dyn TemplateEngine>,
        resolver: Option<Arc<dyn PrincipalResolver>>,
        debug: bool,
    ) -> Self {
        Self {
            routes,
            chain,
            engine,
            resolver,
            debug,
        }
    }

    /// Dispatch one request. `start` receives the status line and
    /// header list exactly once, before any body bytes exist.
    pub fn call(&self, raw: RawRequest, start: &mut StartResponse<'_>) -> ResponseBody {
        let request_id = Uuid::new_v4();

        let request = match Request::from_raw(raw) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Rejecting request");
                return reject_unimplemented(start);
            }
        };

        let method = request.method();
        let path = request.path().to_string();
        tracing::info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            remote = %request.remote_addr(),
            "Dispatching request"
        );

        let principal = self
            .resolver
            .as_ref()
            .and_then(|resolver| resolver.resolve(&request));
        let mut ctx = RequestContext::new(request);
        if let Some(principal) = principal {
            ctx.set_principal(principal);
        }

        // Unmatched paths and static files render errors as pages.
        let lookup = self.routes.find(method, &path);
        let flavor = match &lookup {
            Some(Lookup::Handler { route, .. }) => {
                tracing::debug!(
                    request_id = %request_id,
                    pattern = %route.pattern().raw(),
                    "Route matched"
                );
                route.flavor()
            }
            Some(Lookup::File { route, .. }) => {
                tracing::debug!(
                    request_id = %request_id,
                    prefix = %route.prefix(),
                    "Static route matched"
                );
                Flavor::Page
            }
            None => Flavor::Page,
        };

        let result = match &lookup {
            Some(Lookup::Handler { route, args }) => {
                let handler = route.handler();
                let terminal =
                    |ctx: &mut RequestContext| -> Result<Payload, DispatchError> {
                        (**handler)(ctx, args)
                    };
                self.chain.dispatch(&mut ctx, &terminal)
            }
            Some(Lookup::File { route, remainder }) => {
                let terminal =
                    |ctx: &mut RequestContext| -> Result<Payload, DispatchError> {
                        route.respond(remainder, &path, ctx.response_mut())
                    };
                self.chain.dispatch(&mut ctx, &terminal)
            }
            None => {
                let terminal =
                    |_: &mut RequestContext| -> Result<Payload, DispatchError> {
                        Err(DispatchError::not_found(path.as_str()))
                    };
                self.chain.dispatch(&mut ctx, &terminal)
            }
        };

        let realized =
            result.and_then(|payload| self.realize(payload, ctx.response_mut()));
        match realized {
            Ok(body) => {
                let response = ctx.into_response();
                tracing::debug!(
                    request_id = %request_id,
                    status = %response.status_line(),
                    "Response started"
                );
                start(response.status().line(), &response.headers());
                body
            }
            Err(error) => self.error_response(ctx, error, flavor, request_id, start),
        }
    }

    /// Turn a handler payload into wire bytes, adjusting the response
    /// content type where the payload dictates one.
    fn realize(
        &self,
        payload: Payload,
        response: &mut Response,
    ) -> Result<ResponseBody, DispatchError> {
        match payload {
            Payload::Empty => Ok(ResponseBody::Empty),
            Payload::Text(text) => Ok(ResponseBody::Bytes(text.into_bytes())),
            Payload::Bytes(bytes) => Ok(ResponseBody::Bytes(bytes)),
            Payload::Json(value) => {
                response.set_content_type("application/json");
                Ok(ResponseBody::Bytes(value.to_string().into_bytes()))
            }
            Payload::Template(template) => {
                let rendered = self.engine.render(&template)?;
                Ok(ResponseBody::Bytes(rendered))
            }
            Payload::Stream(stream) => Ok(ResponseBody::Stream(stream)),
        }
    }

    /// Render a dispatch error to the wire. The single catch point for
    /// everything a handler or interceptor can raise.
    fn error_response(
        &self,
        ctx: RequestContext,
        error: DispatchError,
        flavor: Flavor,
        request_id: Uuid,
        start: &mut StartResponse<'_>,
    ) -> ResponseBody {
        let error = match error {
            DispatchError::Redirect(redirect) => {
                let mut response = ctx.into_response();
                response.set_header("Location", redirect.location);
                let line = status::line_for(redirect.kind.code());
                start(&line, &response.headers());
                return ResponseBody::Empty;
            }
            other => other,
        };

        if let DispatchError::Internal(detail) = &error {
            tracing::error!(request_id = %request_id, detail = %detail, "Dispatch failed");
        } else {
            tracing::info!(request_id = %request_id, error = %error, "Dispatch rejected");
        }

        let line = status::line_for(error.status_code());
        let mut headers = match &error {
            DispatchError::Http(http) => http.headers().to_vec(),
            _ => vec![powered_by_header()],
        };

        let body = match flavor {
            Flavor::Page => {
                headers.push((
                    "Content-Type".to_string(),
                    "text/html; charset=utf-8".to_string(),
                ));
                page_error_body(&line, &error, self.debug)
            }
            Flavor::Api => {
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                api_error_body(&error, self.debug)
            }
        };

        start(&line, &headers);
        ResponseBody::Bytes(body)
    }
}

fn reject_unimplemented(start: &mut StartResponse<'_>) -> ResponseBody {
    let line = status::line_for(501);
    let headers = vec![
        powered_by_header(),
        (
            "Content-Type".to_string(),
            "text/html; charset=utf-8".to_string(),
        ),
    ];
    let body = format!("<html><body><h1>{line}</h1></body></html>");
    start(&line, &headers);
    ResponseBody::Bytes(body.into_bytes())
}

fn page_error_body(line: &str, error: &DispatchError, debug: bool) -> Vec<u8> {
    let body = match error {
        DispatchError::Internal(detail) if debug => {
            format!("<html><body><h1>{line}</h1><pre>{detail}</pre></body></html>")
        }
        _ => format!("<html><body><h1>{line}</h1></body></html>"),
    };
    body.into_bytes()
}

fn api_error_body(error: &DispatchError, debug: bool) -> Vec<u8> {
    let message = match error {
        DispatchError::Internal(detail) if debug => detail.clone(),
        DispatchError::Internal(_) => "internal error".to_string(),
        other => other.to_string(),
    };
    serde_json::json!({
        "error": error.api_code(),
        "data": error.api_data(),
        "message": message,
    })
    .to_string()
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_error_body_is_minimal_html() {
        let body = page_error_body("404 Not Found", &DispatchError::not_found("/x"), false);
        assert_eq!(body, b"<html><body><h1>404 Not Found</h1></body></html>");
    }

    #[test]
    fn test_internal_detail_needs_the_debug_flag() {
        let error = DispatchError::Internal("boom".to_string());
        let hidden = page_error_body("500 Internal Server Error", &error, false);
        assert!(!String::from_utf8(hidden).unwrap().contains("boom"));
        let shown = page_error_body("500 Internal Server Error", &error, true);
        assert!(String::from_utf8(shown).unwrap().contains("<pre>boom</pre>"));
    }

    #[test]
    fn test_api_error_body_shape() {
        let body = api_error_body(&DispatchError::validation("email", "not an address"), false);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "value:invalid");
        assert_eq!(value["data"], "email");
        assert_eq!(value["message"], "invalid value for field \"email\": not an address");
    }

    #[test]
    fn test_api_internal_message_is_generic_without_debug() {
        let error = DispatchError::Internal("secret detail".to_string());
        let value: serde_json::Value =
            serde_json::from_slice(&api_error_body(&error, false)).unwrap();
        assert_eq!(value["message"], "internal error");
        let value: serde_json::Value =
            serde_json::from_slice(&api_error_body(&error, true)).unwrap();
        assert_eq!(value["message"], "secret detail");
    }
}
