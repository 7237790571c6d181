//! Per-dispatch state.
//!
//! One `RequestContext` is built for each inbound call and handed by
//! mutable reference through the interceptor chain to the handler. It
//! never outlives the dispatch and is never shared across dispatches,
//! so nothing in here needs synchronization.

use crate::http::{Request, Response};
use crate::session::Principal;

/// The request, the response under construction, and whoever the
/// session layer says is calling.
#[derive(Debug)]
pub struct RequestContext {
    request: Request,
    response: Response,
    principal: Option<Principal>,
}

impl RequestContext {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::default(),
            principal: None,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn set_principal(&mut self, principal: Principal) {
        self.principal = Some(principal);
    }

    pub fn clear_principal(&mut self) {
        self.principal = None;
    }

    /// Hand the finished response back to the caller.
    pub fn into_response(self) -> Response {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RawRequest;

    #[test]
    fn test_context_starts_unauthenticated() {
        let ctx = RequestContext::new(Request::from_raw(RawRequest::default()).unwrap());
        assert!(ctx.principal().is_none());
        assert_eq!(ctx.response().status().line(), "200 OK");
    }

    #[test]
    fn test_principal_can_be_bound_and_cleared() {
        let mut ctx = RequestContext::new(Request::from_raw(RawRequest::default()).unwrap());
        ctx.set_principal(Principal {
            id: "u1".to_string(),
            name: "ada".to_string(),
            admin: false,
        });
        assert_eq!(ctx.principal().map(|p| p.name.as_str()), Some("ada"));
        ctx.clear_principal();
        assert!(ctx.principal().is_none());
    }
}
