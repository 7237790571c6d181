//! Signed-cookie sessions.
//!
//! # Responsibilities
//! - Issue and verify `id-expiry-signature` session cookie values
//! - Resolve a request's cookie into a bound principal before dispatch
//! - Gate admin paths behind a signed-in admin principal
//!
//! # Design Decisions
//! - The signature covers the principal id, a per-principal secret
//!   token, the expiry and a server secret, so revoking the token (say,
//!   a password change) invalidates every outstanding cookie at once
//! - The cookie value splits on `-`, which is why principal ids must
//!   not contain one; issuing for such an id is an error, not a
//!   truncated cookie
//! - Verification failures are indistinguishable on the wire; the
//!   request simply proceeds unauthenticated

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::error::DispatchError;
use crate::gateway::RequestContext;
use crate::http::{Payload, Request};
use crate::interceptor::{Middleware, Next};

/// Who a verified session cookie says is calling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub admin: bool,
}

/// A principal plus the per-principal secret its cookies are signed
/// with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRecord {
    pub principal: Principal,
    pub token: String,
}

/// Lookup seam to whatever owns principal records.
pub trait PrincipalStore: Send + Sync {
    fn lookup(&self, id: &str) -> Option<PrincipalRecord>;
}

/// In-memory store for development and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: HashMap<String, PrincipalRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: PrincipalRecord) {
        self.records.insert(record.principal.id.clone(), record);
    }
}

impl PrincipalStore for MemoryStore {
    fn lookup(&self, id: &str) -> Option<PrincipalRecord> {
        self.records.get(id).cloned()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The cookie format reserves `-` as its separator.
    #[error("principal id {0:?} contains '-'")]
    IdWithDash(String),
}

/// Issues and verifies session cookie values.
#[derive(Debug, Clone)]
pub struct SessionSigner {
    cookie_name: String,
    secret: String,
    ttl_secs: i64,
}

impl SessionSigner {
    pub fn new(cookie_name: impl Into<String>, secret: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            secret: secret.into(),
            ttl_secs,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Produce the cookie value `id-expiry-signature` for a record.
    pub fn issue(&self, record: &PrincipalRecord) -> Result<String, SessionError> {
        self.issue_at(record, Utc::now().timestamp())
    }

    fn issue_at(&self, record: &PrincipalRecord, now: i64) -> Result<String, SessionError> {
        let id = &record.principal.id;
        if id.contains('-') {
            return Err(SessionError::IdWithDash(id.clone()));
        }
        let expires = now + self.ttl_secs;
        let signature = self.signature(id, &record.token, expires);
        Ok(format!("{id}-{expires}-{signature}"))
    }

    /// Verify a cookie value against the store. Any mismatch in shape,
    /// expiry or signature yields `None`.
    pub fn verify(&self, value: &str, store: &dyn PrincipalStore) -> Option<Principal> {
        self.verify_at(value, store, Utc::now().timestamp())
    }

    fn verify_at(&self, value: &str, store: &dyn PrincipalStore, now: i64) -> Option<Principal> {
        let parts: Vec<&str> = value.split('-').collect();
        let [id, expires, signature] = parts.as_slice() else {
            return None;
        };
        let expires: i64 = expires.parse().ok()?;
        if expires < now {
            return None;
        }
        let record = store.lookup(id)?;
        if self.signature(id, &record.token, expires) != *signature {
            return None;
        }
        Some(record.principal)
    }

    fn signature(&self, id: &str, token: &str, expires: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("{id}-{token}-{expires}-{}", self.secret).as_bytes());
        hex(&hasher.finalize())
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Binds a principal to the dispatch, before the interceptor chain
/// runs. Implementations decide where the principal comes from.
pub trait PrincipalResolver: Send + Sync {
    fn resolve(&self, request: &Request) -> Option<Principal>;
}

/// Resolver backed by the signed session cookie.
pub struct CookieResolver {
    signer: SessionSigner,
    store: Arc<dyn PrincipalStore>,
}

impl CookieResolver {
    pub fn new(signer: SessionSigner, store: Arc<dyn PrincipalStore>) -> Self {
        Self { signer, store }
    }
}

impl PrincipalResolver for CookieResolver {
    fn resolve(&self, request: &Request) -> Option<Principal> {
        let cookie = request.cookie(self.signer.cookie_name())?;
        let principal = self.signer.verify(cookie, self.store.as_ref())?;
        tracing::debug!(principal = %principal.name, "Bound principal from session cookie");
        Some(principal)
    }
}

/// Middleware that turns away anyone but a signed-in admin, redirecting
/// to the sign-in page.
pub struct AdminGate {
    sign_in_path: String,
}

impl AdminGate {
    pub fn new(sign_in_path: impl Into<String>) -> Self {
        Self {
            sign_in_path: sign_in_path.into(),
        }
    }
}

impl Middleware for AdminGate {
    fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Payload, DispatchError> {
        match ctx.principal() {
            Some(principal) if principal.admin => next.run(ctx),
            _ => Err(DispatchError::see_other(&self.sign_in_path)),
        }
    }
}
