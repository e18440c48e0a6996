//! User credentials and administrator checks.
//!
//! Operations declared `authenticated` or `admin` need HTTP Basic credentials
//! of a configured user. The user part is a bare identifier.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::config::SecurityConfig;
use crate::jid::BareJid;
use crate::routing::context::RequestContext;
use crate::routing::error::RouteError;
use crate::routing::registry::{Access, RouteEntry};
use crate::security::access_control::AccessGate;

/// Configured accounts and the administrator set.
#[derive(Debug, Clone, Default)]
pub struct CredentialGate {
    users: HashMap<BareJid, String>,
    admins: HashSet<BareJid>,
}

impl CredentialGate {
    pub fn new<U, A>(users: U, admins: A) -> Self
    where
        U: IntoIterator<Item = (BareJid, String)>,
        A: IntoIterator<Item = BareJid>,
    {
        Self {
            users: users.into_iter().collect(),
            admins: admins.into_iter().collect(),
        }
    }

    /// Build from configuration. Entries that are not bare identifiers are skipped.
    pub fn from_config(security: &SecurityConfig) -> Self {
        let users = security.users.iter().filter_map(|u| match u.jid.parse::<BareJid>() {
            Ok(jid) => Some((jid, u.password.clone())),
            Err(e) => {
                tracing::warn!(jid = %u.jid, error = %e, "Ignoring user with invalid identifier");
                None
            }
        });
        let admins = security.admins.iter().filter_map(|a| match a.parse::<BareJid>() {
            Ok(jid) => Some(jid),
            Err(e) => {
                tracing::warn!(jid = %a, error = %e, "Ignoring admin with invalid identifier");
                None
            }
        });
        Self::new(users, admins)
    }

    /// The user's identifier when `user` names a configured account and `password` matches.
    pub fn check_credentials(&self, user: &str, password: &str) -> Option<BareJid> {
        let jid = user.parse::<BareJid>().ok()?;
        match self.users.get(&jid) {
            Some(expected) if expected == password => Some(jid),
            _ => None,
        }
    }

    pub fn is_admin(&self, user: &BareJid) -> bool {
        self.admins.contains(user)
    }
}

#[async_trait]
impl AccessGate for CredentialGate {
    async fn check(&self, entry: &RouteEntry, ctx: &RequestContext) -> Result<(), RouteError> {
        let access = entry.access();
        if !matches!(access, Access::Authenticated | Access::Admin) {
            return Ok(());
        }

        let Some(user) = basic_credentials(ctx).and_then(|(u, p)| self.check_credentials(&u, &p)) else {
            tracing::warn!(request_id = %ctx.request_id, route = %entry.label(), "Missing or invalid credentials");
            return Err(RouteError::http(StatusCode::UNAUTHORIZED, "Unauthorized"));
        };

        if access == Access::Admin && !self.is_admin(&user) {
            tracing::warn!(request_id = %ctx.request_id, route = %entry.label(), user = %user, "Administrator required");
            return Err(RouteError::http(StatusCode::FORBIDDEN, "Forbidden"));
        }

        Ok(())
    }
}

/// User and password from an `Authorization: Basic` header.
pub fn basic_credentials(ctx: &RequestContext) -> Option<(String, String)> {
    let value = ctx.header(header::AUTHORIZATION.as_str())?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}
