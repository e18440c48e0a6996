//! In-memory user directory.
//!
//! Users are keyed by bare identifier; each carries the resources of its open
//! sessions, in the order they were opened.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::handlers::sync_op;
use crate::jid::BareJid;
use crate::routing::error::HandlerError;
use crate::routing::params::ParamType;
use crate::routing::registry::{Handler, Invocation, Operation};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub jid: String,
    pub name: Option<String>,
    pub sessions: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionOpen {
    pub resource: String,
}

#[derive(Debug, Serialize)]
pub struct Session {
    pub jid: String,
    pub index: usize,
    pub resource: String,
}

#[derive(Default)]
pub struct UserHandler {
    users: DashMap<BareJid, User>,
}

impl UserHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn list_users(&self, _inv: Invocation) -> Result<Response, HandlerError> {
        let mut users: Vec<User> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.jid.cmp(&b.jid));
        Ok(Json(users).into_response())
    }

    fn get_user(&self, inv: Invocation) -> Result<Response, HandlerError> {
        let jid = bare_param(&inv)?;
        let user = self.users.get(&jid).ok_or_else(|| unknown_user(&jid))?;
        Ok(Json(user.value().clone()).into_response())
    }

    fn put_user(&self, inv: Invocation) -> Result<Response, HandlerError> {
        let jid = bare_param(&inv)?;
        let update: UserUpdate = if inv.request.body.is_empty() {
            UserUpdate::default()
        } else {
            serde_json::from_slice(&inv.request.body)
                .map_err(|e| HandlerError::validation(format!("invalid user body: {}", e)))?
        };

        let mut created = false;
        let mut entry = self.users.entry(jid.clone()).or_insert_with(|| {
            created = true;
            User {
                jid: jid.to_string(),
                name: None,
                sessions: Vec::new(),
            }
        });
        if update.name.is_some() {
            entry.name = update.name;
        }
        let user = entry.clone();
        drop(entry);

        tracing::debug!(jid = %jid, created, "User stored");
        let status = if created { StatusCode::CREATED } else { StatusCode::OK };
        Ok((status, Json(user)).into_response())
    }

    fn delete_user(&self, inv: Invocation) -> Result<Response, HandlerError> {
        let jid = bare_param(&inv)?;
        match self.users.remove(&jid) {
            Some(_) => Ok(StatusCode::NO_CONTENT.into_response()),
            None => Err(unknown_user(&jid)),
        }
    }

    fn open_session(&self, inv: Invocation) -> Result<Response, HandlerError> {
        let jid = bare_param(&inv)?;
        let open: SessionOpen = serde_json::from_slice(&inv.request.body)
            .map_err(|e| HandlerError::validation(format!("invalid session body: {}", e)))?;
        if open.resource.is_empty() || open.resource.contains('/') {
            return Err(HandlerError::validation("resource must be a non-empty segment"));
        }

        let mut user = self.users.get_mut(&jid).ok_or_else(|| unknown_user(&jid))?;
        if user.sessions.contains(&open.resource) {
            return Err(HandlerError::domain(
                StatusCode::CONFLICT,
                format!("session {}/{} already open", jid, open.resource),
            ));
        }
        user.sessions.push(open.resource.clone());
        let session = Session {
            jid: jid.to_string(),
            index: user.sessions.len() - 1,
            resource: open.resource,
        };
        Ok((StatusCode::CREATED, Json(session)).into_response())
    }

    fn get_session(&self, inv: Invocation) -> Result<Response, HandlerError> {
        let jid = bare_param(&inv)?;
        let index = inv
            .params
            .integer("index")
            .ok_or_else(|| HandlerError::validation("missing session index"))?;

        let user = self.users.get(&jid).ok_or_else(|| unknown_user(&jid))?;
        let resource = usize::try_from(index)
            .ok()
            .and_then(|i| user.sessions.get(i))
            .ok_or_else(|| {
                HandlerError::domain(StatusCode::NOT_FOUND, format!("{} has no session {}", jid, index))
            })?;

        Ok(Json(Session {
            jid: jid.to_string(),
            index: index as usize,
            resource: resource.clone(),
        })
        .into_response())
    }

    /// Look a session up by full identifier. A bare identifier resolves to the first session.
    fn find_session(&self, inv: Invocation) -> Result<Response, HandlerError> {
        let jid = inv
            .params
            .jid("jid")
            .ok_or_else(|| HandlerError::validation("missing jid"))?;
        let bare = jid.bare();

        let user = self.users.get(bare).ok_or_else(|| unknown_user(bare))?;
        let found = match jid.resource() {
            Some(resource) => user.sessions.iter().position(|s| s == resource),
            None if user.sessions.is_empty() => None,
            None => Some(0),
        };
        let Some(index) = found else {
            return Err(HandlerError::domain(
                StatusCode::NOT_FOUND,
                format!("no session for {}", jid),
            ));
        };

        Ok(Json(Session {
            jid: bare.to_string(),
            index,
            resource: user.sessions[index].clone(),
        })
        .into_response())
    }
}

impl Handler for UserHandler {
    fn name(&self) -> &str {
        "users"
    }

    fn base_path(&self) -> &str {
        "/users"
    }

    fn operations(self: Arc<Self>) -> Vec<Operation> {
        vec![
            Operation::new("list_users", sync_op(&self, UserHandler::list_users)).get(),
            Operation::new("find_session", sync_op(&self, UserHandler::find_session))
                .get()
                .path("/sessions/{jid}")
                .param("jid", ParamType::Jid),
            Operation::new("get_user", sync_op(&self, UserHandler::get_user))
                .get()
                .path("/{jid}")
                .param("jid", ParamType::BareJid),
            Operation::new("put_user", sync_op(&self, UserHandler::put_user))
                .put()
                .path("/{jid}")
                .param("jid", ParamType::BareJid),
            Operation::new("delete_user", sync_op(&self, UserHandler::delete_user))
                .delete()
                .path("/{jid}")
                .param("jid", ParamType::BareJid)
                .admin(),
            Operation::new("open_session", sync_op(&self, UserHandler::open_session))
                .post()
                .path("/{jid}/sessions")
                .param("jid", ParamType::BareJid),
            Operation::new("get_session", sync_op(&self, UserHandler::get_session))
                .get()
                .path("/{jid}/sessions/{index}")
                .param("jid", ParamType::BareJid)
                .param("index", ParamType::Integer),
        ]
    }
}

fn bare_param(inv: &Invocation) -> Result<BareJid, HandlerError> {
    inv.params
        .bare_jid("jid")
        .cloned()
        .ok_or_else(|| HandlerError::validation("missing jid"))
}

fn unknown_user(jid: &BareJid) -> HandlerError {
    HandlerError::domain(StatusCode::NOT_FOUND, format!("unknown user {}", jid))
}
