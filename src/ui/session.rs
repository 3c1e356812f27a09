//! Logged-in sessions of the HTML interface.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::CookieJar;
use dashmap::DashMap;
use std::sync::Arc;

use crate::auth::Session;
use crate::AppState;

// Session token cookie name
pub const SESSION_COOKIE: &str = "kaichuan_session";

/// Open sessions by token. Sessions end on logout or process exit.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) {
        self.sessions.insert(session.token.clone(), session);
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, token: &str) -> Option<Session> {
        self.sessions.remove(token).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// The session of the request's cookie. Requests without one are sent to the login page.
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| state.sessions.get(cookie.value()))
            .map(CurrentSession)
            .ok_or_else(|| Redirect::to("/login"))
    }
}
