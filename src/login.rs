#[cfg(feature = "web")]
use crate::app::{AppError, AppState};
#[cfg(feature = "web")]
use axum::{
    Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
#[cfg(feature = "web")]
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
#[cfg(feature = "web")]
use log::info;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
#[cfg(feature = "web")]
use std::sync::Arc;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, SystemTime};
#[cfg(feature = "web")]
use uuid::Uuid;

/// Prefix of the environment variables holding `email:password` entries.
pub const CREDENTIAL_ENV_PREFIX: &str = "JOURNALS_USER_";
/// Number of credential variables read, `JOURNALS_USER_1` to `JOURNALS_USER_21`.
pub const MAX_CREDENTIALS: usize = 21;
/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";
/// Default session lifetime: 24 hours.
pub const SESSION_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Static allow-list of `email:password` pairs
///
/// Entries are held as `"email:password"` tokens with the email trimmed and
/// lowercased. The list never changes after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialList {
    entries: HashSet<String>,
}

impl CredentialList {
    /// Build the list from raw `email:password` strings
    ///
    /// Entries that are blank, have no `:` or have an empty email are dropped.
    ///
    /// # Examples
    /// ```
    /// use journal_ratings::login::CredentialList;
    ///
    /// let list = CredentialList::from_entries(["Ana@Example.org:secret", "", "broken"]);
    /// assert_eq!(list.len(), 1);
    /// assert!(list.is_allowed("ana@example.org", "secret"));
    /// ```
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = CredentialList::default();
        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.is_empty() {
                continue;
            }
            match entry.split_once(':') {
                Some((email, password)) if !email.trim().is_empty() => {
                    list.entries.insert(credential_token(email, password));
                }
                _ => warn!("Ignoring malformed credential entry"),
            }
        }
        list
    }

    /// Read `JOURNALS_USER_1` to `JOURNALS_USER_21`; unset or empty variables are skipped.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`CredentialList::from_env`] with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let entries = (1..=MAX_CREDENTIALS)
            .filter_map(|i| lookup(&format!("{}{}", CREDENTIAL_ENV_PREFIX, i)))
            .filter(|value| !value.trim().is_empty());
        Self::from_entries(entries)
    }

    pub fn is_allowed(&self, email: &str, password: &str) -> bool {
        self.entries.contains(&credential_token(email, password))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn credential_token(email: &str, password: &str) -> String {
    format!("{}:{}", email.trim().to_lowercase(), password)
}

/// User session data
///
/// Represents an authenticated user session.
#[derive(Debug, Clone)]
pub struct Session {
    /// Email the user signed in with
    pub email: String,

    /// Time when the session expires
    pub expires_at: SystemTime,
}

/// In-memory map of session id to session
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    duration: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::new(SESSION_DURATION)
    }
}

impl SessionStore {
    pub fn new(duration: Duration) -> Self {
        SessionStore {
            sessions: RwLock::new(HashMap::new()),
            duration,
        }
    }

    /// Create and store a new session; returns its id.
    #[cfg(feature = "web")]
    pub fn create(&self, email: &str) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.insert(session_id.clone(), email);
        session_id
    }

    /// Store a session under a caller-chosen id. Expired sessions left behind
    /// by abandoned cookies are purged first.
    pub fn insert(&self, session_id: String, email: &str) {
        let now = SystemTime::now();
        let session = Session {
            email: email.trim().to_lowercase(),
            expires_at: now + self.duration,
        };

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(session_id, session);
    }

    /// The email of a live session, or `None`. Expired sessions are dropped.
    pub fn validate(&self, session_id: &str) -> Option<String> {
        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            match sessions.get(session_id) {
                Some(session) if session.expires_at > SystemTime::now() => {
                    return Some(session.email.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }

        self.remove(session_id);
        None
    }

    pub fn remove(&self, session_id: &str) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(session_id);
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Login form data
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Notices shown on the login page
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    #[serde(default)]
    pub logged_out: bool,
}

/// The signed-in email for the request's session cookie, if any.
#[cfg(feature = "web")]
pub fn is_authorized(jar: &CookieJar, sessions: &SessionStore) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| sessions.validate(cookie.value()))
}

/// Authentication middleware
///
/// Lets the request through with the signed-in email as an extension, or
/// redirects to the login page. Nothing behind this layer runs for an
/// unauthenticated request.
#[cfg(feature = "web")]
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Response {
    match is_authorized(&jar, &state.sessions) {
        Some(email) => {
            request.extensions_mut().insert(SignedIn(email));
            next.run(request).await
        }
        None => Redirect::to("/login").into_response(),
    }
}

/// Email of the signed-in user, set by [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn(pub String);

/// Serve the login page
#[cfg(feature = "web")]
pub async fn serve_login_page(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    if is_authorized(&jar, &state.sessions).is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let page = state.templates.render(
        "login",
        &serde_json::json!({
            "error": query.error,
            "logged_out": query.logged_out,
        }),
    )?;
    Ok(Html(page).into_response())
}

/// Handle user login requests
///
/// Checks the submitted pair against the allow-list and, when it matches,
/// sets a session cookie and redirects to the lookup page.
#[cfg(feature = "web")]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    if !state.credentials.is_allowed(&form.email, &form.password) {
        warn!("Rejected login attempt");
        let target = format!(
            "/login?error={}",
            urlencoding::encode("Invalid email or password")
        );
        return Redirect::to(&target).into_response();
    }

    let session_id = state.sessions.create(&form.email);
    info!("Signed in {}", form.email.trim().to_lowercase());
    let cookie = Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    (jar.add(cookie), Redirect::to("/")).into_response()
}

/// Handle user logout
///
/// Drops the session and clears the cookie, then redirects to the login page.
#[cfg(feature = "web")]
pub async fn handle_logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/login?logged_out=true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_normalized_and_malformed_ones_dropped() {
        let list = CredentialList::from_entries([
            "  Reader@Uni.EDU:p4ss:word ",
            ":nobody",
            "no-colon",
            "   ",
        ]);
        assert_eq!(list.len(), 1);
        assert!(list.is_allowed("reader@uni.edu", "p4ss:word"));
        assert!(list.is_allowed(" READER@uni.edu ", "p4ss:word"));
        assert!(!list.is_allowed("reader@uni.edu", "P4SS:word"));
        assert!(!list.is_allowed("other@uni.edu", "p4ss:word"));
    }

    #[test]
    fn env_lookup_reads_numbered_variables_up_to_the_limit() {
        let list = CredentialList::from_lookup(|name| match name {
            "JOURNALS_USER_1" => Some("a@x.org:1".to_string()),
            "JOURNALS_USER_2" => Some(String::new()),
            "JOURNALS_USER_21" => Some("b@x.org:2".to_string()),
            "JOURNALS_USER_22" => Some("c@x.org:3".to_string()),
            _ => None,
        });
        assert_eq!(list.len(), 2);
        assert!(list.is_allowed("a@x.org", "1"));
        assert!(list.is_allowed("b@x.org", "2"));
        assert!(!list.is_allowed("c@x.org", "3"));
    }

    #[test]
    fn empty_list_allows_nobody() {
        let list = CredentialList::default();
        assert!(list.is_empty());
        assert!(!list.is_allowed("", ""));
    }

    #[test]
    fn sessions_validate_until_removed() {
        let store = SessionStore::default();
        store.insert("abc".to_string(), "Reader@Uni.edu");
        assert_eq!(store.validate("abc").as_deref(), Some("reader@uni.edu"));
        assert_eq!(store.validate("other"), None);

        store.remove("abc");
        assert_eq!(store.validate("abc"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn new_sign_in_purges_abandoned_expired_sessions() {
        let store = SessionStore::new(Duration::ZERO);
        store.insert("abandoned-1".to_string(), "a@x.org");
        store.insert("abandoned-2".to_string(), "b@x.org");
        assert_eq!(store.len(), 1);

        let store = SessionStore::new(Duration::from_secs(60));
        store.insert("live".to_string(), "a@x.org");
        store.insert("other".to_string(), "b@x.org");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn expired_sessions_are_rejected_and_purged() {
        let store = SessionStore::new(Duration::ZERO);
        store.insert("abc".to_string(), "reader@uni.edu");
        assert_eq!(store.len(), 1);
        assert_eq!(store.validate("abc"), None);
        assert_eq!(store.len(), 0);
    }
}
