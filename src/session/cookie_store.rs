use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError,
};

use cookie::Cookie;
use reqwest::{
    cookie::{CookieStore, Jar},
    header::HeaderValue,
};
use url::Url;

/// Name of the cookie carrying the portal's server side session.
pub const SESSION_COOKIE: &str = "JSESSIONID";

type Observer = Box<dyn Fn(&str) + Send + Sync>;

/// Accepts every cookie like [`Jar`] does, and additionally remembers the
/// current session id, calling the observer whenever it changes.
pub struct SessionCookieStore {
    inner: Jar,
    session_id: Mutex<Option<String>>,
    on_change: Option<Observer>,
    closed: AtomicBool,
}

impl SessionCookieStore {
    pub fn new() -> Self {
        Self {
            inner: Jar::default(),
            session_id: Mutex::new(None),
            on_change: None,
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_observer(on_change: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            on_change: Some(Box::new(on_change)),
            ..Self::new()
        }
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drops the session. Cookies are neither stored nor sent afterwards.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        *self.session_id.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn observe(&self, value: &str) {
        {
            let mut current = self.session_id.lock().unwrap_or_else(PoisonError::into_inner);
            if current.as_deref() == Some(value) {
                return;
            }
            *current = Some(value.to_owned());
        }
        if let Some(on_change) = &self.on_change {
            on_change(value);
        }
    }
}

impl Default for SessionCookieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionCookieStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookieStore")
            .field("has_session", &self.session_id().is_some())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl CookieStore for SessionCookieStore {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        if self.is_closed() {
            return;
        }
        let headers: Vec<&HeaderValue> = cookie_headers.collect();
        self.inner.set_cookies(&mut headers.iter().copied(), url);
        for value in headers.into_iter().filter_map(session_cookie_value) {
            self.observe(&value);
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        if self.is_closed() {
            return None;
        }
        self.inner.cookies(url)
    }
}

/// Value of a `Set-Cookie` header if it sets a non-empty session cookie.
fn session_cookie_value(header: &HeaderValue) -> Option<String> {
    let cookie = Cookie::parse(header.to_str().ok()?).ok()?;
    (cookie.name() == SESSION_COOKIE && !cookie.value().is_empty())
        .then(|| cookie.value().to_owned())
}
