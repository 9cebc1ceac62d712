use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
    sync::OnceLock,
    time::Duration,
};

use governor::{
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::InMemoryState,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, CACHE_CONTROL},
    Client,
};
use tokio::time::sleep;
use tracing::{instrument, Level};
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    parse::{self, CourseKey},
    session::SessionManager,
};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(2);

/// A gradebook page under the portal's `parents` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubPage {
    WeeklySummary,
    CourseSummary(CourseKey),
}

impl SubPage {
    pub const fn tab(&self) -> &'static str {
        match self {
            Self::WeeklySummary => "weeklysummary",
            Self::CourseSummary(_) => "coursesummary",
        }
    }
}

impl Display for SubPage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::WeeklySummary => write!(f, "{}", self.tab()),
            Self::CourseSummary(key) => write!(f, "{} ({key})", self.tab()),
        }
    }
}

/// `base` with `segments` appended to its path.
pub fn portal_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| Error::ConfigInvalid(format!("{base} cannot be used as a base url")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub fn make_client(session: &SessionManager) -> Result<Client> {
    let mut headers = HeaderMap::new();
    // only advertise what the client can decode
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    let client = Client::builder()
        .gzip(true)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .cookie_provider(session.cookie_store())
        .timeout(REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

static RATE_LIMIT: u32 = 4;
static DELAY_JITTER: u64 = 1;
static RATE_LIMITER: OnceLock<
    governor::RateLimiter<
        governor::state::NotKeyed,
        InMemoryState,
        QuantaClock,
        NoOpMiddleware<QuantaInstant>,
    >,
> = OnceLock::new();

async fn wait_for_rate_limit() {
    let rate_limiter = RATE_LIMITER.get_or_init(|| {
        governor::RateLimiter::direct(governor::Quota::per_second(
            NonZeroU32::new(RATE_LIMIT).unwrap_or(NonZeroU32::MIN),
        ))
    });
    let jitter = governor::Jitter::new(Duration::ZERO, Duration::from_secs(DELAY_JITTER));
    rate_limiter.until_ready_with_jitter(jitter).await;
}

/// Backoff before retry number `attempt` (1 based).
pub fn retry_delay(attempt: u32) -> Duration {
    BACKOFF_BASE * 2u32.saturating_pow(attempt.saturating_sub(1))
}

/// Authenticated access to one student's gradebook pages.
#[derive(Debug)]
pub struct Portal {
    client: Client,
    session: SessionManager,
    parents_url: Url,
    student_id: String,
}

impl Portal {
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = config.credentials.clone();
        let parents_url = portal_url(
            &config.base_url,
            &[credentials.organization.as_str(), "parents"],
        )?;
        let student_id = credentials.student_id.clone();
        let session = SessionManager::new(credentials, &config.base_url)?;
        let client = make_client(&session)?;
        Ok(Self {
            client,
            session,
            parents_url,
            student_id,
        })
    }

    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn sub_page_url(&self, page: SubPage) -> Url {
        let mut url = self.parents_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("tab1", "studentdata")
                .append_pair("tab2", "gradebook")
                .append_pair("tab3", page.tab())
                .append_pair("studentid", &self.student_id)
                .append_pair("action", "form");
            if let SubPage::CourseSummary(key) = page {
                for (name, value) in key.query_params() {
                    query.append_pair(name, &value);
                }
            }
        }
        url
    }

    pub async fn authenticate(&self) -> Result<()> {
        self.session.authenticate(&self.client).await
    }

    /// Logs in, retrying transient failures. Rejected credentials are not
    /// retried.
    pub async fn authenticate_with_retries(&self) -> Result<()> {
        let mut attempt = 1;
        loop {
            match self.authenticate().await {
                Err(e) if e.is_transient() && attempt < MAX_ATTEMPTS => {
                    let delay = retry_delay(attempt);
                    log::warn!("Login failed ({e}), retrying in {delay:?}");
                    sleep(delay).await;
                    attempt += 1;
                }
                res => return res,
            }
        }
    }

    #[instrument(skip(self, page), fields(page = %page), level = Level::TRACE)]
    async fn fetch_once(&self, page: SubPage) -> Result<String> {
        wait_for_rate_limit().await;
        let start = std::time::Instant::now();
        let res = self
            .client
            .get(self.sub_page_url(page))
            .send()
            .await?
            .error_for_status()?;
        let text = res.text().await?;
        log::trace!("Got text of {page} in \t {:?}", start.elapsed());
        if parse::is_login_page(&text) {
            return Err(Error::Auth(format!("{page} returned the login form")));
        }
        Ok(text)
    }

    /// Fetches `page` as text. Transient failures are retried with backoff;
    /// an expired session is renewed before the next attempt.
    pub async fn fetch(&self, page: SubPage) -> Result<String> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(page).await {
                Err(e) if (e.is_transient() || e.is_auth()) && attempt < MAX_ATTEMPTS => {
                    let delay = retry_delay(attempt);
                    log::warn!(
                        "Fetching {page} failed ({e}), attempt {attempt}/{MAX_ATTEMPTS}, retrying in {delay:?}"
                    );
                    sleep(delay).await;
                    if e.is_auth() {
                        log::info!("Session expired, logging in again");
                        if let Err(e) = self.authenticate().await {
                            log::warn!("Logging in again failed: {e}");
                        }
                    }
                    attempt += 1;
                }
                res => return res,
            }
        }
    }
}
