//! Logged-in HTTP session with the back office.
//!
//! A [`Session`] wraps a cookie-holding HTTP client bound to one site's admin
//! entry point. It is created by [`Session::authenticate`], lives for one
//! process run, and is never persisted.
//!
//! Response bodies are read as UTF-8. Older stores send Windows-1252, so a
//! body that is not valid UTF-8 is decoded as Windows-1252 with a warning
//! rather than having its accented characters replaced.

use reqwest::{Client, Response};
use scraper::{Html, Selector};
use tokio::sync::Mutex;
use encoding_rs::WINDOWS_1252;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{AuthenticationError, TransportError};
use crate::settings::{FetchSettings, SiteConfig};

/// `name` attribute of the admin login form.
pub const LOGIN_FORM_NAME: &str = "digiSHOP";

/// Login form field carrying the user name.
const USER_FIELD: &str = "userId";

/// Login form field carrying the password.
const PASSWORD_FIELD: &str = "password";

/// User agent string for cctools.
const USER_AGENT: &str = concat!("cctools/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Session
// ============================================================================

/// An HTTP session against one site's admin UI.
pub struct Session {
    client: Client,
    base_url: Url,
    export_lock: Mutex<()>,
}

impl Session {
    /// Creates an unauthenticated session rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Client`] if the HTTP client cannot be built.
    pub fn new(base_url: Url, settings: &FetchSettings) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(TransportError::Client)?;

        Ok(Self {
            client,
            base_url,
            export_lock: Mutex::new(()),
        })
    }

    /// Logs in to the admin UI and returns the authenticated session.
    ///
    /// Loads the admin page, fills the login form (keeping its hidden
    /// fields), submits it, and checks the response for the configured
    /// login marker.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError::LoginFormNotFound`] if the page has no
    /// login form, [`AuthenticationError::Rejected`] if the marker is absent
    /// after submitting, and [`AuthenticationError::Transport`] on HTTP failure.
    #[instrument(skip(config, settings), fields(host = %config.host, site = %config.site))]
    pub async fn authenticate(
        config: &SiteConfig,
        settings: &FetchSettings,
    ) -> Result<Self, AuthenticationError> {
        Self::login(config.admin_url()?, config, settings).await
    }

    /// Logs in with `config`'s credentials at an explicit admin URL.
    ///
    /// [`Session::authenticate`] calls this with [`SiteConfig::admin_url`];
    /// use it directly for stores behind a non-standard entry point.
    ///
    /// # Errors
    ///
    /// Same as [`Session::authenticate`].
    pub async fn login(
        base_url: Url,
        config: &SiteConfig,
        settings: &FetchSettings,
    ) -> Result<Self, AuthenticationError> {
        let session = Self::new(base_url, settings)?;

        let page = session.get_text("").await?;
        let form =
            parse_login_form(&page).ok_or_else(|| AuthenticationError::LoginFormNotFound {
                form: LOGIN_FORM_NAME.to_string(),
                url: session.base_url.to_string(),
            })?;

        let mut fields = form.fields;
        set_field(&mut fields, USER_FIELD, &config.username);
        set_field(&mut fields, PASSWORD_FIELD, &config.password);

        debug!(action = %form.action, "Submitting login form");
        let url = session.resolve(&form.action)?;
        let body = session.post_form(&form.action, &fields).await?;
        let body = decode_body(url.as_str(), &body);

        if !contains_marker(&body, &settings.login_marker) {
            return Err(AuthenticationError::Rejected {
                username: config.username.clone(),
            });
        }

        info!(user = %config.username, "Logged in");
        Ok(session)
    }

    /// Returns the admin entry point this session is bound to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the admin URL with `query` as its query string.
    pub fn query_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_query((!query.is_empty()).then_some(query));
        url
    }

    /// Performs a GET of the admin page with `query` and reads the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on network failure, timeout, or non-2xx status.
    #[instrument(skip(self))]
    pub async fn get(&self, query: &str) -> Result<Vec<u8>, TransportError> {
        let url = self.query_url(query);
        debug!("GET request");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))?;
        read_body(url.as_str(), response).await
    }

    /// Like [`Session::get`], but decodes the body as text.
    ///
    /// # Errors
    ///
    /// Same as [`Session::get`].
    pub async fn get_text(&self, query: &str) -> Result<String, TransportError> {
        let body = self.get(query).await?;
        Ok(decode_body(self.query_url(query).as_str(), &body))
    }

    /// POSTs `fields` as a form to `action`, resolved against the admin URL.
    ///
    /// An empty `action` posts back to the admin page itself.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] on an unusable action, network failure,
    /// timeout, or non-2xx status.
    #[instrument(skip(self, fields))]
    pub async fn post_form(
        &self,
        action: &str,
        fields: &[(String, String)],
    ) -> Result<Vec<u8>, TransportError> {
        let url = self.resolve(action)?;
        debug!(url = %url, "POST request with form data");

        let response = self
            .client
            .post(url.clone())
            .form(fields)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url.as_str(), e))?;
        read_body(url.as_str(), response).await
    }

    /// Lock serializing multi-request exports on this session.
    pub(crate) fn export_lock(&self) -> &Mutex<()> {
        &self.export_lock
    }

    fn resolve(&self, action: &str) -> Result<Url, TransportError> {
        if action.is_empty() {
            return Ok(self.base_url.clone());
        }
        self.base_url
            .join(action)
            .map_err(|e| TransportError::InvalidUrl(format!("{action}: {e}")))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

async fn read_body(url: &str, response: Response) -> Result<Vec<u8>, TransportError> {
    let status = response.status();
    debug!(status = %status, "Response received");
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = response
        .bytes()
        .await
        .map_err(|e| TransportError::from_reqwest(url, e))?;
    Ok(body.to_vec())
}

/// Decodes a response body as UTF-8, falling back to Windows-1252.
pub(crate) fn decode_body(url: &str, body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(
                url,
                offset = e.valid_up_to(),
                "Response is not valid UTF-8, decoding as Windows-1252"
            );
            WINDOWS_1252.decode_without_bom_handling(body).0.into_owned()
        }
    }
}

// ============================================================================
// Login Form
// ============================================================================

/// The login form as found on the admin page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoginForm {
    /// Raw `action` attribute (may be relative or empty).
    pub action: String,
    /// Fields to submit: hidden inputs plus the named submit button.
    pub fields: Vec<(String, String)>,
}

/// Finds the login form in an admin page.
pub(crate) fn parse_login_form(html: &str) -> Option<LoginForm> {
    let document = Html::parse_document(html);
    let form_selector = Selector::parse(&format!("form[name=\"{LOGIN_FORM_NAME}\"]")).ok()?;
    let input_selector = Selector::parse("input[name]").ok()?;

    let form = document.select(&form_selector).next()?;
    let action = form.value().attr("action").unwrap_or("").to_string();

    let mut fields = Vec::new();
    let mut has_submit = false;
    for input in form.select(&input_selector) {
        let element = input.value();
        let Some(name) = element.attr("name") else {
            continue;
        };
        let value = element.attr("value").unwrap_or("");
        match element.attr("type").map(str::to_ascii_lowercase).as_deref() {
            Some("hidden") => fields.push((name.to_string(), value.to_string())),
            Some("submit" | "image") if !has_submit => {
                has_submit = true;
                fields.push((name.to_string(), value.to_string()));
            }
            _ => {}
        }
    }

    Some(LoginForm { action, fields })
}

fn set_field(fields: &mut Vec<(String, String)>, name: &str, value: &str) {
    match fields.iter_mut().find(|(field, _)| field == name) {
        Some((_, existing)) => value.clone_into(existing),
        None => fields.push((name.to_string(), value.to_string())),
    }
}

fn contains_marker(body: &str, marker: &str) -> bool {
    body.to_lowercase().contains(&marker.to_lowercase())
}

// ============================================================================
// Tests
// ============================================================================
