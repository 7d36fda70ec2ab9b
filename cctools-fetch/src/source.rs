//! Sources of raw export payloads.

use async_trait::async_trait;
use cctools_core::ObjectType;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::error::FetchError;
use crate::export::ExportFetcher;
use crate::session::Session;
use crate::settings::{FetchSettings, SiteConfig};

// ============================================================================
// Export Source Trait
// ============================================================================

/// Something that can produce the raw export payload for an object type.
///
/// The browser facade only talks to this trait, so tests can substitute a
/// canned source for the live site.
#[async_trait]
pub trait ExportSource: Send + Sync {
    /// Returns the raw export text for `object_type`.
    async fn export(&self, object_type: ObjectType) -> Result<String, FetchError>;
}

// ============================================================================
// Site Source
// ============================================================================

/// Export source backed by the live back office.
///
/// Logs in on the first export and reuses the session afterwards, so a run
/// served entirely from cache never authenticates.
#[derive(Debug)]
pub struct SiteSource {
    config: SiteConfig,
    settings: FetchSettings,
    fetcher: ExportFetcher,
    admin_url: Option<Url>,
    session: OnceCell<Session>,
}

impl SiteSource {
    /// Creates a source for `config`. Does not touch the network.
    pub fn new(config: SiteConfig, settings: FetchSettings) -> Self {
        Self {
            fetcher: ExportFetcher::new(settings.clone()),
            config,
            settings,
            admin_url: None,
            session: OnceCell::new(),
        }
    }

    /// Logs in at `url` instead of the entry point derived from the config.
    #[must_use]
    pub fn with_admin_url(mut self, url: Url) -> Self {
        self.admin_url = Some(url);
        self
    }

    /// Returns the site this source exports from.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Returns true once a login has succeeded.
    pub fn is_authenticated(&self) -> bool {
        self.session.initialized()
    }

    async fn session(&self, object_type: ObjectType) -> Result<&Session, FetchError> {
        self.session
            .get_or_try_init(|| async {
                debug!(%object_type, "First export, logging in");
                match &self.admin_url {
                    Some(url) => Session::login(url.clone(), &self.config, &self.settings).await,
                    None => Session::authenticate(&self.config, &self.settings).await,
                }
            })
            .await
            .map_err(|source| FetchError::Authentication {
                object_type,
                source,
            })
    }
}

#[async_trait]
impl ExportSource for SiteSource {
    async fn export(&self, object_type: ObjectType) -> Result<String, FetchError> {
        let session = self.session(object_type).await?;
        self.fetcher.fetch(session, object_type).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthenticationError;
    use crate::test_server::{Reply, TestServer};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LOGIN_PAGE: &str = r#"<form name="digiSHOP" action="index.php?m=login">
        <input type="hidden" name="token" value="t1"></form>"#;

    #[test]
    fn test_new_source_is_not_authenticated() {
        let source = SiteSource::new(
            SiteConfig::new("shop.example.com", "acme", "clerk", "secret"),
            FetchSettings::default(),
        );
        assert!(!source.is_authenticated());
        assert_eq!(source.config().site, "acme");
    }

    #[tokio::test]
    async fn test_invalid_site_fails_as_authentication_error() {
        let source = SiteSource::new(
            SiteConfig::new("bad host", "acme", "clerk", "secret"),
            FetchSettings::default(),
        );

        let err = source.export(ObjectType::Category).await.unwrap_err();

        assert_eq!(err.object_type(), ObjectType::Category);
        assert!(matches!(
            err,
            FetchError::Authentication {
                source: AuthenticationError::Transport(_),
                ..
            }
        ));
        assert!(!source.is_authenticated());
    }

    #[tokio::test]
    async fn test_logs_in_once_for_several_exports() {
        let logins = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&logins);
        let server = TestServer::start(move |request| {
            if request.method == "POST" {
                counter.fetch_add(1, Ordering::SeqCst);
                return Reply::ok("<a href='?m=logout'>Logout</a>");
            }
            match request.query() {
                "" => Reply::ok(LOGIN_PAGE),
                "m=ajax_export_send" => Reply::ok("Category Id,Category Name\n1,Bags\n"),
                _ => Reply::ok("done"),
            }
        })
        .await;
        let source = SiteSource::new(
            SiteConfig::new("shop.example.com", "acme", "clerk", "secret"),
            FetchSettings::default(),
        )
        .with_admin_url(server.admin_url());

        let first = source.export(ObjectType::Category).await.unwrap();
        source.export(ObjectType::Product).await.unwrap();

        assert_eq!(first, "Category Id,Category Name\n1,Bags\n");
        assert!(source.is_authenticated());
        assert_eq!(logins.load(Ordering::SeqCst), 1);
        assert_eq!(server.get_queries().len(), 1 + 3 + 3);
    }

    #[tokio::test]
    async fn test_rejected_login_stops_before_export() {
        let server = TestServer::start(|request| match request.method.as_str() {
            "POST" => Reply::ok("<p>Invalid password</p>"),
            _ => Reply::ok(LOGIN_PAGE),
        })
        .await;
        let source = SiteSource::new(
            SiteConfig::new("shop.example.com", "acme", "clerk", "wrong"),
            FetchSettings::default(),
        )
        .with_admin_url(server.admin_url());

        let err = source.export(ObjectType::Variant).await.unwrap_err();

        assert!(matches!(
            err,
            FetchError::Authentication {
                object_type: ObjectType::Variant,
                source: AuthenticationError::Rejected { .. },
            }
        ));
        assert!(!source.is_authenticated());
        assert!(server.get_queries().iter().all(|q| !q.contains("ajax_export")));
    }
}
