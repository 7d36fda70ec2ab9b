//! The back office's three-step export flow.
//!
//! Exporting a table takes three requests on a logged-in session:
//!
//! 1. load the export page for the table's instance,
//! 2. run `doExport`, which prepares the file server-side and streams
//!    progress until it is done,
//! 3. download the prepared file from `ajax_export_send`.
//!
//! The server keeps a single prepared export per session, so the three steps
//! for one table must not interleave with another table's.

use std::path::Path;

use cctools_core::ObjectType;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::error::{FetchError, TransportError};
use crate::session::{Session, decode_body};
use crate::settings::FetchSettings;

/// Query that downloads the prepared export.
const EXPORT_SEND_QUERY: &str = "m=ajax_export_send";

/// Returns the back office export instance for `object_type`.
pub fn export_instance(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::Category => "categories",
        ObjectType::Product => "products",
        ObjectType::ProductOption => "productOptions",
        ObjectType::OptionSet => "optionSets",
        ObjectType::OptionGroup => "optionGroups",
        ObjectType::OptionItem => "options",
        ObjectType::Question => "questions",
        ObjectType::Personalization => "personalizations",
        ObjectType::Variant => "variants",
    }
}

/// Query that loads the export page for `object_type`.
pub fn export_page_query(object_type: ObjectType) -> String {
    let instance = export_instance(object_type);
    format!("m=ajax_export&instance={instance}&checkAccess={instance}")
}

/// Query that prepares the export for `object_type` server-side.
pub fn do_export_query(object_type: ObjectType) -> String {
    format!("{}&rs=doExport", export_page_query(object_type))
}

// ============================================================================
// Export Fetcher
// ============================================================================

/// Runs the export flow on a session and returns the raw table text.
#[derive(Debug, Clone, Default)]
pub struct ExportFetcher {
    settings: FetchSettings,
}

impl ExportFetcher {
    /// Creates a fetcher with the given settings.
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    /// Exports `object_type` and returns the payload as text.
    ///
    /// An export with a header and no data rows is a valid result.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] naming `object_type` if any of the
    /// three requests fails.
    #[instrument(skip(self, session), fields(instance = export_instance(object_type)))]
    pub async fn fetch(
        &self,
        session: &Session,
        object_type: ObjectType,
    ) -> Result<String, FetchError> {
        let wrap = |source: TransportError| FetchError::Transport {
            object_type,
            source,
        };

        let _export = session.export_lock().lock().await;

        debug!("Loading export page");
        session
            .get(&export_page_query(object_type))
            .await
            .map_err(wrap)?;

        debug!("Preparing export");
        let progress = session
            .get(&do_export_query(object_type))
            .await
            .map_err(wrap)?;
        debug!(bytes = progress.len(), "Export prepared");

        let send_url = session.query_url(EXPORT_SEND_QUERY);
        let body = session.get(EXPORT_SEND_QUERY).await.map_err(wrap)?;
        info!(%object_type, bytes = body.len(), "Downloaded export");

        if let Some(dir) = &self.settings.dump_dir {
            dump_payload(dir, object_type, &body).await;
        }

        Ok(decode_body(send_url.as_str(), &body))
    }
}

async fn dump_payload(dir: &Path, object_type: ObjectType, body: &[u8]) {
    let stamp = Utc::now().format("%Y%m%dT%H%M%S");
    let path = dir.join(format!("{object_type}-{stamp}.csv"));

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        warn!(dir = %dir.display(), error = %e, "Failed to create dump directory");
        return;
    }
    match tokio::fs::write(&path, body).await {
        Ok(()) => debug!(path = %path.display(), "Dumped export payload"),
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to dump export payload"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{Reply, TestServer};

    #[test]
    fn test_every_type_has_distinct_instance() {
        let mut instances: Vec<_> = ObjectType::all().iter().map(|t| export_instance(*t)).collect();
        instances.sort_unstable();
        instances.dedup();
        assert_eq!(instances.len(), ObjectType::all().len());
    }

    #[test]
    fn test_export_queries() {
        assert_eq!(
            export_page_query(ObjectType::Product),
            "m=ajax_export&instance=products&checkAccess=products"
        );
        assert_eq!(
            do_export_query(ObjectType::OptionSet),
            "m=ajax_export&instance=optionSets&checkAccess=optionSets&rs=doExport"
        );
    }

    #[tokio::test]
    async fn test_dump_payload_writes_file() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("dumps");

        dump_payload(&dir, ObjectType::Variant, b"Product SKU\n").await;

        let entries: Vec<_> = std::fs::read_dir(&dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let name = entries[0].as_ref().unwrap().file_name();
        assert!(name.to_string_lossy().starts_with("variant-"));
    }

    fn session(server: &TestServer) -> Session {
        Session::new(server.admin_url(), &FetchSettings::default()).unwrap()
    }

    /// Serves `payload` from the send step and progress text elsewhere.
    async fn export_server(payload: &'static [u8]) -> TestServer {
        TestServer::start(move |request| match request.query() {
            EXPORT_SEND_QUERY => Reply::ok(payload),
            query if query.ends_with("&rs=doExport") => Reply::ok("<script>progress(100)</script>"),
            _ => Reply::ok("<html>export page</html>"),
        })
        .await
    }

    #[tokio::test]
    async fn test_fetch_runs_three_steps_in_order() {
        let server = export_server(b"SKU,Product Name\nA1,Tote\n").await;

        let body = ExportFetcher::default()
            .fetch(&session(&server), ObjectType::Product)
            .await
            .unwrap();

        assert_eq!(body, "SKU,Product Name\nA1,Tote\n");
        assert_eq!(
            server.get_queries(),
            vec![
                export_page_query(ObjectType::Product),
                do_export_query(ObjectType::Product),
                EXPORT_SEND_QUERY.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_header_only_export_is_returned() {
        let server = export_server(b"Option Id,Option Group Id,Option Name\n").await;

        let body = ExportFetcher::default()
            .fetch(&session(&server), ObjectType::OptionItem)
            .await
            .unwrap();

        assert_eq!(body, "Option Id,Option Group Id,Option Name\n");
    }

    #[tokio::test]
    async fn test_export_in_windows_1252_keeps_accents() {
        let server = export_server(b"SKU,Product Name\nA1,Caf\xe9 Mug\n").await;

        let body = ExportFetcher::default()
            .fetch(&session(&server), ObjectType::Product)
            .await
            .unwrap();

        assert!(body.contains("Café Mug"));
        assert!(!body.contains('\u{fffd}'));
    }

    #[tokio::test]
    async fn test_failed_step_names_type_and_stops() {
        let server = TestServer::start(|request| {
            if request.query().ends_with("&rs=doExport") {
                Reply::status(500)
            } else {
                Reply::ok("ok")
            }
        })
        .await;

        let err = ExportFetcher::default()
            .fetch(&session(&server), ObjectType::Variant)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::Transport {
                object_type: ObjectType::Variant,
                source: TransportError::Status { status: 500, .. },
            }
        ));
        assert_eq!(server.get_queries().len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_exports_do_not_interleave() {
        let server = export_server(b"x\n").await;
        let session = session(&server);
        let fetcher = ExportFetcher::default();

        let (a, b) = tokio::join!(
            fetcher.fetch(&session, ObjectType::Category),
            fetcher.fetch(&session, ObjectType::Variant),
        );
        a.unwrap();
        b.unwrap();

        let queries = server.get_queries();
        assert_eq!(queries.len(), 6);
        for flow in queries.chunks(3) {
            assert_eq!(flow[2], EXPORT_SEND_QUERY);
            let instance = flow[0].split('&').nth(1).unwrap();
            assert!(flow[1].contains(instance));
        }
    }

    #[tokio::test]
    async fn test_fetch_dumps_payload_when_configured() {
        let temp = tempfile::tempdir().unwrap();
        let server = export_server(b"Category Id\n1\n").await;
        let fetcher = ExportFetcher::new(FetchSettings::default().with_dump_dir(temp.path()));

        fetcher
            .fetch(&session(&server), ObjectType::Category)
            .await
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
