//! User agent that opens the authorization URL in the system browser

use chainview_common::auth::UserAgent;
use tracing::{info, warn};

/// Opens URLs with the platform's default browser
///
/// When launching is disabled or fails, the URL is logged so the user can
/// open it by hand; navigation itself never fails.
#[derive(Debug, Clone, Copy)]
pub struct BrowserUserAgent {
    open_browser: bool,
}

impl BrowserUserAgent {
    /// `open_browser = false` only logs the URL
    pub const fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

impl UserAgent for BrowserUserAgent {
    fn navigate(&self, url: &str) -> Result<(), String> {
        if !self.open_browser {
            info!(url, "Open this URL to authorize ChainView");
            return Ok(());
        }

        match open::that(url) {
            Ok(()) => info!("Opened authorization URL in the system browser"),
            Err(e) => warn!(error = %e, url, "Could not launch a browser; open the URL manually"),
        }
        Ok(())
    }
}
