//! Hand-off of document URLs to a browser

use crate::error::{Error, Result};
use url::Url;

/// Opens a document URL in a new browsing context
pub trait DocumentOpener: Send + Sync {
    /// Returns whether the URL was actually handed to a browser.
    fn open(&self, url: &Url) -> Result<bool>;
}

/// Opens URLs with the desktop's default browser
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl DocumentOpener for SystemBrowser {
    fn open(&self, url: &Url) -> Result<bool> {
        open::that_detached(url.as_str()).map_err(|e| Error::Open {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(true)
    }
}

/// Leaves opening to the caller (headless hosts)
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledOpener;

impl DocumentOpener for DisabledOpener {
    fn open(&self, url: &Url) -> Result<bool> {
        tracing::debug!(url = %url, "browser hand-off disabled");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_opener_opens_nothing() {
        let url = Url::parse("http://127.0.0.1:5000/view_pdf/A").unwrap();
        assert!(!DisabledOpener.open(&url).unwrap());
    }
}
