//! Opening external links in the system's default handler.

/// Narrow interface to the OS's URL opener.
pub trait LinkOpener {
    fn open(&self, url: &str);
}

/// Hands URLs to the platform's default browser.
pub struct SystemLinkOpener;

impl LinkOpener for SystemLinkOpener {
    fn open(&self, url: &str) {
        tracing::info!(%url, "opening external link");
        if let Err(e) = open::that(url) {
            // No handler for the URL is the host system's problem to surface;
            // we only record it.
            tracing::error!("Failed to open {}: {}", url, e);
        }
    }
}
