//! Static metadata published by the landing page.
//!
//! Asset paths are relative; [`SiteMetadata::resolve`] joins them onto the
//! canonical base URL the way the page's `<head>` does.

use serde::Serialize;
use url::Url;

/// Route the landing page's "Launch App" buttons navigate to.
pub const LAUNCH_ROUTE: &str = "/trust";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SiteMetadata {
    pub title: &'static str,
    pub description: &'static str,
    pub base_url: &'static str,
    pub icon: &'static str,
    pub open_graph_image: &'static str,
}

pub const SITE: SiteMetadata = SiteMetadata {
    title: "CapyFlows",
    description: "Onchain trust distribution",
    base_url: "https://capyflows.vercel.app/",
    icon: "/capyflows-logo.png",
    open_graph_image: "capyflows-og.png",
};

impl SiteMetadata {
    pub fn base(&self) -> Result<Url, url::ParseError> {
        Url::parse(self.base_url)
    }

    /// Resolve a site-relative path (with or without a leading `/`).
    pub fn resolve(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base()?.join(path)
    }

    pub fn icon_url(&self) -> Result<Url, url::ParseError> {
        self.resolve(self.icon)
    }

    pub fn open_graph_image_url(&self) -> Result<Url, url::ParseError> {
        self.resolve(self.open_graph_image)
    }

    pub fn launch_url(&self) -> Result<Url, url::ParseError> {
        self.resolve(LAUNCH_ROUTE)
    }
}
