//! Rendering collaborator for script-driven pages
//!
//! A renderer loads a page in a real browser engine and returns the markup
//! after scripts have run. The pipeline only calls it when a page's static
//! markup yields no usable content and JS rendering is enabled.
//!
//! The headless-Chromium implementation lives behind the `browser` cargo
//! feature.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// When a rendered page counts as ready
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitStrategy {
    /// The load event fired
    Load,
    /// An element matching the CSS selector exists
    Selector(String),
    /// A fixed delay after navigation
    Delay(Duration),
}

impl Default for WaitStrategy {
    fn default() -> Self {
        Self::Load
    }
}

/// Failures of the rendering collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Renderer is not available: {0}")]
    Unavailable(String),

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to render {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Rendering timed out")]
    Timeout,
}

/// Renders a page and returns its post-script markup
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        url: &Url,
        wait: &WaitStrategy,
        timeout: Duration,
    ) -> Result<String, RenderError>;
}

#[cfg(feature = "browser")]
pub use chromium::ChromiumRenderer;

#[cfg(feature = "browser")]
mod chromium {
    use super::{RenderError, Renderer, WaitStrategy};
    use async_trait::async_trait;
    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::sync::OnceCell;
    use url::Url;

    /// Headless Chromium renderer, launched on first use
    #[derive(Default)]
    pub struct ChromiumRenderer {
        browser: OnceCell<Browser>,
    }

    impl ChromiumRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        async fn browser(&self) -> Result<&Browser, RenderError> {
            self.browser
                .get_or_try_init(|| async {
                    tracing::info!("Launching headless browser");

                    let config = BrowserConfig::builder()
                        .arg("--disable-blink-features=AutomationControlled")
                        .arg("--disable-dev-shm-usage")
                        .arg("--no-first-run")
                        .arg("--no-sandbox")
                        .arg("--disable-gpu")
                        .build()
                        .map_err(RenderError::Launch)?;

                    let (browser, mut handler) = Browser::launch(config)
                        .await
                        .map_err(|e| RenderError::Launch(e.to_string()))?;

                    tokio::spawn(async move {
                        while let Some(event) = handler.next().await {
                            if event.is_err() {
                                break;
                            }
                        }
                    });

                    Ok(browser)
                })
                .await
        }

        async fn load(page: &Page, url: &Url, wait: &WaitStrategy) -> Result<String, RenderError> {
            let navigation_error = |e: chromiumoxide::error::CdpError| RenderError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            };

            page.goto(url.as_str()).await.map_err(navigation_error)?;

            match wait {
                WaitStrategy::Load => {
                    page.wait_for_navigation().await.map_err(navigation_error)?;
                }
                WaitStrategy::Selector(selector) => {
                    page.find_element(selector.as_str())
                        .await
                        .map_err(navigation_error)?;
                }
                WaitStrategy::Delay(delay) => tokio::time::sleep(*delay).await,
            }

            page.content().await.map_err(navigation_error)
        }
    }

    #[async_trait]
    impl Renderer for ChromiumRenderer {
        async fn render(
            &self,
            url: &Url,
            wait: &WaitStrategy,
            timeout: Duration,
        ) -> Result<String, RenderError> {
            let browser = self.browser().await?;
            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| RenderError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?;

            tracing::debug!("Rendering {}", url);
            let result = match tokio::time::timeout(timeout, Self::load(&page, url, wait)).await {
                Ok(result) => result,
                Err(_) => Err(RenderError::Timeout),
            };

            let _ = page.close().await;
            result
        }
    }
}
