//! In-memory render surface for crawler tests

use crate::render::{select_nodes, RenderSurface, RenderedNode};
use crate::HarvestError;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

/// Serves canned HTML by URL; unknown URLs fail like a 404
#[derive(Debug, Default)]
pub struct StaticSurface {
    pages: HashMap<String, String>,
    hanging: HashSet<String>,
    current: Option<(String, String)>,
    navigations: Vec<String>,
}

impl StaticSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Navigations to `url` never complete
    pub fn hanging(mut self, url: &str) -> Self {
        self.hanging.insert(url.to_string());
        self
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }
}

#[async_trait]
impl RenderSurface for StaticSurface {
    async fn navigate(&mut self, url: &str) -> Result<(), HarvestError> {
        self.navigations.push(url.to_string());
        self.current = None;

        if self.hanging.contains(url) {
            std::future::pending::<()>().await;
        }

        match self.pages.get(url) {
            Some(html) => {
                self.current = Some((url.to_string(), html.clone()));
                Ok(())
            }
            None => Err(HarvestError::Navigation {
                url: url.to_string(),
                message: "HTTP 404 (dead link)".to_string(),
            }),
        }
    }

    async fn wait_for_settled_url(&mut self, pattern: &str) -> Result<(), HarvestError> {
        match &self.current {
            Some((url, _)) if url.contains(pattern) => Ok(()),
            Some((url, _)) => Err(HarvestError::Unsettled {
                url: url.clone(),
                pattern: pattern.to_string(),
            }),
            None => Err(HarvestError::Navigation {
                url: String::new(),
                message: "no page loaded".to_string(),
            }),
        }
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|(url, _)| url.as_str())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<RenderedNode>, HarvestError> {
        match &self.current {
            Some((_, html)) => select_nodes(html, selector),
            None => Ok(Vec::new()),
        }
    }
}
