//! Rendering capabilities consumed by checks that look at a live page.
//!
//! Driving a browser is not part of this crate. A [`RenderingSurface`] hands
//! out isolated [`Page`]s; each check opens its own page and the page is
//! released when it is dropped, whatever the check's outcome.
//!
//! [`SnapshotSurface`] serves pages from computed-style snapshots recorded
//! elsewhere, keyed by URL and viewport.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use serde::{Deserialize, Serialize};

use super::suite::Viewport;
use crate::error::{Error, Result};

/// Something that can open isolated pages at a given viewport.
pub trait RenderingSurface: Sync {
    fn open(&self, viewport: Viewport) -> Result<Box<dyn Page + '_>>;
}

/// One isolated browsing context.
pub trait Page {
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Number of elements matching `selector`.
    fn element_count(&self, selector: &str) -> Result<usize>;

    /// Computed value of `property` on the first element matching `selector`,
    /// or `None` when nothing matches.
    fn computed_style(&self, selector: &str, property: &str) -> Result<Option<String>>;

    /// Attribute `name` of the first element matching `selector`, or `None`
    /// when nothing matches or the attribute is absent.
    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;
}

/// Recorded state of the elements matching one selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    #[serde(default = "one")]
    pub count: usize,
    #[serde(default)]
    pub computed: BTreeMap<String, String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

fn one() -> usize {
    1
}

/// A page as rendered at one URL and viewport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub url: String,
    pub viewport: Viewport,
    #[serde(default)]
    pub elements: BTreeMap<String, ElementSnapshot>,
}

impl PageSnapshot {
    fn element(&self, selector: &str) -> Option<&ElementSnapshot> {
        self.elements
            .get(selector.trim())
            .filter(|element| element.count > 0)
    }
}

/// A surface backed by recorded page snapshots.
#[derive(Debug, Default)]
pub struct SnapshotSurface {
    pages: Vec<PageSnapshot>,
    open_pages: AtomicUsize,
}

impl SnapshotSurface {
    pub fn new(pages: Vec<PageSnapshot>) -> Self {
        Self {
            pages,
            open_pages: AtomicUsize::new(0),
        }
    }

    /// Parse a JSON array of page snapshots.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Pages currently open and not yet released.
    pub fn open_pages(&self) -> usize {
        self.open_pages.load(Ordering::SeqCst)
    }
}

impl RenderingSurface for SnapshotSurface {
    fn open(&self, viewport: Viewport) -> Result<Box<dyn Page + '_>> {
        self.open_pages.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SnapshotPage {
            surface: self,
            viewport,
            current: None,
        }))
    }
}

struct SnapshotPage<'a> {
    surface: &'a SnapshotSurface,
    viewport: Viewport,
    current: Option<&'a PageSnapshot>,
}

impl<'a> SnapshotPage<'a> {
    fn loaded(&self) -> Result<&'a PageSnapshot> {
        self.current
            .ok_or_else(|| Error::Surface("page queried before navigation".to_string()))
    }
}

impl Page for SnapshotPage<'_> {
    fn navigate(&mut self, url: &str) -> Result<()> {
        let page = self
            .surface
            .pages
            .iter()
            .find(|page| page.url == url && page.viewport == self.viewport)
            .ok_or_else(|| {
                Error::Surface(format!(
                    "no snapshot of {url} at {}x{}",
                    self.viewport.width, self.viewport.height
                ))
            })?;
        debug!("navigated to {url} ({} recorded selectors)", page.elements.len());
        self.current = Some(page);
        Ok(())
    }

    fn element_count(&self, selector: &str) -> Result<usize> {
        Ok(self
            .loaded()?
            .elements
            .get(selector.trim())
            .map_or(0, |element| element.count))
    }

    fn computed_style(&self, selector: &str, property: &str) -> Result<Option<String>> {
        let Some(element) = self.loaded()?.element(selector) else {
            return Ok(None);
        };
        element
            .computed
            .get(property)
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                Error::Surface(format!(
                    "snapshot has no computed '{property}' for '{selector}'"
                ))
            })
    }

    fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .loaded()?
            .element(selector)
            .and_then(|element| element.attributes.get(name).cloned()))
    }
}

impl Drop for SnapshotPage<'_> {
    fn drop(&mut self) {
        self.surface.open_pages.fetch_sub(1, Ordering::SeqCst);
    }
}
