//! Where stylesheet text comes from.

use std::fs;
use std::path::{Path, PathBuf};

use super::{DeclarationQuery, assert_declaration};
use crate::css::{Declaration, Stylesheet};
use crate::error::Result;

/// Stylesheet text, either held in memory or read from disk.
///
/// File sources are re-read on every load, so each assertion sees the file
/// as it is at that moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesheetSource {
    Inline(String),
    File(PathBuf),
}

impl StylesheetSource {
    pub fn file(path: impl AsRef<Path>) -> Self {
        StylesheetSource::File(path.as_ref().to_path_buf())
    }

    pub fn inline(css: impl Into<String>) -> Self {
        StylesheetSource::Inline(css.into())
    }

    /// Read the current source text.
    pub fn load(&self) -> Result<String> {
        match self {
            StylesheetSource::Inline(css) => Ok(css.clone()),
            StylesheetSource::File(path) => Ok(fs::read_to_string(path)?),
        }
    }

    /// Load and parse the current source text.
    pub fn parse(&self) -> Result<Stylesheet> {
        Stylesheet::parse(&self.load()?)
    }

    /// Load, parse and assert in one pass.
    pub fn assert(&self, query: &DeclarationQuery) -> Result<Declaration> {
        let stylesheet = self.parse()?;
        assert_declaration(&stylesheet, query).cloned()
    }
}
