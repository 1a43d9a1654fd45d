//! Check-suite configuration.
//!
//! A suite is a JSON document naming one target origin, one viewport, an
//! optional stylesheet and an ordered list of named checks:
//!
//! ```json
//! {
//!   "target": "http://localhost:3003",
//!   "viewport": { "width": 450, "height": 766 },
//!   "stylesheet": "style.css",
//!   "checks": [
//!     { "name": "hero height", "kind": "declaration",
//!       "selector": ".hero", "property": "height",
//!       "accepted": ["70vh"], "context": "conditional" },
//!     { "name": "header gap", "kind": "computed",
//!       "selector": "header", "property": "gap", "expected": "15px" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::query::DeclarationQuery;

pub const DEFAULT_TARGET: &str = "http://localhost:3003";

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    /// A small phone in portrait orientation.
    fn default() -> Self {
        Self {
            width: 450,
            height: 766,
        }
    }
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

/// One kind of check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Check {
    /// A stylesheet declaration assertion.
    Declaration(DeclarationQuery),
    /// The computed value of a property on the first matching element.
    Computed {
        selector: String,
        property: String,
        expected: String,
        /// Zero matching elements is a warning rather than a failure.
        #[serde(default)]
        optional: bool,
    },
    /// An attribute of the first matching element.
    Attribute {
        selector: String,
        attribute: String,
        expected: String,
    },
    /// Passes when at least one nested check passes.
    AnyOf { checks: Vec<Check> },
}

impl Check {
    /// Whether this check needs a rendered page.
    pub fn needs_surface(&self) -> bool {
        match self {
            Check::Declaration(_) => false,
            Check::Computed { .. } | Check::Attribute { .. } => true,
            Check::AnyOf { checks } => checks.iter().any(Check::needs_surface),
        }
    }

    fn validate(&self, name: &str) -> Result<()> {
        match self {
            Check::AnyOf { checks } if checks.is_empty() => Err(Error::Config(format!(
                "check '{name}': any_of needs at least one alternative"
            ))),
            Check::AnyOf { checks } => checks.iter().try_for_each(|c| c.validate(name)),
            Check::Declaration(query) if query.accepted.is_empty() => Err(Error::Config(
                format!("check '{name}': no accepted values"),
            )),
            _ => Ok(()),
        }
    }
}

/// A check with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCheck {
    pub name: String,
    #[serde(flatten)]
    pub check: Check,
}

/// A whole suite: where to look, at what size, and what to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub stylesheet: Option<PathBuf>,
    pub checks: Vec<NamedCheck>,
}

impl Suite {
    /// Parse a suite from JSON text and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let suite: Suite = serde_json::from_str(json)?;
        suite.validate()?;
        Ok(suite)
    }

    /// Load a suite file. A relative stylesheet path resolves against the
    /// directory containing the suite file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut suite = Self::from_json(&data)?;

        if let Some(stylesheet) = &suite.stylesheet {
            if stylesheet.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                suite.stylesheet = Some(base.join(stylesheet));
            }
        }
        Ok(suite)
    }

    fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::Config("viewport must be non-empty".to_string()));
        }

        let mut names = HashSet::new();
        for named in &self.checks {
            if !names.insert(named.name.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate check name '{}'",
                    named.name
                )));
            }
            named.check.validate(&named.name)?;
        }
        Ok(())
    }

    /// Whether any check needs a rendered page.
    pub fn needs_surface(&self) -> bool {
        self.checks.iter().any(|c| c.check.needs_surface())
    }
}
