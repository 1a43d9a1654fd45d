//! Concurrent execution of a check suite.

use std::fmt;

use log::{debug, info, warn};
use rayon::prelude::*;

use super::suite::{Check, Suite};
use super::surface::{Page, RenderingSurface};
use crate::error::{Error, Result};
use crate::query::StylesheetSource;

/// Result of a single check.
#[derive(Debug)]
pub enum Outcome {
    Passed,
    /// Soft pass that must stay visible, e.g. an optional element is absent.
    Warned(String),
    Failed(Error),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

impl From<Result<Outcome>> for Outcome {
    fn from(result: Result<Outcome>) -> Self {
        result.unwrap_or_else(Outcome::Failed)
    }
}

#[derive(Debug)]
pub struct CheckReport {
    pub name: String,
    pub outcome: Outcome,
}

/// Outcomes of a whole suite, in suite order.
#[derive(Debug, Default)]
pub struct Report {
    pub checks: Vec<CheckReport>,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    pub fn warned(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Warned(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(Outcome::is_failure)
    }

    /// Every check passed or merely warned.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn get(&self, name: &str) -> Option<&Outcome> {
        self.checks
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.outcome)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.checks.iter().filter(|c| pred(&c.outcome)).count()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for check in &self.checks {
            match &check.outcome {
                Outcome::Passed => writeln!(f, "PASS  {}", check.name)?,
                Outcome::Warned(message) => writeln!(f, "WARN  {}: {message}", check.name)?,
                Outcome::Failed(error) => {
                    writeln!(f, "FAIL  {} [{}]: {error}", check.name, error.kind())?
                }
            }
        }
        write!(
            f,
            "{} passed, {} warned, {} failed",
            self.passed(),
            self.warned(),
            self.failed()
        )
    }
}

/// Runs a suite's checks against a stylesheet and an optional surface.
pub struct Runner<'a> {
    suite: &'a Suite,
    stylesheet: Option<StylesheetSource>,
    surface: Option<&'a dyn RenderingSurface>,
}

impl<'a> Runner<'a> {
    /// A runner using the suite's own stylesheet path, if any.
    pub fn new(suite: &'a Suite) -> Self {
        Self {
            suite,
            stylesheet: suite.stylesheet.as_ref().map(StylesheetSource::file),
            surface: None,
        }
    }

    pub fn with_stylesheet(mut self, source: StylesheetSource) -> Self {
        self.stylesheet = Some(source);
        self
    }

    pub fn with_surface(mut self, surface: &'a dyn RenderingSurface) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Run every check concurrently; outcomes keep suite order.
    pub fn run(&self) -> Report {
        info!(
            "running {} checks against {} at {}x{}",
            self.suite.checks.len(),
            self.suite.target,
            self.suite.viewport.width,
            self.suite.viewport.height
        );

        let checks = self
            .suite
            .checks
            .par_iter()
            .map(|named| {
                let outcome = self.run_check(&named.check);
                match &outcome {
                    Outcome::Passed => debug!("{}: passed", named.name),
                    Outcome::Warned(message) => warn!("{}: {message}", named.name),
                    Outcome::Failed(error) => debug!("{}: {error}", named.name),
                }
                CheckReport {
                    name: named.name.clone(),
                    outcome,
                }
            })
            .collect();

        Report { checks }
    }

    fn run_check(&self, check: &Check) -> Outcome {
        match check {
            Check::Declaration(query) => match &self.stylesheet {
                Some(source) => match source.assert(query) {
                    Ok(_) => Outcome::Passed,
                    Err(error) => Outcome::Failed(error),
                },
                None => Outcome::Failed(Error::Config("no stylesheet configured".to_string())),
            },
            Check::Computed {
                selector,
                property,
                expected,
                optional,
            } => self
                .with_page(|page| computed(page, selector, property, expected, *optional))
                .into(),
            Check::Attribute {
                selector,
                attribute,
                expected,
            } => self
                .with_page(|page| attribute_value(page, selector, attribute, expected))
                .into(),
            Check::AnyOf { checks } => self.any_of(checks),
        }
    }

    /// Open a page, navigate to the target and hand it to `body`. The page is
    /// released when this returns, on every path.
    fn with_page<F>(&self, body: F) -> Result<Outcome>
    where
        F: FnOnce(&dyn Page) -> Result<Outcome>,
    {
        let Some(surface) = self.surface else {
            return Ok(Outcome::Warned(
                "skipped: no rendering surface configured".to_string(),
            ));
        };
        let mut page = surface.open(self.suite.viewport)?;
        page.navigate(&self.suite.target)?;
        body(&*page)
    }

    fn any_of(&self, checks: &[Check]) -> Outcome {
        let mut failures = Vec::new();
        for check in checks {
            match self.run_check(check) {
                Outcome::Passed => return Outcome::Passed,
                Outcome::Warned(message) => {
                    warn!("alternative did not pass: {message}");
                    failures.push(message);
                }
                Outcome::Failed(error) => failures.push(error.to_string()),
            }
        }
        Outcome::Failed(Error::NoAlternativePassed { failures })
    }
}

fn computed(
    page: &dyn Page,
    selector: &str,
    property: &str,
    expected: &str,
    optional: bool,
) -> Result<Outcome> {
    if page.element_count(selector)? == 0 {
        let message = format!("no element matches '{selector}'");
        return if optional {
            Ok(Outcome::Warned(message))
        } else {
            Err(Error::Surface(message))
        };
    }

    let actual = page
        .computed_style(selector, property)?
        .ok_or_else(|| Error::Surface(format!("no element matches '{selector}'")))?;
    if actual == expected {
        Ok(Outcome::Passed)
    } else {
        Err(Error::ComputedMismatch {
            selector: selector.to_string(),
            property: property.to_string(),
            actual,
            expected: expected.to_string(),
        })
    }
}

fn attribute_value(
    page: &dyn Page,
    selector: &str,
    attribute: &str,
    expected: &str,
) -> Result<Outcome> {
    let actual = page.attribute(selector, attribute)?.ok_or_else(|| {
        Error::Surface(format!("'{selector}' has no '{attribute}' attribute"))
    })?;
    if actual == expected {
        Ok(Outcome::Passed)
    } else {
        Err(Error::AttributeMismatch {
            selector: selector.to_string(),
            attribute: attribute.to_string(),
            actual,
            expected: expected.to_string(),
        })
    }
}
