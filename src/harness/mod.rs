//! Check suites and their execution.
//!
//! A [`Suite`] lists named checks. Declaration checks query the stylesheet;
//! computed and attribute checks ask a [`RenderingSurface`] for what a page
//! actually rendered. The [`Runner`] executes them and collects a [`Report`].

mod runner;
mod suite;
mod surface;

pub use runner::{CheckReport, Outcome, Report, Runner};
pub use suite::{Check, DEFAULT_TARGET, NamedCheck, Suite, Viewport};
pub use surface::{ElementSnapshot, Page, PageSnapshot, RenderingSurface, SnapshotSurface};
