//! Stylesheet model and parsing.
//!
//! The model keeps selectors and values as written. Nothing here resolves
//! the cascade or expands shorthands.

mod model;
mod parser;

pub use model::{ConditionalBlock, Declaration, Location, RuleNode, StyleRule, Stylesheet};
pub use parser::parse;
