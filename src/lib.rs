//! # rulecheck
//!
//! Structural assertions over CSS stylesheets, plus a small harness for
//! responsive-layout check suites.
//!
//! A stylesheet is parsed into an ordered tree of style rules and `@media`
//! blocks. Queries then ask whether a selector declares a property with one
//! of a set of accepted values, either in the default rules or inside a
//! conditional block. Nothing here computes the cascade: the first matching
//! rule and the first matching declaration win.
//!
//! ## Quick Start
//!
//! ```
//! use rulecheck::{DeclarationQuery, Stylesheet, assert_declaration};
//!
//! let stylesheet = Stylesheet::parse(
//!     ".hero { height: 100vh; } @media (max-width: 768px) { .hero { height: 70vh; } }",
//! )
//! .unwrap();
//!
//! let query = DeclarationQuery::new(".hero", "height").accept("70vh").conditional();
//! assert!(assert_declaration(&stylesheet, &query).is_ok());
//! ```

pub mod css;
pub mod error;
pub mod harness;
pub mod query;

pub use css::{Declaration, RuleNode, Stylesheet};
pub use error::{Error, FailureKind, Result};
pub use query::{
    Context, DeclarationQuery, StylesheetSource, assert_declaration, assert_declaration_in_source,
    find_declaration,
};
