//! Stylesheet parsing into [`RuleNode`]s.
//!
//! Tokenizing and rule-list recovery are delegated to `cssparser`. Selectors
//! and declaration values are kept as source text: this model records what the
//! author wrote, it does not interpret it.

use cssparser::{
    AtRuleParser, BasicParseErrorKind, CowRcStr, DeclarationParser, ParseError, ParseErrorKind,
    Parser, ParserInput, ParserState, QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser,
    StyleSheetParser,
};
use log::debug;

use super::model::{ConditionalBlock, Declaration, Location, RuleNode, StyleRule};
use crate::error::{Error, Result};

/// Structural problems cssparser itself does not reject.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
enum ModelError {
    #[error("empty selector in selector list")]
    EmptySelector,
    #[error("@media nested inside @media is not supported")]
    NestedConditional,
    #[error("at-rule @{0} inside a style rule")]
    AtRuleInStyleRule(String),
    #[error("block is missing its closing '}}'")]
    UnclosedBlock,
}

type RuleResult<'i, T> = std::result::Result<T, ParseError<'i, ModelError>>;

/// Parse stylesheet source into its top-level rule nodes, in source order.
///
/// The first syntax error aborts the parse; no partial result is returned.
pub fn parse(css: &str) -> Result<Vec<RuleNode>> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut nodes = Vec::new();

    let mut rule_parser = TopLevelRuleParser {
        source_len: css.len(),
    };
    for result in StyleSheetParser::new(&mut parser, &mut rule_parser) {
        match result {
            Ok(Some(node)) => nodes.push(node),
            Ok(None) => {}
            Err((error, _)) => return Err(to_error(error)),
        }
    }

    debug!("parsed {} top-level rule nodes", nodes.len());
    Ok(nodes)
}

fn to_error(error: ParseError<'_, ModelError>) -> Error {
    let location = Location::from_source(error.location);
    let reason = match error.kind {
        ParseErrorKind::Custom(model) => model.to_string(),
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected token {token:?}")
        }
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "unexpected end of input".to_string()
        }
        ParseErrorKind::Basic(other) => format!("{other:?}"),
    };
    Error::Parse {
        line: location.line,
        column: location.column,
        reason,
    }
}

/// Prelude of an at-rule: either a conditional block or one we skip.
enum AtPrelude {
    Media(String),
    Skipped(String),
}

fn parse_at_prelude<'i>(name: &CowRcStr<'i>, input: &mut Parser<'i, '_>) -> AtPrelude {
    let start = input.position();
    while input.next().is_ok() {}
    if name.eq_ignore_ascii_case("media") {
        AtPrelude::Media(prelude_text(input.slice_from(start)))
    } else {
        AtPrelude::Skipped(name.to_string())
    }
}

fn skip_block<'i>(
    name: &str,
    start: &ParserState,
    input: &mut Parser<'i, '_>,
    source_len: usize,
) -> RuleResult<'i, ()> {
    debug!(
        "skipping @{name} at {}",
        Location::from_source(start.source_location())
    );
    while input.next().is_ok() {}
    expect_closed(start, input, source_len)
}

/// cssparser closes blocks left open at end of input. A closed block stops
/// on its `}`, so a block body that ran to the end of the source never had one.
fn expect_closed<'i>(
    start: &ParserState,
    input: &mut Parser<'i, '_>,
    source_len: usize,
) -> RuleResult<'i, ()> {
    input.skip_whitespace();
    if input.position().byte_index() >= source_len {
        Err(start
            .source_location()
            .new_custom_error(ModelError::UnclosedBlock))
    } else {
        Ok(())
    }
}

/// Parser for top-level stylesheet rules.
struct TopLevelRuleParser {
    source_len: usize,
}

impl<'i> AtRuleParser<'i> for TopLevelRuleParser {
    type Prelude = AtPrelude;
    type AtRule = Option<RuleNode>;
    type Error = ModelError;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> RuleResult<'i, Self::Prelude> {
        Ok(parse_at_prelude(&name, input))
    }

    fn rule_without_block(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
    ) -> std::result::Result<Self::AtRule, ()> {
        match prelude {
            AtPrelude::Media(_) => Err(()),
            AtPrelude::Skipped(name) => {
                debug!(
                    "skipping @{name} at {}",
                    Location::from_source(start.source_location())
                );
                Ok(None)
            }
        }
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> RuleResult<'i, Self::AtRule> {
        match prelude {
            AtPrelude::Media(condition) => {
                let rules = parse_conditional_body(input, self.source_len)?;
                expect_closed(start, input, self.source_len)?;
                Ok(Some(RuleNode::Conditional(ConditionalBlock {
                    condition,
                    rules,
                    location: Location::from_source(start.source_location()),
                })))
            }
            AtPrelude::Skipped(name) => {
                skip_block(&name, start, input, self.source_len)?;
                Ok(None)
            }
        }
    }
}

impl<'i> QualifiedRuleParser<'i> for TopLevelRuleParser {
    type Prelude = Vec<String>;
    type QualifiedRule = Option<RuleNode>;
    type Error = ModelError;

    fn parse_prelude<'t>(&mut self, input: &mut Parser<'i, 't>) -> RuleResult<'i, Self::Prelude> {
        parse_selector_list(input)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> RuleResult<'i, Self::QualifiedRule> {
        let rule = parse_style_block(prelude, start, input, self.source_len)?;
        Ok(Some(RuleNode::Rule(rule)))
    }
}

/// Parse the rule list inside a `@media` block.
fn parse_conditional_body<'i>(
    input: &mut Parser<'i, '_>,
    source_len: usize,
) -> RuleResult<'i, Vec<StyleRule>> {
    let mut rules = Vec::new();
    let mut body_parser = ConditionalBodyParser { source_len };
    for result in StyleSheetParser::new(input, &mut body_parser) {
        match result {
            Ok(Some(rule)) => rules.push(rule),
            Ok(None) => {}
            Err((error, _)) => return Err(error),
        }
    }
    Ok(rules)
}

/// Parser for the rules of a conditional block. Only one level deep.
struct ConditionalBodyParser {
    source_len: usize,
}

impl<'i> AtRuleParser<'i> for ConditionalBodyParser {
    type Prelude = String;
    type AtRule = Option<StyleRule>;
    type Error = ModelError;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> RuleResult<'i, Self::Prelude> {
        match parse_at_prelude(&name, input) {
            AtPrelude::Media(_) => Err(input.new_custom_error(ModelError::NestedConditional)),
            AtPrelude::Skipped(name) => Ok(name),
        }
    }

    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
    ) -> std::result::Result<Self::AtRule, ()> {
        Ok(None)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> RuleResult<'i, Self::AtRule> {
        skip_block(&prelude, start, input, self.source_len)?;
        Ok(None)
    }
}

impl<'i> QualifiedRuleParser<'i> for ConditionalBodyParser {
    type Prelude = Vec<String>;
    type QualifiedRule = Option<StyleRule>;
    type Error = ModelError;

    fn parse_prelude<'t>(&mut self, input: &mut Parser<'i, 't>) -> RuleResult<'i, Self::Prelude> {
        parse_selector_list(input)
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> RuleResult<'i, Self::QualifiedRule> {
        parse_style_block(prelude, start, input, self.source_len).map(Some)
    }
}

/// Parse a comma-separated list of selectors as source text.
fn parse_selector_list<'i>(input: &mut Parser<'i, '_>) -> RuleResult<'i, Vec<String>> {
    input.parse_comma_separated(|input| {
        let location = input.current_source_location();
        let start = input.position();
        while input.next().is_ok() {}
        let selector = prelude_text(input.slice_from(start));
        if selector.is_empty() {
            return Err(location.new_custom_error(ModelError::EmptySelector));
        }
        Ok(selector)
    })
}

fn parse_style_block<'i>(
    selectors: Vec<String>,
    start: &ParserState,
    input: &mut Parser<'i, '_>,
    source_len: usize,
) -> RuleResult<'i, StyleRule> {
    let mut declarations = Vec::new();
    let mut decl_parser = DeclarationListParser;
    for result in RuleBodyParser::new(input, &mut decl_parser) {
        match result {
            Ok(declaration) => declarations.push(declaration),
            Err((error, _)) => return Err(error),
        }
    }
    expect_closed(start, input, source_len)?;

    Ok(StyleRule {
        selectors,
        declarations,
        location: Location::from_source(start.source_location()),
    })
}

/// Parser for the declarations of one style rule.
struct DeclarationListParser;

impl<'i> AtRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type AtRule = Declaration;
    type Error = ModelError;

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> RuleResult<'i, Self::Prelude> {
        Err(input.new_custom_error(ModelError::AtRuleInStyleRule(name.to_string())))
    }
}

impl<'i> QualifiedRuleParser<'i> for DeclarationListParser {
    type Prelude = ();
    type QualifiedRule = Declaration;
    type Error = ModelError;
}

impl<'i> DeclarationParser<'i> for DeclarationListParser {
    type Declaration = Declaration;
    type Error = ModelError;

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        start: &ParserState,
    ) -> RuleResult<'i, Self::Declaration> {
        let value_start = input.position();
        while input.next().is_ok() {}
        let value = strip_comments(input.slice_from(value_start));

        Ok(Declaration {
            property: name.to_string(),
            value: value.trim().to_string(),
            location: Location::from_source(start.source_location()),
        })
    }
}

impl<'i> RuleBodyItemParser<'i, Declaration, ModelError> for DeclarationListParser {
    fn parse_declarations(&self) -> bool {
        true
    }
    fn parse_qualified(&self) -> bool {
        false
    }
}

/// Remove `/* ... */` comments that sit outside quoted strings.
fn strip_comments(raw: &str) -> String {
    remove_comments(raw, false)
}

/// Selector or `@media` prelude text: comments removed, the gap a comment
/// leaves between two spaces collapsed to one, then trimmed.
fn prelude_text(raw: &str) -> String {
    remove_comments(raw, true).trim().to_string()
}

fn remove_comments(raw: &str, collapse_gaps: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(ch) = chars.next() {
        match quote {
            Some(q) => {
                out.push(ch);
                if ch == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if ch == q {
                    quote = None;
                }
            }
            None if ch == '"' || ch == '\'' => {
                quote = Some(ch);
                out.push(ch);
            }
            None if ch == '/' && chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
                if collapse_gaps && out.ends_with(char::is_whitespace) {
                    while chars.next_if(|c| c.is_whitespace()).is_some() {}
                }
            }
            None => out.push(ch),
        }
    }

    out
}
