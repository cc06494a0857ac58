//! Script parser.
//!
//! Converts test-script source into AST nodes with source location tracking.
//! Purely syntactic: no evaluation, no name resolution. Discovery relies on
//! this guarantee to scan files without running them.

use miette::NamedSource;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::ast::{AstNode, Expr, Span};
use crate::errors::HarnessError;

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct ScriptParser;

/// Parse a whole script into its top-level forms.
///
/// `origin` names the source in diagnostics (normally the file path).
pub fn parse(source: &str, origin: &str) -> Result<Vec<AstNode>, HarnessError> {
    if source.trim().is_empty() {
        return Ok(vec![]);
    }

    let pairs = ScriptParser::parse(Rule::program, source)
        .map_err(|e| convert_parse_error(e, source, origin))?;

    let program = pairs.peek().unwrap(); // pest guarantees program rule exists

    program
        .into_inner()
        .filter(|p| p.as_rule() != Rule::EOI)
        .map(|p| build_ast_node(p, source, origin))
        .collect()
}

fn build_ast_node(pair: Pair<Rule>, source: &str, origin: &str) -> Result<AstNode, HarnessError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::number => {
            let text = pair.as_str();
            let value = text.parse::<f64>().map_err(|_| {
                make_error(
                    format!("invalid number literal '{}'", text),
                    source,
                    origin,
                    span,
                )
            })?;
            Ok(AstNode {
                expr: Expr::Number(value),
                span,
            })
        }

        Rule::boolean => Ok(AstNode {
            expr: Expr::Bool(pair.as_str() == "true"),
            span,
        }),

        Rule::string => Ok(AstNode {
            expr: Expr::String(unescape_string(pair.as_str())),
            span,
        }),

        Rule::symbol => Ok(AstNode {
            expr: Expr::Symbol(pair.as_str().to_string()),
            span,
        }),

        Rule::list => {
            let children: Result<Vec<_>, _> = pair
                .into_inner()
                .map(|p| build_ast_node(p, source, origin))
                .collect();
            Ok(AstNode {
                expr: Expr::List(children?),
                span,
            })
        }

        rule => Err(make_error(
            format!("unsupported rule: {:?}", rule),
            source,
            origin,
            span,
        )),
    }
}

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn unescape_string(text: &str) -> String {
    // Remove surrounding quotes
    let inner = &text[1..text.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('\\') => result.push('\\'),
                Some('"') => result.push('"'),
                Some(other) => {
                    result.push('\\');
                    result.push(other);
                }
                None => result.push('\\'),
            }
        } else {
            result.push(ch);
        }
    }

    result
}

fn make_error(message: String, source: &str, origin: &str, span: Span) -> HarnessError {
    HarnessError::Parse {
        message,
        path: origin.to_string(),
        src: NamedSource::new(origin, source.to_string()),
        span: span.into(),
    }
}

fn convert_parse_error(
    error: pest::error::Error<Rule>,
    source: &str,
    origin: &str,
) -> HarnessError {
    let span = match error.location {
        pest::error::InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        pest::error::InputLocation::Span((start, end)) => Span { start, end },
    };

    let rendered = error.to_string();
    let message = if rendered.contains("expected \")\"") || rendered.contains("expected ')'") {
        "missing closing parenthesis".to_string()
    } else {
        "syntax error".to_string()
    };

    make_error(message, source, origin, span)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_forms() {
        let nodes = parse("", "test.st").unwrap();
        assert!(nodes.is_empty());
    }

    #[test]
    fn parses_a_definition_form() {
        let nodes = parse("(def (test_one) (assert true))", "test.st").unwrap();
        assert_eq!(nodes.len(), 1);
        let items = nodes[0].as_list().unwrap();
        assert_eq!(items[0].as_symbol(), Some("def"));
    }

    #[test]
    fn preserves_declaration_order() {
        let nodes = parse("(def (test_b)) (def (test_a))", "test.st").unwrap();
        let first = nodes[0].as_list().unwrap()[1].as_list().unwrap()[0]
            .as_symbol()
            .unwrap();
        assert_eq!(first, "test_b");
    }

    #[test]
    fn string_escapes() {
        let nodes = parse(r#"(print "a\nb\"c")"#, "test.st").unwrap();
        let items = nodes[0].as_list().unwrap();
        assert_eq!(items[1].as_string(), Some("a\nb\"c"));
    }

    #[test]
    fn unmatched_paren_is_a_parse_error() {
        let err = parse("(def (test_a)", "broken.st").unwrap_err();
        assert!(matches!(err, HarnessError::Parse { .. }));
        assert!(err.to_string().contains("broken.st"));
    }

    #[test]
    fn comments_are_ignored() {
        let nodes = parse("; a comment\n(def (test_a)) ; trailing\n", "test.st").unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn negative_and_fractional_numbers() {
        let nodes = parse("(-1.5 2)", "test.st").unwrap();
        let items = nodes[0].as_list().unwrap();
        assert_eq!(items[0].expr, Expr::Number(-1.5));
        assert_eq!(items[1].expr, Expr::Number(2.0));
    }
}
