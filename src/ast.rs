// All AST nodes carry a span for source tracking; spans feed the miette
// diagnostics attached to parse and load errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start, span.end.saturating_sub(span.start)).into()
    }
}

/// A single expression in a test script.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    List(Vec<AstNode>),
    Symbol(String),
    String(String),
    Number(f64),
    Bool(bool),
}

/// An expression together with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub expr: Expr,
    pub span: Span,
}

impl AstNode {
    pub fn as_symbol(&self) -> Option<&str> {
        match &self.expr {
            Expr::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AstNode]> {
        match &self.expr {
            Expr::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match &self.expr {
            Expr::String(s) => Some(s),
            _ => None,
        }
    }

    // Utility: pretty printing for traces and assertion messages
    pub fn pretty(&self) -> String {
        match &self.expr {
            Expr::List(items) => {
                let inner = items
                    .iter()
                    .map(|n| n.pretty())
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("({})", inner)
            }
            Expr::Symbol(s) => s.clone(),
            Expr::String(s) => format!("{:?}", s),
            Expr::Number(n) => n.to_string(),
            Expr::Bool(b) => b.to_string(),
        }
    }
}
