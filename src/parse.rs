//! Reference parser: statement text -> generic node tree.
//!
//! The evaluator only depends on [`Node`]; this pest grammar is one way of
//! producing it and can be swapped through [`crate::EvalConfig`].

use std::fmt;

use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::errors::ParseError;

#[derive(Parser)]
#[grammar = "construct.pest"]
pub struct ConstructParser;

/// Generic parse-tree node: a literal, a bare name, or `{name, args}`.
///
/// Operators are calls too: `a + b` is `Call { name: "+", args: [a, b] }`,
/// `-a` is `neg`, and `x = e` is `=`.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Number(f64),
    Ident(String),
    Call { name: String, args: Vec<Node> },
}

impl Node {
    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Node {
        Node::Call {
            name: name.into(),
            args,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(n) => write!(f, "{}", n),
            Node::Ident(s) => write!(f, "{}", s),
            Node::Call { name, args } if args.len() == 2 && is_operator(name) => {
                if name == "=" {
                    write!(f, "{} = {}", args[0], args[1])
                } else {
                    write!(f, "({} {} {})", args[0], name, args[1])
                }
            }
            Node::Call { name, args } if name == "neg" && args.len() == 1 => write!(f, "-{}", args[0]),
            Node::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn is_operator(name: &str) -> bool {
    matches!(name, "+" | "-" | "*" | "/" | "^" | "=")
}

fn pratt() -> PrattParser<Rule> {
    PrattParser::new()
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left) | Op::infix(Rule::div, Assoc::Left))
        .op(Op::prefix(Rule::neg))
        .op(Op::infix(Rule::pow, Assoc::Right))
}

/// Parse one statement into a [`Node`].
pub fn parse(source: &str) -> Result<Node, ParseError> {
    let mut pairs = ConstructParser::parse(Rule::statement, source).map_err(|e| {
        let offset = match e.location {
            pest::error::InputLocation::Pos(p) => p,
            pest::error::InputLocation::Span((s, _)) => s,
        };
        ParseError::new(source, offset, e.variant.message().to_string())
    })?;

    let statement = pairs
        .next()
        .ok_or_else(|| ParseError::new(source, 0, "empty statement"))?;
    let body = statement
        .into_inner()
        .find(|p| matches!(p.as_rule(), Rule::assignment | Rule::expr))
        .ok_or_else(|| ParseError::new(source, 0, "empty statement"))?;

    let pratt = pratt();
    match body.as_rule() {
        Rule::assignment => {
            let mut inner = body.into_inner();
            let (Some(name), Some(value)) = (inner.next(), inner.next()) else {
                return Err(ParseError::new(source, 0, "incomplete assignment"));
            };
            let value = parse_expr(&pratt, source, value.into_inner())?;
            Ok(Node::call(
                "=",
                vec![Node::Ident(name.as_str().to_string()), value],
            ))
        }
        _ => parse_expr(&pratt, source, body.into_inner()),
    }
}

fn parse_expr(pratt: &PrattParser<Rule>, source: &str, pairs: Pairs<Rule>) -> Result<Node, ParseError> {
    pratt
        .map_primary(|primary| parse_primary(pratt, source, primary))
        .map_prefix(|op, rhs| match op.as_rule() {
            Rule::neg => Ok(Node::call("neg", vec![rhs?])),
            rule => Err(unexpected(source, &op, rule)),
        })
        .map_infix(|lhs, op, rhs| {
            let name = match op.as_rule() {
                Rule::add => "+",
                Rule::sub => "-",
                Rule::mul => "*",
                Rule::div => "/",
                Rule::pow => "^",
                rule => return Err(unexpected(source, &op, rule)),
            };
            Ok(Node::call(name, vec![lhs?, rhs?]))
        })
        .parse(pairs)
}

fn parse_primary(pratt: &PrattParser<Rule>, source: &str, pair: Pair<Rule>) -> Result<Node, ParseError> {
    match pair.as_rule() {
        Rule::number => pair.as_str().parse::<f64>().map(Node::Number).map_err(|e| {
            ParseError::new(source, pair.as_span().start(), format!("invalid number: {}", e))
        }),
        Rule::ident => Ok(Node::Ident(pair.as_str().to_string())),
        Rule::expr => parse_expr(pratt, source, pair.into_inner()),
        Rule::call => {
            let mut inner = pair.into_inner();
            let name = inner
                .next()
                .map(|p| p.as_str().to_string())
                .ok_or_else(|| ParseError::new(source, 0, "call without a name"))?;
            let args = inner
                .map(|arg| parse_expr(pratt, source, arg.into_inner()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Node::Call { name, args })
        }
        rule => Err(unexpected(source, &pair, rule)),
    }
}

fn unexpected(source: &str, pair: &Pair<Rule>, rule: Rule) -> ParseError {
    ParseError::new(
        source,
        pair.as_span().start(),
        format!("unexpected {:?}", rule),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f64) -> Node {
        Node::Number(v)
    }

    fn id(s: &str) -> Node {
        Node::Ident(s.to_string())
    }

    #[test]
    fn parse_call_with_args() {
        let node = parse("point(1, 2)").unwrap();
        assert_eq!(node, Node::call("point", vec![num(1.0), num(2.0)]));
    }

    #[test]
    fn parse_assignment() {
        let node = parse("a = line(p, q)").unwrap();
        assert_eq!(
            node,
            Node::call("=", vec![id("a"), Node::call("line", vec![id("p"), id("q")])])
        );
    }

    #[test]
    fn precedence_and_associativity() {
        let node = parse("1 + 2 * 3 ^ 2 ^ 1").unwrap();
        let pow = Node::call("^", vec![num(3.0), Node::call("^", vec![num(2.0), num(1.0)])]);
        assert_eq!(
            node,
            Node::call("+", vec![num(1.0), Node::call("*", vec![num(2.0), pow])])
        );
    }

    #[test]
    fn negation_binds_looser_than_power() {
        let node = parse("-2 ^ 2").unwrap();
        assert_eq!(
            node,
            Node::call("neg", vec![Node::call("^", vec![num(2.0), num(2.0)])])
        );
    }

    #[test]
    fn parenthesized_and_trailing_semicolon() {
        let node = parse("(1 - x) / 2;").unwrap();
        assert_eq!(
            node,
            Node::call("/", vec![Node::call("-", vec![num(1.0), id("x")]), num(2.0)])
        );
    }

    #[test]
    fn display_round_trips_through_the_grammar() {
        let text = "a = rotate(polygon(p, q, r), -(45 / 2), origin)";
        let node = parse(text).unwrap();
        assert_eq!(parse(&node.to_string()).unwrap(), node);
    }

    #[test]
    fn empty_call() {
        assert_eq!(parse("group()").unwrap(), Node::call("group", vec![]));
    }

    #[test]
    fn syntax_error_reports_offset() {
        let err = parse("point(1, ").unwrap_err();
        assert!(err.span.offset() <= "point(1, ".len());
        assert!(parse("= 3").is_err());
    }
}
