//! Reference source front end.
//!
//! Parses assembly text with a `pest` grammar and lowers the parse tree into the
//! `SyntaxTree` shape consumed by the program extractor.

use pest::Parser;
use pest::error::{Error, LineColLocation};
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::asm::hash_source;
use crate::asm::problem::Problem;
use crate::asm::syntax::{Node, NodeKind, OperandKind, OperandNode, SegmentKind, Span, SyntaxTree};

#[derive(Parser)]
#[grammar = "asm/grammar.pest"] // relative to src
struct SourceParser;

/// Parses assembly source into a syntax tree.
///
/// # Errors
///
/// Returns a single `Problem` located at the first character the grammar could not
/// accept.
pub fn parse(source: &str) -> Result<SyntaxTree, Problem> {
    let program = SourceParser::parse(Rule::program, source)
        .map_err(to_problem)?
        .next()
        .ok_or_else(|| Problem::new("empty parse result"))?;

    let mut nodes = Vec::new();
    for line in program.into_inner().filter(|p| p.as_rule() == Rule::line) {
        for item in line.into_inner() {
            if let Some(node) = lower_node(item) {
                nodes.push(node);
            }
        }
    }
    Ok(SyntaxTree::new(nodes, hash_source(source)))
}

fn span_of(pair: &Pair<'_, Rule>) -> Span {
    let (line, start) = pair.as_span().start_pos().line_col();
    let end = start + pair.as_str().chars().count();
    Span::new(u32::try_from(line).unwrap_or(u32::MAX), start, end)
}

fn lower_node(pair: Pair<'_, Rule>) -> Option<Node> {
    let span = span_of(&pair);
    let kind = match pair.as_rule() {
        Rule::label => {
            let name = pair.into_inner().next()?.as_str().to_string();
            NodeKind::Label(name)
        }
        Rule::segment => match pair.as_str() {
            ".text" => NodeKind::Segment(SegmentKind::Text),
            _ => NodeKind::Segment(SegmentKind::Data),
        },
        Rule::directive => {
            let mut inner = pair.into_inner();
            let name = inner.next()?.as_str().trim_start_matches('.').to_string();
            NodeKind::Directive {
                name,
                operands: inner.filter_map(lower_operand).collect(),
            }
        }
        Rule::statement => {
            let mut inner = pair.into_inner();
            let mnemonic = inner.next()?.as_str().to_string();
            NodeKind::Statement {
                mnemonic,
                operands: inner.filter_map(lower_operand).collect(),
            }
        }
        _ => return None,
    };
    Some(Node::new(kind, span))
}

fn lower_operand(pair: Pair<'_, Rule>) -> Option<OperandNode> {
    let span = span_of(&pair);
    let kind = match pair.as_rule() {
        Rule::integer => OperandKind::Integer(pair.as_str().to_string()),
        Rule::register => OperandKind::Register(pair.as_str().to_string()),
        Rule::string => {
            let body = pair
                .into_inner()
                .next()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default();
            OperandKind::String(body)
        }
        Rule::address => {
            let (mut label, mut offset, mut base) = (None, None, None);
            for part in pair.into_inner() {
                let text = Some(part.as_str().to_string());
                match part.as_rule() {
                    Rule::label_ref => label = text,
                    Rule::integer => offset = text,
                    Rule::register => base = text,
                    _ => {}
                }
            }
            OperandKind::Address {
                label,
                offset,
                base,
            }
        }
        _ => return None,
    };
    Some(OperandNode::new(kind, span))
}

fn to_problem(err: Error<Rule>) -> Problem {
    let (line, start, end) = match err.line_col {
        LineColLocation::Pos((line, col)) => (line, col, col + 1),
        LineColLocation::Span((line, start), (_, end)) => (line, start, end),
    };
    Problem::at(
        format!("syntax error: {}", err.variant.message()),
        Span::new(u32::try_from(line).unwrap_or(u32::MAX), start, end),
    )
}
