use pretty_assertions::assert_eq;

use mipsim_core::asm::parser::parse;
use mipsim_core::asm::syntax::{NodeKind, OperandKind, SegmentKind, Span};

fn register(text: &str) -> OperandKind {
    OperandKind::Register(text.to_string())
}

fn integer(text: &str) -> OperandKind {
    OperandKind::Integer(text.to_string())
}

fn address(label: Option<&str>, offset: Option<&str>, base: Option<&str>) -> OperandKind {
    OperandKind::Address {
        label: label.map(str::to_string),
        offset: offset.map(str::to_string),
        base: base.map(str::to_string),
    }
}

fn operand_kinds(kind: &NodeKind) -> Vec<OperandKind> {
    match kind {
        NodeKind::Statement { operands, .. } | NodeKind::Directive { operands, .. } => {
            operands.iter().map(|o| o.kind.clone()).collect()
        }
        other => panic!("node has no operands: {other:?}"),
    }
}

#[test]
fn label_and_statement_share_a_line() {
    let tree = parse("main: addi $t0, $zero, 5").unwrap();

    assert_eq!(tree.nodes.len(), 2);
    assert_eq!(tree.nodes[0].kind, NodeKind::Label("main".to_string()));
    assert_eq!(tree.nodes[0].span, Span::new(1, 1, 6));

    let NodeKind::Statement { mnemonic, .. } = &tree.nodes[1].kind else {
        panic!("expected a statement, got {:?}", tree.nodes[1].kind);
    };
    assert_eq!(mnemonic, "addi");
    assert_eq!(
        operand_kinds(&tree.nodes[1].kind),
        vec![register("$t0"), register("$zero"), integer("5")]
    );
    assert_eq!(tree.nodes[1].span.line, 1);
    assert_eq!(tree.nodes[1].span.start, 7);
}

#[test]
fn segments_directives_and_comments() {
    let source = "\
# header comment
.data
msg:    .asciiz \"hi\\n\"   # trailing comment
nums:   .word 1, -2, 0x10
.text
";
    let tree = parse(source).unwrap();
    let kinds: Vec<_> = tree.nodes.iter().map(|n| n.kind.clone()).collect();

    assert_eq!(kinds.len(), 6);
    assert_eq!(kinds[0], NodeKind::Segment(SegmentKind::Data));
    assert_eq!(kinds[1], NodeKind::Label("msg".to_string()));
    assert_eq!(
        operand_kinds(&kinds[2]),
        vec![OperandKind::String("hi\\n".to_string())]
    );
    assert_eq!(kinds[3], NodeKind::Label("nums".to_string()));
    assert_eq!(
        operand_kinds(&kinds[4]),
        vec![integer("1"), integer("-2"), integer("0x10")]
    );
    assert_eq!(kinds[5], NodeKind::Segment(SegmentKind::Text));
    assert_eq!(tree.nodes[5].span.line, 5);
}

#[test]
fn address_operand_shapes() {
    let source = "\
lw $t0, 4($sp)
sw $t1, ($a0)
la $a0, msg
lw $t2, table+8
lb $t3, table($t4)
j loop";
    let tree = parse(source).unwrap();
    let second: Vec<_> = tree
        .nodes
        .iter()
        .map(|n| operand_kinds(&n.kind).pop().unwrap())
        .collect();

    assert_eq!(
        second,
        vec![
            address(None, Some("4"), Some("$sp")),
            address(None, None, Some("$a0")),
            address(Some("msg"), None, None),
            address(Some("table"), Some("+8"), None),
            address(Some("table"), None, Some("$t4")),
            address(Some("loop"), None, None),
        ]
    );
}

#[test]
fn several_labels_may_precede_one_statement() {
    let tree = parse("a: b:\n  c: nop").unwrap();
    let labels: Vec<_> = tree
        .nodes
        .iter()
        .filter_map(|n| match &n.kind {
            NodeKind::Label(name) => Some((name.clone(), n.span.line)),
            _ => None,
        })
        .collect();

    assert_eq!(
        labels,
        vec![
            ("a".to_string(), 1),
            ("b".to_string(), 1),
            ("c".to_string(), 2)
        ]
    );
}

#[test]
fn syntax_error_is_located() {
    let problem = parse(".text\nmain: add $t0 $t1").unwrap_err();

    assert_eq!(problem.line, Some(2));
    assert!(problem.message.starts_with("syntax error"), "{problem}");
    assert!(problem.to_string().starts_with("2:"));
}

#[test]
fn source_hash_tracks_content() {
    let a = parse("nop").unwrap();
    let b = parse("nop").unwrap();
    let c = parse("nop\n").unwrap();

    assert_eq!(a.source_hash, b.source_hash);
    assert_ne!(a.source_hash, c.source_hash);
}
