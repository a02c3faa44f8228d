use pretty_assertions::assert_eq;

use mipsim_core::asm::extractor::{Extraction, ProgramExtractor};
use mipsim_core::asm::linker::Linker;
use mipsim_core::asm::parser::parse;
use mipsim_core::asm::{AssemblerOptions, Problem, assemble_source};
use mipsim_core::common::Address;
use mipsim_core::isa::abi::RegisterTable;
use mipsim_core::isa::instruction::Instruction;
use mipsim_core::isa::program::LabelKind;

const TEXT: Address = Address::new(0x0040_0000);
const DATA: Address = Address::new(0x1000_0000);

fn extraction(source: &str) -> (Extraction, u64, Vec<Problem>) {
    let tree = parse(source).unwrap();
    let table = RegisterTable::default();
    let (out, problems) = ProgramExtractor::new(&table, false).extract(&tree);
    (out, tree.source_hash, problems)
}

#[test]
fn assigns_text_and_data_addresses() {
    let source = "\
.data
first:  .word 7
greet:  .asciiz \"abc\"
after:  .byte 1
.text
main:   la $a0, greet
loop:   addi $t0, $t0, 1
        j loop
";
    let (out, hash, problems) = extraction(source);
    assert_eq!(problems, vec![]);

    let mut problems = Vec::new();
    let program = Linker::new(TEXT, DATA).link(out, hash, &mut problems).unwrap();

    assert_eq!(problems, vec![]);
    assert_eq!(program.label_address("main"), Some(TEXT));
    assert_eq!(program.label_address("loop"), Some(Address::new(0x0040_0004)));
    assert_eq!(program.label_address("first"), Some(DATA));
    assert_eq!(program.label_address("greet"), Some(Address::new(0x1000_0004)));
    assert_eq!(program.label_address("after"), Some(Address::new(0x1000_0008)));
    assert_eq!(program.text_end(), Address::new(0x0040_000C));
    assert_eq!(program.source_hash(), hash);

    let label = program.label("loop").unwrap();
    assert_eq!(label.kind, LabelKind::Instruction);
    assert_eq!(label.line, 7);
    assert_eq!(program.label("first").unwrap().kind, LabelKind::Variable);

    assert_eq!(
        program.statement_at(Address::new(0x0040_0008)).unwrap().instruction,
        Instruction::J
    );
    assert_eq!(program.statement_at(Address::new(0x0040_0002)), None);
    assert_eq!(program.statement_at(Address::new(0x0040_000C)), None);
    assert_eq!(program.line_of(Address::new(0x0040_0004)), Some(7));
    assert_eq!(program.line_of(Address::new(0x1000_0004)), Some(3));
}

#[test]
fn data_image_is_big_endian_and_sized() {
    let program = assemble_source(
        ".data\nw: .word 0x01020304\ns: .asciiz \"hi\"\nz: .space 3\nh: .half -2\n.text\nmain: nop\n",
        AssemblerOptions::default(),
    )
    .unwrap();

    assert_eq!(
        program.data_image(),
        vec![1, 2, 3, 4, b'h', b'i', 0, 0, 0, 0, 0xFF, 0xFE]
    );
}

#[test]
fn undefined_label_is_reported_at_reference() {
    let (out, hash, problems) = extraction(".text\nmain: j nowhere\n");
    assert_eq!(problems, vec![]);

    let mut problems = Vec::new();
    let program = Linker::new(TEXT, DATA).link(out, hash, &mut problems);

    assert!(program.is_none());
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].message, "undefined label 'nowhere'");
    assert_eq!(problems[0].line, Some(2));
}

#[test]
fn prior_problems_suppress_the_program() {
    let (out, hash, _) = extraction(".text\nmain: nop\n");
    let mut problems = vec![Problem::new("earlier failure")];

    assert!(Linker::new(TEXT, DATA).link(out, hash, &mut problems).is_none());
    assert_eq!(problems.len(), 1);
}

#[test]
fn duplicate_label_resolves_to_first_declaration() {
    let (out, hash, problems) = extraction(".text\nmain: nop\ntwice: nop\ntwice: nop\n");
    assert_eq!(problems.len(), 1);

    let mut fresh = Vec::new();
    let program = Linker::new(TEXT, DATA).link(out, hash, &mut fresh).unwrap();

    assert_eq!(program.label_address("twice"), Some(Address::new(0x0040_0004)));
}

#[test]
fn custom_bases_are_honoured() {
    let options = AssemblerOptions {
        text_base: Address::new(0x1000),
        data_base: Address::new(0x8000),
        ..AssemblerOptions::default()
    };
    let program =
        assemble_source(".data\nv: .word 1\n.text\nmain: nop\n", options).unwrap();

    assert_eq!(program.label_address("main"), Some(Address::new(0x1000)));
    assert_eq!(program.label_address("v"), Some(Address::new(0x8000)));
}

#[test]
fn static_data_must_fit_below_the_heap() {
    let source = ".data\nbig: .space 262144\nx: .word 7\n.text\nmain: lw $t0, x\n";

    let err = assemble_source(source, AssemblerOptions::default()).unwrap_err();

    assert_eq!(err.problems().len(), 1);
    let problem = &err.problems()[0];
    assert_eq!(
        problem.message,
        "static data does not fit below the heap at 0x10040000"
    );
    assert_eq!(problem.line, Some(3));
}

#[test]
fn static_data_may_fill_the_segment_exactly() {
    let program = assemble_source(
        ".data\nbig: .space 262140\nlast: .word 7\n.text\nmain: lw $t0, last\n",
        AssemblerOptions::default(),
    )
    .unwrap();

    assert_eq!(program.label_address("last"), Some(Address::new(0x1003_FFFC)));
}
