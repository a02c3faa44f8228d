use pretty_assertions::assert_eq;

use mipsim_core::isa::disasm::{disassemble, listing};

use crate::common::harness::assemble;

#[test]
fn statements_render_with_numeric_registers() {
    let program = assemble(".data\nmsg: .asciiz \"x\"\n.text\nmain: addi $t0, $zero, -5\n la $a0, msg\n lw $t1, 8($sp)\n syscall\n");
    let text: Vec<_> = program.statements().values().map(disassemble).collect();

    assert_eq!(
        text,
        vec!["addi $8, $0, -5", "la $4, msg", "lw $9, 8($29)", "syscall"]
    );
}

#[test]
fn listing_prefixes_address_and_line() {
    let program = assemble(".text\nmain: nop\n\n  jr $ra\n");

    assert_eq!(
        listing(&program),
        vec!["0x00400000:    2: nop", "0x00400004:    4: jr $31"]
    );
}
