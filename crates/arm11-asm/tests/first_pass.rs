use arm11_asm::{first_pass, AsmError, AsmErrorKind};
use pretty_assertions::assert_eq;

#[test]
fn labels_bind_to_next_instruction() {
    let src = "\
start:
    mov r0, #1      @ index 0
loop: sub r0, r0, #1
    cmp r0, #0

    bne loop        ; index 3
";
    let fp = first_pass(src.lines());
    assert!(fp.errors.is_empty());
    assert_eq!(fp.instructions, 4);
    assert_eq!(fp.symbols.get("start"), Some(0));
    assert_eq!(fp.symbols.get("loop"), Some(1));
    assert_eq!(fp.symbols.get("bne"), None);
}

#[test]
fn trailing_and_stacked_labels_bind_to_end() {
    let fp = first_pass("mov r0, #1\nfirst: second:\nmov r1, #2\ndone:\n".lines());
    assert_eq!(fp.symbols.get("first"), Some(1));
    assert_eq!(fp.symbols.get("second"), Some(1));
    assert_eq!(fp.symbols.get("done"), Some(2));
    let entries = fp.symbols.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].name, "done");
    assert_eq!(entries[0].addr, 8);
}

#[test]
fn duplicate_label_is_reported_once() {
    let fp = first_pass("a:\nmov r0, #1\na:\nmov r1, #1\n".lines());
    assert_eq!(
        fp.errors,
        vec![AsmError::new(3, AsmErrorKind::DuplicateLabel("a".into()))]
    );
    // the first definition stands
    assert_eq!(fp.symbols.get("a"), Some(0));
    assert_eq!(fp.instructions, 2);
}

#[test]
fn pending_duplicate_is_caught() {
    let fp = first_pass("x: x:\nmov r0, #1\n".lines());
    assert_eq!(fp.errors.len(), 1);
    assert_eq!(fp.errors[0].to_string(), "[1] Multiple definitions of the same label: x.");
}

#[test]
fn counts_literal_loads() {
    let fp = first_pass("ldr r0, =0x20200000\nldr r1, [r0]\nldrne r2, =1\n".lines());
    assert_eq!(fp.instructions, 3);
    assert_eq!(fp.literal_slots, 2);
}

#[test]
fn label_after_instruction_names_the_next_one() {
    let fp = first_pass("mov r0, #1 next:\nmov r1, #2\nb next end:\n".lines());
    assert!(fp.errors.is_empty());
    assert_eq!(fp.symbols.get("next"), Some(1));
    assert_eq!(fp.symbols.get("end"), Some(3));

    let fp = first_pass("a:\nmov r0, #1 a:\n".lines());
    assert_eq!(
        fp.errors,
        vec![AsmError::new(2, AsmErrorKind::DuplicateLabel("a".into()))]
    );
}
