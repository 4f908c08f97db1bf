use arm11_asm::{assemble, AsmError, AsmErrorKind};
use pretty_assertions::assert_eq;

fn messages(src: &str) -> Vec<String> {
    assemble(src)
        .expect_err("source should not assemble")
        .iter()
        .map(|e| e.to_string())
        .collect()
}

#[test]
fn message_texts() {
    assert_eq!(messages("foo r0, r1"), vec!["[1] Undefined instruction foo."]);
    assert_eq!(
        messages("mov r0, #0x101"),
        vec!["[1] The expression #0x101 is invalid."]
    );
    assert_eq!(messages("mov r16, #1"), vec!["[1] The register r16 is invalid."]);
    assert_eq!(
        messages("add r0, r1"),
        vec!["[1] The expression is missing from the add instruction."]
    );
    assert_eq!(messages("b nowhere"), vec!["[1] The label nowhere is not defined."]);
}

#[test]
fn operand_errors() {
    let errs = assemble(
        "mov foo, #1\nadd r0, r1, x\nstr r0, =5\nlsl r0, #32\nldr r0, [r1\nadd r0, r1, =4\n",
    )
    .unwrap_err();
    let kinds: Vec<AsmErrorKind> = errs.into_iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AsmErrorKind::InvalidRegister("foo".into()),
            AsmErrorKind::InvalidExpression("x".into()),
            AsmErrorKind::InvalidExpression("=5".into()),
            AsmErrorKind::InvalidExpression("#32".into()),
            AsmErrorKind::InvalidExpression("[r1".into()),
            AsmErrorKind::InvalidExpression("=4".into()),
        ]
    );
}

#[test]
fn leftover_operand_is_undefined() {
    assert_eq!(
        messages("mov r0, #1, r2"),
        vec!["[1] Undefined instruction r2."]
    );
}

#[test]
fn errors_from_both_passes_sorted_by_line() {
    let src = "\
bogus
a: mov r0, #1
a: mov r1, #1
b missing
";
    let errs = assemble(src).unwrap_err();
    assert_eq!(
        errs,
        vec![
            AsmError::new(1, AsmErrorKind::UndefinedInstruction("bogus".into())),
            AsmError::new(3, AsmErrorKind::DuplicateLabel("a".into())),
            AsmError::new(4, AsmErrorKind::UndefinedLabel("missing".into())),
        ]
    );
}

#[test]
fn duplicate_alone_still_fails_after_pass_two() {
    let errs = assemble("x:\nmov r0, #1\nx:\nandeq r0, r0, r0\n").unwrap_err();
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].kind, AsmErrorKind::DuplicateLabel("x".into()));
}

#[test]
fn every_stray_token_is_reported() {
    assert_eq!(
        messages("foo bar\nmov r0, #1\n"),
        vec!["[1] Undefined instruction foo.", "[1] Undefined instruction bar."]
    );
    // stray tokens are reported, then the statement itself
    assert_eq!(
        messages("junk add r0, r1\n"),
        vec![
            "[1] Undefined instruction junk.",
            "[1] The expression is missing from the add instruction.",
        ]
    );
}

#[test]
fn mnemonic_as_branch_target_is_missing_expression() {
    assert_eq!(
        messages("b mov r0, #1\n"),
        vec!["[1] The expression is missing from the b instruction."]
    );
}
