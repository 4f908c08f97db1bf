/// One line-level assembly failure. Every kind is recoverable: the
/// assembler records it and moves on to the next line.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmErrorKind {
    #[error("Undefined instruction {0}.")]
    UndefinedInstruction(String),
    #[error("Multiple definitions of the same label: {0}.")]
    DuplicateLabel(String),
    #[error("The expression {0} is invalid.")]
    InvalidExpression(String),
    #[error("The register {0} is invalid.")]
    InvalidRegister(String),
    #[error("The expression is missing from the {0} instruction.")]
    MissingExpression(String),
    #[error("The label {0} is not defined.")]
    UndefinedLabel(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("[{line}] {kind}")]
pub struct AsmError {
    pub line: usize,
    pub kind: AsmErrorKind,
}

impl AsmError {
    pub fn new(line: usize, kind: AsmErrorKind) -> Self {
        Self { line, kind }
    }
}
