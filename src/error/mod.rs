//! Error types for all pipeline phases.
//!
//! Two strata are kept separate: the errors below abort the current phase
//! and are reported by the host, while language-level failures from builtin
//! functions travel through the operand stack as `Object::Error` values.

use thiserror::Error;

use crate::code::OpCode;
use crate::object::ObjectType;
use crate::span::Span;

/// Parser errors. Collected into a list and reported together.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("unexpected token '{found}', expected {expected} at {span}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("could not parse {0:?} as integer at {1}")]
    InvalidInteger(String, Span),

    #[error("{message} at {span}")]
    General { message: String, span: Span },
}

impl ParserError {
    pub fn unexpected_token(
        expected: impl Into<String>,
        found: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::UnexpectedToken {
            expected: expected.into(),
            found: found.into(),
            span,
        }
    }

    pub fn general(message: impl Into<String>, span: Span) -> Self {
        Self::General {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. } => *span,
            Self::InvalidInteger(_, span) => *span,
            Self::General { span, .. } => *span,
        }
    }
}

/// Compilation errors. The compiler stops at the first one.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("undefined variable {0}")]
    UndefinedVariable(String),
}

/// Errors raised by the virtual machine while executing bytecode.
///
/// These carry a descriptive message only; runtime values have no source
/// positions attached.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("stack overflow")]
    StackOverflow,

    #[error("call stack overflow")]
    CallStackOverflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("calling non-function and non-builtin")]
    NotCallable,

    #[error("wrong number of arguments: want={want}, got={got}")]
    WrongArity { want: usize, got: usize },

    #[error("unsupported types for binary operation: {0} {1}")]
    UnsupportedBinaryTypes(ObjectType, ObjectType),

    #[error("unknown integer operator: {0}")]
    UnknownIntegerOperator(OpCode),

    #[error("unknown string operator: {0}")]
    UnknownStringOperator(OpCode),

    #[error("unknown operator: {op} ({left} {right})")]
    UnknownOperator {
        op: OpCode,
        left: ObjectType,
        right: ObjectType,
    },

    #[error("unsupported type for negation: {0}")]
    UnsupportedNegation(ObjectType),

    #[error("unusable as hash key: {0}")]
    UnusableHashKey(ObjectType),

    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),

    #[error("not a function: {0}")]
    NotAFunction(String),

    #[error("unknown opcode: {0}")]
    UnknownOpcode(u8),
}

/// A unified error type for all phases.
#[derive(Debug, Error)]
pub enum MonkeyError {
    #[error("{}", format_parser_errors(.0))]
    Parse(Vec<ParserError>),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_parser_errors(errors: &[ParserError]) -> String {
    let messages: Vec<String> = errors.iter().map(|err| err.to_string()).collect();
    format!("parser errors: {}", messages.join("; "))
}
