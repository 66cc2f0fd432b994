use std::error::Error;
use std::fmt::{Display, Formatter};

/// Kinds of failures raised while loading a problem, compiling its actions,
/// or evaluating the compiled procedures.
/// - UnsupportedEffectShape: conditional or quantified effect.
/// - UnrecognizedExpression: an expression of a kind the stage cannot handle.
/// - UnresolvedVariableReference: a state variable reached the printer unsubstituted.
/// - DuplicateMappingInsertion: a point inserted twice in a static instantiation,
///   or an object declared twice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ErrorKind {
    UnsupportedEffectShape,
    UnrecognizedExpression,
    UnresolvedVariableReference,
    DuplicateMappingInsertion,
    UnknownSymbol,
    UnknownObject,
    UnknownParameter,
    InvalidArity,
    MissingStateValue,
    #[default]
    Evaluation,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            ErrorKind::UnsupportedEffectShape => "unsupported effect shape",
            ErrorKind::UnrecognizedExpression => "unrecognized expression",
            ErrorKind::UnresolvedVariableReference => "unresolved variable reference",
            ErrorKind::DuplicateMappingInsertion => "duplicate mapping insertion",
            ErrorKind::UnknownSymbol => "unknown symbol",
            ErrorKind::UnknownObject => "unknown object",
            ErrorKind::UnknownParameter => "unknown parameter",
            ErrorKind::InvalidArity => "invalid arity",
            ErrorKind::MissingStateValue => "missing state value",
            ErrorKind::Evaluation => "evaluation error",
        };
        write!(f, "{}", str)
    }
}

/// Error of the preprocessor.
/// The first context is where the error occurred, usually the name of the function.
/// Callers add their own context with `chain` while propagating it.
#[derive(Debug, Clone, Default)]
pub struct CompileError {
    kind: ErrorKind,
    backtrace: Vec<String>,
    message: String,
}

impl CompileError {
    pub fn new(kind: ErrorKind, context: impl Display, message: impl Display) -> Self {
        Self {
            kind,
            backtrace: vec![context.to_string()],
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn get_message(&self) -> &str {
        &self.message
    }

    pub fn get_backtrace(&self) -> &[String] {
        &self.backtrace
    }

    pub fn chain(mut self, context: impl Display) -> Self {
        self.backtrace.push(context.to_string());
        self
    }

    pub fn unsupported_effect_shape(context: impl Display, effect: impl Display) -> Self {
        Self::new(
            ErrorKind::UnsupportedEffectShape,
            context,
            format!(
                "Effect '{}' has a condition or quantified parameters, only unconditional effects are supported.",
                effect
            ),
        )
    }

    pub fn unrecognized_expression(context: impl Display, expression: impl Display) -> Self {
        Self::new(
            ErrorKind::UnrecognizedExpression,
            context,
            format!("Unknown type of expression '{}'", expression),
        )
    }

    pub fn unresolved_variable(context: impl Display, variable: impl Display) -> Self {
        Self::new(
            ErrorKind::UnresolvedVariableReference,
            context,
            format!(
                "State variable {} must be resolved before reaching the printer.",
                variable
            ),
        )
    }

    pub fn duplicate_mapping(context: impl Display, symbol: &str, point: impl Display) -> Self {
        Self::new(
            ErrorKind::DuplicateMappingInsertion,
            context,
            format!("Point {} already present in the instantiation of {}.", point, symbol),
        )
    }

    pub fn duplicate_object(context: impl Display, object: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateMappingInsertion,
            context,
            format!("Object {} declared twice.", object),
        )
    }

    pub fn unknown_symbol(context: impl Display, symbol: &str) -> Self {
        Self::new(
            ErrorKind::UnknownSymbol,
            context,
            format!("Symbol '{}' is not declared in the domain.", symbol),
        )
    }

    pub fn unknown_object(context: impl Display, object: impl Display) -> Self {
        Self::new(
            ErrorKind::UnknownObject,
            context,
            format!("Object '{}' is not declared in the instance.", object),
        )
    }

    pub fn unknown_parameter(context: impl Display, parameter: &str) -> Self {
        Self::new(
            ErrorKind::UnknownParameter,
            context,
            format!("Parameter '{}' is not bound by the action.", parameter),
        )
    }

    pub fn wrong_arity(context: impl Display, symbol: &str, got: usize, expected: usize) -> Self {
        Self::new(
            ErrorKind::InvalidArity,
            context,
            format!(
                "Wrong number of args: {} applied to {} arguments, expected {}.",
                symbol, got, expected
            ),
        )
    }

    pub fn missing_value(context: impl Display, variable: impl Display) -> Self {
        Self::new(
            ErrorKind::MissingStateValue,
            context,
            format!("No value for state variable {}.", variable),
        )
    }

    pub fn evaluation(context: impl Display, message: impl Display) -> Self {
        Self::new(ErrorKind::Evaluation, context, message)
    }
}

impl Error for CompileError {}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}:\n{}", self.kind, self.message)?;
        writeln!(f, "\nbacktrace:")?;
        for a in &self.backtrace {
            writeln!(f, "- from {}", a)?;
        }
        Ok(())
    }
}

impl From<anyhow::Error> for CompileError {
    fn from(a: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Evaluation,
            backtrace: vec!["anyhow".to_string()],
            message: format!("{:?}", a),
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(e: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Evaluation,
            backtrace: vec!["std::io::Error".to_string()],
            message: format!("{:?}", e),
        }
    }
}

impl From<serde_json::Error> for CompileError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            kind: ErrorKind::Evaluation,
            backtrace: vec!["serde_json::Error".to_string()],
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
