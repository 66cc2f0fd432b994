use crate::error::{CompileError, Result};
use crate::model::ObjectIdx;
use p3r_language::symbol::*;
use std::fmt::{Display, Formatter};

/// Comparison operators of relational atoms.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Relation {
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl Relation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Relation::Eq => EQ,
            Relation::Neq => NEQ,
            Relation::Lt => LT,
            Relation::Leq => LEQ,
            Relation::Gt => GT,
            Relation::Geq => GEQ,
        }
    }

    /// Relation holding exactly when `self` does not.
    pub fn negate(&self) -> Self {
        match self {
            Relation::Eq => Relation::Neq,
            Relation::Neq => Relation::Eq,
            Relation::Lt => Relation::Geq,
            Relation::Leq => Relation::Gt,
            Relation::Gt => Relation::Leq,
            Relation::Geq => Relation::Lt,
        }
    }

    /// Relation to use when the two operands are exchanged.
    pub fn swap(&self) -> Self {
        match self {
            Relation::Eq => Relation::Eq,
            Relation::Neq => Relation::Neq,
            Relation::Lt => Relation::Gt,
            Relation::Leq => Relation::Geq,
            Relation::Gt => Relation::Lt,
            Relation::Geq => Relation::Leq,
        }
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, Relation::Eq | Relation::Neq)
    }

    pub fn test(&self, lhs: ObjectIdx, rhs: ObjectIdx) -> bool {
        match self {
            Relation::Eq => lhs == rhs,
            Relation::Neq => lhs != rhs,
            Relation::Lt => lhs < rhs,
            Relation::Leq => lhs <= rhs,
            Relation::Gt => lhs > rhs,
            Relation::Geq => lhs >= rhs,
        }
    }

    pub fn is_relational_symbol(symbol: &str) -> bool {
        RELATIONAL_SYMBOLS.contains(&symbol)
    }
}

impl TryFrom<&str> for Relation {
    type Error = CompileError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            EQ => Ok(Relation::Eq),
            NEQ => Ok(Relation::Neq),
            LT => Ok(Relation::Lt),
            LEQ => Ok(Relation::Leq),
            GT => Ok(Relation::Gt),
            GEQ => Ok(Relation::Geq),
            _ => Err(CompileError::unrecognized_expression(
                "Relation::try_from",
                value,
            )),
        }
    }
}

impl Display for Relation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Pushes a negation down to a comparison operator.
/// A non negated symbol is returned as is.
pub fn process_symbol(symbol: &str, negated: bool) -> Result<String> {
    if !negated {
        return Ok(symbol.to_string());
    }
    let relation = Relation::try_from(symbol)
        .map_err(|e| e.chain(format!("process_symbol({}, negated)", symbol)))?;
    Ok(relation.negate().symbol().to_string())
}
