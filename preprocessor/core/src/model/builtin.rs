use crate::error::{CompileError, Result};
use crate::model::action::Binding;
use crate::model::expression::Relation;
use crate::model::ObjectIdx;
use std::fmt::{Display, Formatter};

/// Where a builtin reads one of its values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Position in the relevant variables.
    Relevant(usize),
    /// Position in the action parameters.
    Parameter(usize),
    Constant(ObjectIdx),
}

impl Operand {
    pub fn value(&self, relevant: &[ObjectIdx], binding: &Binding) -> Result<ObjectIdx> {
        match self {
            Operand::Relevant(p) => relevant.get(*p).copied().ok_or_else(|| {
                CompileError::evaluation(
                    "Operand::value",
                    format!(
                        "relevant value #{} requested, {} provided",
                        p,
                        relevant.len()
                    ),
                )
            }),
            Operand::Parameter(p) => binding.value(*p),
            Operand::Constant(c) => Ok(*c),
        }
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Relevant(p) => write!(f, "X{}", p),
            Operand::Parameter(p) => write!(f, "P{}", p),
            Operand::Constant(c) => write!(f, "{}", c),
        }
    }
}

/// Specialized applicability tests.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuiltinConstraint {
    /// `X = c` or `X != c` for a relevant variable X.
    UnaryRelation {
        relation: Relation,
        variable: usize,
        value: Operand,
    },
    /// `X op Y` for two relevant variables, op one of `=`, `!=`, `<`, `<=`.
    BinaryRelation {
        relation: Relation,
        lhs: usize,
        rhs: usize,
    },
}

impl BuiltinConstraint {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinConstraint::UnaryRelation { relation, .. } => match relation {
                Relation::Eq => "EQXConstraint",
                _ => "NEQXConstraint",
            },
            BuiltinConstraint::BinaryRelation { relation, .. } => match relation {
                Relation::Eq => "EQConstraint",
                Relation::Neq => "NEQConstraint",
                Relation::Lt => "LTConstraint",
                _ => "LEQConstraint",
            },
        }
    }

    pub fn check(&self, relevant: &[ObjectIdx], binding: &Binding) -> Result<bool> {
        match self {
            BuiltinConstraint::UnaryRelation {
                relation,
                variable,
                value,
            } => {
                let x = Operand::Relevant(*variable).value(relevant, binding)?;
                Ok(relation.test(x, value.value(relevant, binding)?))
            }
            BuiltinConstraint::BinaryRelation { relation, lhs, rhs } => {
                let x = Operand::Relevant(*lhs).value(relevant, binding)?;
                let y = Operand::Relevant(*rhs).value(relevant, binding)?;
                Ok(relation.test(x, y))
            }
        }
    }
}

impl Display for BuiltinConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BuiltinConstraint::UnaryRelation {
                relation,
                variable,
                value,
            } => write!(f, "{}(X{} {} {})", self.name(), variable, relation, value),
            BuiltinConstraint::BinaryRelation { relation, lhs, rhs } => {
                write!(f, "{}(X{} {} X{})", self.name(), lhs, relation, rhs)
            }
        }
    }
}

/// Specialized effects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuiltinEffect {
    /// The affected variable takes a constant or parameter value.
    ValueAssignment { value: Operand },
    /// The affected variable takes the value of a relevant variable.
    VariableAssignment { source: usize },
}

impl BuiltinEffect {
    pub fn name(&self) -> &'static str {
        match self {
            BuiltinEffect::ValueAssignment { .. } => "ValueAssignmentEffect",
            BuiltinEffect::VariableAssignment { .. } => "VariableAssignmentEffect",
        }
    }

    /// Value written when it is known at compile time.
    pub fn target_value(&self) -> Option<ObjectIdx> {
        match self {
            BuiltinEffect::ValueAssignment {
                value: Operand::Constant(c),
            } => Some(*c),
            _ => None,
        }
    }

    pub fn value(&self, relevant: &[ObjectIdx], binding: &Binding) -> Result<ObjectIdx> {
        match self {
            BuiltinEffect::ValueAssignment { value } => value.value(relevant, binding),
            BuiltinEffect::VariableAssignment { source } => {
                Operand::Relevant(*source).value(relevant, binding)
            }
        }
    }
}

impl Display for BuiltinEffect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BuiltinEffect::ValueAssignment { value } => write!(f, "{}({})", self.name(), value),
            BuiltinEffect::VariableAssignment { source } => {
                write!(f, "{}(X{})", self.name(), source)
            }
        }
    }
}
