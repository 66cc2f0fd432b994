use crate::error::{CompileError, Result};
use crate::model::variable::{Arg, Variable};
use p3r_language::symbol::{ARITHMETIC_SYMBOLS, NEGATION_PREFIX};
use std::fmt::{Display, Formatter};

pub mod dump;
pub mod eval;
pub mod relation;

pub use relation::{process_symbol, Relation};

/// Application of a function symbol to subterms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionalExpression {
    pub symbol: String,
    pub arguments: Vec<Expression>,
}

/// Application of a predicate (or comparison) symbol, possibly negated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PredicativeExpression {
    pub symbol: String,
    pub negated: bool,
    pub arguments: Vec<Expression>,
}

/// Node of an expression tree.
///
/// `Static*`, `Relational` and `Arithmetic` nodes never depend on the state:
/// they can be evaluated against the static data of the problem.
/// `Variable` wraps a state variable and has to be resolved before printing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    Functional(FunctionalExpression),
    StaticFunctional(FunctionalExpression),
    Arithmetic(FunctionalExpression),
    Predicative(PredicativeExpression),
    StaticPredicative(PredicativeExpression),
    Relational(PredicativeExpression),
    Variable(Variable),
    Parameter(String),
    Object(String),
    Numeric(i64),
}

impl Expression {
    pub fn functional(symbol: impl Into<String>, arguments: Vec<Expression>) -> Self {
        Self::Functional(FunctionalExpression {
            symbol: symbol.into(),
            arguments,
        })
    }

    pub fn static_functional(symbol: impl Into<String>, arguments: Vec<Expression>) -> Self {
        Self::StaticFunctional(FunctionalExpression {
            symbol: symbol.into(),
            arguments,
        })
    }

    pub fn arithmetic(symbol: impl Into<String>, arguments: Vec<Expression>) -> Result<Self> {
        let symbol = symbol.into();
        if arguments.len() != 2 {
            return Err(CompileError::wrong_arity(
                "Expression::arithmetic",
                &symbol,
                arguments.len(),
                2,
            ));
        }
        Ok(Self::Arithmetic(FunctionalExpression { symbol, arguments }))
    }

    pub fn predicative(symbol: impl Into<String>, negated: bool, arguments: Vec<Expression>) -> Self {
        Self::Predicative(PredicativeExpression {
            symbol: symbol.into(),
            negated,
            arguments,
        })
    }

    pub fn static_predicative(
        symbol: impl Into<String>,
        negated: bool,
        arguments: Vec<Expression>,
    ) -> Self {
        Self::StaticPredicative(PredicativeExpression {
            symbol: symbol.into(),
            negated,
            arguments,
        })
    }

    pub fn relational(symbol: impl Into<String>, negated: bool, arguments: Vec<Expression>) -> Result<Self> {
        let symbol = symbol.into();
        if arguments.len() != 2 {
            return Err(CompileError::wrong_arity(
                "Expression::relational",
                &symbol,
                arguments.len(),
                2,
            ));
        }
        Relation::try_from(symbol.as_str())?;
        Ok(Self::Relational(PredicativeExpression {
            symbol,
            negated,
            arguments,
        }))
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self::Parameter(name.into())
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::Object(name.into())
    }

    pub fn symbol(&self) -> String {
        match self {
            Expression::Functional(f)
            | Expression::StaticFunctional(f)
            | Expression::Arithmetic(f) => f.symbol.clone(),
            Expression::Predicative(p)
            | Expression::StaticPredicative(p)
            | Expression::Relational(p) => p.symbol.clone(),
            Expression::Variable(v) => v.symbol().to_string(),
            Expression::Parameter(s) | Expression::Object(s) => s.clone(),
            Expression::Numeric(i) => i.to_string(),
        }
    }

    pub fn arguments(&self) -> &[Expression] {
        match self {
            Expression::Functional(f)
            | Expression::StaticFunctional(f)
            | Expression::Arithmetic(f) => &f.arguments,
            Expression::Predicative(p)
            | Expression::StaticPredicative(p)
            | Expression::Relational(p) => &p.arguments,
            Expression::Variable(_)
            | Expression::Parameter(_)
            | Expression::Object(_)
            | Expression::Numeric(_) => &[],
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(
            self,
            Expression::StaticFunctional(_)
                | Expression::Arithmetic(_)
                | Expression::StaticPredicative(_)
                | Expression::Relational(_)
        )
    }

    pub fn is_fluent(&self) -> bool {
        !self.is_static()
    }

    /// Nodes whose staticness gates the one of their parent.
    /// Parameters, objects and numbers are constant and never do.
    fn is_functional_typed(&self) -> bool {
        matches!(
            self,
            Expression::Functional(_)
                | Expression::StaticFunctional(_)
                | Expression::Arithmetic(_)
                | Expression::Variable(_)
        )
    }

    /// True iff every functional descendant is static. Vacuously true without arguments.
    pub fn is_subtree_static(&self) -> bool {
        self.arguments().iter().all(|arg| {
            !arg.is_functional_typed() || (arg.is_static() && arg.is_subtree_static())
        })
    }

    /// True iff the expression can be computed once, before search.
    pub fn is_tree_static(&self) -> bool {
        self.is_static() && self.is_subtree_static()
    }

    pub fn is_negated(&self) -> bool {
        match self {
            Expression::Predicative(p)
            | Expression::StaticPredicative(p)
            | Expression::Relational(p) => p.negated,
            _ => false,
        }
    }

    /// Same expression with the negation flag flipped.
    pub fn negate(&self) -> Result<Self> {
        match self {
            Expression::Predicative(p) => Ok(Expression::Predicative(p.negate())),
            Expression::StaticPredicative(p) => Ok(Expression::StaticPredicative(p.negate())),
            Expression::Relational(p) => Ok(Expression::Relational(p.negate())),
            _ => Err(CompileError::unrecognized_expression(
                "Expression::negate",
                self,
            )),
        }
    }

    /// State variable denoted by a fluent application whose arguments are all
    /// parameters or constants.
    pub fn as_state_variable(&self) -> Option<Variable> {
        let (symbol, arguments) = match self {
            Expression::Functional(f) => (&f.symbol, &f.arguments),
            Expression::Predicative(p) => (&p.symbol, &p.arguments),
            Expression::Variable(v) => return Some(v.clone()),
            _ => return None,
        };
        let mut args = Vec::with_capacity(arguments.len());
        for a in arguments {
            match a {
                Expression::Parameter(p) => args.push(Arg::Parameter(p.clone())),
                Expression::Object(o) => args.push(Arg::Object(o.clone())),
                Expression::Numeric(i) => args.push(Arg::Int(*i)),
                _ => return None,
            }
        }
        Some(Variable::new(symbol.clone(), args))
    }

    pub fn is_arithmetic_symbol(symbol: &str) -> bool {
        ARITHMETIC_SYMBOLS.contains(&symbol)
    }
}

impl PredicativeExpression {
    pub fn negate(&self) -> Self {
        Self {
            symbol: self.symbol.clone(),
            negated: !self.negated,
            arguments: self.arguments.clone(),
        }
    }

    pub fn process_symbol(&self) -> Result<String> {
        process_symbol(&self.symbol, self.negated)
    }
}

fn write_application(f: &mut Formatter<'_>, symbol: &str, arguments: &[Expression]) -> std::fmt::Result {
    write!(f, "{}(", symbol)?;
    for (i, a) in arguments.iter().enumerate() {
        if i != 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", a)?;
    }
    write!(f, ")")
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Functional(e) | Expression::StaticFunctional(e) => {
                write_application(f, &e.symbol, &e.arguments)
            }
            Expression::Arithmetic(e) => match e.arguments.as_slice() {
                [lhs, rhs] => write!(f, "({} {} {})", lhs, e.symbol, rhs),
                args => write_application(f, &e.symbol, args),
            },
            Expression::Predicative(p) | Expression::StaticPredicative(p) => {
                if p.negated {
                    write!(f, "{}", NEGATION_PREFIX)?;
                }
                write_application(f, &p.symbol, &p.arguments)
            }
            Expression::Relational(p) => {
                let symbol = p.process_symbol().unwrap_or_else(|_| p.symbol.clone());
                match p.arguments.as_slice() {
                    [lhs, rhs] => write!(f, "{} {} {}", lhs, symbol, rhs),
                    args => write_application(f, &symbol, args),
                }
            }
            Expression::Variable(v) => write!(f, "{}", v),
            Expression::Parameter(s) | Expression::Object(s) => write!(f, "{}", s),
            Expression::Numeric(i) => write!(f, "{}", i),
        }
    }
}
