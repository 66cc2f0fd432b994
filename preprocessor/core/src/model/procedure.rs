use crate::error::{CompileError, Result};
use crate::model::action::{Binding, ParameterMap};
use crate::model::builtin::{BuiltinConstraint, BuiltinEffect};
use crate::model::expression::eval::EvalContext;
use crate::model::expression::Expression;
use crate::model::index::RelevantIndex;
use crate::model::instance::ProblemInstance;
use crate::model::state::{Atom, State};
use crate::model::variable::Variable;
use crate::model::ObjectIdx;
use std::fmt::{Display, Formatter};

/// Applicability test that only reads parameters and static data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticRoutine {
    Relational {
        symbol: String,
        negated: bool,
        arguments: Vec<Expression>,
    },
    Predicative {
        symbol: String,
        negated: bool,
        arguments: Vec<Expression>,
    },
}

impl StaticRoutine {
    pub fn expression(&self) -> Result<Expression> {
        match self {
            StaticRoutine::Relational {
                symbol,
                negated,
                arguments,
            } => Expression::relational(symbol.clone(), *negated, arguments.clone()),
            StaticRoutine::Predicative {
                symbol,
                negated,
                arguments,
            } => Ok(Expression::static_predicative(
                symbol.clone(),
                *negated,
                arguments.clone(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAppProcedure {
    description: String,
    parameters: ParameterMap,
    routine: StaticRoutine,
}

impl StaticAppProcedure {
    pub fn new(description: impl Into<String>, parameters: ParameterMap, routine: StaticRoutine) -> Self {
        Self {
            description: description.into(),
            parameters,
            routine,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn routine(&self) -> &StaticRoutine {
        &self.routine
    }

    pub fn check(&self, binding: &Binding, problem: &ProblemInstance) -> Result<bool> {
        let relevant = RelevantIndex::default();
        let ctx = EvalContext {
            problem,
            parameters: &self.parameters,
            binding,
            relevant: &relevant,
            values: &[],
            state: None,
        };
        Ok(self.routine.expression()?.eval(&ctx)? != 0)
    }
}

/// Generated part shared by applicability and effect procedures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericProcedure {
    description: String,
    expression: Expression,
    parameters: ParameterMap,
    relevant: RelevantIndex,
    code: String,
}

impl GenericProcedure {
    pub fn new(
        description: impl Into<String>,
        expression: Expression,
        parameters: ParameterMap,
        relevant: RelevantIndex,
        code: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            expression,
            parameters,
            relevant,
            code: code.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn relevant(&self) -> &RelevantIndex {
        &self.relevant
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    fn eval(
        &self,
        values: &[ObjectIdx],
        binding: &Binding,
        problem: &ProblemInstance,
        state: &State,
    ) -> Result<ObjectIdx> {
        if values.len() != self.relevant.len() {
            return Err(CompileError::evaluation(
                format!("eval({})", self.description),
                format!(
                    "{} relevant values expected, {} given",
                    self.relevant.len(),
                    values.len()
                ),
            ));
        }
        let ctx = EvalContext {
            problem,
            parameters: &self.parameters,
            binding,
            relevant: &self.relevant,
            values,
            state: Some(state),
        };
        self.expression
            .eval(&ctx)
            .map_err(|e| e.chain(format!("eval({})", self.description)))
    }
}

/// Applicability procedure of an action.
/// A specialized procedure keeps its generic code but is evaluated through the builtin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppProcedure {
    Static(StaticAppProcedure),
    Generic(GenericProcedure),
    Specialized(GenericProcedure, BuiltinConstraint),
}

impl AppProcedure {
    pub fn description(&self) -> &str {
        match self {
            AppProcedure::Static(s) => s.description(),
            AppProcedure::Generic(g) | AppProcedure::Specialized(g, _) => g.description(),
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self, AppProcedure::Static(_))
    }

    pub fn generic(&self) -> Option<&GenericProcedure> {
        match self {
            AppProcedure::Static(_) => None,
            AppProcedure::Generic(g) | AppProcedure::Specialized(g, _) => Some(g),
        }
    }

    pub fn builtin(&self) -> Option<&BuiltinConstraint> {
        match self {
            AppProcedure::Specialized(_, b) => Some(b),
            _ => None,
        }
    }

    pub fn relevant(&self) -> &[Variable] {
        match self.generic() {
            Some(g) => g.relevant().variables(),
            None => &[],
        }
    }

    /// Tests the procedure on the values of its relevant variables, in relevant order.
    pub fn check(
        &self,
        values: &[ObjectIdx],
        binding: &Binding,
        problem: &ProblemInstance,
        state: &State,
    ) -> Result<bool> {
        match self {
            AppProcedure::Static(s) => s.check(binding, problem),
            AppProcedure::Generic(g) => Ok(g.eval(values, binding, problem, state)? != 0),
            AppProcedure::Specialized(_, b) => b.check(values, binding),
        }
    }

    pub fn evaluate(&self, state: &State, binding: &Binding, problem: &ProblemInstance) -> Result<bool> {
        let values = match self.generic() {
            Some(g) => g.relevant().project(state, binding, problem)?,
            None => vec![],
        };
        self.check(&values, binding, problem, state)
    }
}

impl Display for AppProcedure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppProcedure::Static(s) => write!(f, "static {}", s.description()),
            AppProcedure::Generic(g) => write!(f, "{} [{}]", g.description(), g.code()),
            AppProcedure::Specialized(g, b) => write!(f, "{} [{}]", g.description(), b),
        }
    }
}

/// Generic effect: the generated code computes the new value of `affected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericEffect {
    procedure: GenericProcedure,
    affected: Variable,
}

impl GenericEffect {
    pub fn new(procedure: GenericProcedure, affected: Variable) -> Self {
        Self {
            procedure,
            affected,
        }
    }

    pub fn procedure(&self) -> &GenericProcedure {
        &self.procedure
    }

    pub fn affected(&self) -> &Variable {
        &self.affected
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffProcedure {
    Generic(GenericEffect),
    Specialized(GenericEffect, BuiltinEffect),
}

impl EffProcedure {
    pub fn effect(&self) -> &GenericEffect {
        match self {
            EffProcedure::Generic(e) | EffProcedure::Specialized(e, _) => e,
        }
    }

    pub fn description(&self) -> &str {
        self.effect().procedure().description()
    }

    pub fn affected(&self) -> &Variable {
        self.effect().affected()
    }

    pub fn relevant(&self) -> &[Variable] {
        self.effect().procedure().relevant().variables()
    }

    pub fn code(&self) -> &str {
        self.effect().procedure().code()
    }

    pub fn builtin(&self) -> Option<&BuiltinEffect> {
        match self {
            EffProcedure::Specialized(_, b) => Some(b),
            EffProcedure::Generic(_) => None,
        }
    }

    /// New value of the grounded affected variable, given the relevant values in relevant order.
    pub fn apply(
        &self,
        values: &[ObjectIdx],
        binding: &Binding,
        problem: &ProblemInstance,
        state: &State,
    ) -> Result<Atom> {
        let variable = self.affected().ground(binding.args())?;
        let value = match self {
            EffProcedure::Generic(e) => e.procedure.eval(values, binding, problem, state)?,
            EffProcedure::Specialized(_, b) => b.value(values, binding)?,
        };
        Ok(Atom::new(variable, value))
    }

    pub fn evaluate(&self, state: &State, binding: &Binding, problem: &ProblemInstance) -> Result<Atom> {
        let values = self
            .effect()
            .procedure()
            .relevant()
            .project(state, binding, problem)?;
        self.apply(&values, binding, problem, state)
    }
}

impl Display for EffProcedure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EffProcedure::Generic(e) => write!(f, "{} [{}]", e.procedure.description(), e.procedure.code()),
            EffProcedure::Specialized(e, b) => write!(f, "{} [{}]", e.procedure.description(), b),
        }
    }
}
