use crate::error::{CompileError, Result};
use crate::model::action::{Binding, ParameterMap};
use crate::model::expression::{Expression, Relation};
use crate::model::index::RelevantIndex;
use crate::model::instance::ProblemInstance;
use crate::model::state::State;
use crate::model::ObjectIdx;
use p3r_language::symbol::{ADD, DIV, MUL, SUB};

/// What a generic procedure sees when it is called.
/// `state` is only read for nested fluents, flat ones come from `values`.
pub struct EvalContext<'a> {
    pub problem: &'a ProblemInstance,
    pub parameters: &'a ParameterMap,
    pub binding: &'a Binding,
    pub relevant: &'a RelevantIndex,
    pub values: &'a [ObjectIdx],
    pub state: Option<&'a State>,
}

impl EvalContext<'_> {
    fn parameter(&self, name: &str) -> Result<ObjectIdx> {
        match self.parameters.get(name) {
            Some(p) => self.binding.value(*p),
            None => Err(CompileError::unknown_parameter("EvalContext::parameter", name)),
        }
    }

    fn point(&self, arguments: &[Expression]) -> Result<Vec<ObjectIdx>> {
        arguments.iter().map(|a| a.eval(self)).collect()
    }

    /// Value of a fluent application, read from the relevant values when flat.
    fn fluent(&self, e: &Expression, symbol: &str, arguments: &[Expression], predicative: bool) -> Result<ObjectIdx> {
        if let Some(variable) = e.as_state_variable() {
            if let Some(p) = self.relevant.position(&variable) {
                return self.values.get(p).copied().ok_or_else(|| {
                    CompileError::evaluation(
                        "EvalContext::fluent",
                        format!("no value given for relevant variable {}", variable),
                    )
                });
            }
        }
        let point = self.point(arguments)?;
        let state = self.state.ok_or_else(|| {
            CompileError::evaluation(
                "EvalContext::fluent",
                format!("{} is not relevant and no state is available", e),
            )
        })?;
        match state.get_point(symbol, &point) {
            Some(v) => Ok(v),
            None if predicative => Ok(0),
            None => Err(CompileError::missing_value("EvalContext::fluent", e)),
        }
    }
}

fn arithmetic(symbol: &str, lhs: ObjectIdx, rhs: ObjectIdx) -> Result<ObjectIdx> {
    let result = match symbol {
        ADD => lhs.checked_add(rhs),
        SUB => lhs.checked_sub(rhs),
        MUL => lhs.checked_mul(rhs),
        DIV => lhs.checked_div(rhs),
        _ => return Err(CompileError::unrecognized_expression("arithmetic", symbol)),
    };
    result.ok_or_else(|| {
        CompileError::evaluation(
            "arithmetic",
            format!("{} {} {} overflows or divides by zero", lhs, symbol, rhs),
        )
    })
}

fn negate(value: ObjectIdx, negated: bool) -> ObjectIdx {
    match negated {
        true => (value == 0) as ObjectIdx,
        false => (value != 0) as ObjectIdx,
    }
}

impl Expression {
    /// Interprets the expression. Booleans are 0 or 1.
    pub fn eval(&self, ctx: &EvalContext) -> Result<ObjectIdx> {
        match self {
            Expression::Parameter(name) => ctx.parameter(name),
            Expression::Object(name) => ctx.problem.object_index().get_index(name),
            Expression::Numeric(i) => Ok(*i),
            Expression::Variable(v) => Err(CompileError::unresolved_variable("eval", v)),
            Expression::Arithmetic(f) => {
                let point = ctx.point(&f.arguments)?;
                match point.as_slice() {
                    [lhs, rhs] => arithmetic(&f.symbol, *lhs, *rhs),
                    _ => Err(CompileError::wrong_arity("eval", &f.symbol, point.len(), 2)),
                }
            }
            Expression::Relational(p) => {
                let relation = Relation::try_from(p.symbol.as_str())?;
                let relation = if p.negated { relation.negate() } else { relation };
                let point = ctx.point(&p.arguments)?;
                match point.as_slice() {
                    [lhs, rhs] => Ok(relation.test(*lhs, *rhs) as ObjectIdx),
                    _ => Err(CompileError::wrong_arity("eval", &p.symbol, point.len(), 2)),
                }
            }
            Expression::StaticFunctional(f) => {
                let point = ctx.point(&f.arguments)?;
                ctx.problem.static_data().value(&f.symbol, &point)
            }
            Expression::StaticPredicative(p) => {
                let point = ctx.point(&p.arguments)?;
                let value = ctx.problem.static_data().value(&p.symbol, &point)?;
                Ok(negate(value, p.negated))
            }
            Expression::Functional(f) => ctx.fluent(self, &f.symbol, &f.arguments, false),
            Expression::Predicative(p) => {
                let value = ctx.fluent(self, &p.symbol, &p.arguments, true)?;
                Ok(negate(value, p.negated))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::action::{Parameter, ParameterMap};
    use crate::model::domain::{ProblemDomain, Symbol};
    use crate::model::instance::ProblemObject;
    use crate::model::state::{FunctionInstantiation, Instantiation, StaticData};
    use crate::model::variable::Variable;
    use map_macro::map;

    fn problem() -> ProblemInstance {
        let domain = ProblemDomain::new(
            "counters",
            vec![],
            vec![
                Symbol::function("val", vec!["counter".to_string()], "int"),
                Symbol::function("next", vec!["int".to_string()], "int"),
                Symbol::predicate("active", vec!["counter".to_string()]),
            ],
        )
        .unwrap();
        let mut statics = StaticData::default();
        let mut next = FunctionInstantiation::new("next");
        for i in 0..5 {
            next.add(vec![i], i + 1).unwrap();
        }
        statics.add(Instantiation::Function(next)).unwrap();
        ProblemInstance::new(
            "p",
            domain,
            vec![ProblemObject::new("c0", "counter"), ProblemObject::new("c1", "counter")],
            State::default(),
            statics,
        )
        .unwrap()
    }

    #[test]
    pub fn test_eval_static_and_fluent() {
        let problem = problem();
        let parameters: ParameterMap = map! {"?c".to_string() => 0};
        let binding = Binding::new(
            &[Parameter::new("?c", "counter")],
            vec!["c1".into()],
            problem.object_index(),
        )
        .unwrap();
        let val = Variable::new("val", vec!["?c".into()]);
        let relevant = RelevantIndex::new(vec![val]);
        let ctx = EvalContext {
            problem: &problem,
            parameters: &parameters,
            binding: &binding,
            relevant: &relevant,
            values: &[3],
            state: None,
        };
        let e = Expression::relational(
            "=",
            false,
            vec![
                Expression::static_functional(
                    "next",
                    vec![Expression::functional("val", vec![Expression::parameter("?c")])],
                ),
                Expression::Numeric(4),
            ],
        )
        .unwrap();
        assert_eq!(e.eval(&ctx).unwrap(), 1);
        assert_eq!(e.negate().unwrap().eval(&ctx).unwrap(), 0);
        assert_eq!(Expression::object("c1").eval(&ctx).unwrap(), 1);
    }

    #[test]
    pub fn test_eval_nested_fluent_reads_state() {
        let problem = problem();
        let parameters = ParameterMap::default();
        let binding = Binding::default();
        let relevant = RelevantIndex::default();
        let mut state = State::default();
        state.set_point("val", vec![0], 1);
        state.set_point("val", vec![1], 7);
        let ctx = EvalContext {
            problem: &problem,
            parameters: &parameters,
            binding: &binding,
            relevant: &relevant,
            values: &[],
            state: Some(&state),
        };
        // val(val(c0)) = val(c1)
        let nested = Expression::functional(
            "val",
            vec![Expression::functional("val", vec![Expression::object("c0")])],
        );
        assert_eq!(nested.eval(&ctx).unwrap(), 7);
        let active = Expression::predicative("active", true, vec![Expression::object("c0")]);
        assert_eq!(active.eval(&ctx).unwrap(), 1);
    }

    #[test]
    pub fn test_eval_division_by_zero() {
        let problem = problem();
        let parameters = ParameterMap::default();
        let binding = Binding::default();
        let relevant = RelevantIndex::default();
        let ctx = EvalContext {
            problem: &problem,
            parameters: &parameters,
            binding: &binding,
            relevant: &relevant,
            values: &[],
            state: None,
        };
        let e = Expression::arithmetic("/", vec![Expression::Numeric(1), Expression::Numeric(0)]).unwrap();
        assert!(e.eval(&ctx).is_err());
        let e = Expression::Variable(Variable::new("val", vec!["c0".into()]));
        assert!(e.eval(&ctx).is_err());
    }
}
