use crate::error::Result;
use crate::model::builtin::{BuiltinConstraint, BuiltinEffect, Operand};
use crate::model::expression::{Expression, Relation};
use crate::model::index::ProcedureIndex;

//catalog of the shapes with a specialized evaluation

/// Operand of a builtin read from the relevant values, when `e` is a flat fluent.
fn relevant_operand(e: &Expression, index: &ProcedureIndex) -> Result<Option<usize>> {
    match e {
        Expression::Functional(_) | Expression::Predicative(_) => match e.as_state_variable() {
            Some(v) => Ok(Some(index.relevant_position(&v)?)),
            None => Ok(None),
        },
        _ => Ok(None),
    }
}

/// Operand known once the action is bound.
fn constant_operand(e: &Expression, index: &ProcedureIndex) -> Result<Option<Operand>> {
    match e {
        Expression::Parameter(p) => Ok(Some(Operand::Parameter(index.parameter_position(p)?))),
        Expression::Object(o) => Ok(Some(Operand::Constant(index.object_index(o)?))),
        Expression::Numeric(i) => Ok(Some(Operand::Constant(*i))),
        _ => Ok(None),
    }
}

/// Specialized constraint for an applicability expression, if its shape is known.
pub fn match_constraint(
    expression: &Expression,
    index: &ProcedureIndex,
) -> Result<Option<BuiltinConstraint>> {
    let p = match expression {
        Expression::Relational(p) => p,
        _ => return Ok(None),
    };
    let (lhs, rhs) = match p.arguments.as_slice() {
        [lhs, rhs] => (lhs, rhs),
        _ => return Ok(None),
    };
    let relation = Relation::try_from(p.symbol.as_str())?;
    let relation = if p.negated { relation.negate() } else { relation };

    let x = relevant_operand(lhs, index)?;
    let y = relevant_operand(rhs, index)?;
    let builtin = match (x, y) {
        (Some(lhs), Some(rhs)) => Some(match relation {
            Relation::Gt | Relation::Geq => BuiltinConstraint::BinaryRelation {
                relation: relation.swap(),
                lhs: rhs,
                rhs: lhs,
            },
            _ => BuiltinConstraint::BinaryRelation { relation, lhs, rhs },
        }),
        (Some(variable), None) if relation.is_equality() => constant_operand(rhs, index)?
            .map(|value| BuiltinConstraint::UnaryRelation {
                relation,
                variable,
                value,
            }),
        (None, Some(variable)) if relation.is_equality() => constant_operand(lhs, index)?
            .map(|value| BuiltinConstraint::UnaryRelation {
                relation,
                variable,
                value,
            }),
        _ => None,
    };
    Ok(builtin)
}

/// Specialized effect for the right hand side of an assignment, if its shape is known.
pub fn match_effect(rhs: &Expression, index: &ProcedureIndex) -> Result<Option<BuiltinEffect>> {
    if let Some(value) = constant_operand(rhs, index)? {
        return Ok(Some(BuiltinEffect::ValueAssignment { value }));
    }
    Ok(relevant_operand(rhs, index)?.map(|source| BuiltinEffect::VariableAssignment { source }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::action::ParameterMap;
    use crate::model::instance::{ObjectIndex, ProblemObject};
    use map_macro::map;

    fn objects() -> ObjectIndex {
        ObjectIndex::new(&[
            ProblemObject::new("a", "block"),
            ProblemObject::new("table", "place"),
        ])
        .unwrap()
    }

    fn loc(p: &str) -> Expression {
        Expression::functional("loc", vec![Expression::parameter(p)])
    }

    #[test]
    pub fn test_unary_equality() {
        let parameters: ParameterMap = map! {"?a".to_string() => 0, "?b".to_string() => 1};
        let objects = objects();
        let index = ProcedureIndex::new(&parameters, &objects, vec![loc("?a").as_state_variable().unwrap()]);

        let e = Expression::relational("=", true, vec![Expression::object("table"), loc("?a")]).unwrap();
        assert_eq!(
            match_constraint(&e, &index).unwrap(),
            Some(BuiltinConstraint::UnaryRelation {
                relation: Relation::Neq,
                variable: 0,
                value: Operand::Constant(1),
            })
        );

        let e = Expression::relational("=", false, vec![loc("?a"), Expression::parameter("?b")]).unwrap();
        assert_eq!(
            match_constraint(&e, &index).unwrap().unwrap().to_string(),
            "EQXConstraint(X0 = P1)"
        );

        let e = Expression::relational("<", false, vec![loc("?a"), Expression::Numeric(3)]).unwrap();
        assert_eq!(match_constraint(&e, &index).unwrap(), None);
    }

    #[test]
    pub fn test_binary_relation_is_normalized() {
        let parameters: ParameterMap = map! {"?a".to_string() => 0, "?b".to_string() => 1};
        let objects = objects();
        let index = ProcedureIndex::new(
            &parameters,
            &objects,
            vec![
                loc("?a").as_state_variable().unwrap(),
                loc("?b").as_state_variable().unwrap(),
            ],
        );
        let e = Expression::relational(">", false, vec![loc("?a"), loc("?b")]).unwrap();
        assert_eq!(
            match_constraint(&e, &index).unwrap(),
            Some(BuiltinConstraint::BinaryRelation {
                relation: Relation::Lt,
                lhs: 1,
                rhs: 0,
            })
        );
        // not (loc(?a) < loc(?b)) is loc(?b) <= loc(?a)
        let e = Expression::relational("<", true, vec![loc("?a"), loc("?b")]).unwrap();
        assert_eq!(
            match_constraint(&e, &index).unwrap().unwrap().to_string(),
            "LEQConstraint(X1 <= X0)"
        );
    }

    #[test]
    pub fn test_effect_shapes() {
        let parameters: ParameterMap = map! {"?a".to_string() => 0};
        let objects = objects();
        let index = ProcedureIndex::new(&parameters, &objects, vec![loc("?a").as_state_variable().unwrap()]);
        assert_eq!(
            match_effect(&Expression::parameter("?a"), &index).unwrap(),
            Some(BuiltinEffect::ValueAssignment {
                value: Operand::Parameter(0)
            })
        );
        assert_eq!(
            match_effect(&loc("?a"), &index).unwrap(),
            Some(BuiltinEffect::VariableAssignment { source: 0 })
        );
        let sum = Expression::arithmetic("+", vec![loc("?a"), Expression::Numeric(1)]).unwrap();
        assert_eq!(match_effect(&sum, &index).unwrap(), None);
    }
}
