use crate::error::{CompileError, Result};
use crate::model::action::{Binding, ParameterMap};
use crate::model::instance::{ObjectIndex, ProblemInstance};
use crate::model::state::State;
use crate::model::variable::Variable;
use crate::model::ObjectIdx;
use std::collections::HashMap;

/// Positions of the state variables read by a procedure.
/// Callers pass the values of those variables in this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevantIndex {
    variables: Vec<Variable>,
    positions: HashMap<Variable, usize>,
}

impl RelevantIndex {
    /// Deduplicates the variables, keeping the order of their first occurrence.
    pub fn new(relevant: impl IntoIterator<Item = Variable>) -> Self {
        let mut index = Self::default();
        for v in relevant {
            if !index.positions.contains_key(&v) {
                index.positions.insert(v.clone(), index.variables.len());
                index.variables.push(v);
            }
        }
        index
    }

    pub fn position(&self, variable: &Variable) -> Option<usize> {
        self.positions.get(variable).copied()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Reads from the state the values of the relevant variables grounded with the binding.
    pub fn project(
        &self,
        state: &State,
        binding: &Binding,
        problem: &ProblemInstance,
    ) -> Result<Vec<ObjectIdx>> {
        let mut values = Vec::with_capacity(self.variables.len());
        for v in &self.variables {
            let grounded = v.ground(binding.args())?;
            let value = match state.get(&grounded, problem.object_index())? {
                Some(value) => value,
                None => match problem.domain().get_symbol(v.symbol()) {
                    Some(s) if s.is_predicate() => 0,
                    Some(_) => return Err(CompileError::missing_value("RelevantIndex::project", &grounded)),
                    None => return Err(CompileError::unknown_symbol("RelevantIndex::project", v.symbol())),
                },
            };
            values.push(value);
        }
        Ok(values)
    }
}

/// Everything the printer needs to turn symbolic references of one expression
/// into positional ones. The parameter and object maps are borrowed from the
/// compilation context, only the relevant index belongs to the procedure.
#[derive(Debug, Clone)]
pub struct ProcedureIndex<'a> {
    pub parameters: &'a ParameterMap,
    pub objects: &'a ObjectIndex,
    pub relevant: RelevantIndex,
}

impl<'a> ProcedureIndex<'a> {
    pub fn new(parameters: &'a ParameterMap, objects: &'a ObjectIndex, relevant: Vec<Variable>) -> Self {
        Self {
            parameters,
            objects,
            relevant: RelevantIndex::new(relevant),
        }
    }

    pub fn parameter_position(&self, name: &str) -> Result<usize> {
        self.parameters
            .get(name)
            .copied()
            .ok_or_else(|| CompileError::unknown_parameter("ProcedureIndex::parameter_position", name))
    }

    pub fn object_index(&self, name: &str) -> Result<ObjectIdx> {
        self.objects.get_index(name)
    }

    pub fn relevant_position(&self, variable: &Variable) -> Result<usize> {
        self.relevant.position(variable).ok_or_else(|| {
            CompileError::unresolved_variable("ProcedureIndex::relevant_position", variable)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    pub fn test_relevant_index_dedup_first_occurrence() {
        let loc_a = Variable::new("loc", vec!["?a".into()]);
        let loc_b = Variable::new("loc", vec!["?b".into()]);
        let index = RelevantIndex::new(vec![
            loc_b.clone(),
            loc_a.clone(),
            loc_b.clone(),
            loc_a.clone(),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.position(&loc_b), Some(0));
        assert_eq!(index.position(&loc_a), Some(1));
        assert_eq!(index.variables(), &[loc_b, loc_a]);
    }

    #[test]
    pub fn test_missing_relevant_position() {
        let parameters = ParameterMap::default();
        let objects = ObjectIndex::default();
        let index = ProcedureIndex::new(&parameters, &objects, vec![]);
        let err = index
            .relevant_position(&Variable::new("clear", vec!["?b".into()]))
            .unwrap_err();
        assert_eq!(
            err.kind(),
            crate::error::ErrorKind::UnresolvedVariableReference
        );
        assert!(index.parameter_position("?b").is_err());
    }
}
