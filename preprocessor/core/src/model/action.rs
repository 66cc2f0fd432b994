use crate::error::{CompileError, Result};
use crate::model::instance::{ObjectIndex, ProblemInstance};
use crate::model::procedure::{AppProcedure, EffProcedure};
use crate::model::state::{Atom, State};
use crate::model::variable::{Arg, ParameterBinding};
use crate::model::ObjectIdx;
use p3r_language::types::INT_TYPES;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Position of each action parameter, by name.
pub type ParameterMap = HashMap<String, usize>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub typename: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, typename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typename: typename.into(),
        }
    }

    pub fn is_int(&self) -> bool {
        INT_TYPES.contains(&self.typename.as_str())
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.typename)
    }
}

/// Values given to the parameters of an action, both positionally and by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    values: Vec<ObjectIdx>,
    args: ParameterBinding,
}

impl Binding {
    pub fn new(parameters: &[Parameter], args: Vec<Arg>, objects: &ObjectIndex) -> Result<Self> {
        if parameters.len() != args.len() {
            return Err(CompileError::wrong_arity(
                "Binding::new",
                "binding",
                args.len(),
                parameters.len(),
            ));
        }
        let mut binding = Self::default();
        for (p, a) in parameters.iter().zip(args) {
            binding.values.push(objects.value(&a)?);
            binding.args.insert(p.name.clone(), a);
        }
        Ok(binding)
    }

    /// Builds a binding from object indexes. Parameters of an int type take the value as is.
    pub fn from_values(
        parameters: &[Parameter],
        values: Vec<ObjectIdx>,
        objects: &ObjectIndex,
    ) -> Result<Self> {
        if parameters.len() != values.len() {
            return Err(CompileError::wrong_arity(
                "Binding::from_values",
                "binding",
                values.len(),
                parameters.len(),
            ));
        }
        let mut args = Vec::with_capacity(values.len());
        for (p, v) in parameters.iter().zip(&values) {
            if p.is_int() {
                args.push(Arg::Int(*v));
            } else {
                match objects.get_name(*v) {
                    Some(name) => args.push(Arg::Object(name.to_string())),
                    None => return Err(CompileError::unknown_object("Binding::from_values", v)),
                }
            }
        }
        Self::new(parameters, args, objects)
    }

    pub fn values(&self) -> &[ObjectIdx] {
        &self.values
    }

    pub fn args(&self) -> &ParameterBinding {
        &self.args
    }

    pub fn value(&self, position: usize) -> Result<ObjectIdx> {
        self.values.get(position).copied().ok_or_else(|| {
            CompileError::unknown_parameter("Binding::value", &format!("#{}", position))
        })
    }
}

/// An action with its compiled applicability and effect procedures.
#[derive(Debug, Clone)]
pub struct Action {
    name: String,
    parameters: Vec<Parameter>,
    parameter_map: ParameterMap,
    applicability: Vec<AppProcedure>,
    effects: Vec<EffProcedure>,
}

impl Action {
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        let parameter_map = parameters
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        Self {
            name: name.into(),
            parameters,
            parameter_map,
            applicability: vec![],
            effects: vec![],
        }
    }

    pub(crate) fn add_applicability_procedure(&mut self, procedure: AppProcedure) {
        self.applicability.push(procedure)
    }

    pub(crate) fn add_effect_procedure(&mut self, procedure: EffProcedure) {
        self.effects.push(procedure)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter_map(&self) -> &ParameterMap {
        &self.parameter_map
    }

    pub fn applicability_procedures(&self) -> &[AppProcedure] {
        &self.applicability
    }

    pub fn effect_procedures(&self) -> &[EffProcedure] {
        &self.effects
    }

    pub fn bind(&self, args: Vec<Arg>, problem: &ProblemInstance) -> Result<Binding> {
        Binding::new(&self.parameters, args, problem.object_index())
            .map_err(|e| e.chain(format!("bind({})", self.name)))
    }

    pub fn is_applicable(&self, state: &State, binding: &Binding, problem: &ProblemInstance) -> Result<bool> {
        for procedure in &self.applicability {
            if !procedure.evaluate(state, binding, problem)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Atoms written by the effects, all computed on the same state.
    pub fn apply(&self, state: &State, binding: &Binding, problem: &ProblemInstance) -> Result<Vec<Atom>> {
        self.effects
            .iter()
            .map(|e| e.evaluate(state, binding, problem))
            .collect()
    }

    pub fn successor(&self, state: &State, binding: &Binding, problem: &ProblemInstance) -> Result<State> {
        let atoms = self.apply(state, binding, problem)?;
        let mut next = state.clone();
        for atom in &atoms {
            next.apply(atom, problem.object_index())?;
        }
        Ok(next)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ")")
    }
}
