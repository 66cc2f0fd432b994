use crate::error::{CompileError, Result};
use crate::model::instance::ObjectIndex;
use crate::model::variable::Variable;
use crate::model::ObjectIdx;
use im::{HashMap, HashSet};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// A point of the domain of a symbol, as object indexes.
pub type Point = Vec<ObjectIdx>;

fn format_point(point: &[ObjectIdx]) -> String {
    format!("({})", point.iter().join(", "))
}

/// Extensional definition of a static function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionInstantiation {
    symbol: String,
    mapping: HashMap<Point, ObjectIdx>,
}

impl FunctionInstantiation {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            mapping: Default::default(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn add(&mut self, point: Point, value: ObjectIdx) -> Result<()> {
        if self.mapping.contains_key(&point) {
            return Err(CompileError::duplicate_mapping(
                "FunctionInstantiation::add",
                &self.symbol,
                format_point(&point),
            ));
        }
        self.mapping.insert(point, value);
        Ok(())
    }

    pub fn get(&self, point: &[ObjectIdx]) -> Option<ObjectIdx> {
        self.mapping.get(point).copied()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// Extensional definition of a static predicate: the set of points where it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredicateInstantiation {
    symbol: String,
    set: HashSet<Point>,
}

impl PredicateInstantiation {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            set: Default::default(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn add(&mut self, point: Point) -> Result<()> {
        if self.set.contains(&point) {
            return Err(CompileError::duplicate_mapping(
                "PredicateInstantiation::add",
                &self.symbol,
                format_point(&point),
            ));
        }
        self.set.insert(point);
        Ok(())
    }

    pub fn contains(&self, point: &[ObjectIdx]) -> bool {
        self.set.contains(point)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instantiation {
    Function(FunctionInstantiation),
    Predicate(PredicateInstantiation),
}

impl Instantiation {
    pub fn symbol(&self) -> &str {
        match self {
            Instantiation::Function(f) => f.symbol(),
            Instantiation::Predicate(p) => p.symbol(),
        }
    }
}

/// Immutable data of the instance: the extension of every static symbol.
#[derive(Debug, Clone, Default)]
pub struct StaticData {
    inner: HashMap<String, Instantiation>,
}

impl StaticData {
    pub fn add(&mut self, instantiation: Instantiation) -> Result<()> {
        let symbol = instantiation.symbol().to_string();
        if self.inner.contains_key(&symbol) {
            return Err(CompileError::duplicate_mapping(
                "StaticData::add",
                &symbol,
                "<extension>",
            ));
        }
        self.inner.insert(symbol, instantiation);
        Ok(())
    }

    pub fn is_static(&self, symbol: &str) -> bool {
        self.inner.contains_key(symbol)
    }

    pub fn get(&self, symbol: &str) -> Option<&Instantiation> {
        self.inner.get(symbol)
    }

    /// Value of a static symbol at a point. Predicates evaluate to 0 or 1.
    pub fn value(&self, symbol: &str, point: &[ObjectIdx]) -> Result<ObjectIdx> {
        match self.inner.get(symbol) {
            Some(Instantiation::Predicate(p)) => Ok(p.contains(point) as ObjectIdx),
            Some(Instantiation::Function(f)) => f.get(point).ok_or_else(|| {
                CompileError::evaluation(
                    "StaticData::value",
                    format!(
                        "static function {} is undefined on {}",
                        symbol,
                        format_point(point)
                    ),
                )
            }),
            None => Err(CompileError::unknown_symbol("StaticData::value", symbol)),
        }
    }
}

/// Values of the fluent state variables.
/// Predicative variables that are absent are false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    values: HashMap<String, HashMap<Point, ObjectIdx>>,
}

impl State {
    pub fn set_point(&mut self, symbol: &str, point: Point, value: ObjectIdx) {
        match self.values.get_mut(symbol) {
            Some(extension) => {
                extension.insert(point, value);
            }
            None => {
                self.values
                    .insert(symbol.to_string(), im::hashmap! {point => value});
            }
        }
    }

    pub fn get_point(&self, symbol: &str, point: &[ObjectIdx]) -> Option<ObjectIdx> {
        self.values.get(symbol).and_then(|e| e.get(point)).copied()
    }

    pub fn set(&mut self, variable: &Variable, value: ObjectIdx, objects: &ObjectIndex) -> Result<()> {
        let point = objects.point(variable)?;
        self.set_point(variable.symbol(), point, value);
        Ok(())
    }

    pub fn get(&self, variable: &Variable, objects: &ObjectIndex) -> Result<Option<ObjectIdx>> {
        let point = objects.point(variable)?;
        Ok(self.get_point(variable.symbol(), &point))
    }

    pub fn apply(&mut self, atom: &Atom, objects: &ObjectIndex) -> Result<()> {
        self.set(&atom.variable, atom.value, objects)
    }

    pub fn len(&self) -> usize {
        self.values.values().map(|e| e.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A state variable together with a value, produced by effect procedures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub variable: Variable,
    pub value: ObjectIdx,
}

impl Atom {
    pub fn new(variable: Variable, value: ObjectIdx) -> Self {
        Self { variable, value }
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} := {}", self.variable, self.value)
    }
}
