use crate::compilation::formula::ActionSchema;
use crate::error::{CompileError, Result};
use crate::model::domain::{ObjectType, ProblemDomain, Symbol};
use crate::model::instance::{ObjectIndex, ProblemInstance, ProblemObject};
use crate::model::state::{
    FunctionInstantiation, Instantiation, Point, PredicateInstantiation, State, StaticData,
};
use crate::model::ObjectIdx;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Constant as written in the description: an object name or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Name(String),
}

impl Value {
    fn index(&self, objects: &ObjectIndex) -> Result<ObjectIdx> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Name(n) => objects.get_index(n),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Name(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SymbolDescription {
    Predicate {
        name: String,
        #[serde(default)]
        arguments: Vec<String>,
    },
    Function {
        name: String,
        #[serde(default)]
        arguments: Vec<String>,
        codomain: String,
    },
}

impl From<SymbolDescription> for Symbol {
    fn from(s: SymbolDescription) -> Self {
        match s {
            SymbolDescription::Predicate { name, arguments } => Symbol::predicate(name, arguments),
            SymbolDescription::Function {
                name,
                arguments,
                codomain,
            } => Symbol::function(name, arguments, codomain),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDescription {
    pub name: String,
    #[serde(default)]
    pub types: Vec<ObjectType>,
    pub symbols: Vec<SymbolDescription>,
}

/// Atom of the initial state. Predicative atoms without value are true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitAtom {
    pub symbol: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub point: Vec<Value>,
    pub value: Value,
}

/// Extension of a static symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StaticDescription {
    Predicate {
        symbol: String,
        points: Vec<Vec<Value>>,
    },
    Function {
        symbol: String,
        mapping: Vec<MappingEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescription {
    pub name: String,
    pub objects: Vec<ProblemObject>,
    #[serde(default)]
    pub init: Vec<InitAtom>,
    #[serde(default)]
    pub static_data: Vec<StaticDescription>,
}

/// Grounded problem and action schemas, as produced by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDescription {
    pub domain: DomainDescription,
    pub instance: InstanceDescription,
    #[serde(default)]
    pub actions: Vec<ActionSchema>,
}

impl ProblemDescription {
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CompileError::from(e).chain(format!("read({})", path.display())))?;
        Self::parse(&content).map_err(|e| e.chain(format!("read({})", path.display())))
    }

    /// Builds the problem instance. A symbol is static iff the instance gives its extension.
    pub fn into_problem(self) -> Result<(ProblemInstance, Vec<ActionSchema>)> {
        let domain = ProblemDomain::new(
            self.domain.name,
            self.domain.types,
            self.domain.symbols.into_iter().map(Symbol::from).collect(),
        )?;
        let instance = self.instance;
        let objects = ObjectIndex::new(&instance.objects)?;

        let mut init = State::default();
        for atom in &instance.init {
            let symbol = checked_symbol(&domain, &atom.symbol, atom.args.len())?;
            let point = point(&atom.args, &objects)?;
            let value = match (&atom.value, symbol.is_predicate()) {
                (Some(v), _) => v.index(&objects)?,
                (None, true) => 1,
                (None, false) => {
                    return Err(CompileError::missing_value(
                        "ProblemDescription::init",
                        &atom.symbol,
                    ))
                }
            };
            init.set_point(&atom.symbol, point, value);
        }

        let mut static_data = StaticData::default();
        for data in &instance.static_data {
            static_data.add(instantiation(&domain, data, &objects)?)?;
        }

        let problem = ProblemInstance::new(instance.name, domain, instance.objects, init, static_data)?;
        Ok((problem, self.actions))
    }
}

fn checked_symbol<'a>(domain: &'a ProblemDomain, name: &str, arity: usize) -> Result<&'a Symbol> {
    let symbol = domain
        .get_symbol(name)
        .ok_or_else(|| CompileError::unknown_symbol("ProblemDescription", name))?;
    if symbol.arity() != arity {
        return Err(CompileError::wrong_arity(
            "ProblemDescription",
            name,
            arity,
            symbol.arity(),
        ));
    }
    Ok(symbol)
}

fn point(args: &[Value], objects: &ObjectIndex) -> Result<Point> {
    args.iter().map(|a| a.index(objects)).collect()
}

fn instantiation(
    domain: &ProblemDomain,
    data: &StaticDescription,
    objects: &ObjectIndex,
) -> Result<Instantiation> {
    match data {
        StaticDescription::Predicate { symbol, points } => {
            let mut extension = PredicateInstantiation::new(symbol.clone());
            for p in points {
                let s = checked_symbol(domain, symbol, p.len())?;
                if !s.is_predicate() {
                    return Err(CompileError::unrecognized_expression(
                        "ProblemDescription::static_data",
                        format!("function {} given as a predicate extension", symbol),
                    ));
                }
                extension.add(point(p, objects)?)?;
            }
            Ok(Instantiation::Predicate(extension))
        }
        StaticDescription::Function { symbol, mapping } => {
            let mut extension = FunctionInstantiation::new(symbol.clone());
            for entry in mapping {
                let s = checked_symbol(domain, symbol, entry.point.len())?;
                if s.is_predicate() {
                    return Err(CompileError::unrecognized_expression(
                        "ProblemDescription::static_data",
                        format!("predicate {} given as a function extension", symbol),
                    ));
                }
                extension.add(point(&entry.point, objects)?, entry.value.index(objects)?)?;
            }
            Ok(Instantiation::Function(extension))
        }
    }
}
