use crate::error::{CompileError, Result};
use crate::model::domain::ProblemDomain;
use crate::model::state::{Point, State, StaticData};
use crate::model::variable::{Arg, Variable};
use crate::model::ObjectIdx;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemObject {
    pub name: String,
    #[serde(rename = "type")]
    pub typename: String,
}

impl ProblemObject {
    pub fn new(name: impl Into<String>, typename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typename: typename.into(),
        }
    }
}

/// Global name -> index map of the problem objects.
/// Indexes follow the declaration order of the objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectIndex {
    names: Vec<String>,
    index: HashMap<String, ObjectIdx>,
}

impl ObjectIndex {
    pub fn new(objects: &[ProblemObject]) -> Result<Self> {
        let mut index = Self::default();
        for o in objects {
            if index.index.contains_key(&o.name) {
                return Err(CompileError::duplicate_object("ObjectIndex::new", &o.name));
            }
            index
                .index
                .insert(o.name.clone(), index.names.len() as ObjectIdx);
            index.names.push(o.name.clone());
        }
        Ok(index)
    }

    pub fn get_index(&self, name: &str) -> Result<ObjectIdx> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CompileError::unknown_object("ObjectIndex::get_index", name))
    }

    pub fn get_name(&self, index: ObjectIdx) -> Option<&str> {
        if index < 0 {
            return None;
        }
        self.names.get(index as usize).map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Value of a constant argument.
    pub fn value(&self, arg: &Arg) -> Result<ObjectIdx> {
        match arg {
            Arg::Object(o) => self.get_index(o),
            Arg::Int(i) => Ok(*i),
            Arg::Parameter(p) => Err(CompileError::unknown_parameter("ObjectIndex::value", p)),
        }
    }

    /// Point of a grounded variable.
    pub fn point(&self, variable: &Variable) -> Result<Point> {
        variable
            .args()
            .iter()
            .map(|a| self.value(a))
            .collect::<Result<Point>>()
            .map_err(|e| e.chain(format!("point({})", variable)))
    }
}

/// A planning problem: a domain with its objects, initial state and static data.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    name: String,
    domain: ProblemDomain,
    objects: Vec<ProblemObject>,
    object_index: ObjectIndex,
    init: State,
    static_data: StaticData,
}

impl ProblemInstance {
    pub fn new(
        name: impl Into<String>,
        domain: ProblemDomain,
        objects: Vec<ProblemObject>,
        init: State,
        static_data: StaticData,
    ) -> Result<Self> {
        let object_index = ObjectIndex::new(&objects)?;
        Ok(Self {
            name: name.into(),
            domain,
            objects,
            object_index,
            init,
            static_data,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &ProblemDomain {
        &self.domain
    }

    pub fn objects(&self) -> &[ProblemObject] {
        &self.objects
    }

    pub fn object_index(&self) -> &ObjectIndex {
        &self.object_index
    }

    pub fn init(&self) -> &State {
        &self.init
    }

    pub fn static_data(&self) -> &StaticData {
        &self.static_data
    }

    pub fn get_complete_name(&self) -> String {
        format!("{}/{}", self.domain.name(), self.name)
    }
}
