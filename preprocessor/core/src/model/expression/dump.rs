use crate::error::{CompileError, Result};
use crate::model::action::ParameterMap;
use crate::model::expression::Expression;
use crate::model::instance::ObjectIndex;
use crate::model::ObjectIdx;
use serde::{Deserialize, Serialize};

/// Serializable form of an expression, read by the search engine.
/// Field names are part of the file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DumpRecord {
    Nested {
        symbol: String,
        subterms: Vec<DumpRecord>,
    },
    Atom {
        symbol: String,
        subterms: Vec<DumpRecord>,
    },
    Parameter {
        position: usize,
        name: String,
    },
    Constant {
        value: ObjectIdx,
    },
    IntConstant {
        value: i64,
    },
}

impl Expression {
    pub fn dump(&self, objects: &ObjectIndex, parameters: &ParameterMap) -> Result<DumpRecord> {
        let subterms = |args: &[Expression]| -> Result<Vec<DumpRecord>> {
            args.iter().map(|a| a.dump(objects, parameters)).collect()
        };
        match self {
            Expression::Functional(f)
            | Expression::StaticFunctional(f)
            | Expression::Arithmetic(f) => Ok(DumpRecord::Nested {
                symbol: f.symbol.clone(),
                subterms: subterms(&f.arguments)?,
            }),
            Expression::Predicative(p)
            | Expression::StaticPredicative(p)
            | Expression::Relational(p) => {
                if p.arguments.len() != 2 {
                    return Err(CompileError::wrong_arity(
                        format!("dump({})", self),
                        &p.symbol,
                        p.arguments.len(),
                        2,
                    ));
                }
                Ok(DumpRecord::Atom {
                    symbol: p.process_symbol()?,
                    subterms: subterms(&p.arguments)?,
                })
            }
            Expression::Variable(v) => Err(CompileError::unresolved_variable("dump", v)),
            Expression::Parameter(name) => match parameters.get(name) {
                Some(position) => Ok(DumpRecord::Parameter {
                    position: *position,
                    name: name.clone(),
                }),
                None => Err(CompileError::unknown_parameter("dump", name)),
            },
            Expression::Object(name) => Ok(DumpRecord::Constant {
                value: objects.get_index(name)?,
            }),
            Expression::Numeric(i) => Ok(DumpRecord::IntConstant { value: *i }),
        }
    }
}
