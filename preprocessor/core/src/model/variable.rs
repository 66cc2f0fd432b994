use crate::error::{CompileError, Result};
use im::HashMap;
use p3r_language::symbol::PARAMETER_PREFIX;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Argument of a state variable: a placeholder for an action parameter or a constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arg {
    Parameter(String),
    Object(String),
    Int(i64),
}

impl Arg {
    /// Reads a raw argument as written by the front end: `?x` is a parameter,
    /// anything parsing as an integer is an int, the rest are objects.
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with(PARAMETER_PREFIX) {
            Self::Parameter(raw.to_string())
        } else if let Ok(i) = raw.parse::<i64>() {
            Self::Int(i)
        } else {
            Self::Object(raw.to_string())
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Self::Parameter(_))
    }
}

impl Display for Arg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Parameter(p) => write!(f, "{}", p),
            Arg::Object(o) => write!(f, "{}", o),
            Arg::Int(i) => write!(f, "{}", i),
        }
    }
}

impl From<&str> for Arg {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<i64> for Arg {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

/// Values given to the parameters of an action, by parameter name.
pub type ParameterBinding = HashMap<String, Arg>;

/// A state variable, made up of a symbol and a number of arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Variable {
    symbol: String,
    args: Vec<Arg>,
}

impl Variable {
    pub fn new(symbol: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            symbol: symbol.into(),
            args,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn is_grounded(&self) -> bool {
        !self.args.iter().any(Arg::is_parameter)
    }

    /// Substitutes parameter placeholders by their value in the binding.
    pub fn ground(&self, binding: &ParameterBinding) -> Result<Variable> {
        let mut args = Vec::with_capacity(self.args.len());
        for a in &self.args {
            match a {
                Arg::Parameter(p) => match binding.get(p) {
                    Some(value) => args.push(value.clone()),
                    None => {
                        return Err(CompileError::unknown_parameter(
                            format!("ground({})", self),
                            p,
                        ))
                    }
                },
                _ => args.push(a.clone()),
            }
        }
        Ok(Variable::new(self.symbol.clone(), args))
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(", self.symbol)?;
        for (i, a) in self.args.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", a)?;
        }
        write!(f, ")")
    }
}
