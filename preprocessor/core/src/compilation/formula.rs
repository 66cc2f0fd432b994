use crate::model::action::Parameter;
use itertools::Itertools;
use p3r_language::symbol::NEGATION_PREFIX;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Term as produced by the front end.
/// Names starting with `?` are parameters, other names are objects
/// or nullary symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Term {
    Int(i64),
    Name(String),
    Application { symbol: String, args: Vec<Term> },
}

impl Term {
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    pub fn application(symbol: impl Into<String>, args: Vec<Term>) -> Self {
        Self::Application {
            symbol: symbol.into(),
            args,
        }
    }
}

fn write_args(f: &mut Formatter<'_>, symbol: &str, args: &[Term]) -> std::fmt::Result {
    write!(f, "{}({})", symbol, args.iter().join(", "))
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Int(i) => write!(f, "{}", i),
            Term::Name(n) => write!(f, "{}", n),
            Term::Application { symbol, args } => write_args(f, symbol, args),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Formula {
    #[default]
    Truth,
    Atom {
        symbol: String,
        args: Vec<Term>,
        #[serde(default)]
        negated: bool,
    },
    And {
        parts: Vec<Formula>,
    },
}

impl Formula {
    pub fn atom(symbol: impl Into<String>, args: Vec<Term>, negated: bool) -> Self {
        Self::Atom {
            symbol: symbol.into(),
            args,
            negated,
        }
    }

    pub fn is_truth(&self) -> bool {
        matches!(self, Formula::Truth)
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Formula::Truth => write!(f, "true"),
            Formula::Atom {
                symbol,
                args,
                negated,
            } => {
                if *negated {
                    write!(f, "{}", NEGATION_PREFIX)?;
                }
                write_args(f, symbol, args)
            }
            Formula::And { parts } => {
                write!(f, "(and")?;
                for p in parts {
                    write!(f, " {}", p)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Top level conjuncts of a formula. `Truth` has none, nested conjunctions are flattened.
pub fn get_formula_parts(formula: &Formula) -> Vec<&Formula> {
    match formula {
        Formula::Truth => vec![],
        Formula::Atom { .. } => vec![formula],
        Formula::And { parts } => parts.iter().flat_map(get_formula_parts).collect(),
    }
}

/// Literal of an effect: a predicative atom made true (or false when negated),
/// or an assignment of a functional state variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectLiteral {
    Atom {
        symbol: String,
        args: Vec<Term>,
        #[serde(default)]
        negated: bool,
    },
    Assign {
        lhs: Term,
        rhs: Term,
    },
}

impl Display for EffectLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EffectLiteral::Atom {
                symbol,
                args,
                negated,
            } => {
                if *negated {
                    write!(f, "{}", NEGATION_PREFIX)?;
                }
                write_args(f, symbol, args)
            }
            EffectLiteral::Assign { lhs, rhs } => write!(f, "{} := {}", lhs, rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(default)]
    pub condition: Formula,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub literal: EffectLiteral,
}

impl Effect {
    pub fn new(literal: EffectLiteral) -> Self {
        Self {
            condition: Formula::Truth,
            parameters: vec![],
            literal,
        }
    }

    pub fn is_unconditional(&self) -> bool {
        self.condition.is_truth() && self.parameters.is_empty()
    }
}

impl Display for Effect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.parameters.is_empty() {
            write!(f, "forall({}) ", self.parameters.iter().join(", "))?;
        }
        if !self.condition.is_truth() {
            write!(f, "when {} ", self.condition)?;
        }
        write!(f, "{}", self.literal)
    }
}

/// Action as given by the front end, before compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSchema {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub precondition: Formula,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    pub fn test_formula_parts() {
        let on = Formula::atom("on", vec![Term::name("?a"), Term::name("?b")], false);
        let clear = Formula::atom("clear", vec![Term::name("?a")], false);
        let formula = Formula::And {
            parts: vec![
                on.clone(),
                Formula::Truth,
                Formula::And {
                    parts: vec![clear.clone()],
                },
            ],
        };
        assert_eq!(get_formula_parts(&formula), vec![&on, &clear]);
        assert!(get_formula_parts(&Formula::Truth).is_empty());
        assert_eq!(get_formula_parts(&on), vec![&on]);
    }

    #[test]
    pub fn test_deserialize_effect() {
        let effect: Effect = serde_json::from_value(json!({
            "literal": {
                "type": "assign",
                "lhs": {"symbol": "val", "args": ["?c"]},
                "rhs": {"symbol": "+", "args": [{"symbol": "val", "args": ["?c"]}, 1]}
            }
        }))
        .unwrap();
        assert!(effect.is_unconditional());
        assert_eq!(effect.to_string(), "val(?c) := +(val(?c), 1)");

        let effect: Effect = serde_json::from_value(json!({
            "condition": {"type": "atom", "symbol": "clear", "args": ["?b"]},
            "literal": {"type": "atom", "symbol": "on", "args": ["?a", "?b"], "negated": true}
        }))
        .unwrap();
        assert!(!effect.is_unconditional());
        assert_eq!(effect.to_string(), "when clear(?b) not on(?a, ?b)");
    }
}
