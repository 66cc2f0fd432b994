use crate::error::{CompileError, Result};
use p3r_language::types::TYPE_BOOL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: String,
    pub parent: Option<String>,
}

impl ObjectType {
    pub fn new(name: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            name: name.into(),
            parent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Predicate,
    Function { codomain: String },
}

/// A predicate or function symbol with its argument types.
/// Symbols are built when the domain is loaded and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    name: String,
    arguments: Vec<String>,
    kind: SymbolKind,
}

impl Symbol {
    pub fn predicate(name: impl Into<String>, domain: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments: domain,
            kind: SymbolKind::Predicate,
        }
    }

    pub fn function(name: impl Into<String>, domain: Vec<String>, codomain: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: domain,
            kind: SymbolKind::Function {
                codomain: codomain.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_predicate(&self) -> bool {
        matches!(self.kind, SymbolKind::Predicate)
    }

    pub fn codomain(&self) -> &str {
        match &self.kind {
            SymbolKind::Predicate => TYPE_BOOL,
            SymbolKind::Function { codomain } => codomain,
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) -> {}",
            self.name,
            self.arguments.join(", "),
            self.codomain()
        )
    }
}

/// Types and symbols of a planning domain.
/// Symbols are kept in declaration order so that iterations are deterministic.
#[derive(Debug, Clone, Default)]
pub struct ProblemDomain {
    name: String,
    types: Vec<ObjectType>,
    symbols: Vec<Symbol>,
    symbol_id: HashMap<String, usize>,
}

impl ProblemDomain {
    pub fn new(name: impl Into<String>, types: Vec<ObjectType>, symbols: Vec<Symbol>) -> Result<Self> {
        let mut domain = Self {
            name: name.into(),
            types,
            symbols: vec![],
            symbol_id: Default::default(),
        };
        for symbol in symbols {
            domain.add_symbol(symbol)?;
        }
        Ok(domain)
    }

    fn add_symbol(&mut self, symbol: Symbol) -> Result<()> {
        if self.symbol_id.contains_key(symbol.name()) {
            return Err(CompileError::new(
                crate::error::ErrorKind::DuplicateMappingInsertion,
                "ProblemDomain::add_symbol",
                format!("Symbol '{}' is declared twice.", symbol.name()),
            ));
        }
        self.symbol_id
            .insert(symbol.name().to_string(), self.symbols.len());
        self.symbols.push(symbol);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &[ObjectType] {
        &self.types
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbol_id.get(name).map(|id| &self.symbols[*id])
    }

    pub fn get_predicates(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_predicate())
    }

    /// A domain is predicative if it has no functions, only predicates.
    pub fn is_predicative(&self) -> bool {
        self.symbols.iter().all(|s| s.is_predicate())
    }

    /// Returns true if `t` is `ancestor` or one of its subtypes.
    pub fn is_subtype(&self, t: &str, ancestor: &str) -> bool {
        let mut current = Some(t.to_string());
        // bound the walk in case the hierarchy declares a cycle
        let mut steps = 0;
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            if steps > self.types.len() {
                return false;
            }
            steps += 1;
            current = self
                .types
                .iter()
                .find(|ty| ty.name == name)
                .and_then(|ty| ty.parent.clone());
        }
        false
    }
}
