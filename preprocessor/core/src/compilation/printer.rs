use crate::error::{CompileError, Result};
use crate::model::expression::{Expression, FunctionalExpression, PredicativeExpression};
use crate::model::index::ProcedureIndex;
use crate::model::ObjectIdx;
use p3r_language::code::*;
use p3r_language::symbol::EQ;

/// Target language of the generated procedures.
pub trait Syntax {
    fn parameter(&self, position: usize) -> String;

    fn relevant(&self, position: usize) -> String;

    fn constant(&self, value: ObjectIdx) -> String {
        value.to_string()
    }

    /// Call of a state (`fluent`) or static data accessor.
    fn call(&self, symbol: &str, fluent: bool, arguments: &[String]) -> String;

    fn arithmetic(&self, lhs: &str, operator: &str, rhs: &str) -> String;

    fn comparison(&self, lhs: &str, operator: &str, rhs: &str) -> String;

    fn not(&self, code: &str) -> String;

    fn bool_return(&self, code: &str) -> String;

    fn effect_return(&self, code: &str) -> String;
}

#[derive(Debug, Default, Copy, Clone)]
pub struct CppSyntax;

impl Syntax for CppSyntax {
    fn parameter(&self, position: usize) -> String {
        format!("{}[{}]", BINDING, position)
    }

    fn relevant(&self, position: usize) -> String {
        format!("{}[{}]", RELEVANT, position)
    }

    fn call(&self, symbol: &str, fluent: bool, arguments: &[String]) -> String {
        let scope = if fluent { STATE } else { STATIC };
        format!("{}.{}({})", scope, symbol, arguments.join(", "))
    }

    fn arithmetic(&self, lhs: &str, operator: &str, rhs: &str) -> String {
        format!("({} {} {})", lhs, operator, rhs)
    }

    fn comparison(&self, lhs: &str, operator: &str, rhs: &str) -> String {
        let operator = if operator == EQ { "==" } else { operator };
        format!("{} {} {}", lhs, operator, rhs)
    }

    fn not(&self, code: &str) -> String {
        format!("!({})", code)
    }

    fn bool_return(&self, code: &str) -> String {
        format!("return {};", code)
    }

    fn effect_return(&self, code: &str) -> String {
        format!("return {}({}, {});", ATOM, AFFECTED, code)
    }
}

/// Lowers the non static parts of an expression into code, reading parameters,
/// objects and relevant variables through the procedure index.
pub struct Printer<'a, S: Syntax = CppSyntax> {
    index: &'a ProcedureIndex<'a>,
    syntax: S,
}

impl<'a> Printer<'a, CppSyntax> {
    pub fn new(index: &'a ProcedureIndex<'a>) -> Self {
        Self {
            index,
            syntax: CppSyntax,
        }
    }
}

impl<'a, S: Syntax> Printer<'a, S> {
    pub fn with_syntax(index: &'a ProcedureIndex<'a>, syntax: S) -> Self {
        Self { index, syntax }
    }

    pub fn print(&self, expression: &Expression) -> Result<String> {
        match expression {
            Expression::Parameter(name) => {
                Ok(self.syntax.parameter(self.index.parameter_position(name)?))
            }
            Expression::Object(name) => Ok(self.syntax.constant(self.index.object_index(name)?)),
            Expression::Numeric(i) => Ok(self.syntax.constant(*i)),
            Expression::Variable(v) => Err(CompileError::unresolved_variable("Printer::print", v)),
            Expression::Functional(f) => self.fluent(expression, &f.symbol, &f.arguments),
            Expression::StaticFunctional(f) => self.static_call(f),
            Expression::Arithmetic(f) => match self.arguments(&f.arguments)?.as_slice() {
                [lhs, rhs] => Ok(self.syntax.arithmetic(lhs, &f.symbol, rhs)),
                args => Err(CompileError::wrong_arity("Printer::print", &f.symbol, args.len(), 2)),
            },
            Expression::Relational(p) => self.relational(p),
            Expression::Predicative(p) => {
                let code = self.fluent(expression, &p.symbol, &p.arguments)?;
                Ok(self.negation(code, p.negated))
            }
            Expression::StaticPredicative(p) => {
                let code = self.static_call(&FunctionalExpression {
                    symbol: p.symbol.clone(),
                    arguments: p.arguments.clone(),
                })?;
                Ok(self.negation(code, p.negated))
            }
        }
    }

    /// Code of an applicability procedure.
    pub fn bool_code(&self, expression: &Expression) -> Result<String> {
        Ok(finish_bool_code(&self.syntax, &self.print(expression)?))
    }

    /// Code of an effect procedure writing the value of `expression`.
    pub fn effect_code(&self, expression: &Expression) -> Result<String> {
        Ok(self.syntax.effect_return(&self.print(expression)?))
    }

    /// Code of an effect procedure writing a value known at compile time.
    pub fn constant_effect_code(&self, value: ObjectIdx) -> String {
        self.syntax.effect_return(&self.syntax.constant(value))
    }

    fn arguments(&self, arguments: &[Expression]) -> Result<Vec<String>> {
        arguments.iter().map(|a| self.print(a)).collect()
    }

    /// Flat fluents are read from the relevant values, nested ones from the state.
    fn fluent(&self, expression: &Expression, symbol: &str, arguments: &[Expression]) -> Result<String> {
        match expression.as_state_variable() {
            Some(variable) => Ok(self.syntax.relevant(self.index.relevant_position(&variable)?)),
            None => Ok(self.syntax.call(symbol, true, &self.arguments(arguments)?)),
        }
    }

    fn static_call(&self, f: &FunctionalExpression) -> Result<String> {
        Ok(self.syntax.call(&f.symbol, false, &self.arguments(&f.arguments)?))
    }

    fn relational(&self, p: &PredicativeExpression) -> Result<String> {
        let symbol = p.process_symbol()?;
        match self.arguments(&p.arguments)?.as_slice() {
            [lhs, rhs] => Ok(self.syntax.comparison(lhs, &symbol, rhs)),
            args => Err(CompileError::wrong_arity("Printer::relational", &p.symbol, args.len(), 2)),
        }
    }

    fn negation(&self, code: String, negated: bool) -> String {
        match negated {
            true => self.syntax.not(&code),
            false => code,
        }
    }
}

pub fn finish_bool_code(syntax: &impl Syntax, code: &str) -> String {
    syntax.bool_return(code)
}
