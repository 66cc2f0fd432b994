use crate::compilation::formula::{Formula, Term};
use crate::error::{CompileError, Result};
use crate::model::action::ParameterMap;
use crate::model::domain::Symbol;
use crate::model::expression::{Expression, Relation};
use crate::model::instance::ProblemInstance;
use crate::model::variable::Variable;
use itertools::Itertools;
use p3r_language::symbol::PARAMETER_PREFIX;

/// Lowers front-end formulas and terms into expression trees, collecting
/// the state variables they read.
pub struct ExpressionParser<'a> {
    problem: &'a ProblemInstance,
    parameters: &'a ParameterMap,
}

impl<'a> ExpressionParser<'a> {
    pub fn new(problem: &'a ProblemInstance, parameters: &'a ParameterMap) -> Self {
        Self {
            problem,
            parameters,
        }
    }

    /// Parses one conjunct of a precondition.
    /// Relevant variables are returned in order of first occurrence, without duplicates.
    pub fn process_formula(&self, formula: &Formula) -> Result<(Expression, Vec<Variable>)> {
        let mut relevant = vec![];
        let expression = match formula {
            Formula::Atom {
                symbol,
                args,
                negated,
            } => self.atom(symbol, args, *negated, &mut relevant)?,
            _ => {
                return Err(CompileError::unrecognized_expression(
                    "ExpressionParser::process_formula",
                    formula,
                ))
            }
        };
        Ok((expression, dedup(relevant)))
    }

    pub fn process_term(&self, term: &Term) -> Result<(Expression, Vec<Variable>)> {
        let mut relevant = vec![];
        let expression = self.term(term, &mut relevant)?;
        Ok((expression, dedup(relevant)))
    }

    /// Parses the atom of a predicative effect into the affected state variable.
    pub fn process_effect_atom(
        &self,
        symbol: &str,
        args: &[Term],
        negated: bool,
    ) -> Result<(Expression, Variable)> {
        let expression = self.atom(symbol, args, negated, &mut vec![])?;
        self.affected(expression)
    }

    /// Parses the left hand side of an assignment into the affected state variable.
    pub fn process_lhs(&self, term: &Term) -> Result<(Expression, Variable)> {
        let expression = self.term(term, &mut vec![])?;
        self.affected(expression)
    }

    fn affected(&self, expression: Expression) -> Result<(Expression, Variable)> {
        match (expression.is_fluent(), expression.as_state_variable()) {
            (true, Some(variable)) => Ok((Expression::Variable(variable.clone()), variable)),
            _ => Err(CompileError::unrecognized_expression(
                "ExpressionParser::affected",
                format!("{} is not a state variable", expression),
            )),
        }
    }

    fn symbol(&self, name: &str, arity: usize) -> Result<&'a Symbol> {
        let symbol = self
            .problem
            .domain()
            .get_symbol(name)
            .ok_or_else(|| CompileError::unknown_symbol("ExpressionParser::symbol", name))?;
        if symbol.arity() != arity {
            return Err(CompileError::wrong_arity(
                "ExpressionParser::symbol",
                name,
                arity,
                symbol.arity(),
            ));
        }
        Ok(symbol)
    }

    fn arguments(&self, args: &[Term], relevant: &mut Vec<Variable>) -> Result<Vec<Expression>> {
        args.iter().map(|a| self.term(a, relevant)).collect()
    }

    /// Records the application as relevant when it denotes a state variable.
    fn fluent(&self, expression: Expression, relevant: &mut Vec<Variable>) -> Expression {
        if let Some(variable) = expression.as_state_variable() {
            relevant.push(variable);
        }
        expression
    }

    fn atom(
        &self,
        symbol: &str,
        args: &[Term],
        negated: bool,
        relevant: &mut Vec<Variable>,
    ) -> Result<Expression> {
        if Relation::is_relational_symbol(symbol) {
            let arguments = self.arguments(args, relevant)?;
            return Expression::relational(symbol, negated, arguments);
        }
        let s = self.symbol(symbol, args.len())?;
        if !s.is_predicate() {
            return Err(CompileError::unrecognized_expression(
                "ExpressionParser::atom",
                format!("function {} used as an atom", symbol),
            ));
        }
        let arguments = self.arguments(args, relevant)?;
        if self.problem.static_data().is_static(symbol) {
            Ok(Expression::static_predicative(symbol, negated, arguments))
        } else {
            Ok(self.fluent(Expression::predicative(symbol, negated, arguments), relevant))
        }
    }

    fn term(&self, term: &Term, relevant: &mut Vec<Variable>) -> Result<Expression> {
        match term {
            Term::Int(i) => Ok(Expression::Numeric(*i)),
            Term::Name(name) => self.name(name, relevant),
            Term::Application { symbol, args } => self.application(symbol, args, relevant),
        }
    }

    fn name(&self, name: &str, relevant: &mut Vec<Variable>) -> Result<Expression> {
        if name.starts_with(PARAMETER_PREFIX) {
            return match self.parameters.contains_key(name) {
                true => Ok(Expression::parameter(name)),
                false => Err(CompileError::unknown_parameter("ExpressionParser::name", name)),
            };
        }
        if self.problem.object_index().contains(name) {
            return Ok(Expression::object(name));
        }
        if let Ok(i) = name.parse::<i64>() {
            return Ok(Expression::Numeric(i));
        }
        match self.problem.domain().get_symbol(name) {
            Some(_) => self.application(name, &[], relevant),
            None => Err(CompileError::unknown_object("ExpressionParser::name", name)),
        }
    }

    fn application(
        &self,
        symbol: &str,
        args: &[Term],
        relevant: &mut Vec<Variable>,
    ) -> Result<Expression> {
        if Expression::is_arithmetic_symbol(symbol) {
            let arguments = self.arguments(args, relevant)?;
            return Expression::arithmetic(symbol, arguments);
        }
        let s = self.symbol(symbol, args.len())?;
        let arguments = self.arguments(args, relevant)?;
        let is_static = self.problem.static_data().is_static(symbol);
        let expression = match (s.is_predicate(), is_static) {
            (true, true) => Expression::static_predicative(symbol, false, arguments),
            // a fluent predicate read as a term would hide the state from the classifier
            (true, false) => {
                return Err(CompileError::unrecognized_expression(
                    "ExpressionParser::application",
                    format!("fluent predicate {} used as a term", symbol),
                ))
            }
            (false, true) => Expression::static_functional(symbol, arguments),
            (false, false) => Expression::functional(symbol, arguments),
        };
        match is_static {
            true => Ok(expression),
            false => Ok(self.fluent(expression, relevant)),
        }
    }
}

fn dedup(variables: Vec<Variable>) -> Vec<Variable> {
    variables.into_iter().unique().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compilation::printer::Printer;
    use crate::compilation::tests::blocks_problem;
    use crate::error::ErrorKind;
    use crate::model::index::ProcedureIndex;
    use crate::model::variable::Arg;
    use map_macro::map;

    fn parameters() -> ParameterMap {
        map! {"?a".to_string() => 0, "?b".to_string() => 1}
    }

    #[test]
    pub fn test_flat_atom_is_relevant() {
        let problem = blocks_problem();
        let parameters = parameters();
        let parser = ExpressionParser::new(&problem, &parameters);
        let (e, relevant) = parser
            .process_formula(&Formula::atom(
                "on",
                vec![Term::name("?a"), Term::name("?b")],
                false,
            ))
            .unwrap();
        assert!(matches!(e, Expression::Predicative(_)));
        assert_eq!(
            relevant,
            vec![Variable::new("on", vec![Arg::Parameter("?a".into()), Arg::Parameter("?b".into())])]
        );
    }

    #[test]
    pub fn test_relevant_deduplicated() {
        let problem = blocks_problem();
        let parameters = parameters();
        let parser = ExpressionParser::new(&problem, &parameters);
        let loc = Term::application("loc", vec![Term::name("?a")]);
        let (e, relevant) = parser
            .process_formula(&Formula::atom("=", vec![loc.clone(), loc], false))
            .unwrap();
        assert!(!e.is_tree_static());
        assert_eq!(relevant.len(), 1);

        let index = ProcedureIndex::new(&parameters, problem.object_index(), relevant);
        let code = Printer::new(&index).bool_code(&e).unwrap();
        assert_eq!(code, "return _relevant[0] == _relevant[0];");
    }

    #[test]
    pub fn test_static_symbol() {
        let problem = blocks_problem();
        let parameters = parameters();
        let parser = ExpressionParser::new(&problem, &parameters);
        let (e, relevant) = parser
            .process_formula(&Formula::atom("fragile", vec![Term::name("?a")], true))
            .unwrap();
        assert!(e.is_tree_static());
        assert!(relevant.is_empty());
        assert_eq!(e.to_string(), "not fragile(?a)");
    }

    #[test]
    pub fn test_lhs_must_be_state_variable() {
        let problem = blocks_problem();
        let parameters = parameters();
        let parser = ExpressionParser::new(&problem, &parameters);
        let (e, affected) = parser
            .process_lhs(&Term::application("loc", vec![Term::name("?a")]))
            .unwrap();
        assert!(matches!(e, Expression::Variable(_)));
        assert_eq!(affected.to_string(), "loc(?a)");
        assert!(parser.process_lhs(&Term::name("?a")).is_err());
    }

    #[test]
    pub fn test_load_errors() {
        let problem = blocks_problem();
        let parameters = parameters();
        let parser = ExpressionParser::new(&problem, &parameters);
        let kind = |f: Formula| parser.process_formula(&f).unwrap_err().kind();
        assert_eq!(
            kind(Formula::atom("above", vec![Term::name("?a")], false)),
            ErrorKind::UnknownSymbol
        );
        assert_eq!(
            kind(Formula::atom("on", vec![Term::name("?a")], false)),
            ErrorKind::InvalidArity
        );
        assert_eq!(
            kind(Formula::atom("clear", vec![Term::name("?z")], false)),
            ErrorKind::UnknownParameter
        );
        assert_eq!(
            kind(Formula::atom("clear", vec![Term::name("d")], false)),
            ErrorKind::UnknownObject
        );
    }
}
