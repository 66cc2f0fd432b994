use crate::compilation::builtin::{match_constraint, match_effect};
use crate::compilation::formula::{get_formula_parts, ActionSchema, Effect, EffectLiteral, Formula};
use crate::compilation::parser::ExpressionParser;
use crate::compilation::printer::Printer;
use crate::error::{CompileError, Result};
use crate::model::action::Action;
use crate::model::builtin::{BuiltinEffect, Operand};
use crate::model::expression::Expression;
use crate::model::index::ProcedureIndex;
use crate::model::instance::ProblemInstance;
use crate::model::procedure::*;
use crate::model::variable::Variable;
use log::{debug, error, info};

pub mod builtin;
pub mod formula;
pub mod parser;
pub mod printer;

/// Compiles the precondition and effects of one action into procedures.
pub struct ActionCompiler<'a> {
    problem: &'a ProblemInstance,
    schema: &'a ActionSchema,
}

impl<'a> ActionCompiler<'a> {
    pub fn new(problem: &'a ProblemInstance, schema: &'a ActionSchema) -> Self {
        Self { problem, schema }
    }

    pub fn process(&self) -> Result<Action> {
        let mut action = Action::new(self.schema.name.clone(), self.schema.parameters.clone());

        for part in get_formula_parts(&self.schema.precondition) {
            let procedure = self.generate_app_procedure(&action, part)?;
            debug!("{}: applicability procedure {}", action.name(), procedure);
            action.add_applicability_procedure(procedure);
        }

        for effect in &self.schema.effects {
            let procedure = self.generate_eff_procedure(&action, effect)?;
            debug!("{}: effect procedure {}", action.name(), procedure);
            action.add_effect_procedure(procedure);
        }

        Ok(action)
    }

    fn build_procedure_index<'b>(&'b self, action: &'b Action, relevant: Vec<Variable>) -> ProcedureIndex<'b> {
        ProcedureIndex::new(action.parameter_map(), self.problem.object_index(), relevant)
    }

    fn generate_app_procedure(&self, action: &Action, formula: &Formula) -> Result<AppProcedure> {
        let parser = ExpressionParser::new(self.problem, action.parameter_map());
        let (expression, relevant) = parser.process_formula(formula)?;

        if expression.is_tree_static() {
            let routine = match expression {
                Expression::Relational(p) => StaticRoutine::Relational {
                    symbol: p.symbol,
                    negated: p.negated,
                    arguments: p.arguments,
                },
                Expression::StaticPredicative(p) => StaticRoutine::Predicative {
                    symbol: p.symbol,
                    negated: p.negated,
                    arguments: p.arguments,
                },
                other => {
                    return Err(CompileError::unrecognized_expression(
                        format!("generate_app_procedure({})", action.name()),
                        other,
                    ))
                }
            };
            let description = routine.expression()?.to_string();
            return Ok(AppProcedure::Static(StaticAppProcedure::new(
                description,
                action.parameter_map().clone(),
                routine,
            )));
        }

        let index = self.build_procedure_index(action, relevant);
        let printer = Printer::new(&index);
        let code = printer.bool_code(&expression)?;
        let builtin = match_constraint(&expression, &index)?;
        let generic = GenericProcedure::new(
            expression.to_string(),
            expression,
            action.parameter_map().clone(),
            index.relevant,
            code,
        );
        Ok(match builtin {
            Some(b) => {
                debug!("{}: builtin {} for {}", action.name(), b, generic.description());
                AppProcedure::Specialized(generic, b)
            }
            None => AppProcedure::Generic(generic),
        })
    }

    fn generate_eff_procedure(&self, action: &Action, effect: &Effect) -> Result<EffProcedure> {
        if !effect.is_unconditional() {
            return Err(CompileError::unsupported_effect_shape(
                format!("generate_eff_procedure({})", action.name()),
                effect,
            ));
        }
        let parser = ExpressionParser::new(self.problem, action.parameter_map());
        let description = effect.literal.to_string();

        match &effect.literal {
            EffectLiteral::Assign { lhs, rhs } => {
                let (_, affected) = parser.process_lhs(lhs)?;
                let (rhs, relevant) = parser.process_term(rhs)?;

                let index = self.build_procedure_index(action, relevant);
                let printer = Printer::new(&index);
                let code = printer.effect_code(&rhs)?;
                let builtin = match_effect(&rhs, &index)?;
                let generic = GenericEffect::new(
                    GenericProcedure::new(
                        description,
                        rhs,
                        action.parameter_map().clone(),
                        index.relevant,
                        code,
                    ),
                    affected,
                );
                Ok(match builtin {
                    Some(b) => {
                        debug!("{}: builtin {} for {}", action.name(), b, generic.procedure().description());
                        EffProcedure::Specialized(generic, b)
                    }
                    None => EffProcedure::Generic(generic),
                })
            }
            EffectLiteral::Atom {
                symbol,
                args,
                negated,
            } => {
                let (_, affected) = parser.process_effect_atom(symbol, args, *negated)?;
                let value = if *negated { 0 } else { 1 };
                // the new value of a predicate never reads the state
                let index = self.build_procedure_index(action, vec![]);
                let code = Printer::new(&index).constant_effect_code(value);
                let generic = GenericEffect::new(
                    GenericProcedure::new(
                        description,
                        Expression::Numeric(value),
                        action.parameter_map().clone(),
                        index.relevant,
                        code,
                    ),
                    affected,
                );
                Ok(EffProcedure::Specialized(
                    generic,
                    BuiltinEffect::ValueAssignment {
                        value: Operand::Constant(value),
                    },
                ))
            }
        }
    }
}

pub fn compile_action(problem: &ProblemInstance, schema: &ActionSchema) -> Result<Action> {
    match ActionCompiler::new(problem, schema).process() {
        Ok(action) => {
            info!(
                "compiled action {}: {} applicability and {} effect procedures",
                action,
                action.applicability_procedures().len(),
                action.effect_procedures().len()
            );
            Ok(action)
        }
        Err(e) => {
            error!("failed to compile action {}: {}", schema.name, e.get_message());
            Err(e.chain(format!("compile_action({})", schema.name)))
        }
    }
}

/// Compiles every action in order. The first failure aborts the whole run.
pub fn compile_actions(problem: &ProblemInstance, schemas: &[ActionSchema]) -> Result<Vec<Action>> {
    schemas.iter().map(|s| compile_action(problem, s)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::compilation::formula::Term;
    use crate::error::ErrorKind;
    use crate::model::action::Parameter;
    use crate::model::domain::{ObjectType, ProblemDomain, Symbol};
    use crate::model::instance::ProblemObject;
    use crate::model::state::{
        FunctionInstantiation, Instantiation, PredicateInstantiation, State, StaticData,
    };

    fn args(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    /// Blocks world with a static `fragile` predicate and a static `weight` function.
    pub fn blocks_problem() -> ProblemInstance {
        let domain = ProblemDomain::new(
            "blocks",
            vec![
                ObjectType::new("block", Some("object".to_string())),
                ObjectType::new("place", Some("object".to_string())),
            ],
            vec![
                Symbol::predicate("on", args(&["block", "block"])),
                Symbol::predicate("clear", args(&["block"])),
                Symbol::predicate("fragile", args(&["block"])),
                Symbol::function("loc", args(&["block"]), "place"),
                Symbol::function("owner", args(&["place"]), "place"),
                Symbol::function("weight", args(&["block"]), "int"),
                Symbol::function("height", args(&["block"]), "int"),
            ],
        )
        .unwrap();
        let mut statics = StaticData::default();
        let mut fragile = PredicateInstantiation::new("fragile");
        fragile.add(vec![1]).unwrap();
        statics.add(Instantiation::Predicate(fragile)).unwrap();
        let mut weight = FunctionInstantiation::new("weight");
        for (i, w) in [(0, 1), (1, 2), (2, 3)] {
            weight.add(vec![i], w).unwrap();
        }
        statics.add(Instantiation::Function(weight)).unwrap();

        ProblemInstance::new(
            "p1",
            domain,
            vec![
                ProblemObject::new("a", "block"),
                ProblemObject::new("b", "block"),
                ProblemObject::new("c", "block"),
                ProblemObject::new("table", "place"),
            ],
            State::default(),
            statics,
        )
        .unwrap()
    }

    fn schema(precondition: Formula, effects: Vec<Effect>) -> ActionSchema {
        ActionSchema {
            name: "move".to_string(),
            parameters: vec![Parameter::new("?a", "block"), Parameter::new("?b", "block")],
            precondition,
            effects,
        }
    }

    fn name(n: &str) -> Term {
        Term::name(n)
    }

    #[test]
    pub fn test_generic_applicability() {
        let problem = blocks_problem();
        let schema = schema(
            Formula::atom("on", vec![name("?a"), name("?b")], false),
            vec![],
        );
        let action = compile_action(&problem, &schema).unwrap();
        let procedures = action.applicability_procedures();
        assert_eq!(procedures.len(), 1);
        assert!(matches!(procedures[0], AppProcedure::Generic(_)));
        assert_eq!(procedures[0].relevant()[0].to_string(), "on(?a, ?b)");
        assert!(procedures[0].builtin().is_none());
        assert_eq!(procedures[0].generic().unwrap().code(), "return _relevant[0];");
    }

    #[test]
    pub fn test_static_applicability() {
        let problem = blocks_problem();
        let schema = schema(
            Formula::And {
                parts: vec![
                    Formula::atom("=", vec![name("?a"), name("table")], true),
                    Formula::atom("fragile", vec![name("?b")], false),
                    Formula::atom(">", vec![
                        Term::application("weight", vec![name("?a")]),
                        Term::application("weight", vec![name("?b")]),
                    ], false),
                ],
            },
            vec![],
        );
        let action = compile_action(&problem, &schema).unwrap();
        let procedures = action.applicability_procedures();
        assert_eq!(procedures.len(), 3);
        assert!(procedures.iter().all(AppProcedure::is_static));
        assert_eq!(procedures[0].description(), "?a != table");
    }

    #[test]
    pub fn test_specialized_applicability() {
        let problem = blocks_problem();
        let loc = |p: &str| Term::application("loc", vec![name(p)]);
        let schema = schema(
            Formula::And {
                parts: vec![
                    Formula::atom("=", vec![loc("?a"), name("table")], false),
                    Formula::atom("!=", vec![loc("?a"), loc("?b")], false),
                ],
            },
            vec![],
        );
        let action = compile_action(&problem, &schema).unwrap();
        let procedures = action.applicability_procedures();
        assert_eq!(procedures[0].builtin().unwrap().name(), "EQXConstraint");
        assert_eq!(
            procedures[0].generic().unwrap().code(),
            "return _relevant[0] == 3;"
        );
        assert_eq!(procedures[1].builtin().unwrap().name(), "NEQConstraint");
        assert_eq!(procedures[1].relevant().len(), 2);
    }

    #[test]
    pub fn test_effects() {
        let problem = blocks_problem();
        let schema = schema(
            Formula::Truth,
            vec![
                Effect::new(EffectLiteral::Atom {
                    symbol: "on".to_string(),
                    args: vec![name("?a"), name("?b")],
                    negated: true,
                }),
                Effect::new(EffectLiteral::Assign {
                    lhs: Term::application("loc", vec![name("?a")]),
                    rhs: Term::application("loc", vec![name("?b")]),
                }),
                Effect::new(EffectLiteral::Assign {
                    lhs: Term::application("height", vec![name("?a")]),
                    rhs: Term::application(
                        "+",
                        vec![Term::application("height", vec![name("?a")]), Term::Int(1)],
                    ),
                }),
            ],
        );
        let action = compile_action(&problem, &schema).unwrap();
        let effects = action.effect_procedures();
        assert_eq!(effects[0].affected().to_string(), "on(?a, ?b)");
        assert!(effects[0].relevant().is_empty());
        assert_eq!(effects[0].builtin().unwrap().target_value(), Some(0));
        assert_eq!(effects[0].code(), "return Atom(_affected, 0);");

        assert_eq!(effects[1].relevant()[0].to_string(), "loc(?b)");
        assert_eq!(
            effects[1].builtin(),
            Some(&BuiltinEffect::VariableAssignment { source: 0 })
        );

        assert_eq!(effects[2].relevant()[0].to_string(), "height(?a)");
        assert!(effects[2].builtin().is_none());
        assert_eq!(effects[2].code(), "return Atom(_affected, (_relevant[0] + 1));");
    }

    #[test]
    pub fn test_unsupported_effect() {
        let problem = blocks_problem();
        let mut effect = Effect::new(EffectLiteral::Atom {
            symbol: "clear".to_string(),
            args: vec![name("?b")],
            negated: false,
        });
        effect.condition = Formula::atom("clear", vec![name("?a")], false);
        let schema = schema(Formula::Truth, vec![effect]);
        let err = compile_action(&problem, &schema).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedEffectShape);
    }

    #[test]
    pub fn test_predicate_as_term() {
        let problem = blocks_problem();
        let of_a = |s: &str| Term::application(s, vec![name("?a")]);

        let fluent = schema(Formula::atom("=", vec![of_a("clear"), Term::Int(1)], false), vec![]);
        let err = compile_action(&problem, &fluent).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedExpression);

        let fixed = schema(Formula::atom("=", vec![of_a("fragile"), Term::Int(1)], false), vec![]);
        let action = compile_action(&problem, &fixed).unwrap();
        let procedure = &action.applicability_procedures()[0];
        assert!(procedure.is_static());
        let fragile = action.bind(vec!["b".into(), "a".into()], &problem).unwrap();
        let solid = action.bind(vec!["a".into(), "b".into()], &problem).unwrap();
        assert!(procedure.evaluate(problem.init(), &fragile, &problem).unwrap());
        assert!(!procedure.evaluate(problem.init(), &solid, &problem).unwrap());
    }

    #[test]
    pub fn test_compile_actions_aborts_on_failure() {
        let problem = blocks_problem();
        let good = schema(Formula::atom("clear", vec![name("?a")], false), vec![]);
        let mut bad = schema(Formula::atom("clear", vec![name("?z")], false), vec![]);
        bad.name = "bad".to_string();
        assert_eq!(compile_actions(&problem, &[good.clone()]).unwrap().len(), 1);
        assert!(compile_actions(&problem, &[good, bad]).is_err());
    }
}
