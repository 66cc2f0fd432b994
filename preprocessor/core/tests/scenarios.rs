use p3r_core::error::ErrorKind;
use p3r_core::model::action::Binding;
use p3r_core::model::expression::process_symbol;
use p3r_core::model::procedure::{AppProcedure, EffProcedure};
use p3r_core::model::state::State;
use p3r_core::model::variable::Arg;
use p3r_core::{compile_action, compile_actions, ProblemDescription};
use serde_json::{json, Value};

fn blocks() -> Value {
    json!({
        "domain": {
            "name": "blocks",
            "types": [{"name": "block", "parent": "object"}, {"name": "place", "parent": "object"}],
            "symbols": [
                {"type": "predicate", "name": "on", "arguments": ["block", "block"]},
                {"type": "predicate", "name": "clear", "arguments": ["block"]},
                {"type": "predicate", "name": "fragile", "arguments": ["block"]},
                {"type": "function", "name": "loc", "arguments": ["block"], "codomain": "place"},
                {"type": "function", "name": "height", "arguments": ["block"], "codomain": "int"},
                {"type": "function", "name": "weight", "arguments": ["block"], "codomain": "int"}
            ]
        },
        "instance": {
            "name": "p1",
            "objects": [
                {"name": "a", "type": "block"},
                {"name": "b", "type": "block"},
                {"name": "table", "type": "place"},
                {"name": "shelf", "type": "place"}
            ],
            "init": [
                {"symbol": "on", "args": ["a", "b"]},
                {"symbol": "clear", "args": ["a"]},
                {"symbol": "loc", "args": ["a"], "value": "table"},
                {"symbol": "loc", "args": ["b"], "value": "table"},
                {"symbol": "height", "args": ["a"], "value": 1},
                {"symbol": "height", "args": ["b"], "value": 0}
            ],
            "static_data": [
                {"type": "predicate", "symbol": "fragile", "points": [["b"]]},
                {"type": "function", "symbol": "weight", "mapping": [
                    {"point": ["a"], "value": 2},
                    {"point": ["b"], "value": 5}
                ]}
            ]
        },
        "actions": [
            {
                "name": "unstack",
                "parameters": [{"name": "?a", "type": "block"}, {"name": "?b", "type": "block"}],
                "precondition": {"type": "and", "parts": [
                    {"type": "atom", "symbol": "on", "args": ["?a", "?b"]},
                    {"type": "atom", "symbol": "clear", "args": ["?a"]},
                    {"type": "atom", "symbol": "=", "args": ["?a", "table"], "negated": true},
                    {"type": "atom", "symbol": "=", "args": [{"symbol": "loc", "args": ["?a"]}, {"symbol": "loc", "args": ["?b"]}]},
                    {"type": "atom", "symbol": "<", "args": [{"symbol": "weight", "args": ["?a"]}, {"symbol": "weight", "args": ["?b"]}]}
                ]},
                "effects": [
                    {"literal": {"type": "atom", "symbol": "on", "args": ["?a", "?b"], "negated": true}},
                    {"literal": {"type": "atom", "symbol": "clear", "args": ["?b"]}},
                    {"literal": {"type": "assign", "lhs": {"symbol": "loc", "args": ["?a"]}, "rhs": "shelf"}},
                    {"literal": {"type": "assign",
                        "lhs": {"symbol": "height", "args": ["?a"]},
                        "rhs": {"symbol": "-", "args": [{"symbol": "height", "args": ["?a"]}, 1]}}}
                ]
            },
            {
                "name": "guarded",
                "parameters": [{"name": "?a", "type": "block"}, {"name": "?b", "type": "block"}],
                "effects": [
                    {
                        "condition": {"type": "atom", "symbol": "clear", "args": ["?a"]},
                        "literal": {"type": "atom", "symbol": "clear", "args": ["?b"]}
                    }
                ]
            }
        ]
    })
}

#[test]
pub fn test_scenarios() {
    let description: ProblemDescription = serde_json::from_value(blocks()).unwrap();
    let (problem, schemas) = description.into_problem().unwrap();
    let unstack = compile_action(&problem, &schemas[0]).unwrap();
    let app = unstack.applicability_procedures();

    // on(?a, ?b): generic, one relevant variable, no builtin
    assert!(matches!(app[0], AppProcedure::Generic(_)));
    assert_eq!(app[0].relevant().len(), 1);
    assert_eq!(app[0].relevant()[0].to_string(), "on(?a, ?b)");
    assert!(app[0].builtin().is_none());

    // ?a = table, negated: static
    assert!(matches!(app[2], AppProcedure::Static(_)));
    assert_eq!(app[2].description(), "?a != table");
    assert!(matches!(app[4], AppProcedure::Static(_)));

    // loc(?a) = loc(?b): binary builtin
    assert_eq!(app[3].builtin().unwrap().name(), "EQConstraint");

    // clear(?b) := true
    let eff = unstack.effect_procedures();
    assert_eq!(eff[1].affected().to_string(), "clear(?b)");
    assert!(eff[1].relevant().is_empty());
    assert_eq!(eff[1].builtin().unwrap().target_value(), Some(1));
    assert_eq!(eff[0].builtin().unwrap().target_value(), Some(0));

    // height(?a) := height(?a) - 1 reads the affected variable through the rhs only
    assert!(matches!(eff[3], EffProcedure::Generic(_)));
    assert_eq!(eff[3].relevant().len(), 1);

    // conditional effect
    let err = compile_action(&problem, &schemas[1]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedEffectShape);
    assert!(compile_actions(&problem, &schemas).is_err());
    assert!(compile_actions(&problem, &schemas[..1]).is_ok());
}

#[test]
pub fn test_negation_pushdown_involutive() {
    for symbol in ["=", "!=", "<", "<=", ">", ">="] {
        let negated = process_symbol(symbol, true).unwrap();
        assert_eq!(process_symbol(&negated, true).unwrap(), symbol);
    }
}

#[test]
pub fn test_apply_action() {
    let description: ProblemDescription = serde_json::from_value(blocks()).unwrap();
    let (problem, schemas) = description.into_problem().unwrap();
    let unstack = compile_action(&problem, &schemas[0]).unwrap();

    let binding = unstack
        .bind(vec![Arg::Object("a".into()), Arg::Object("b".into())], &problem)
        .unwrap();
    assert!(unstack.is_applicable(problem.init(), &binding, &problem).unwrap());

    let next = unstack.successor(problem.init(), &binding, &problem).unwrap();
    let objects = problem.object_index();
    assert_eq!(next.get_point("on", &[0, 1]), Some(0));
    assert_eq!(next.get_point("clear", &[1]), Some(1));
    assert_eq!(next.get_point("loc", &[0]), Some(objects.get_index("shelf").unwrap()));
    assert_eq!(next.get_point("height", &[0]), Some(0));
    assert!(!unstack.is_applicable(&next, &binding, &problem).unwrap());

    // b is heavier than a
    let reversed = unstack
        .bind(vec![Arg::Object("b".into()), Arg::Object("a".into())], &problem)
        .unwrap();
    assert!(!unstack.is_applicable(problem.init(), &reversed, &problem).unwrap());
}

#[test]
pub fn test_builtins_agree_with_generic_code() {
    let description: ProblemDescription = serde_json::from_value(blocks()).unwrap();
    let (problem, schemas) = description.into_problem().unwrap();
    let unstack = compile_action(&problem, &schemas[0]).unwrap();
    let objects = problem.object_index();

    let mut states = vec![problem.init().clone()];
    let mut moved = State::default();
    moved.set_point("loc", vec![0], objects.get_index("shelf").unwrap());
    moved.set_point("loc", vec![1], objects.get_index("table").unwrap());
    states.push(moved);

    for values in [vec![0, 1], vec![1, 0], vec![0, 0]] {
        let binding = Binding::from_values(unstack.parameters(), values, objects).unwrap();
        for state in &states {
            for procedure in unstack.applicability_procedures() {
                if let AppProcedure::Specialized(generic, _) = procedure {
                    let values = generic.relevant().project(state, &binding, &problem).unwrap();
                    let builtin = procedure.check(&values, &binding, &problem, state).unwrap();
                    let generic = AppProcedure::Generic(generic.clone())
                        .check(&values, &binding, &problem, state)
                        .unwrap();
                    assert_eq!(builtin, generic);
                }
            }
            for procedure in unstack.effect_procedures() {
                if let EffProcedure::Specialized(effect, _) = procedure {
                    let values = effect
                        .procedure()
                        .relevant()
                        .project(state, &binding, &problem)
                        .unwrap();
                    let builtin = procedure.apply(&values, &binding, &problem, state).unwrap();
                    let generic = EffProcedure::Generic(effect.clone())
                        .apply(&values, &binding, &problem, state)
                        .unwrap();
                    assert_eq!(builtin, generic);
                }
            }
        }
    }
}

#[test]
pub fn test_static_conjuncts_ignore_the_state() {
    let description: ProblemDescription = serde_json::from_value(blocks()).unwrap();
    let (problem, schemas) = description.into_problem().unwrap();
    let unstack = compile_action(&problem, &schemas[0]).unwrap();
    let objects = problem.object_index();
    let binding = Binding::from_values(unstack.parameters(), vec![0, 1], objects).unwrap();

    for procedure in unstack.applicability_procedures() {
        if procedure.is_static() {
            let empty = procedure.evaluate(&State::default(), &binding, &problem).unwrap();
            let full = procedure.evaluate(problem.init(), &binding, &problem).unwrap();
            assert_eq!(empty, full);
        }
    }
}
