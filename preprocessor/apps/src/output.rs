use anyhow::Context;
use p3r_core::model::action::{Action, Parameter};
use p3r_core::model::expression::dump::DumpRecord;
use p3r_core::model::instance::ProblemInstance;
use p3r_core::model::procedure::{AppProcedure, EffProcedure};
use p3r_language::code::*;
use p3r_language::output::{ACTIONS_FILE, PROCEDURES_FILE};
use serde::Serialize;
use std::fmt::Write;
use std::fs;
use std::path::Path;

pub const KIND_STATIC: &str = "static";
pub const KIND_GENERIC: &str = "generic";
pub const KIND_SPECIALIZED: &str = "specialized";

#[derive(Debug, Clone, Serialize)]
pub struct ProcedureRecord {
    pub kind: &'static str,
    pub description: String,
    pub relevant: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump: Option<DumpRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionRecord {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub applicability: Vec<ProcedureRecord>,
    pub effects: Vec<ProcedureRecord>,
}

impl ActionRecord {
    pub fn new(action: &Action, problem: &ProblemInstance) -> Self {
        let dump = |e: &p3r_core::model::expression::Expression| {
            e.dump(problem.object_index(), action.parameter_map()).ok()
        };

        let applicability = action
            .applicability_procedures()
            .iter()
            .map(|p| {
                let (kind, code, dump) = match p {
                    AppProcedure::Static(s) => (
                        KIND_STATIC,
                        None,
                        s.routine().expression().ok().as_ref().and_then(dump),
                    ),
                    AppProcedure::Generic(g) => {
                        (KIND_GENERIC, Some(g.code().to_string()), dump(g.expression()))
                    }
                    AppProcedure::Specialized(g, _) => {
                        (KIND_SPECIALIZED, Some(g.code().to_string()), dump(g.expression()))
                    }
                };
                ProcedureRecord {
                    kind,
                    description: p.description().to_string(),
                    relevant: p.relevant().iter().map(|v| v.to_string()).collect(),
                    affected: None,
                    code,
                    builtin: p.builtin().map(|b| b.to_string()),
                    dump,
                }
            })
            .collect();

        let effects = action
            .effect_procedures()
            .iter()
            .map(|e| ProcedureRecord {
                kind: match e {
                    EffProcedure::Generic(_) => KIND_GENERIC,
                    EffProcedure::Specialized(..) => KIND_SPECIALIZED,
                },
                description: e.description().to_string(),
                relevant: e.relevant().iter().map(|v| v.to_string()).collect(),
                affected: Some(e.affected().to_string()),
                code: Some(e.code().to_string()),
                builtin: e.builtin().map(|b| b.to_string()),
                dump: dump(e.effect().procedure().expression()),
            })
            .collect();

        Self {
            name: action.name().to_string(),
            parameters: action.parameters().to_vec(),
            applicability,
            effects,
        }
    }
}

fn write_function(out: &mut String, signature: &str, comment: &str, code: &str) -> std::fmt::Result {
    writeln!(out, "// {}", comment)?;
    writeln!(out, "{} {{", signature)?;
    writeln!(out, "    {}", code)?;
    writeln!(out, "}}\n")
}

/// One function per procedure that needs generated code.
pub fn procedures_code(actions: &[Action]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let arguments = format!(
        "const std::vector<ObjectIdx>& {}, const std::vector<ObjectIdx>& {}, const State& {}, const StaticData& {}",
        BINDING, RELEVANT, STATE, STATIC
    );
    for action in actions {
        for (i, p) in action.applicability_procedures().iter().enumerate() {
            if let Some(g) = p.generic() {
                let signature = format!("bool {}_app_{}({})", action.name(), i, arguments);
                write_function(&mut out, &signature, p.description(), g.code())?;
            }
        }
        for (i, e) in action.effect_procedures().iter().enumerate() {
            let signature = format!(
                "{} {}_eff_{}({}, const VariableIdx {})",
                ATOM,
                action.name(),
                i,
                arguments,
                AFFECTED
            );
            write_function(&mut out, &signature, e.description(), e.code())?;
        }
    }
    Ok(out)
}

/// Writes the compiled actions and their generated code in `dir`.
pub fn write_output(dir: &Path, problem: &ProblemInstance, actions: &[Action]) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("could not create {}", dir.display()))?;

    let records: Vec<ActionRecord> = actions
        .iter()
        .map(|a| ActionRecord::new(a, problem))
        .collect();
    let path = dir.join(ACTIONS_FILE);
    fs::write(&path, serde_json::to_string_pretty(&records)?)
        .with_context(|| format!("could not write {}", path.display()))?;

    let path = dir.join(PROCEDURES_FILE);
    fs::write(&path, procedures_code(actions)?)
        .with_context(|| format!("could not write {}", path.display()))?;
    Ok(())
}
