use anyhow::Context;
use log::info;
use p3r_apps::config::CompilerConfig;
use p3r_apps::output::write_output;
use p3r_apps::{compile_parallel, logger};
use p3r_core::ProblemDescription;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "p3r",
    about = "Compilation of the actions of a planning problem into procedures"
)]
struct Opt {
    #[structopt(short = "c", long = "config")]
    config: Option<PathBuf>,
    #[structopt(short = "p", long = "problem")]
    problem: Option<PathBuf>,
    #[structopt(short = "o", long = "output")]
    output: Option<PathBuf>,
    #[structopt(short = "j", long = "jobs")]
    jobs: Option<usize>,
    #[structopt(short = "l", long = "log-level")]
    log_level: Option<String>,
    #[structopt(long = "log-dir")]
    log_dir: Option<PathBuf>,
}

impl From<Opt> for CompilerConfig {
    fn from(opt: Opt) -> Self {
        Self {
            problem: opt.problem,
            output_dir: opt.output,
            jobs: opt.jobs,
            log_level: opt.log_level,
            log_dir: opt.log_dir,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt: Opt = Opt::from_args();

    let config = match &opt.config {
        Some(path) => CompilerConfig::read(path)?,
        None => CompilerConfig::default(),
    };
    let config = config.override_with(opt.into());

    if let Some(path) = logger::init(config.log_level()?, config.log_dir.clone())? {
        info!("logging to {}", path.display());
    }

    let problem_path = config.problem()?;
    let (problem, schemas) = ProblemDescription::read(problem_path)
        .and_then(ProblemDescription::into_problem)
        .with_context(|| format!("could not load {}", problem_path.display()))?;
    info!(
        "loaded problem {}: {} objects, {} actions",
        problem.get_complete_name(),
        problem.object_index().len(),
        schemas.len()
    );

    let instant = Instant::now();
    let problem = Arc::new(problem);
    let actions = compile_parallel(problem.clone(), schemas, config.jobs()).await?;
    info!(
        "compiled {} actions in {:.3} ms",
        actions.len(),
        instant.elapsed().as_secs_f64() * 1000.0
    );

    let output_dir = config.output_dir();
    write_output(&output_dir, &problem, &actions)?;
    info!("output written to {}", output_dir.display());
    log::logger().flush();
    Ok(())
}
