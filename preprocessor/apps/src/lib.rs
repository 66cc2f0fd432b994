use log::error;
use p3r_core::compilation::formula::ActionSchema;
use p3r_core::model::action::Action;
use p3r_core::model::instance::ProblemInstance;
use std::sync::Arc;
use tokio::task::JoinSet;

pub mod config;
pub mod logger;
pub mod output;

/// Compiles the actions on at most `jobs` blocking threads.
/// Actions are returned in declaration order, the first failure aborts the run.
pub async fn compile_parallel(
    problem: Arc<ProblemInstance>,
    schemas: Vec<ActionSchema>,
    jobs: usize,
) -> anyhow::Result<Vec<Action>> {
    run_parallel(schemas, jobs, move |schema: ActionSchema| {
        p3r_core::compile_action(&problem, &schema)
    })
    .await
}

/// Applies `f` to every item, keeping at most `jobs` calls in flight.
/// No call is started once a failure has been joined.
async fn run_parallel<T, R, F>(items: Vec<T>, jobs: usize, f: F) -> anyhow::Result<Vec<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> p3r_core::Result<R> + Send + Sync + 'static,
{
    let jobs = jobs.max(1);
    let f = Arc::new(f);
    let mut results: Vec<Option<R>> = items.iter().map(|_| None).collect();
    let mut pending = items.into_iter().enumerate();
    let mut running = JoinSet::new();

    loop {
        while running.len() < jobs {
            match pending.next() {
                Some((i, item)) => {
                    let f = f.clone();
                    running.spawn_blocking(move || (i, f(item)));
                }
                None => break,
            }
        }
        let (i, result) = match running.join_next().await {
            Some(joined) => joined?,
            None => break,
        };
        match result {
            Ok(r) => results[i] = Some(r),
            Err(e) => {
                running.abort_all();
                error!(
                    "aborting compilation: {} running, {} not started",
                    running.len(),
                    pending.len()
                );
                return Err(e.into());
            }
        }
    }
    Ok(results.into_iter().flatten().collect())
}
