//! Dispatches resolved work units and collects exactly one outcome per unit.
//!
//! Sequential mode walks units in discovery order and, with fail-fast enabled,
//! stops at the first failure. Parallel mode runs every unit on a pool of at
//! most `max_workers` threads and never stops early; outcomes arrive in
//! completion order.

use std::panic::{self, AssertUnwindSafe};

use crate::cli::Output;
use crate::config::{ExecutionMode, RunConfiguration};
use crate::executor::{ExecutionOutcome, UnitRunner};
use crate::parallel::{ExecutionStrategy, ParallelExecutor, SequentialExecutor};
use crate::units::WorkUnit;

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub outcomes: Vec<ExecutionOutcome>,
    /// Unit that triggered a fail-fast abort
    pub aborted_on: Option<String>,
}

impl RunOutcome {
    pub fn successful(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.successful()
    }

    pub fn aborted(&self) -> bool {
        self.aborted_on.is_some()
    }
}

pub struct Orchestrator<'a, R: UnitRunner> {
    runner: &'a R,
    config: &'a RunConfiguration,
    output: &'a Output,
}

impl<'a, R: UnitRunner> Orchestrator<'a, R> {
    pub fn new(runner: &'a R, config: &'a RunConfiguration, output: &'a Output) -> Self {
        Self {
            runner,
            config,
            output,
        }
    }

    pub fn strategy(&self, unit_count: usize) -> ExecutionStrategy {
        match self.config.mode() {
            ExecutionMode::Sequential => ExecutionStrategy::Sequential,
            ExecutionMode::Parallel => {
                ExecutionStrategy::parallel(unit_count, self.config.max_workers())
            }
        }
    }

    pub fn run(&self, units: &[WorkUnit]) -> RunOutcome {
        match self.strategy(units.len()) {
            ExecutionStrategy::Sequential => self.run_sequential(units),
            ExecutionStrategy::Parallel { workers } => self.run_parallel(units, workers),
        }
    }

    fn run_sequential(&self, units: &[WorkUnit]) -> RunOutcome {
        self.output.info(&format!(
            "Starting sequential processing of {} folders...",
            units.len()
        ));

        let fail_fast = self.config.fail_fast();
        let outcomes = SequentialExecutor::execute(
            units,
            |unit, _| self.run_isolated(unit),
            |outcome| fail_fast && outcome.failed(),
        );

        let mut run = RunOutcome {
            outcomes,
            aborted_on: None,
        };

        if fail_fast && let Some(last) = run.outcomes.last().filter(|o| o.failed()) {
            run.aborted_on = Some(last.unit_name.clone());
            return run;
        }

        self.output.info(&format!(
            "Sequential processing completed: {} successful, {} failed",
            run.successful(),
            run.failed()
        ));
        run
    }

    fn run_parallel(&self, units: &[WorkUnit], workers: usize) -> RunOutcome {
        self.output.info(&format!(
            "Starting parallel processing of {} folders ({} workers)...",
            units.len(),
            workers
        ));

        let executor = ParallelExecutor::new(workers);
        let collected = executor.execute(
            units,
            |unit, worker_id| {
                tracing::debug!("worker-{} picked up {}", worker_id, unit.display_name());
                self.run_isolated(unit)
            },
            |outcome, current, total| {
                if outcome.succeeded {
                    self.output.success(&format!(
                        "Parallel processing completed: {}",
                        outcome.unit_name
                    ));
                } else {
                    self.output
                        .error(&format!("Parallel processing failed: {}", outcome.unit_name));
                }
                self.output.progress_indicator(current, total, "Progress");
            },
        );

        let outcomes = match collected {
            Ok(outcomes) => outcomes,
            Err(e) => {
                // Worker results are lost with the pool; record every unit as failed
                self.output
                    .error(&format!("Exception in parallel processing: {}", e));
                units
                    .iter()
                    .map(|unit| ExecutionOutcome::failure(unit.display_name(), 0.0, e.to_string()))
                    .collect()
            }
        };

        RunOutcome {
            outcomes,
            aborted_on: None,
        }
    }

    /// A panicking runner still yields a failure outcome for its unit
    fn run_isolated(&self, unit: &WorkUnit) -> ExecutionOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| self.runner.run(unit))).unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            let detail = format!("Exception in processing for {}: {}", unit.display_name(), message);
            self.output.error(&detail);
            ExecutionOutcome::failure(unit.display_name(), 0.0, detail)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    /// Fails every unit whose name is listed; records what was attempted
    #[derive(Default)]
    struct StubRunner {
        failing: Vec<&'static str>,
        panicking: Vec<&'static str>,
        attempted: Mutex<Vec<String>>,
    }

    impl StubRunner {
        fn failing(names: &[&'static str]) -> Self {
            Self {
                failing: names.to_vec(),
                ..Self::default()
            }
        }

        fn attempted(&self) -> Vec<String> {
            self.attempted.lock().unwrap().clone()
        }
    }

    impl UnitRunner for StubRunner {
        fn run(&self, unit: &WorkUnit) -> ExecutionOutcome {
            let name = unit.display_name();
            self.attempted.lock().unwrap().push(name.to_string());
            if self.panicking.iter().any(|n| *n == name) {
                panic!("engine crashed");
            }
            // Vary completion order in parallel runs
            thread::sleep(Duration::from_millis((name.len() as u64 % 3) * 5));
            if self.failing.iter().any(|n| *n == name) {
                ExecutionOutcome::failure(name, 0.1, "Command failed with return code 1")
            } else {
                ExecutionOutcome::success(name, 0.1)
            }
        }
    }

    fn units(names: &[&str]) -> Vec<WorkUnit> {
        names.iter().map(|n| WorkUnit::new(format!("data/{n}"))).collect()
    }

    fn quiet() -> Output {
        Output::new(false, true)
    }

    #[test]
    fn test_sequential_fail_fast_stops_after_first_failure() {
        let runner = StubRunner::failing(&["A"]);
        let config = RunConfiguration::builder().build().unwrap();
        let output = quiet();

        let run = Orchestrator::new(&runner, &config, &output).run(&units(&["A", "B"]));

        assert_eq!(run.outcomes.len(), 1);
        assert!(!run.outcomes[0].succeeded);
        assert_eq!(run.aborted_on.as_deref(), Some("A"));
        assert_eq!(runner.attempted(), vec!["A"]);
    }

    #[test]
    fn test_sequential_continue_on_error_runs_everything() {
        let runner = StubRunner::failing(&["A"]);
        let config = RunConfiguration::builder().continue_on_error(true).build().unwrap();
        let output = quiet();

        let run = Orchestrator::new(&runner, &config, &output).run(&units(&["A", "B"]));

        assert!(!run.aborted());
        assert_eq!(run.outcomes.len(), 2);
        assert_eq!(run.outcomes[0].unit_name, "A");
        assert!(!run.outcomes[0].succeeded);
        assert_eq!(run.outcomes[1].unit_name, "B");
        assert!(run.outcomes[1].succeeded);
        assert_eq!((run.successful(), run.failed()), (1, 1));
    }

    #[test]
    fn test_sequential_success_preserves_order() {
        let runner = StubRunner::default();
        let config = RunConfiguration::builder().build().unwrap();
        let output = quiet();

        let run = Orchestrator::new(&runner, &config, &output).run(&units(&["c", "a", "b"]));

        let names: Vec<&str> = run.outcomes.iter().map(|o| o.unit_name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
        assert!(!run.aborted());
    }

    #[test]
    fn test_parallel_runs_all_units_despite_failure() {
        let runner = StubRunner::failing(&["unit3"]);
        // Fail-fast is on by default but does not apply in parallel mode
        let config = RunConfiguration::builder().parallel(true).build().unwrap();
        let output = quiet();
        let work = units(&["unit1", "unit2", "unit3", "unit4", "unit5"]);

        let run = Orchestrator::new(&runner, &config, &output).run(&work);

        assert_eq!(run.outcomes.len(), 5);
        assert_eq!(run.failed(), 1);
        assert_eq!(run.successful(), 4);
        assert!(!run.aborted());

        let mut names: Vec<String> = run.outcomes.iter().map(|o| o.unit_name.clone()).collect();
        names.sort();
        assert_eq!(names, vec!["unit1", "unit2", "unit3", "unit4", "unit5"]);
    }

    #[test]
    fn test_parallel_pool_is_capped() {
        let runner = StubRunner::default();
        let config = RunConfiguration::builder().parallel(true).build().unwrap();
        let output = quiet();
        let orchestrator = Orchestrator::new(&runner, &config, &output);

        assert_eq!(orchestrator.strategy(10), ExecutionStrategy::Parallel { workers: 4 });
        assert_eq!(orchestrator.strategy(3), ExecutionStrategy::Parallel { workers: 3 });
    }

    #[test]
    fn test_panicking_runner_is_isolated() {
        let runner = StubRunner {
            panicking: vec!["boom"],
            ..StubRunner::default()
        };
        let config = RunConfiguration::builder().parallel(true).build().unwrap();
        let output = quiet();

        let run = Orchestrator::new(&runner, &config, &output).run(&units(&["ok1", "boom", "ok2"]));

        assert_eq!(run.outcomes.len(), 3);
        let boom = run.outcomes.iter().find(|o| o.unit_name == "boom").unwrap();
        assert!(!boom.succeeded);
        assert!(boom.error_detail.as_deref().unwrap().contains("engine crashed"));
    }
}
