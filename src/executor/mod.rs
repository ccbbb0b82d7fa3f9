//! Scenario runner
//!
//! Runs `vus` virtual users, one tokio task each, for the configured
//! duration. Each VU loops: issue one GET, then pause for the think-time.
//! No new request is dispatched once the deadline has passed, and think-time
//! pauses are cut short at the deadline. Requests still in flight at
//! `deadline + graceful_stop` are abandoned and not recorded.
//!
//! Every VU buffers its own outcomes; the buffers are merged through the
//! join handles when the run ends. The only shared mutable state is the
//! atomic progress counters.

pub mod progress;

pub use progress::{ProgressSnapshot, RunProgress};

use crate::{
    client::HttpClient,
    error::Result,
    logging::{LogLevel, RunLogger},
    models::{RequestOutcome, RunConfig},
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, sleep_until, Instant};
use url::Url;

/// How often progress is logged in verbose mode
const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// Everything the VUs produced, merged after all of them stopped
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub outcomes: Vec<RequestOutcome>,
    /// Completed request-plus-pause cycles
    pub iterations: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// Stopped through the shutdown handle before the deadline
    pub interrupted: bool,
    pub peak_vus: u32,
    /// Requests dropped because they outlived the graceful stop period
    pub abandoned_requests: u64,
}

/// Stops a running scenario from outside, e.g. on Ctrl-C
#[derive(Debug, Clone)]
pub struct ShutdownHandle(Arc<watch::Sender<bool>>);

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.0.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.0.borrow()
    }
}

/// Per-VU view of the run
#[derive(Clone)]
struct VuContext {
    client: Arc<dyn HttpClient>,
    target: Arc<Url>,
    think_time: Duration,
    deadline: Instant,
    hard_stop: Instant,
    shutdown: Arc<watch::Sender<bool>>,
    progress: Arc<RunProgress>,
    logger: Arc<RunLogger>,
}

#[derive(Debug, Default)]
struct VuResult {
    outcomes: Vec<RequestOutcome>,
    iterations: u64,
    abandoned: u64,
}

/// Drives a constant number of virtual users against one URL
pub struct ScenarioRunner {
    config: Arc<RunConfig>,
    client: Arc<dyn HttpClient>,
    target: Arc<Url>,
    logger: Arc<RunLogger>,
    progress: Arc<RunProgress>,
    shutdown: Arc<watch::Sender<bool>>,
}

impl ScenarioRunner {
    /// Validate the configuration and prepare a runner
    pub fn new(config: Arc<RunConfig>, client: Arc<dyn HttpClient>) -> Result<Self> {
        config.validate()?;
        let target = Arc::new(config.target()?);
        let (shutdown, _) = watch::channel(false);

        Ok(Self {
            logger: Arc::new(RunLogger::new(&config)),
            config,
            client,
            target,
            progress: Arc::new(RunProgress::new()),
            shutdown: Arc::new(shutdown),
        })
    }

    pub fn with_logger(mut self, logger: RunLogger) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    pub fn progress(&self) -> Arc<RunProgress> {
        Arc::clone(&self.progress)
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run all VUs to completion and collect their outcomes
    pub async fn run(&self) -> Result<ScenarioResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let deadline = start + self.config.duration;

        self.logger.log_run_start(&self.config).await;

        let context = VuContext {
            client: Arc::clone(&self.client),
            target: Arc::clone(&self.target),
            think_time: self.config.think_time,
            deadline,
            hard_stop: deadline + self.config.graceful_stop,
            shutdown: Arc::clone(&self.shutdown),
            progress: Arc::clone(&self.progress),
            logger: Arc::clone(&self.logger),
        };

        let handles: Vec<_> = (0..self.config.vus)
            .map(|vu| tokio::spawn(run_vu(vu, context.clone())))
            .collect();

        let reporter = self.logger.would_log(LogLevel::Info).then(|| {
            tokio::spawn(report_progress(Arc::clone(&self.progress), Arc::clone(&self.logger)))
        });

        let results = join_all(handles).await;

        if let Some(reporter) = reporter {
            reporter.abort();
        }

        let mut outcomes = Vec::new();
        let mut iterations = 0;
        let mut abandoned_requests = 0;
        for result in results {
            let vu = result?;
            outcomes.extend(vu.outcomes);
            iterations += vu.iterations;
            abandoned_requests += vu.abandoned;
        }

        let interrupted = *self.shutdown.borrow();
        if interrupted {
            self.logger.log_shutdown_requested().await;
        }

        Ok(ScenarioResult {
            outcomes,
            iterations,
            started_at,
            finished_at: Utc::now(),
            elapsed: start.elapsed(),
            interrupted,
            peak_vus: self.progress.peak_vus(),
            abandoned_requests,
        })
    }
}

/// One virtual user's request loop
async fn run_vu(vu: u32, ctx: VuContext) -> VuResult {
    ctx.progress.vu_started();
    let mut shutdown = ctx.shutdown.subscribe();
    let mut result = VuResult::default();

    loop {
        if *shutdown.borrow() || Instant::now() >= ctx.deadline {
            break;
        }

        let outcome = tokio::select! {
            outcome = ctx.client.get(vu, &ctx.target) => outcome,
            _ = sleep_until(ctx.hard_stop) => {
                result.abandoned += 1;
                break;
            }
            _ = shutdown.changed() => {
                result.abandoned += 1;
                break;
            }
        };

        ctx.progress.record_request(outcome.is_successful());
        ctx.logger.log_outcome(&outcome).await;
        result.outcomes.push(outcome);

        let wake = (Instant::now() + ctx.think_time).min(ctx.deadline);
        tokio::select! {
            _ = sleep_until(wake) => {
                result.iterations += 1;
                ctx.progress.record_iteration();
            }
            _ = shutdown.changed() => break,
        }
    }

    ctx.progress.vu_finished();
    result
}

async fn report_progress(progress: Arc<RunProgress>, logger: Arc<RunLogger>) {
    let mut ticker = interval_at(Instant::now() + PROGRESS_INTERVAL, PROGRESS_INTERVAL);
    loop {
        ticker.tick().await;
        logger.log_progress(&progress.snapshot()).await;
    }
}
