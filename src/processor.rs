//! Processor - the periodic driver that turns pending sign-ups into deliveries.
//!
//! Each cycle loads both stores, takes the first `batch_size` pending sign-ups
//! in file order, and runs classify → generate → notify for each. Successful
//! records are marked contacted and their solution delivered; anything that
//! fails stays pending for the next cycle. Both stores are rewritten in full
//! at the end of the cycle.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::classifier::classify_signup;
use crate::domain::{SignupRecord, SignupStatus, SolutionRecord};
use crate::error::{DeliveryError, Result};
use crate::generator::SolutionGenerator;
use crate::notify::QueueProducer;
use crate::storage::{RecordStore, SignupFileStore, SolutionFileStore};

/// Configuration for the processor
#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    pub signups_path: PathBuf,
    pub solutions_path: PathBuf,
    /// Maximum sign-ups handled per cycle
    pub batch_size: usize,
    /// Interval between cycles
    pub interval: Duration,
}

impl ProcessorOptions {
    pub fn new(signups_path: impl Into<PathBuf>, solutions_path: impl Into<PathBuf>) -> Self {
        Self {
            signups_path: signups_path.into(),
            solutions_path: solutions_path.into(),
            batch_size: 3,
            interval: Duration::from_secs(300),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// What a cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Pending sign-ups picked for this cycle
    pub selected: usize,
    pub delivered: usize,
    pub failed: usize,
    /// True when the cycle did not run because another one was in flight
    pub skipped: bool,
}

impl CycleReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Holds the in-flight flag; dropping it releases the flag.
struct CycleGuard<'a>(&'a AtomicBool);

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Processor<G: SolutionGenerator> {
    options: ProcessorOptions,
    generator: G,
    producer: QueueProducer,
    in_flight: AtomicBool,
}

impl<G: SolutionGenerator> Processor<G> {
    pub fn new(options: ProcessorOptions, generator: G, producer: QueueProducer) -> Self {
        Self {
            options,
            generator,
            producer,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    fn begin_cycle(&self) -> Option<CycleGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard(&self.in_flight))
    }

    /// Run one full cycle against the configured store files.
    ///
    /// Returns a skipped report if another cycle is still running.
    pub fn run_cycle(&self) -> Result<CycleReport> {
        let Some(_guard) = self.begin_cycle() else {
            log::warn!("Previous cycle still running, skipping");
            return Ok(CycleReport::skipped());
        };

        let mut signups = SignupFileStore::open(&self.options.signups_path);
        let mut solutions = SolutionFileStore::open(&self.options.solutions_path);

        // Leave both files alone until someone repairs the unreadable one
        for (unreadable, path) in [
            (signups.is_unreadable(), signups.path()),
            (solutions.is_unreadable(), solutions.path()),
        ] {
            if unreadable {
                return Err(DeliveryError::Storage(format!(
                    "{} could not be read; cycle skipped and no store rewritten",
                    path.display()
                )));
            }
        }

        let report = self.process_batch(&mut signups, &mut solutions);

        solutions.flush()?;
        signups.flush()?;

        tracing::info!(
            selected = report.selected,
            delivered = report.delivered,
            failed = report.failed,
            "Cycle complete"
        );
        Ok(report)
    }

    /// Process up to `batch_size` pending sign-ups from `signups`.
    ///
    /// Mutations go to the stores in memory; the caller flushes.
    pub fn process_batch<S, T>(&self, signups: &mut S, solutions: &mut T) -> CycleReport
    where
        S: RecordStore<SignupRecord>,
        T: RecordStore<SolutionRecord>,
    {
        let pending: Vec<SignupRecord> = signups
            .list_by_status(SignupStatus::Pending)
            .into_iter()
            .take(self.options.batch_size)
            .collect();

        let mut report = CycleReport {
            selected: pending.len(),
            ..CycleReport::default()
        };
        tracing::info!(pending = pending.len(), "Processing cycle started");

        for mut signup in pending {
            match self.deliver(&signup) {
                Ok(solution) => {
                    solutions.upsert(solution);
                    signup.mark_contacted();
                    log::info!("Completed: {}", signup.name);
                    signups.upsert(signup);
                    report.delivered += 1;
                }
                Err(e) => {
                    log::error!("Failed processing {}: {}", signup.email, e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    fn deliver(&self, signup: &SignupRecord) -> Result<SolutionRecord> {
        let judgment = classify_signup(signup);
        log::debug!(
            "Classified {} as {} (priority {}/5)",
            signup.id,
            judgment.category(),
            judgment.priority()
        );

        let mut solution = self.generator.generate(signup, &judgment)?;

        if let Err(e) = self.producer.notify_delivery(signup, &solution, &judgment) {
            log::warn!("Failed to queue notification for {}: {}", signup.email, e);
        }

        solution.mark_delivered();
        Ok(solution)
    }
}

impl<G: SolutionGenerator + 'static> Processor<G> {
    /// Run a cycle now and then every `interval` until `shutdown` flips to true.
    ///
    /// Cycles run on the blocking pool. A tick that lands while a cycle is
    /// still running is skipped, and shutdown waits for the in-flight cycle.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        tracing::info!(
            interval_secs = self.options.interval.as_secs(),
            batch_size = self.options.batch_size,
            "Processor started"
        );

        let mut interval = tokio::time::interval(self.options.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: Option<JoinHandle<Result<CycleReport>>> = None;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Some(handle) = in_flight.take() {
                        if handle.is_finished() {
                            log_cycle_outcome(handle.await);
                        } else {
                            tracing::warn!("Previous cycle still running, skipping tick");
                            in_flight = Some(handle);
                            continue;
                        }
                    }
                    let this = Arc::clone(&self);
                    in_flight = Some(tokio::task::spawn_blocking(move || this.run_cycle()));
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        if let Some(handle) = in_flight {
            tracing::info!("Waiting for in-flight cycle to finish");
            log_cycle_outcome(handle.await);
        }

        tracing::info!("Processor stopped");
        Ok(())
    }
}

fn log_cycle_outcome(outcome: std::result::Result<Result<CycleReport>, tokio::task::JoinError>) {
    match outcome {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Cycle failed"),
        Err(e) => tracing::error!(error = %e, "Cycle task panicked"),
    }
}
