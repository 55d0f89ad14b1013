use std::sync::Arc;

use engine_logging::{engine_debug, engine_error};
use harvester_core::WorkPlan;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::pipeline::{HarvestError, HarvestPipeline};
use crate::WorkReport;

/// One work to harvest with the pipeline of the version it belongs to.
pub struct WorkJob {
    pub pipeline: Arc<HarvestPipeline>,
    pub plan: WorkPlan,
}

pub type WorkOutcome = Result<WorkReport, HarvestError>;

/// Runs works concurrently, never more than `size` at a time. Each work
/// runs its own sections in order; a failed work does not stop the others.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub const DEFAULT_SIZE: usize = 5;

    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Outcomes come back in the order the jobs were given.
    pub async fn run(&self, jobs: Vec<WorkJob>) -> Vec<WorkOutcome> {
        let titles: Vec<String> = jobs.iter().map(|job| job.plan.title.clone()).collect();
        let mut tasks = JoinSet::new();

        for (index, job) in jobs.into_iter().enumerate() {
            let semaphore = Arc::clone(&self.semaphore);
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(err) => {
                        return (
                            index,
                            Err(HarvestError::Worker {
                                title: job.plan.title.clone(),
                                message: err.to_string(),
                            }),
                        )
                    }
                };
                engine_debug!("work={} started", job.plan.title);
                (index, job.pipeline.harvest_work(&job.plan).await)
            });
        }

        let mut outcomes: Vec<Option<WorkOutcome>> = titles.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(err) => engine_error!("worker task ended abnormally: {err}"),
            }
        }

        outcomes
            .into_iter()
            .zip(titles)
            .map(|(outcome, title)| {
                outcome.unwrap_or_else(|| {
                    Err(HarvestError::Worker {
                        title,
                        message: "task panicked or was cancelled".to_string(),
                    })
                })
            })
            .collect()
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIZE)
    }
}
