//! The resumable per-work harvest loop.
//!
//! Sections of a work run strictly in order. Each one goes through the
//! lifecycle in `harvester_core::update`; the pipeline only carries out the
//! effects the state machine asks for.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info};
use harvester_core::{
    update, AddressError, ContentRecord, PlannedSection, RecordMeta, SectionAddress, SectionEffect,
    SectionMsg, SectionState, WorkPlan, WorkTally,
};
use thiserror::Error;

use crate::extract::{EmptyPolicy, ExtractError};
use crate::fetch::{NullProgressSink, ProgressSink};
use crate::persist::{PersistError, RecordStore};
use crate::retry::{run_with_retry, RetryError, RetryPolicy, Sleeper, TokioSleeper};
use crate::source::Source;
use crate::{HarvestEvent, WorkReport};

#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("{title}: section {section} failed after {attempts} attempt(s): {source}")]
    SectionFailed {
        title: String,
        section: u32,
        attempts: u32,
        source: ExtractError,
    },
    #[error("{title}: section {section} could not be written: {source}")]
    Persist {
        title: String,
        section: u32,
        source: PersistError,
    },
    #[error(transparent)]
    Mapping(#[from] AddressError),
    #[error("{title}: worker stopped unexpectedly: {message}")]
    Worker { title: String, message: String },
}

impl HarvestError {
    /// Title of the work the failure belongs to, when there is one.
    pub fn title(&self) -> Option<&str> {
        match self {
            HarvestError::SectionFailed { title, .. }
            | HarvestError::Persist { title, .. }
            | HarvestError::Worker { title, .. } => Some(title),
            HarvestError::Mapping(_) => None,
        }
    }
}

enum Fetched {
    Record(ContentRecord),
    Empty,
}

pub struct HarvestPipeline {
    store: RecordStore,
    source: Arc<dyn Source>,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    validate_existing: bool,
    sink: Arc<dyn ProgressSink>,
}

impl HarvestPipeline {
    pub fn new(store: RecordStore, source: Arc<dyn Source>) -> Self {
        Self {
            store,
            source,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            validate_existing: true,
            sink: Arc::new(NullProgressSink),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// With validation off, any existing file counts as harvested.
    pub fn validate_existing(mut self, validate: bool) -> Self {
        self.validate_existing = validate;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Harvests every section of `plan` in order. The first section that
    /// cannot be completed aborts the work; later sections are not touched.
    pub async fn harvest_work(&self, plan: &WorkPlan) -> Result<WorkReport, HarvestError> {
        let mut tally = WorkTally::default();
        for planned in &plan.sections {
            match self.harvest_section(plan, planned).await {
                Ok(state) => tally.record(state),
                Err(err) => {
                    engine_error!("work={} failed: {err}", plan.title);
                    self.sink.emit(HarvestEvent::WorkFailed {
                        title: plan.title.clone(),
                        message: err.to_string(),
                    });
                    return Err(err);
                }
            }
        }
        engine_info!(
            "work={} done written={} skipped={} empty={}",
            plan.title,
            tally.written,
            tally.skipped,
            tally.empty
        );
        self.sink.emit(HarvestEvent::WorkFinished {
            title: plan.title.clone(),
            tally,
        });
        Ok(WorkReport {
            title: plan.title.clone(),
            short_code: plan.short_code.clone(),
            tally,
        })
    }

    /// Runs works one after another in order and stops at the first failure.
    pub async fn harvest_all(&self, plans: &[WorkPlan]) -> Result<Vec<WorkReport>, HarvestError> {
        let mut reports = Vec::with_capacity(plans.len());
        for plan in plans {
            reports.push(self.harvest_work(plan).await?);
        }
        Ok(reports)
    }

    async fn harvest_section(
        &self,
        plan: &WorkPlan,
        planned: &PlannedSection,
    ) -> Result<SectionState, HarvestError> {
        let address = &planned.address;
        let harvested = self.store.is_harvested(address, self.validate_existing);
        let (mut state, effects) = update(SectionState::Pending, SectionMsg::Checked { harvested });
        let mut queue: VecDeque<SectionEffect> = effects.into();
        let mut record = None;
        // Set alongside the failure message; the `AbortWork` answer returns it.
        let mut failure = None;

        while let Some(effect) = queue.pop_front() {
            let msg = match effect {
                SectionEffect::Fetch => match self.fetch(plan, planned).await {
                    Ok(Fetched::Record(fetched)) => {
                        record = Some(fetched);
                        SectionMsg::Fetched
                    }
                    Ok(Fetched::Empty) => SectionMsg::FetchedEmpty,
                    Err(RetryError { attempts, last }) => {
                        failure = Some(HarvestError::SectionFailed {
                            title: plan.title.clone(),
                            section: address.section,
                            attempts,
                            source: last,
                        });
                        SectionMsg::FetchExhausted
                    }
                },
                SectionEffect::Persist => {
                    let Some(fetched) = record.as_ref() else {
                        continue;
                    };
                    match self.store.write(address, fetched) {
                        Ok(path) => {
                            self.written(address, path);
                            SectionMsg::Written
                        }
                        Err(source) => {
                            failure = Some(HarvestError::Persist {
                                title: plan.title.clone(),
                                section: address.section,
                                source,
                            });
                            SectionMsg::WriteFailed
                        }
                    }
                }
                SectionEffect::AbortWork => match failure.take() {
                    Some(err) => return Err(err),
                    None => continue,
                },
            };
            let (next, effects) = update(state, msg);
            state = next;
            queue.extend(effects);
        }

        match state {
            SectionState::Skipped => {
                engine_debug!("section={address} skipped, already harvested");
                self.sink.emit(HarvestEvent::SectionSkipped {
                    address: address.clone(),
                });
            }
            SectionState::Empty => {
                engine_info!("section={address} accepted as empty");
                self.sink.emit(HarvestEvent::SectionEmpty {
                    address: address.clone(),
                });
            }
            _ => {}
        }
        Ok(state)
    }

    fn written(&self, address: &SectionAddress, path: PathBuf) {
        engine_info!("section={address} written path={}", path.display());
        self.sink.emit(HarvestEvent::SectionWritten {
            address: address.clone(),
            path,
        });
    }

    async fn fetch(
        &self,
        plan: &WorkPlan,
        planned: &PlannedSection,
    ) -> Result<Fetched, RetryError<ExtractError>> {
        let source = self.source.as_ref();
        let sink = self.sink.as_ref();
        let address = &planned.address;
        let label = format!("{} {}", plan.title, address.section);

        run_with_retry(&self.retry, self.sleeper.as_ref(), &label, |attempt| async move {
            let result = source
                .extract(&planned.locator)
                .await
                .and_then(|extraction| {
                    if extraction.is_empty() {
                        return match source.empty_policy() {
                            EmptyPolicy::Accept => Ok(Fetched::Empty),
                            EmptyPolicy::Retry => Err(ExtractError::Empty),
                        };
                    }
                    let meta = RecordMeta {
                        title: plan.title.clone(),
                        abbrev: plan.short_code.clone(),
                    };
                    Ok(Fetched::Record(ContentRecord::new(
                        meta,
                        address.section,
                        extraction,
                    )?))
                });
            if let Err(err) = &result {
                sink.emit(HarvestEvent::AttemptFailed {
                    address: address.clone(),
                    attempt,
                    message: err.to_string(),
                });
            }
            result
        })
        .await
    }
}
