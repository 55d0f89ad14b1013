#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use harvester_core::{
    CatalogEntry, Extraction, SectionLocator, ShortCodeTable, SubUnits, WorkMapping, WorkPlan,
};
use harvester_engine::{EmptyPolicy, ExtractError, HarvestEvent, ProgressSink, Sleeper, Source};

pub fn verses(section: u32) -> Extraction {
    let content: SubUnits = [
        ("1".to_string(), format!("Capítulo {section}, primeiro versículo")),
        ("2".to_string(), format!("Capítulo {section}, segundo versículo")),
    ]
    .into_iter()
    .collect();
    Extraction::new(content)
}

/// Answers each section from a script; once a section's script runs out it
/// returns two verses.
pub struct ScriptedSource {
    scripts: Mutex<HashMap<(String, u32), VecDeque<Result<Extraction, ExtractError>>>>,
    calls: Mutex<Vec<(String, u32)>>,
    policy: EmptyPolicy,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            policy: EmptyPolicy::Retry,
            delay: None,
        }
    }

    pub fn accepting_empty(mut self) -> Self {
        self.policy = EmptyPolicy::Accept;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn script(
        self,
        work: &str,
        section: u32,
        responses: Vec<Result<Extraction, ExtractError>>,
    ) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert((work.to_string(), section), responses.into());
        self
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sections_called(&self, work: &str) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter(|(w, _)| w == work)
            .map(|(_, s)| s)
            .collect()
    }
}

#[async_trait]
impl Source for ScriptedSource {
    async fn extract(&self, locator: &SectionLocator) -> Result<Extraction, ExtractError> {
        let key = (locator.work_id.clone(), locator.section);
        self.calls.lock().unwrap().push(key.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| Ok(verses(locator.section)))
    }

    fn empty_policy(&self) -> EmptyPolicy {
        self.policy
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<HarvestEvent>>,
}

impl CollectingSink {
    pub fn events(&self) -> Vec<HarvestEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for CollectingSink {
    fn emit(&self, event: HarvestEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub fn plan(version: &str, title: &str, slug: &str, short_code: &str, sections: u32) -> WorkPlan {
    let table: ShortCodeTable = [(slug, short_code)].into_iter().collect();
    let entry = CatalogEntry::new(title, slug, sections);
    let mut plans = WorkMapping::new(table)
        .plan(version, version, &entry)
        .unwrap();
    plans.remove(0)
}

pub fn genesis(sections: u32) -> WorkPlan {
    plan("acf", "Gênesis", "genesis", "gn", sections)
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
