//! The three subcommands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use engine_logging::{engine_error, engine_info, engine_warn};
use harvester_core::{report, AddressScheme, Catalog, ReportViewModel, WorkTally};
use harvester_engine::{
    ensure_output_dir, fetch_catalog, scan, AtomicFileWriter, ChannelProgressSink, FetchSettings,
    HarvestError, HarvestEvent, HarvestPipeline, HttpSource, ProgressSink, RecordStore,
    ReqwestFetcher, WorkJob, WorkReport, WorkerPool,
};
use tokio::sync::mpsc;

use crate::cli::{CatalogArgs, HarvestArgs, VerifyArgs};
use crate::config::{load_catalog_file, AppConfig, CatalogSource, VersionConfig};

/// How a harvest run ended, work by work.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub completed: Vec<WorkReport>,
    pub failed: Vec<HarvestError>,
    pub attempts_failed: usize,
}

impl RunSummary {
    pub fn totals(&self) -> WorkTally {
        self.completed
            .iter()
            .fold(WorkTally::default(), |mut total, work| {
                total.written += work.tally.written;
                total.skipped += work.tally.skipped;
                total.empty += work.tally.empty;
                total
            })
    }

    pub fn print(&self) {
        let totals = self.totals();
        println!(
            "{} work(s) ok, {} failed; sections written {}, skipped {}, empty {}; {} failed attempt(s)",
            self.completed.len(),
            self.failed.len(),
            totals.written,
            totals.skipped,
            totals.empty,
            self.attempts_failed
        );
        for failure in &self.failed {
            println!("  FAILED {failure}");
        }
    }
}

async fn load_catalog(config: &AppConfig) -> anyhow::Result<Catalog> {
    match &config.catalog {
        CatalogSource::Inline(entries) => Ok(Catalog::new(entries.clone())),
        CatalogSource::File(path) => load_catalog_file(path),
        CatalogSource::Api(url) => {
            let fetcher = ReqwestFetcher::new(config.http.fetch_settings(None));
            fetch_catalog(&fetcher, url)
                .await
                .with_context(|| format!("fetching catalog from {url}"))
        }
    }
}

fn build_pipeline(
    config: &AppConfig,
    version: &VersionConfig,
    root: &Path,
    sink: Arc<dyn ProgressSink>,
) -> anyhow::Result<HarvestPipeline> {
    let settings: FetchSettings = config.http.fetch_settings(version.user_agent.as_ref());
    let extractor = version
        .source
        .extractor()
        .with_context(|| format!("version {}: building extractor", version.code))?;
    let source = HttpSource::new(
        version.endpoint.clone(),
        Arc::new(ReqwestFetcher::new(settings)),
        extractor,
    )
    .with_empty_policy(version.empty_policy);

    Ok(
        HarvestPipeline::new(RecordStore::new(AddressScheme::new(root)), Arc::new(source))
            .with_retry(version.retry)
            .validate_existing(version.validate_existing)
            .with_sink(sink),
    )
}

/// Reports progress on the terminal and counts failed attempts. Ends when
/// every pipeline holding the sender is gone.
fn spawn_reporter(mut events: mpsc::UnboundedReceiver<HarvestEvent>) -> tokio::task::JoinHandle<usize> {
    tokio::spawn(async move {
        let mut attempts_failed = 0;
        while let Some(event) = events.recv().await {
            match event {
                HarvestEvent::AttemptFailed { .. } => attempts_failed += 1,
                HarvestEvent::WorkFinished { title, tally } => println!(
                    "{title}: {} written, {} skipped, {} empty",
                    tally.written, tally.skipped, tally.empty
                ),
                HarvestEvent::WorkFailed { title, message } => {
                    println!("{title}: FAILED ({message})")
                }
                _ => {}
            }
        }
        attempts_failed
    })
}

pub async fn harvest(config: &AppConfig, args: &HarvestArgs) -> anyhow::Result<RunSummary> {
    let root = args.root.as_deref().unwrap_or(&config.output_root);
    ensure_output_dir(root).with_context(|| format!("preparing output root {}", root.display()))?;
    let catalog = load_catalog(config).await?;
    let versions = config.select_versions(&args.versions)?;
    engine_info!(
        "harvest root={} works={} versions={}",
        root.display(),
        catalog.len(),
        versions.len()
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let reporter = spawn_reporter(rx);
    let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink::new(tx));

    // Mapping errors are configuration defects: surface them before any
    // request goes out.
    let mut jobs = Vec::new();
    for version in &versions {
        let pipeline = Arc::new(build_pipeline(config, version, root, sink.clone())?);
        let plans = version
            .plans(&catalog, &config.short_codes)
            .with_context(|| format!("version {}: mapping catalog", version.code))?;
        jobs.extend(plans.into_iter().map(|plan| WorkJob {
            pipeline: pipeline.clone(),
            plan,
        }));
    }
    drop(sink);

    let mut summary = RunSummary::default();
    if args.sequential {
        // Works run in order and the first failure ends the run.
        for job in jobs {
            match job.pipeline.harvest_work(&job.plan).await {
                Ok(report) => summary.completed.push(report),
                Err(err) => {
                    summary.failed.push(err);
                    break;
                }
            }
        }
    } else {
        let pool = WorkerPool::new(args.concurrency.unwrap_or(config.concurrency));
        engine_info!("running {} work(s) on {} worker(s)", jobs.len(), pool.size());
        for outcome in pool.run(jobs).await {
            match outcome {
                Ok(report) => summary.completed.push(report),
                Err(err) => summary.failed.push(err),
            }
        }
    }

    summary.attempts_failed = reporter.await.context("progress reporter stopped")?;
    for failure in &summary.failed {
        engine_error!("{failure}");
    }
    Ok(summary)
}

pub fn verify(config: &AppConfig, args: &VerifyArgs) -> anyhow::Result<String> {
    let root = args.root.as_deref().unwrap_or(&config.output_root);
    let outcome = scan(root)?;
    for unreadable in &outcome.unreadable {
        engine_warn!("skipped {}: {}", unreadable.path.display(), unreadable.reason);
    }
    if outcome.counts.is_empty() {
        bail!("no records found under {}", root.display());
    }
    let divergence = report(&outcome.counts, args.reference.as_deref());
    let view = ReportViewModel::from_report(&divergence, args.divergent_only);
    engine_info!(
        "verify versions={} rows={} divergent={}",
        view.columns.len(),
        divergence.entries.len(),
        view.divergent_rows
    );
    Ok(view.render())
}

pub async fn catalog(config: &AppConfig, args: &CatalogArgs) -> anyhow::Result<usize> {
    let url = match (&args.url, &config.catalog) {
        (Some(url), _) => url.clone(),
        (None, CatalogSource::Api(url)) => url.clone(),
        (None, _) => bail!("no catalog API URL: pass --url or configure catalog: Api(..)"),
    };
    let fetcher = ReqwestFetcher::new(config.http.fetch_settings(None));
    let catalog = fetch_catalog(&fetcher, &url)
        .await
        .with_context(|| format!("fetching catalog from {url}"))?;

    let content = ron::ser::to_string_pretty(&catalog, ron::ser::PrettyConfig::new())
        .context("serializing catalog")?;
    let dir = match args.output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    let filename = args
        .output
        .file_name()
        .context("catalog output needs a file name")?
        .to_string_lossy();
    let path = AtomicFileWriter::new(dir).write(&filename, &content)?;
    engine_info!("catalog saved path={} works={}", path.display(), catalog.len());
    Ok(catalog.len())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use tempfile::TempDir;

    fn config() -> AppConfig {
        ron::from_str(include_str!("../../../config/harvester.example.ron")).unwrap()
    }

    fn write(root: &Path, version: &str, section: u32, verses: &[&str]) {
        let dir = root.join(version).join("gn");
        fs::create_dir_all(&dir).unwrap();
        let content = verses
            .iter()
            .enumerate()
            .map(|(i, text)| format!("\"{}\":\"{text}\"", i + 1))
            .collect::<Vec<_>>()
            .join(",");
        fs::write(
            dir.join(format!("{section}.json")),
            format!(r#"{{"meta":{{"title":"Gênesis","abbrev":"gn"}},"chapter":{section},"content":{{{content}}}}}"#),
        )
        .unwrap();
    }

    #[test]
    fn verify_renders_upper_cased_versions_and_flags() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "acf", 1, &["a", "b", "c"]);
        write(temp.path(), "nvi", 1, &["a", "b"]);
        write(temp.path(), "acf", 2, &["a"]);

        let args = VerifyArgs {
            root: Some(temp.path().to_path_buf()),
            reference: None,
            divergent_only: false,
        };
        let table = verify(&config(), &args).unwrap();
        assert!(table.contains("ACF"));
        assert!(table.contains("NVI"));
        assert!(table.contains("N/A"));
        assert!(table.contains("2 verses (!)"));
    }

    #[test]
    fn verify_without_records_is_an_error() {
        let temp = TempDir::new().unwrap();
        let args = VerifyArgs {
            root: Some(temp.path().to_path_buf()),
            reference: None,
            divergent_only: true,
        };
        assert!(verify(&config(), &args).is_err());
    }

    #[test]
    fn summary_totals_add_up_completed_works() {
        let work = |written, skipped| WorkReport {
            title: "T".into(),
            short_code: "t".into(),
            tally: WorkTally {
                written,
                skipped,
                empty: 0,
            },
        };
        let summary = RunSummary {
            completed: vec![work(2, 1), work(0, 3)],
            ..RunSummary::default()
        };
        assert_eq!(
            summary.totals(),
            WorkTally {
                written: 2,
                skipped: 4,
                empty: 0
            }
        );
    }
}
