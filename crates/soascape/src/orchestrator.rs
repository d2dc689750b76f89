//! Drives one reporting run end to end.
//!
//! `Init → ResolveEndpoints (optional) → Public → Special → Private×N`,
//! fully sequential. Setup failures abort before any report is written;
//! everything after that is best-effort; a failing report or endpoint is
//! logged and the run moves on. The run log is closed on every exit path
//! because it is owned by the run.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::catalog::{CatalogSnapshot, UnitId};
use crate::error::SoascapeError;
use crate::layout::OutputLayout;
use crate::naming::TranslationTable;
use crate::reports::{ReportDescriptor, XmlReportWriter};
use crate::resolver::{EndpointResolutionCache, EndpointResolver, ResolverSettings};
use crate::runlog::RunLog;
use crate::transform::{StylesheetEngine, TransformRunner};

/// Configuration of one run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub output_root: PathBuf,
    pub translations_file: Option<PathBuf>,
    /// Skip the upfront resolution pass when the registry is already known
    /// to be unavailable; endpoints then report empty protected URLs.
    pub resolve_endpoints: bool,
    /// Append `_YYYY-MM-DD` to the XML file names of special and private
    /// reports.
    pub date_suffix: bool,
    pub alternate_host: Option<String>,
    pub resolver: ResolverSettings,
}

impl RunConfig {
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            translations_file: None,
            resolve_endpoints: true,
            date_suffix: false,
            alternate_host: None,
            resolver: ResolverSettings::FileSystem { virtual_root: None },
        }
    }
}

/// Outcome of a run. The `Result` of [`ReportOrchestrator::run`] only
/// reflects top-level setup; per-report detail lives here and in the log.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub reports_written: usize,
    pub failures: usize,
    pub resolved_endpoints: usize,
    pub log_path: Option<PathBuf>,
}

pub struct ReportOrchestrator<E: StylesheetEngine> {
    config: RunConfig,
    engine: E,
    last_error: Option<String>,
}

impl<E: StylesheetEngine> ReportOrchestrator<E> {
    pub fn new(config: RunConfig, engine: E) -> Self {
        Self {
            config,
            engine,
            last_error: None,
        }
    }

    /// Most recent setup-level failure recorded by this orchestrator.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn run(&mut self, catalog: &CatalogSnapshot) -> Result<RunSummary, SoascapeError> {
        let config = &self.config;
        let engine = &self.engine;
        let last_error = &mut self.last_error;

        if !config.output_root.is_dir() {
            let err = SoascapeError::Setup(format!(
                "data folder path \"{}\" does not exist",
                config.output_root.display()
            ));
            *last_error = Some(err.to_string());
            return Err(err);
        }
        if let Some(file) = &config.translations_file {
            if !file.is_file() {
                let err = SoascapeError::Setup(format!(
                    "translations file \"{}\" does not exist",
                    file.display()
                ));
                *last_error = Some(err.to_string());
                return Err(err);
            }
        }

        let layout = OutputLayout::new(&config.output_root);

        // A missing log never aborts the run.
        let mut log = match layout
            .ensure(layout.log_dir())
            .and_then(|dir| RunLog::create(&dir, "reportLog"))
        {
            Ok(log) => log,
            Err(err) => {
                *last_error = Some(err.to_string());
                RunLog::disabled()
            }
        };

        let translations = match &config.translations_file {
            Some(path) => match TranslationTable::load(path) {
                Ok(table) => table,
                Err(err) => {
                    log.error(err.to_string());
                    TranslationTable::new()
                }
            },
            None => TranslationTable::new(),
        };

        let mut cache = EndpointResolutionCache::new();
        if config.resolve_endpoints {
            let mut resolver =
                EndpointResolver::new(config.resolver.clone(), config.alternate_host.clone());
            for (endpoint_id, ep) in catalog.all_endpoints() {
                let resolved = resolver.resolve(&ep.registry_folder_url, &mut log);
                cache.record(endpoint_id, resolved);
            }
        }

        let writer = XmlReportWriter::new(catalog, &cache);
        let generation_date = Local::now().format("%A, %B %-d, %Y").to_string();
        let runner = TransformRunner::new(engine, layout.xsl_dir(), generation_date);
        let date_addon = if config.date_suffix {
            format!("_{}", Local::now().format("%Y-%m-%d"))
        } else {
            String::new()
        };

        let mut written = 0usize;
        let mut failures = 0usize;

        let public_dir = match layout.ensure(layout.public_xml_dir()) {
            Ok(dir) => dir,
            Err(err) => {
                *last_error = Some(err.to_string());
                return Err(err);
            }
        };
        for descriptor in &ReportDescriptor::PUBLIC {
            if run_report(
                &writer,
                &runner,
                descriptor,
                &public_dir,
                None,
                false,
                "",
                &translations,
                &mut log,
            ) {
                written += 1;
            } else {
                failures += 1;
            }
        }

        let special_dir = match layout.ensure(layout.special_xml_dir()) {
            Ok(dir) => dir,
            Err(err) => {
                *last_error = Some(err.to_string());
                return Err(err);
            }
        };
        for descriptor in &ReportDescriptor::SCOPED {
            if run_report(
                &writer,
                &runner,
                descriptor,
                &special_dir,
                None,
                false,
                &date_addon,
                &translations,
                &mut log,
            ) {
                written += 1;
            } else {
                failures += 1;
            }
        }

        for unit_id in catalog.internal_units() {
            let unit = catalog.unit(unit_id)?;
            match layout.ensure(layout.private_xml_dir(&unit.name)) {
                Ok(private_dir) => {
                    for descriptor in &ReportDescriptor::SCOPED {
                        if run_report(
                            &writer,
                            &runner,
                            descriptor,
                            &private_dir,
                            Some(unit_id),
                            true,
                            &date_addon,
                            &translations,
                            &mut log,
                        ) {
                            written += 1;
                        } else {
                            failures += 1;
                        }
                    }
                }
                Err(err) => {
                    // Skip this unit only.
                    *last_error = Some(err.to_string());
                    log.error(err.to_string());
                    failures += ReportDescriptor::SCOPED.len();
                }
            }
        }

        Ok(RunSummary {
            reports_written: written,
            failures,
            resolved_endpoints: cache.len(),
            log_path: log.path().map(Path::to_path_buf),
        })
    }
}

/// Writes one report and, on success, its HTML transform. Failures are
/// logged and reported back as `false`; they never propagate.
fn run_report<E: StylesheetEngine>(
    writer: &XmlReportWriter<'_>,
    runner: &TransformRunner<'_, E>,
    descriptor: &ReportDescriptor,
    xml_dir: &Path,
    unit_filter: Option<UnitId>,
    private_scope: bool,
    date_addon: &str,
    translations: &TranslationTable,
    log: &mut RunLog,
) -> bool {
    let xml_path = xml_dir.join(format!("{}{}.xml", descriptor.identifier, date_addon));
    let outcome = File::create(&xml_path)
        .map_err(SoascapeError::from)
        .and_then(|file| {
            let mut out = BufWriter::new(file);
            writer.write_document(descriptor, &mut out, unit_filter)?;
            out.flush().map_err(SoascapeError::from)
        });

    match outcome {
        Ok(()) => {
            runner.run(
                descriptor,
                xml_dir,
                &xml_path,
                private_scope,
                translations,
                log,
            );
            true
        }
        Err(err) => {
            log.error(format!(
                "report {} failed: {err}",
                descriptor.identifier
            ));
            false
        }
    }
}
