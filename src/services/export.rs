use crate::cli::RoutedCommand;
use crate::config::{AppPaths, ConfigLoader};
use crate::content::{
    ContentContainer, ContentError, ContentPack, ExportFilter, LoadRequest, PackOptions,
    SaveGameBackend,
};
use crate::logging::log_failure;
use crate::metrics::ExportMetrics;
use crate::models::config::directory_part;
use crate::models::{
    BatchConfig, BatchReport, BatchTarget, FailurePolicy, SingleTarget, TargetOutcome,
    TargetStatus,
};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::time::Instant;
use thiserror::Error;

/// Errors that end an export run
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("File Not Found: {0}")]
    InputNotFound(Utf8PathBuf),

    #[error("Unrecognized export mode: {0}")]
    UnrecognizedMode(String),

    #[error("{failed} of {attempted} export targets failed")]
    TargetsFailed { failed: usize, attempted: usize },

    #[error("Failed to create export folder {path}")]
    CreateFolder {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Content(#[from] ContentError),
}

/// Runs the pack, batch and single-target exports against one backend.
///
/// Every export loads the save once and builds one [`ContentPack`] that all of
/// its targets read from.
pub struct ExportService<B> {
    backend: B,
    paths: AppPaths,
    metrics: ExportMetrics,
}

impl<B: SaveGameBackend> ExportService<B> {
    pub fn new(backend: B, paths: AppPaths) -> Self {
        Self {
            backend,
            paths,
            metrics: ExportMetrics::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn metrics(&self) -> &ExportMetrics {
        &self.metrics
    }

    /// Build and write a content pack as described by the configuration at `config_path`.
    ///
    /// Returns the path of the written pack.
    pub fn export_pack(&self, config_path: &str) -> Result<Utf8PathBuf> {
        let config = ConfigLoader::new(&self.paths).load_pack_config(config_path);
        let (folder, file) = config.resolve_destination(self.paths.export_dir());
        ensure_folder(&folder)?;

        let container = self.load(&config.map_filename, &config.cluster_folder)?;
        let pack = ContentPack::new(&container, &PackOptions::from(&config));

        tracing::info!("Exporting content pack to {}", file);
        let start = Instant::now();
        pack.export_pack(&file)
            .with_context(|| format!("Failed to export content pack to {}", file))?;
        self.metrics.record_exported(start.elapsed());
        tracing::info!("Content pack exported: {}", file);

        Ok(file)
    }

    /// Run every target requested by the batch configuration at `config_path`.
    ///
    /// Target failures are collected in the report rather than returned. Only
    /// problems before the first target (missing save, failed load) are errors.
    pub fn export_batch(&self, config_path: &str) -> Result<BatchReport> {
        let config = ConfigLoader::new(&self.paths).load_batch_config(config_path);
        let policy = if config.stop_on_error {
            FailurePolicy::AbortOnError
        } else {
            FailurePolicy::ContinueOnError
        };

        let container = self.load(&config.map_filename, &config.cluster_folder)?;
        let pack = ContentPack::new(&container, &PackOptions::from(&config));

        let mut report = BatchReport::default();
        let mut aborted = false;

        for target in BatchTarget::ALL {
            let destination = batch_destination(&config, target);

            if aborted || destination.is_empty() {
                tracing::debug!("Skipping {} export", target);
                report.outcomes.push(TargetOutcome::skipped(target));
                continue;
            }

            let image = batch_image(&config, target);
            if !image.is_empty() {
                tracing::debug!("Image output {} for {} is not supported, ignoring", image, target);
            }

            let destination = Utf8PathBuf::from(destination);
            tracing::info!("Exporting {} to {}", target, destination);
            let start = Instant::now();

            let status = match export_batch_target(&pack, &config, target, &destination) {
                Ok(()) => {
                    tracing::info!("{} exported: {}", target, destination);
                    TargetStatus::Exported
                }
                Err(e) => {
                    log_failure(&format!("Failed to export {}", target), &e);
                    if policy == FailurePolicy::AbortOnError {
                        aborted = true;
                    }
                    TargetStatus::Failed(format!("{:#}", e))
                }
            };

            report.outcomes.push(TargetOutcome {
                target,
                destination: Some(destination),
                status,
                duration: start.elapsed(),
            });
        }

        self.metrics.record_report(&report);
        tracing::info!(
            "Batch export finished: {} exported, {} failed, {} skipped",
            report.exported(),
            report.failed(),
            report.skipped()
        );

        Ok(report)
    }

    /// Run one command line export straight from the save named in `command`.
    ///
    /// Returns the files written.
    pub fn export_single(
        &self,
        target: SingleTarget,
        command: &RoutedCommand,
    ) -> Result<Vec<Utf8PathBuf>> {
        let container = self.load(&command.input, &command.cluster_folder)?;
        let pack = ContentPack::new(&container, &PackOptions::ad_hoc());
        let none = ExportFilter::none();
        let start = Instant::now();

        let written = match target {
            SingleTarget::All => {
                ensure_folder(&command.export_folder)?;
                tracing::info!("Exporting all content to {}", command.export_folder);
                pack.export_json_all(&command.export_folder)
                    .with_context(|| format!("Failed to export to {}", command.export_folder))?
            }
            _ => {
                let destination = single_destination(target, command);
                ensure_folder(&parent_folder(&destination, &command.export_folder))?;
                tracing::info!("Exporting {} to {}", target.label(), destination);

                let result = match target {
                    SingleTarget::Map => pack.export_json_map_structures(&destination),
                    SingleTarget::Structures => {
                        pack.export_json_player_structures(&destination, &none)
                    }
                    SingleTarget::Logs => pack.export_json_tribe_logs(&destination),
                    SingleTarget::Tribes => pack.export_json_tribes(&destination),
                    SingleTarget::Players => pack.export_json_players(&destination),
                    SingleTarget::Wild => pack.export_json_wild(&destination, &none),
                    SingleTarget::Tamed | SingleTarget::All => {
                        pack.export_json_tamed(&destination, &none)
                    }
                };
                result.with_context(|| {
                    format!("Failed to export {} to {}", target.label(), destination)
                })?;

                vec![destination]
            }
        };

        self.metrics.record_exported(start.elapsed());
        tracing::info!("Export completed: {}", target.label());
        Ok(written)
    }

    fn load(&self, save_file: &str, cluster_folder: &str) -> Result<ContentContainer> {
        let save = require_input(save_file)?;
        let request = LoadRequest::new(save).with_cluster_folder(cluster_folder);

        tracing::info!("Loading save {}", request.save_file);
        let start = Instant::now();
        let container = self
            .backend
            .load(&request)
            .with_context(|| format!("Failed to load save {}", request.save_file))?;
        self.metrics.record_load_time(start.elapsed());

        Ok(container)
    }
}

/// The input file must exist before any work starts.
pub fn require_input(path: &str) -> Result<Utf8PathBuf, ExportError> {
    let input = Utf8PathBuf::from(path.trim());
    if input.as_str().is_empty() || !input.is_file() {
        return Err(ExportError::InputNotFound(input));
    }
    Ok(input)
}

/// Create `folder` and its parents. Existing folders are left alone.
pub fn ensure_folder(folder: &Utf8Path) -> Result<(), ExportError> {
    if folder.as_str().is_empty() || folder.is_dir() {
        return Ok(());
    }

    tracing::debug!("Creating export folder {}", folder);
    fs::create_dir_all(folder).map_err(|source| ExportError::CreateFolder {
        path: folder.to_path_buf(),
        source,
    })
}

fn parent_folder(destination: &Utf8Path, fallback: &Utf8Path) -> Utf8PathBuf {
    match directory_part(destination.as_str()) {
        "" => fallback.to_path_buf(),
        dir => Utf8PathBuf::from(dir),
    }
}

fn single_destination(target: SingleTarget, command: &RoutedCommand) -> Utf8PathBuf {
    match (command.output.as_deref(), target.default_file_name()) {
        (Some(output), _) if !output.is_empty() => Utf8PathBuf::from(output),
        (_, Some(name)) => command.export_folder.join(name),
        (_, None) => command.export_folder.clone(),
    }
}

fn batch_destination(config: &BatchConfig, target: BatchTarget) -> &str {
    let name = match target {
        BatchTarget::Tribes => &config.tribes.json_filename,
        BatchTarget::Structures => &config.structures.json_filename,
        BatchTarget::MapStructures => &config.map_structures.json_filename,
        BatchTarget::Players => &config.players.json_filename,
        BatchTarget::Wild => &config.wild.json_filename,
        BatchTarget::Tamed => &config.tamed.json_filename,
    };
    name.trim()
}

fn batch_image(config: &BatchConfig, target: BatchTarget) -> &str {
    let name = match target {
        BatchTarget::Tribes => &config.tribes.image_filename,
        BatchTarget::Structures => &config.structures.image_filename,
        BatchTarget::MapStructures => &config.map_structures.image_filename,
        BatchTarget::Players => &config.players.image_filename,
        BatchTarget::Wild => &config.wild.image_filename,
        BatchTarget::Tamed => &config.tamed.image_filename,
    };
    name.trim()
}

fn export_batch_target(
    pack: &ContentPack,
    config: &BatchConfig,
    target: BatchTarget,
    destination: &Utf8Path,
) -> Result<()> {
    ensure_folder(&parent_folder(destination, Utf8Path::new("")))?;

    let result = match target {
        BatchTarget::Tribes => pack.export_json_tribes(destination),
        BatchTarget::Structures => pack.export_json_player_structures(
            destination,
            &ExportFilter::class_name(&config.structures.class_name),
        ),
        BatchTarget::MapStructures => pack.export_json_map_structures(destination),
        BatchTarget::Players => pack.export_json_players(destination),
        BatchTarget::Wild => pack.export_json_wild(
            destination,
            &ExportFilter::class_name(&config.wild.class_name)
                .with_levels(config.wild.min_level, config.wild.max_level),
        ),
        BatchTarget::Tamed => pack.export_json_tamed(
            destination,
            &ExportFilter::class_name(&config.tamed.class_name),
        ),
    };
    result.with_context(|| format!("Failed to write {}", destination))
}
