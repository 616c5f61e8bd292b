//! `dentlens-batch`: build a dent report for one vehicle panel from a folder
//! of images.
//!
//! Detections are read from `<image stem>.json` response bodies next to the
//! images (or in `--detections`). The report format follows the output file
//! extension.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

// The browser build drives the library directly
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};

    use anyhow::{Context, Result};
    use clap::Parser;

    use dentlens::batch::{BatchOutcome, PanelBatch, ingest_panel};
    use dentlens::config::AppConfig;
    use dentlens::format::{ExportAssembler, FormatRegistry, now_timestamp};
    use dentlens::model::{ImageFile, VehiclePanel};
    use dentlens::service::{DirectoryHost, ImageHost, LocalOnlyHost, SidecarDetector};
    use dentlens::validation::is_image_filename;

    #[derive(Parser)]
    #[command(
        name = "dentlens-batch",
        about = "Build a dent report for one vehicle panel from a folder of images"
    )]
    #[command(version)]
    struct Cli {
        /// Vehicle panel the images show (e.g. hood, left_front_door)
        panel: VehiclePanel,

        /// Folder containing the images
        image_dir: PathBuf,

        /// Report file to write (.json or .zip); the extension picks the format
        #[arg(default_value = "dent-report.zip")]
        output: PathBuf,

        /// Folder holding `<image stem>.json` detection responses
        #[arg(long)]
        detections: Option<PathBuf>,

        /// Copy images into this folder and reference them by file URL
        #[arg(long)]
        host_dir: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        let config = AppConfig::load();

        let level = if cli.verbose {
            log::LevelFilter::Debug
        } else {
            config.preferences.log_level.to_level_filter()
        };
        env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .init();

        let registry = FormatRegistry::new();
        let extension = cli
            .output
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let generator = registry.by_extension(extension).with_context(|| {
            format!(
                "No report format for '{}' (available: {})",
                cli.output.display(),
                registry.ids().join(", ")
            )
        })?;

        let files = read_images(&cli.image_dir)?;
        log::info!(
            "Found {} images in {} for panel '{}'",
            files.len(),
            cli.image_dir.display(),
            cli.panel
        );

        let detector =
            SidecarDetector::new(cli.detections.clone().unwrap_or_else(|| cli.image_dir.clone()));
        let outcome = match &cli.host_dir {
            Some(dir) => ingest(cli.panel, files, &detector, &DirectoryHost::new(dir)),
            None => ingest(cli.panel, files, &detector, &LocalOnlyHost),
        };
        print_outcome(&outcome);

        let mut batch = PanelBatch::new();
        batch.record_panel_result(outcome.panel, outcome.results);

        let report = ExportAssembler::assemble_batch(&batch, now_timestamp());
        for warning in &report.warnings {
            log::warn!("{}", warning);
        }

        let base_name = cli
            .output
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dent-report".to_string());
        let out_dir = match cli.output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let path = generator
            .document(&report, &base_name)?
            .save_in(&out_dir)
            .with_context(|| format!("Failed to write report into {}", out_dir.display()))?;

        println!(
            "Wrote {} report to {} ({} dents)",
            generator.display_name(),
            path.display(),
            report.total_dents
        );
        Ok(())
    }

    fn ingest<H: ImageHost>(
        panel: VehiclePanel,
        files: Vec<ImageFile>,
        detector: &SidecarDetector,
        host: &H,
    ) -> BatchOutcome {
        pollster::block_on(ingest_panel(panel, files, detector, host, |progress| {
            log::info!(
                "[{}/{}] {}",
                progress.completed,
                progress.total,
                progress.current
            );
        }))
    }

    /// Read every image file in a folder, sorted by name.
    fn read_images(dir: &Path) -> Result<Vec<ImageFile>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read folder {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| path.to_str().is_some_and(is_image_filename))
            .collect();
        paths.sort();

        paths
            .iter()
            .map(|path| {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(ImageFile::new(name, bytes))
            })
            .collect()
    }

    fn print_outcome(outcome: &BatchOutcome) {
        println!(
            "Processed {} images for {}",
            outcome.results.len(),
            outcome.panel.label()
        );
        for failure in &outcome.failures {
            eprintln!("  failed: {} ({})", failure.file_name, failure.reason);
        }
        if !outcome.ignored.is_empty() {
            eprintln!(
                "  ignored {} images past the batch limit",
                outcome.ignored.len()
            );
        }
    }
}
