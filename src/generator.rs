// Generation pipeline: discover sources, document each file, rebuild the nav

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{Manifest, MarkdownWriter, NavEntry, TemplateEngine, WrittenDoc};
use crate::parser::PythonParser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Stem of package initializers, never documented
const PACKAGE_INIT_STEM: &str = "__init__";

/// Outcome of a full run
#[derive(Debug, Default)]
pub struct RunReport {
    pub files: usize,
    pub pages: Vec<PathBuf>,
    pub endpoint_pages: Vec<PathBuf>,
    pub manifest: PathBuf,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "Documented {} files ({} pages, {} endpoint pages)",
            self.files,
            self.pages.len(),
            self.endpoint_pages.len()
        )
    }
}

/// Drives the per-file pipeline
pub struct Generator {
    config: Config,
    engine: TemplateEngine,
}

impl Generator {
    /// Create a generator, loading template overrides named by the config
    pub fn new(config: Config) -> Result<Self> {
        let mut engine =
            TemplateEngine::new()?.with_required_marker(config.render.required_marker.clone());
        if let Some(dir) = &config.render.templates_dir {
            engine = engine.with_overrides(dir)?;
        }
        Ok(Self { config, engine })
    }

    /// Source files under `source` in traversal order.
    ///
    /// A file is taken as is; a directory is walked depth-first in file name
    /// order for `.py` files.
    pub fn discover(&self, source: &Path) -> Result<Vec<PathBuf>> {
        if !source.exists() {
            return Err(Error::PathNotFound(source.to_path_buf()));
        }
        if source.is_file() {
            return Ok(vec![source.to_path_buf()]);
        }

        let excludes = self.config.exclude_patterns()?;
        let mut files = Vec::new();

        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();

            if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "py") {
                continue;
            }
            if path.file_stem().map_or(false, |s| s == PACKAGE_INIT_STEM) {
                continue;
            }

            let relative = path.strip_prefix(source).unwrap_or(path);
            if excludes.iter().any(|p| p.matches_path(relative)) {
                tracing::debug!(path = %path.display(), "excluded");
                continue;
            }

            tracing::debug!(path = %path.display(), "discovered");
            files.push(path.to_path_buf());
        }

        Ok(files)
    }

    /// Parse, compile and write the pages of one source file
    pub fn process_file(
        &self,
        parser: &mut PythonParser,
        path: &Path,
        output_dir: &Path,
    ) -> Result<WrittenDoc> {
        println!("Extracting docs from {}!", path.display());

        let doc = parser.parse_file(path)?;
        let compiled = doc.compile(&self.engine)?;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::other(format!("Invalid file name: {}", path.display())))?;

        let written = MarkdownWriter::new(output_dir, &self.engine).write(stem, &compiled)?;
        println!("... Wrote docs to {}", stem);

        Ok(written)
    }

    /// Document everything under `source` into `output_dir` and replace the
    /// navigation of the manifest at `manifest_path`
    pub fn run(&self, source: &Path, output_dir: &Path, manifest_path: &Path) -> Result<RunReport> {
        let mut manifest = Manifest::load(manifest_path)?;
        let files = self.discover(source)?;
        fs::create_dir_all(output_dir)?;

        let progress = self.progress_bar(files.len())?;
        let written = if self.config.run.parallel {
            self.process_parallel(&files, output_dir, progress.as_ref())?
        } else {
            self.process_sequential(&files, output_dir, progress.as_ref())?
        };
        if let Some(pb) = progress {
            pb.finish_with_message("done");
        }

        let mut report = RunReport {
            files: files.len(),
            manifest: manifest.path().to_path_buf(),
            ..Default::default()
        };
        let mut nav: Vec<NavEntry> = Vec::new();
        for doc in written {
            report.pages.push(doc.page);
            report.endpoint_pages.extend(doc.endpoint_pages);
            nav.extend(doc.nav);
        }

        manifest.set_nav(&nav)?;
        manifest.save()?;
        tracing::info!(manifest = %manifest_path.display(), entries = nav.len(), "updated navigation");

        Ok(report)
    }

    fn process_sequential(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<WrittenDoc>> {
        let mut parser = PythonParser::new()?.with_style(self.config.render.docstring_style);
        let mut written = Vec::with_capacity(files.len());
        for path in files {
            written.push(self.process_file(&mut parser, path, output_dir)?);
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }
        Ok(written)
    }

    /// One parser per worker; results come back in discovery order
    fn process_parallel(
        &self,
        files: &[PathBuf],
        output_dir: &Path,
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<WrittenDoc>> {
        let style = self.config.render.docstring_style;
        files
            .par_iter()
            .map_init(
                || PythonParser::new().map(|p| p.with_style(style)),
                |parser, path| -> Result<WrittenDoc> {
                    let parser = parser.as_mut().map_err(|e| Error::parser(e.to_string()))?;
                    let written = self.process_file(parser, path, output_dir)?;
                    if let Some(pb) = progress {
                        pb.inc(1);
                    }
                    Ok(written)
                },
            )
            .collect()
    }

    fn progress_bar(&self, len: usize) -> Result<Option<ProgressBar>> {
        if !self.config.run.progress {
            return Ok(None);
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| Error::other(format!("Invalid progress template: {}", e)))?
                .progress_chars("#>-"),
        );
        Ok(Some(pb))
    }
}
