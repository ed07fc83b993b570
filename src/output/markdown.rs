// Markdown page writer
//
// Writes `<stem>.md` plus, for files with endpoints, one page per endpoint
// under `<stem>_endpoints/`, and reports the navigation entries for them.

use crate::error::Result;
use crate::model::{CompiledDoc, CompiledEndpoint};
use crate::output::nav::NavEntry;
use crate::output::templates::TemplateEngine;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes compiled docs into an output directory
pub struct MarkdownWriter<'a> {
    output_dir: &'a Path,
    engine: &'a TemplateEngine,
}

/// Files written for one source file
#[derive(Debug, Default)]
pub struct WrittenDoc {
    pub page: PathBuf,
    pub endpoint_pages: Vec<PathBuf>,
    /// Endpoint pages written more than once because routes share a file stem
    pub overwritten: Vec<PathBuf>,
    pub nav: Vec<NavEntry>,
}

impl<'a> MarkdownWriter<'a> {
    pub fn new(output_dir: &'a Path, engine: &'a TemplateEngine) -> Self {
        Self { output_dir, engine }
    }

    /// Write the page (and endpoint pages) for the source file named `stem`
    pub fn write(&self, stem: &str, compiled: &CompiledDoc) -> Result<WrittenDoc> {
        let mut written = WrittenDoc::default();

        let page_name = format!("{}.md", stem);
        written.page = self.output_dir.join(&page_name);
        written.nav.push(NavEntry::page(stem, &page_name));

        if !compiled.endpoints.is_empty() {
            let dir_name = endpoint_dir_name(stem);
            let endpoint_dir = self.output_dir.join(&dir_name);
            fs::create_dir_all(&endpoint_dir)?;

            let mut children = Vec::new();
            for endpoint in &compiled.endpoints {
                let file_stem = endpoint_file_stem(endpoint);
                let file_name = format!("{}.md", file_stem);
                let path = endpoint_dir.join(&file_name);

                if written.endpoint_pages.contains(&path) {
                    tracing::warn!(
                        endpoint = %endpoint.name,
                        path = %path.display(),
                        "endpoint page overwritten by a route with the same file stem"
                    );
                    written.overwritten.push(path.clone());
                }
                fs::write(&path, self.engine.render_endpoint(endpoint)?)?;
                tracing::debug!(endpoint = %endpoint.name, path = %path.display(), "wrote endpoint page");

                children.push(NavEntry::page(&file_stem, &format!("{}/{}", dir_name, file_name)));
                written.endpoint_pages.push(path);
            }

            written
                .nav
                .push(NavEntry::section(&format!("{} - Endpoints", stem), children));
        }

        fs::write(&written.page, compiled.page())?;
        tracing::debug!(path = %written.page.display(), "wrote page");

        Ok(written)
    }
}

/// Directory holding the endpoint pages of `stem`
pub fn endpoint_dir_name(stem: &str) -> String {
    format!("{}_endpoints", stem)
}

/// File stem of an endpoint page: last segment of the route path, or the
/// function name when the path has none
pub fn endpoint_file_stem(endpoint: &CompiledEndpoint) -> String {
    let route_path = endpoint.route.path();
    Path::new(&route_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| endpoint.name.clone())
}
