// Template engine for generating Markdown output

use crate::error::Result;
use crate::model::{ClassDoc, CompiledEndpoint, FunctionDoc, ParamDoc, NONE_TEXT};
use std::path::Path;
use tera::{Context, Tera};

const CLASS_TEMPLATE: &str = "class.md";
const FUNCTION_TEMPLATE: &str = "function.md";
const ENDPOINT_TEMPLATE: &str = "endpoint.md";

const DEFAULT_REQUIRED_MARKER: &str = "*is required*";

/// Template engine wrapping Tera with the Markdown page templates
pub struct TemplateEngine {
    tera: Tera,
    required_marker: String,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            (CLASS_TEMPLATE, include_str!("../../templates/class.md.tera")),
            (FUNCTION_TEMPLATE, include_str!("../../templates/function.md.tera")),
            (ENDPOINT_TEMPLATE, include_str!("../../templates/endpoint.md.tera")),
        ])?;

        Ok(Self {
            tera,
            required_marker: DEFAULT_REQUIRED_MARKER.to_string(),
        })
    }

    /// Replace embedded templates with `<name>.tera` files found in `dir`.
    ///
    /// Templates missing from the directory keep their embedded version.
    pub fn with_overrides(mut self, dir: &Path) -> Result<Self> {
        for name in [CLASS_TEMPLATE, FUNCTION_TEMPLATE, ENDPOINT_TEMPLATE] {
            let path = dir.join(format!("{}.tera", name));
            if path.is_file() {
                tracing::debug!(template = name, path = %path.display(), "overriding template");
                self.tera.add_template_file(&path, Some(name))?;
            }
        }
        Ok(self)
    }

    /// Set the Default-column text for required parameters
    pub fn with_required_marker(mut self, marker: impl Into<String>) -> Self {
        self.required_marker = marker.into();
        self
    }

    /// Render a class block: header, description, method table, and a
    /// detail block for every described method
    pub fn render_class(&self, class: &ClassDoc) -> Result<String> {
        let mut context = Context::new();
        context.insert("name", &class.name);
        context.insert("description", class.doc.description().unwrap_or(" "));
        context.insert("method_table", &method_table(class));

        let mut base = self.tera.render(CLASS_TEMPLATE, &context)?;

        for (name, doc) in class.described_methods() {
            base.push('\n');
            base.push_str(&self.render_function(name, doc)?);
        }

        Ok(base)
    }

    /// Render the detail block of a function or method
    pub fn render_function(&self, name: &str, doc: &FunctionDoc) -> Result<String> {
        let mut context = Context::new();
        context.insert("name", name);
        context.insert("params", &signature(&doc.params));
        context.insert("description", doc.description().unwrap_or(NONE_TEXT));
        context.insert("param_table", &self.param_table(&doc.params));

        Ok(self.tera.render(FUNCTION_TEMPLATE, &context)?)
    }

    /// Render an endpoint page around an already rendered detail block
    pub fn render_endpoint(&self, endpoint: &CompiledEndpoint) -> Result<String> {
        let mut context = Context::new();
        context.insert("verb", &endpoint.route.verb.to_string());
        context.insert("path", &endpoint.route.path());
        context.insert("body", &endpoint.markdown);

        Ok(self.tera.render(ENDPOINT_TEMPLATE, &context)?)
    }

    /// Parameter table using this engine's required marker
    pub fn param_table(&self, params: &[ParamDoc]) -> String {
        param_table(params, &self.required_marker)
    }
}

/// `name: type` pairs for a function header
pub fn signature(params: &[ParamDoc]) -> String {
    params
        .iter()
        .map(|p| format!("{}: {}", p.arg_name, p.type_name.as_deref().unwrap_or(NONE_TEXT)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parameter table; empty when there are no parameters
pub fn param_table(params: &[ParamDoc], required_marker: &str) -> String {
    if params.is_empty() {
        return String::new();
    }

    let mut table = String::from(
        "**Parameters:**\n\n| Name | Type | Description | Default |\n| --- | --- | --- | --- |\n",
    );

    for p in params {
        table.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            cell(&p.arg_name),
            cell(p.type_name.as_deref().unwrap_or(NONE_TEXT)),
            cell(p.description.as_deref().unwrap_or(NONE_TEXT)),
            p.default.as_deref().map(cell).unwrap_or_else(|| required_marker.to_string()),
        ));
    }

    table
}

/// Method summary table of a class; empty for classes without methods
pub fn method_table(class: &ClassDoc) -> String {
    if class.methods.is_empty() {
        return String::new();
    }

    let mut table =
        String::from("\n**Methods:**\n\n| Name | Description | Returns |\n| --- | --- | --- |\n");

    for (name, doc) in class.summary_methods() {
        let returns = match &doc.returns {
            None => format!("`{}`", NONE_TEXT),
            Some(r) => format!("`{}`", r.type_name.as_deref().unwrap_or(NONE_TEXT)),
        };
        table.push_str(&format!(
            "| `{}` | {} | {} |\n",
            name,
            cell(doc.description().unwrap_or(NONE_TEXT)),
            returns
        ));
    }

    table
}

/// Make text safe for a single table cell
fn cell(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}
