// Documentation model for one Python source file
//
// A `Doc` is built incrementally by the tree visitor, then compiled into
// Markdown fragments exactly once per file.

use crate::error::Result;
use crate::output::TemplateEngine;
use indexmap::IndexMap;
use std::fmt;

/// Text written wherever a description or type is absent
pub const NONE_TEXT: &str = "None";

/// Method excluded from the class summary table
pub const CONSTRUCTOR_NAME: &str = "__init__";

/// A documented parameter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamDoc {
    pub arg_name: String,
    pub type_name: Option<String>,
    pub description: Option<String>,
    /// Absent means the parameter is required
    pub default: Option<String>,
    pub is_optional: bool,
}

impl ParamDoc {
    pub fn new(arg_name: &str) -> Self {
        Self {
            arg_name: arg_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, type_name: &str) -> Self {
        self.type_name = Some(type_name.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A documented return value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnsDoc {
    pub type_name: Option<String>,
    pub description: Option<String>,
}

/// Structured docstring of a module, class or function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionDoc {
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub params: Vec<ParamDoc>,
    pub returns: Option<ReturnsDoc>,
}

impl FunctionDoc {
    /// A doc carrying only a short description
    pub fn described(short_description: &str) -> Self {
        Self {
            short_description: Some(short_description.to_string()),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, param: ParamDoc) -> Self {
        self.params.push(param);
        self
    }

    pub fn with_return_type(mut self, type_name: &str) -> Self {
        self.returns = Some(ReturnsDoc {
            type_name: Some(type_name.to_string()),
            description: None,
        });
        self
    }

    /// The short description, unless absent.
    ///
    /// A docstring consisting of the literal word `None` counts as absent.
    pub fn description(&self) -> Option<&str> {
        self.short_description
            .as_deref()
            .filter(|d| *d != NONE_TEXT)
    }

    pub fn has_description(&self) -> bool {
        self.description().is_some()
    }

    /// Return type name as written in docs, if any
    pub fn return_type(&self) -> Option<&str> {
        self.returns.as_ref().and_then(|r| r.type_name.as_deref())
    }
}

/// A normalized decorator: `@name` or `@callee(literal, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    pub callee: String,
    /// `None` for a bare name reference, `Some` for a call
    pub args: Option<Vec<String>>,
}

impl Decorator {
    pub fn bare(name: &str) -> Self {
        Self {
            callee: name.to_string(),
            args: None,
        }
    }

    pub fn call(callee: &str, args: &[&str]) -> Self {
        Self {
            callee: callee.to_string(),
            args: Some(args.iter().map(|a| a.to_string()).collect()),
        }
    }

    /// Literal arguments joined by `, `; empty for bare names
    pub fn args_text(&self) -> String {
        self.args.as_ref().map(|a| a.join(", ")).unwrap_or_default()
    }
}

impl fmt::Display for Decorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.args {
            None => write!(f, "{}", self.callee),
            Some(args) => write!(f, "{}:{}", self.callee, args.join(", ")),
        }
    }
}

/// HTTP verbs that mark a function as an endpoint, in matching order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
}

impl HttpVerb {
    pub const ALL: [HttpVerb; 3] = [HttpVerb::Get, HttpVerb::Post, HttpVerb::Put];

    /// Token searched for in a decorator's callee
    pub fn token(self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Put => "put",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token().to_ascii_uppercase())
    }
}

/// Route of an endpoint function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub verb: HttpVerb,
    pub decorator: Decorator,
}

impl Route {
    /// Classify one decorator; the callee must contain a verb token
    pub fn from_decorator(decorator: &Decorator) -> Option<Self> {
        HttpVerb::ALL
            .into_iter()
            .find(|verb| decorator.callee.contains(verb.token()))
            .map(|verb| Route {
                verb,
                decorator: decorator.clone(),
            })
    }

    /// First decorator in order that classifies as a route
    pub fn classify(decorators: &[Decorator]) -> Option<Self> {
        decorators.iter().find_map(Route::from_decorator)
    }

    /// Tag form of the matching decorator, e.g. `get:/users`
    pub fn descriptor(&self) -> String {
        self.decorator.to_string()
    }

    /// Path portion of the descriptor
    pub fn path(&self) -> String {
        self.decorator.args_text()
    }
}

/// Documentation of one class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDoc {
    pub name: String,
    pub doc: FunctionDoc,
    pub methods: IndexMap<String, FunctionDoc>,
    pub decorators: Vec<Decorator>,
}

impl ClassDoc {
    pub fn new(name: &str, doc: FunctionDoc, decorators: Vec<Decorator>) -> Self {
        Self {
            name: name.to_string(),
            doc,
            methods: IndexMap::new(),
            decorators,
        }
    }

    /// Insert a method; a second method of the same name replaces the first
    pub fn append_method(&mut self, name: &str, doc: FunctionDoc) {
        self.methods.insert(name.to_string(), doc);
    }

    /// Methods listed in the summary table
    pub fn summary_methods(&self) -> impl Iterator<Item = (&String, &FunctionDoc)> {
        self.methods
            .iter()
            .filter(|(name, _)| name.as_str() != CONSTRUCTOR_NAME)
    }

    /// Methods that get a full detail block
    pub fn described_methods(&self) -> impl Iterator<Item = (&String, &FunctionDoc)> {
        self.methods.iter().filter(|(_, doc)| doc.has_description())
    }
}

/// Documentation of one source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Doc {
    pub name: String,
    pub module: FunctionDoc,
    pub classes: Vec<ClassDoc>,
    pub functions: IndexMap<String, FunctionDoc>,
    pub endpoints: IndexMap<String, Route>,
}

/// An endpoint rendered by [`Doc::compile`]
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledEndpoint {
    pub name: String,
    pub markdown: String,
    pub route: Route,
}

/// Markdown fragments of one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledDoc {
    pub classes: Vec<String>,
    pub functions: Vec<String>,
    pub endpoints: Vec<CompiledEndpoint>,
}

impl CompiledDoc {
    /// Contents of the per-file page
    pub fn page(&self) -> String {
        let mut page = self.classes.join("---\n\n");
        page.push_str(&self.functions.join("---\n\n"));
        page
    }
}

impl Doc {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Store a new class and hand it back for method registration.
    ///
    /// Classes are not deduplicated by name.
    pub fn append_class(
        &mut self,
        name: &str,
        doc: FunctionDoc,
        decorators: Vec<Decorator>,
    ) -> &mut ClassDoc {
        self.classes.push(ClassDoc::new(name, doc, decorators));
        let last = self.classes.len() - 1;
        &mut self.classes[last]
    }

    /// Store a top-level function, recording it as an endpoint when one of
    /// its decorators names an HTTP verb
    pub fn append_function(&mut self, name: &str, doc: FunctionDoc, decorators: &[Decorator]) {
        if let Some(route) = Route::classify(decorators) {
            tracing::debug!(function = name, route = %route.descriptor(), "classified endpoint");
            self.endpoints.insert(name.to_string(), route);
        }
        self.functions.insert(name.to_string(), doc);
    }

    pub fn is_endpoint(&self, name: &str) -> bool {
        self.endpoints.contains_key(name)
    }

    /// Render every class, function and endpoint. Does not modify the model.
    pub fn compile(&self, engine: &TemplateEngine) -> Result<CompiledDoc> {
        let mut compiled = CompiledDoc::default();

        for class in &self.classes {
            compiled.classes.push(engine.render_class(class)?);
        }

        for (name, doc) in &self.functions {
            let markdown = engine.render_function(name, doc)?;
            match self.endpoints.get(name) {
                Some(route) => compiled.endpoints.push(CompiledEndpoint {
                    name: name.clone(),
                    markdown,
                    route: route.clone(),
                }),
                None => compiled.functions.push(markdown),
            }
        }

        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> TemplateEngine {
        TemplateEngine::new().unwrap()
    }

    #[test]
    fn test_decorator_display() {
        assert_eq!(Decorator::bare("staticmethod").to_string(), "staticmethod");
        assert_eq!(Decorator::call("get", &["/users"]).to_string(), "get:/users");
        assert_eq!(Decorator::call("route", &["/a", "GET"]).to_string(), "route:/a, GET");
        assert_eq!(Decorator::call("cache", &[]).to_string(), "cache:");
    }

    #[test]
    fn test_description_treats_literal_none_as_absent() {
        assert_eq!(FunctionDoc::default().description(), None);
        assert_eq!(FunctionDoc::described("None").description(), None);
        assert_eq!(FunctionDoc::described("Runs it.").description(), Some("Runs it."));
    }

    #[test]
    fn test_route_classification_skips_plain_decorators() {
        let decorators = vec![Decorator::bare("foo"), Decorator::call("post", &["/users"])];
        let route = Route::classify(&decorators).unwrap();
        assert_eq!(route.verb, HttpVerb::Post);
        assert_eq!(route.descriptor(), "post:/users");
        assert_eq!(route.path(), "/users");
    }

    #[test]
    fn test_route_classification_first_match_wins() {
        let decorators = vec![Decorator::call("get", &["/a"]), Decorator::call("post", &["/b"])];
        let route = Route::classify(&decorators).unwrap();
        assert_eq!(route.descriptor(), "get:/a");
    }

    #[test]
    fn test_route_matches_callee_substring_only() {
        assert!(Route::from_decorator(&Decorator::call("put_item", &["/x"])).is_some());
        // verb in the arguments does not count
        assert!(Route::from_decorator(&Decorator::call("route", &["/get"])).is_none());
        assert!(Route::from_decorator(&Decorator::bare("dataclass")).is_none());
    }

    #[test]
    fn test_verb_display() {
        assert_eq!(HttpVerb::Get.to_string(), "GET");
        assert_eq!(HttpVerb::Put.to_string(), "PUT");
    }

    #[test]
    fn test_append_function_records_endpoint() {
        let mut doc = Doc::new("api.py");
        doc.append_function(
            "list_users",
            FunctionDoc::described("List users."),
            &[Decorator::call("get", &["/users"])],
        );
        doc.append_function("helper", FunctionDoc::default(), &[]);

        assert_eq!(doc.functions.len(), 2);
        assert!(doc.is_endpoint("list_users"));
        assert!(!doc.is_endpoint("helper"));
        for name in doc.endpoints.keys() {
            assert!(doc.functions.contains_key(name));
        }
    }

    #[test]
    fn test_append_class_keeps_duplicates() {
        let mut doc = Doc::new("m.py");
        doc.append_class("Thing", FunctionDoc::default(), vec![]);
        doc.append_class("Thing", FunctionDoc::default(), vec![]);
        assert_eq!(doc.classes.len(), 2);
    }

    #[test]
    fn test_append_method_last_write_wins() {
        let mut class = ClassDoc::new("Thing", FunctionDoc::default(), vec![]);
        class.append_method("run", FunctionDoc::described("First."));
        class.append_method("stop", FunctionDoc::default());
        class.append_method("run", FunctionDoc::described("Second."));

        assert_eq!(class.methods.len(), 2);
        let names: Vec<_> = class.methods.keys().cloned().collect();
        assert_eq!(names, vec!["run", "stop"]);
        assert_eq!(class.methods["run"].description(), Some("Second."));
    }

    #[test]
    fn test_summary_and_described_methods() {
        let mut class = ClassDoc::new("Thing", FunctionDoc::default(), vec![]);
        class.append_method("__init__", FunctionDoc::described("Build it."));
        class.append_method("run", FunctionDoc::default());

        let summary: Vec<_> = class.summary_methods().map(|(n, _)| n.as_str()).collect();
        assert_eq!(summary, vec!["run"]);
        let described: Vec<_> = class.described_methods().map(|(n, _)| n.as_str()).collect();
        assert_eq!(described, vec!["__init__"]);
    }

    #[test]
    fn test_compile_splits_endpoints() {
        let mut doc = Doc::new("api.py");
        doc.append_function("ping", FunctionDoc::described("Ping."), &[]);
        doc.append_function(
            "create",
            FunctionDoc::described("Create."),
            &[Decorator::call("post", &["/items"])],
        );

        let compiled = doc.compile(&engine()).unwrap();
        assert!(compiled.classes.is_empty());
        assert_eq!(compiled.functions.len(), 1);
        assert!(compiled.functions[0].starts_with("## `ping()`"));
        assert_eq!(compiled.endpoints.len(), 1);
        assert_eq!(compiled.endpoints[0].name, "create");
        assert_eq!(compiled.endpoints[0].route.descriptor(), "post:/items");
    }

    #[test]
    fn test_compile_is_idempotent() {
        let mut doc = Doc::new("m.py");
        let class = doc.append_class("Thing", FunctionDoc::described("A thing."), vec![]);
        class.append_method("run", FunctionDoc::described("Runs it.").with_return_type("bool"));
        doc.append_function("helper", FunctionDoc::described("Help."), &[]);

        let engine = engine();
        let first = doc.compile(&engine).unwrap();
        let second = doc.compile(&engine).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_page_joins_with_separator() {
        let compiled = CompiledDoc {
            classes: vec!["A\n".to_string(), "B\n".to_string()],
            functions: vec!["f\n".to_string(), "g\n".to_string()],
            endpoints: vec![],
        };
        assert_eq!(compiled.page(), "A\n---\n\nB\nf\n---\n\ng\n");
    }
}
