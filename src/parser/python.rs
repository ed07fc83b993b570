// Python parser using tree-sitter
//
// A single pass over the syntax tree fills one `Doc`. Node kinds are folded
// into a small closed set so every kind the walk cares about has exactly one
// handler; everything else just recurses.

use crate::error::{Error, Result};
use crate::model::{Doc, FunctionDoc};
use crate::parser::decorators::{classify_decorators, decorator_nodes};
use crate::parser::docstring::{self, DocstringStyle};
use crate::parser::literal::string_value;
use std::collections::HashSet;
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Parser for Python source files
pub struct PythonParser {
    parser: Parser,
    style: DocstringStyle,
}

impl PythonParser {
    /// Create a new Python parser
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let language = tree_sitter_python::language();
        parser
            .set_language(&language)
            .map_err(|e| Error::Parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self {
            parser,
            style: DocstringStyle::default(),
        })
    }

    /// Use a fixed docstring convention instead of auto-detection
    pub fn with_style(mut self, style: DocstringStyle) -> Self {
        self.style = style;
        self
    }

    /// Parse a Python file
    pub fn parse_file(&mut self, path: &Path) -> Result<Doc> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
        })?;

        self.parse_source(&source, &path.display().to_string())
    }

    /// Parse Python source code into the documentation of `name`
    pub fn parse_source(&mut self, source: &str, name: &str) -> Result<Doc> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::parser("Failed to parse source"))?;

        let root = tree.root_node();
        if let Some(node) = first_syntax_error(&root) {
            let position = node.start_position();
            return Err(Error::parse(
                name,
                format!(
                    "invalid syntax at line {}, column {}",
                    position.row + 1,
                    position.column + 1
                ),
            ));
        }

        let mut visitor = DocVisitor::new(Doc::new(name), source.as_bytes(), self.style);
        visitor.visit(root);
        Ok(visitor.finish())
    }
}

/// The node kinds the visitor distinguishes
enum SyntaxNode<'tree> {
    Module(Node<'tree>),
    ClassDef {
        node: Node<'tree>,
        decorators: Vec<Node<'tree>>,
    },
    FunctionDef {
        node: Node<'tree>,
        decorators: Vec<Node<'tree>>,
    },
    Other(Node<'tree>),
}

impl<'tree> SyntaxNode<'tree> {
    /// `decorated_definition` is folded into the definition it wraps
    fn classify(node: Node<'tree>) -> Self {
        match node.kind() {
            "module" => SyntaxNode::Module(node),
            "class_definition" => SyntaxNode::ClassDef {
                node,
                decorators: Vec::new(),
            },
            "function_definition" => SyntaxNode::FunctionDef {
                node,
                decorators: Vec::new(),
            },
            "decorated_definition" => match node.child_by_field_name("definition") {
                Some(def) if def.kind() == "class_definition" => SyntaxNode::ClassDef {
                    node: def,
                    decorators: decorator_nodes(&node),
                },
                Some(def) if def.kind() == "function_definition" => SyntaxNode::FunctionDef {
                    node: def,
                    decorators: decorator_nodes(&node),
                },
                _ => SyntaxNode::Other(node),
            },
            _ => SyntaxNode::Other(node),
        }
    }
}

/// Builds a `Doc` while walking one syntax tree
struct DocVisitor<'src> {
    doc: Doc,
    source: &'src [u8],
    style: DocstringStyle,
    /// Function nodes already recorded as methods
    claimed: HashSet<usize>,
}

impl<'src> DocVisitor<'src> {
    fn new(doc: Doc, source: &'src [u8], style: DocstringStyle) -> Self {
        Self {
            doc,
            source,
            style,
            claimed: HashSet::new(),
        }
    }

    /// Hand over the finished documentation
    fn finish(self) -> Doc {
        self.doc
    }

    fn visit(&mut self, node: Node) {
        match SyntaxNode::classify(node) {
            SyntaxNode::Module(node) => self.visit_module(node),
            SyntaxNode::ClassDef { node, decorators } => self.visit_class(node, &decorators),
            SyntaxNode::FunctionDef { node, decorators } => self.visit_function(node, &decorators),
            SyntaxNode::Other(node) => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child);
        }
    }

    fn visit_module(&mut self, node: Node) {
        self.doc.module = self.docstring(&node);
        self.visit_children(node);
    }

    fn visit_class(&mut self, node: Node, decorators: &[Node]) {
        let body = node.child_by_field_name("body");
        let Some(name) = self.name_of(&node) else {
            self.visit_children(node);
            return;
        };

        let doc = body.map(|b| self.docstring(&b)).unwrap_or_default();
        let decorators = classify_decorators(decorators, self.source);

        let mut methods = Vec::new();
        if let Some(body) = body {
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                if let SyntaxNode::FunctionDef { node: method, .. } = SyntaxNode::classify(child) {
                    if let Some(method_name) = self.name_of(&method) {
                        methods.push((method_name, self.body_docstring(&method)));
                        self.claimed.insert(method.id());
                    }
                }
            }
        }

        tracing::trace!(class = %name, methods = methods.len(), "recorded class");
        let class = self.doc.append_class(&name, doc, decorators);
        for (method_name, method_doc) in methods {
            class.append_method(&method_name, method_doc);
        }

        if let Some(body) = body {
            self.visit_children(body);
        }
    }

    fn visit_function(&mut self, node: Node, decorators: &[Node]) {
        if !self.claimed.contains(&node.id()) {
            if let Some(name) = self.name_of(&node) {
                let doc = self.body_docstring(&node);
                let decorators = classify_decorators(decorators, self.source);
                tracing::trace!(function = %name, "recorded function");
                self.doc.append_function(&name, doc, &decorators);
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body);
        }
    }

    fn name_of(&self, definition: &Node) -> Option<String> {
        definition
            .child_by_field_name("name")
            .and_then(|n| n.utf8_text(self.source).ok())
            .map(str::to_string)
    }

    fn body_docstring(&self, definition: &Node) -> FunctionDoc {
        definition
            .child_by_field_name("body")
            .map(|body| self.docstring(&body))
            .unwrap_or_default()
    }

    /// Parsed docstring of a module or block, empty when there is none
    fn docstring(&self, body: &Node) -> FunctionDoc {
        match docstring_text(body, self.source) {
            Some(text) => docstring::parse(&docstring::clean(&text), self.style),
            None => FunctionDoc::default(),
        }
    }
}

/// Text of the docstring: the first statement, if it is a plain string
fn docstring_text(body: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;

    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let literal = string_value(&first.named_child(0)?, source)?;
    (!literal.is_bytes).then_some(literal.value)
}

/// First `ERROR` or missing node in document order
fn first_syntax_error<'tree>(node: &Node<'tree>) -> Option<Node<'tree>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'tree>> = node.children(&mut cursor).collect();
    children
        .iter()
        .find_map(|child| first_syntax_error(child))
        .or(Some(*node))
}
