// Decorator classifier: decorator expressions to normalized records

use crate::model::Decorator;
use crate::parser::literal::constant_value;
use tree_sitter::Node;

/// `decorator` children of a `decorated_definition`, in source order
pub fn decorator_nodes<'tree>(decorated: &Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = decorated.walk();
    decorated
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "decorator")
        .collect()
}

/// Classify decorator nodes, dropping unsupported shapes
pub fn classify_decorators(nodes: &[Node], source: &[u8]) -> Vec<Decorator> {
    nodes
        .iter()
        .filter_map(|node| classify_decorator(node, source))
        .collect()
}

/// Classify one `decorator` node.
///
/// `@name` gives a bare record, `@callee(...)` a call record keeping only
/// positional literal arguments. Anything else (e.g. `@pkg.attr`) is `None`.
pub fn classify_decorator(node: &Node, source: &[u8]) -> Option<Decorator> {
    let expression = first_named(node)?;

    match expression.kind() {
        "identifier" => Some(Decorator {
            callee: expression.utf8_text(source).ok()?.to_string(),
            args: None,
        }),
        "call" => {
            let callee = expression
                .child_by_field_name("function")
                .map(|f| callee_name(&f, source))
                .unwrap_or_default();
            let args = expression
                .child_by_field_name("arguments")
                .map(|a| literal_arguments(&a, source))
                .unwrap_or_default();
            Some(Decorator {
                callee,
                args: Some(args),
            })
        }
        _ => None,
    }
}

/// `get` for both `get(...)` and `router.get(...)`; empty for other targets
fn callee_name(function: &Node, source: &[u8]) -> String {
    let target = match function.kind() {
        "identifier" => Some(*function),
        "attribute" => function.child_by_field_name("attribute"),
        _ => None,
    };
    target
        .and_then(|t| t.utf8_text(source).ok())
        .unwrap_or_default()
        .to_string()
}

/// Positional literal arguments; keyword arguments and expressions are dropped
fn literal_arguments(arguments: &Node, source: &[u8]) -> Vec<String> {
    if arguments.kind() != "argument_list" {
        return Vec::new();
    }
    let mut cursor = arguments.walk();
    arguments
        .named_children(&mut cursor)
        .filter_map(|arg| constant_value(&arg, source))
        .collect()
}

fn first_named<'tree>(node: &Node<'tree>) -> Option<Node<'tree>> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    found
}
