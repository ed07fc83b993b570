// Structured docstring parsing
//
// Understands the three common Python conventions: Google (`Args:` blocks),
// NumPy (underlined section titles) and reStructuredText (`:param x:`
// fields). `Auto` tries all of them and keeps the richest result.

use crate::model::{FunctionDoc, ParamDoc, ReturnsDoc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Docstring convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocstringStyle {
    #[default]
    Auto,
    Google,
    Numpy,
    Rest,
}

/// Sections whose items are parameters
const PARAM_SECTIONS: &[&str] = &[
    "args",
    "arguments",
    "parameters",
    "params",
    "keyword args",
    "keyword arguments",
    "other parameters",
    "attributes",
    "receives",
];

const RETURN_SECTIONS: &[&str] = &["returns", "return", "yields", "yield"];

const OTHER_SECTIONS: &[&str] = &[
    "raises",
    "raise",
    "exceptions",
    "except",
    "warns",
    "example",
    "examples",
    "note",
    "notes",
    "warning",
    "warnings",
    "see also",
    "references",
    "todo",
];

const REST_PARAM_KEYS: &[&str] = &[
    "param",
    "parameter",
    "arg",
    "argument",
    "key",
    "keyword",
    "attribute",
];

fn is_section_title(title: &str) -> bool {
    let title = title.to_ascii_lowercase();
    PARAM_SECTIONS.contains(&title.as_str())
        || RETURN_SECTIONS.contains(&title.as_str())
        || OTHER_SECTIONS.contains(&title.as_str())
}

fn default_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[Dd]efault(?:s to| value is| is|s:|:| =)\s*(.+?)\.?$")
            .expect("default regex is valid")
    })
}

fn google_title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z][A-Za-z ]*?)\s*:\s*$").expect("google title regex is valid")
    })
}

fn google_param_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^(\*{0,2}[A-Za-z_][\w.]*)\s*(?:\(([^)]*)\))?\s*:\s*(.*)$")
            .expect("google param regex is valid")
    })
}

fn numpy_underline_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*-{3,}\s*$").expect("numpy underline regex is valid"))
}

fn numpy_type_default_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r",?\s*default(?:\s*[:=]\s*|\s+)(.+)$").expect("numpy default regex is valid")
    })
}

fn rest_field_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^:(\w+)(?:\s+([^:]+?))?\s*:(?:\s+(.*))?$").expect("rest field regex is valid")
    })
}

/// Parse a cleaned docstring
pub fn parse(text: &str, style: DocstringStyle) -> FunctionDoc {
    match style {
        DocstringStyle::Google => parse_google(text),
        DocstringStyle::Numpy => parse_numpy(text),
        DocstringStyle::Rest => parse_rest(text),
        DocstringStyle::Auto => {
            // ties keep the earlier candidate
            let mut best = parse_rest(text);
            for candidate in [parse_google(text), parse_numpy(text)] {
                if metadata_count(&candidate) > metadata_count(&best) {
                    best = candidate;
                }
            }
            best
        }
    }
}

fn metadata_count(doc: &FunctionDoc) -> usize {
    doc.params.len() + usize::from(doc.returns.is_some())
}

/// Dedent a raw docstring the way `inspect.cleandoc` does
pub fn clean(raw: &str) -> String {
    let expanded = expand_tabs(raw);
    let lines: Vec<&str> = expanded.lines().collect();
    if lines.is_empty() {
        return String::new();
    }

    let margin = lines[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min();

    let mut cleaned = vec![lines[0].trim_start().to_string()];
    for &line in &lines[1..] {
        let dedented = match margin {
            _ if line.trim().is_empty() => "",
            Some(m) => line.get(m..).unwrap_or_else(|| line.trim_start()),
            None => line,
        };
        cleaned.push(dedented.to_string());
    }

    while cleaned.last().is_some_and(|l| l.trim().is_empty()) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|l| l.trim().is_empty()).count();

    cleaned[leading..].join("\n")
}

/// Replace tabs with spaces up to the next multiple of 8 columns
fn expand_tabs(text: &str) -> String {
    const TAB_SIZE: usize = 8;
    let mut out = String::with_capacity(text.len());
    let mut column = 0;
    for c in text.chars() {
        match c {
            '\t' => {
                let width = TAB_SIZE - column % TAB_SIZE;
                out.extend(std::iter::repeat(' ').take(width));
                column += width;
            }
            '\n' | '\r' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// First line is the short description, the rest the long description
fn split_description(chunk: &str) -> (Option<String>, Option<String>) {
    let chunk = chunk.trim();
    if chunk.is_empty() {
        return (None, None);
    }
    match chunk.split_once('\n') {
        Some((short, long)) => (non_empty(short), non_empty(long)),
        None => (non_empty(chunk), None),
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Strip a trailing `, optional` from a type
fn split_optional(type_name: &str) -> (Option<String>, bool) {
    let trimmed = type_name.trim();
    match trimmed.strip_suffix("optional") {
        Some(rest) if rest.is_empty() => (None, true),
        Some(rest) if rest.trim_end().ends_with(',') => {
            (non_empty(rest.trim_end().trim_end_matches(',')), true)
        }
        _ => (non_empty(trimmed), false),
    }
}

/// Default value stated in a parameter description
fn default_from_description(description: &str) -> Option<String> {
    let flat = description.split_whitespace().collect::<Vec<_>>().join(" ");
    default_regex()
        .captures(&flat)
        .and_then(|c| c.get(1))
        .and_then(|m| non_empty(m.as_str()))
}

/// Group section lines into items: a line at the base indentation starts an
/// item, deeper lines continue it
fn split_items(lines: &[&str]) -> Vec<Vec<String>> {
    let base = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| indent_of(l))
        .min()
        .unwrap_or(0);

    let mut items: Vec<Vec<String>> = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if indent_of(line) <= base || items.is_empty() {
            items.push(vec![line.trim().to_string()]);
        } else if let Some(item) = items.last_mut() {
            item.push(line.trim().to_string());
        }
    }
    items
}

fn join_lines(lines: &[String]) -> Option<String> {
    non_empty(&lines.join("\n"))
}

/// A titled block of lines
struct Section<'a> {
    title: String,
    lines: Vec<&'a str>,
}

fn parse_google(text: &str) -> FunctionDoc {
    let mut description = Vec::new();
    let mut sections: Vec<Section> = Vec::new();

    for line in text.lines() {
        let title = (indent_of(line) == 0)
            .then(|| google_title_regex().captures(line))
            .flatten()
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .filter(|t| is_section_title(t));

        if let Some(title) = title {
            sections.push(Section {
                title: title.to_ascii_lowercase(),
                lines: Vec::new(),
            });
            continue;
        }

        match sections.last_mut() {
            Some(section) => section.lines.push(line),
            None => description.push(line),
        }
    }

    let (short_description, long_description) = split_description(&description.join("\n"));
    let mut doc = FunctionDoc {
        short_description,
        long_description,
        ..Default::default()
    };

    for section in &sections {
        if PARAM_SECTIONS.contains(&section.title.as_str()) {
            for item in split_items(&section.lines) {
                doc.params.push(google_param(&item));
            }
        } else if RETURN_SECTIONS.contains(&section.title.as_str()) && doc.returns.is_none() {
            doc.returns = google_returns(&section.lines);
        }
    }

    doc
}

fn google_param(item: &[String]) -> ParamDoc {
    let text = item.join("\n");

    let (arg_name, type_spec, description) = match google_param_regex().captures(&text) {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()).to_string(),
            caps.get(2).map(|m| m.as_str().to_string()),
            caps.get(3).and_then(|m| non_empty(m.as_str())),
        ),
        None => match text.split_once(':') {
            Some((name, desc)) => (name.trim().to_string(), None, non_empty(desc)),
            None => (item[0].clone(), None, join_lines(&item[1..])),
        },
    };

    let (type_name, is_optional) = match type_spec {
        Some(spec) => split_optional(&spec),
        None => (None, false),
    };
    let default = description.as_deref().and_then(default_from_description);

    ParamDoc {
        arg_name,
        type_name,
        description,
        default,
        is_optional,
    }
}

fn google_returns(lines: &[&str]) -> Option<ReturnsDoc> {
    let items: Vec<String> = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.trim().to_string())
        .collect();
    let first = items.first()?;

    let returns = match first.split_once(':') {
        Some((type_name, rest)) => {
            let mut description = vec![rest.trim().to_string()];
            description.extend(items[1..].iter().cloned());
            ReturnsDoc {
                type_name: non_empty(type_name),
                description: join_lines(&description),
            }
        }
        None => ReturnsDoc {
            type_name: None,
            description: join_lines(&items),
        },
    };
    Some(returns)
}

fn parse_numpy(text: &str) -> FunctionDoc {
    let lines: Vec<&str> = text.lines().collect();
    let mut description = Vec::new();
    let mut sections: Vec<Section> = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        let is_title = indent_of(line) == 0
            && is_section_title(line.trim())
            && lines
                .get(i + 1)
                .is_some_and(|next| numpy_underline_regex().is_match(next));

        if is_title {
            sections.push(Section {
                title: line.trim().to_ascii_lowercase(),
                lines: Vec::new(),
            });
            i += 2;
            continue;
        }

        match sections.last_mut() {
            Some(section) => section.lines.push(line),
            None => description.push(line),
        }
        i += 1;
    }

    let (short_description, long_description) = split_description(&description.join("\n"));
    let mut doc = FunctionDoc {
        short_description,
        long_description,
        ..Default::default()
    };

    for section in &sections {
        let items = split_items(&section.lines);
        if PARAM_SECTIONS.contains(&section.title.as_str()) {
            doc.params.extend(items.iter().map(|item| numpy_param(item)));
        } else if RETURN_SECTIONS.contains(&section.title.as_str()) && doc.returns.is_none() {
            doc.returns = items.first().map(|item| numpy_returns(item));
        }
    }

    doc
}

fn numpy_param(item: &[String]) -> ParamDoc {
    let header = &item[0];
    let description = join_lines(&item[1..]);

    let (arg_name, type_spec) = match header.split_once(':') {
        Some((name, spec)) => (name.trim().to_string(), spec.trim().to_string()),
        None => (header.trim().to_string(), String::new()),
    };

    let mut default = None;
    let mut type_spec = type_spec;
    if let Some(caps) = numpy_type_default_regex().captures(&type_spec) {
        default = caps.get(1).and_then(|m| non_empty(m.as_str()));
        let start = caps.get(0).map_or(type_spec.len(), |m| m.start());
        type_spec.truncate(start);
    }
    let (type_name, is_optional) = split_optional(&type_spec);

    if default.is_none() {
        default = description.as_deref().and_then(default_from_description);
    }

    ParamDoc {
        arg_name,
        type_name,
        description,
        default,
        is_optional,
    }
}

fn numpy_returns(item: &[String]) -> ReturnsDoc {
    let header = &item[0];
    let type_name = match header.split_once(':') {
        Some((_, type_name)) => non_empty(type_name),
        None => non_empty(header),
    };
    ReturnsDoc {
        type_name,
        description: join_lines(&item[1..]),
    }
}

/// A `:key args: text` field with its continuation lines
struct RestField {
    key: String,
    args: Option<String>,
    text: Vec<String>,
}

fn parse_rest(text: &str) -> FunctionDoc {
    let mut description = Vec::new();
    let mut fields: Vec<RestField> = Vec::new();

    for line in text.lines() {
        let caps = (indent_of(line) == 0)
            .then(|| rest_field_regex().captures(line))
            .flatten();

        if let Some(caps) = caps {
            fields.push(RestField {
                key: caps.get(1).map_or("", |m| m.as_str()).to_ascii_lowercase(),
                args: caps.get(2).map(|m| m.as_str().trim().to_string()),
                text: caps
                    .get(3)
                    .map(|m| vec![m.as_str().trim().to_string()])
                    .unwrap_or_default(),
            });
            continue;
        }

        match fields.last_mut() {
            Some(field) => {
                if !line.trim().is_empty() {
                    field.text.push(line.trim().to_string());
                }
            }
            None => description.push(line),
        }
    }

    let (short_description, long_description) = split_description(&description.join("\n"));
    let mut doc = FunctionDoc {
        short_description,
        long_description,
        ..Default::default()
    };

    let mut types: HashMap<String, String> = HashMap::new();
    let mut returns: Option<ReturnsDoc> = None;

    for field in &fields {
        let text = join_lines(&field.text);
        match field.key.as_str() {
            key if REST_PARAM_KEYS.contains(&key) => {
                let Some(args) = field.args.as_deref() else {
                    continue;
                };
                let (arg_name, type_spec) = match args.rsplit_once(char::is_whitespace) {
                    Some((type_spec, name)) => (name.to_string(), Some(type_spec.to_string())),
                    None => (args.to_string(), None),
                };
                let (type_name, is_optional) = match type_spec {
                    Some(spec) => split_optional(&spec),
                    None => (None, false),
                };
                let default = text.as_deref().and_then(default_from_description);
                doc.params.push(ParamDoc {
                    arg_name,
                    type_name,
                    description: text,
                    default,
                    is_optional,
                });
            }
            "type" => {
                if let (Some(name), Some(type_name)) = (field.args.as_deref(), text) {
                    types.insert(name.to_string(), type_name);
                }
            }
            "returns" | "return" => {
                returns.get_or_insert_with(ReturnsDoc::default).description = text;
            }
            "rtype" => {
                returns.get_or_insert_with(ReturnsDoc::default).type_name = text;
            }
            _ => {}
        }
    }

    for param in &mut doc.params {
        if param.type_name.is_none() {
            if let Some(spec) = types.get(&param.arg_name) {
                let (type_name, is_optional) = split_optional(spec);
                param.type_name = type_name;
                param.is_optional |= is_optional;
            }
        }
    }
    doc.returns = returns;

    doc
}
