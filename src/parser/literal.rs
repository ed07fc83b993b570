// Python literal constants as they appear in the syntax tree

use tree_sitter::Node;

/// Node kinds that are literal constants
const CONSTANT_KINDS: &[&str] = &[
    "string",
    "concatenated_string",
    "integer",
    "float",
    "true",
    "false",
    "none",
    "ellipsis",
];

/// A decoded string literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    pub value: String,
    pub is_bytes: bool,
}

/// Value of a string literal node, `None` for f-strings and non-strings.
///
/// Adjacent literals (`"a" "b"`) are joined like the interpreter does.
pub fn string_value(node: &Node, source: &[u8]) -> Option<StringLiteral> {
    match node.kind() {
        "string" => decode_string(node.utf8_text(source).ok()?),
        "concatenated_string" => {
            let mut value = String::new();
            let mut is_bytes = false;
            let mut cursor = node.walk();
            for part in node.named_children(&mut cursor) {
                if part.kind() == "comment" {
                    continue;
                }
                let literal = string_value(&part, source)?;
                is_bytes |= literal.is_bytes;
                value.push_str(&literal.value);
            }
            Some(StringLiteral { value, is_bytes })
        }
        _ => None,
    }
}

/// Text of a literal constant: string contents, or the source spelling of
/// numbers, booleans, `None` and `...`
pub fn constant_value(node: &Node, source: &[u8]) -> Option<String> {
    if !CONSTANT_KINDS.contains(&node.kind()) {
        return None;
    }
    match node.kind() {
        "string" | "concatenated_string" => string_value(node, source).map(|s| s.value),
        _ => node.utf8_text(source).ok().map(str::to_string),
    }
}

/// Strip prefix and quotes from a string token and decode escapes
fn decode_string(text: &str) -> Option<StringLiteral> {
    let prefix_len = text
        .find(|c: char| c == '"' || c == '\'')
        .unwrap_or(text.len());
    let (prefix, quoted) = text.split_at(prefix_len);
    let prefix = prefix.to_ascii_lowercase();

    if prefix.contains('f') {
        return None;
    }

    let quote_len = if quoted.starts_with("\"\"\"") || quoted.starts_with("'''") {
        3
    } else {
        1
    };
    if quoted.len() < quote_len * 2 {
        return None;
    }
    let body = &quoted[quote_len..quoted.len() - quote_len];

    let is_bytes = prefix.contains('b');
    let value = if prefix.contains('r') {
        body.to_string()
    } else {
        unescape(body, is_bytes)
    };

    Some(StringLiteral { value, is_bytes })
}

/// Decode backslash escapes. `\u`, `\U` and `\N{...}` only exist in text
/// literals; malformed and unknown escapes are kept verbatim.
fn unescape(body: &str, is_bytes: bool) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        match escape {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            // line continuation
            '\n' => {}
            '0'..='7' => {
                let mut digits = String::from(escape);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(&d @ '0'..='7') => {
                            digits.push(d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            'x' => push_hex_escape(&mut out, &mut chars, escape, 2),
            'u' if !is_bytes => push_hex_escape(&mut out, &mut chars, escape, 4),
            'U' if !is_bytes => push_hex_escape(&mut out, &mut chars, escape, 8),
            other => {
                // includes `\N{NAME}`, which needs the Unicode name table
                out.push('\\');
                out.push(other);
            }
        }
    }

    out
}

/// Decode `\x`, `\u` or `\U` followed by exactly `width` hex digits
fn push_hex_escape(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    escape: char,
    width: usize,
) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.peek() {
            Some(&d) if d.is_ascii_hexdigit() => {
                digits.push(d);
                chars.next();
            }
            _ => break,
        }
    }

    let decoded = (digits.len() == width)
        .then(|| u32::from_str_radix(&digits, 16).ok())
        .flatten()
        .and_then(char::from_u32);
    match decoded {
        Some(c) => out.push(c),
        None => {
            out.push('\\');
            out.push(escape);
            out.push_str(&digits);
        }
    }
}
