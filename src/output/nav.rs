// Navigation entries and the YAML manifest they are merged into

use crate::error::{Error, Result};
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Key replaced in the manifest
pub const NAV_KEY: &str = "nav";

/// One entry of the navigation tree, serialized as a single-key mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEntry {
    /// `{ title: path }`
    Page { title: String, path: String },
    /// `{ title: [entries] }`
    Section { title: String, children: Vec<NavEntry> },
}

impl NavEntry {
    pub fn page(title: &str, path: &str) -> Self {
        NavEntry::Page {
            title: title.to_string(),
            path: path.to_string(),
        }
    }

    pub fn section(title: &str, children: Vec<NavEntry>) -> Self {
        NavEntry::Section {
            title: title.to_string(),
            children,
        }
    }
}

impl Serialize for NavEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            NavEntry::Page { title, path } => map.serialize_entry(title, path)?,
            NavEntry::Section { title, children } => map.serialize_entry(title, children)?,
        }
        map.end()
    }
}

/// A YAML site manifest whose `nav` key is regenerated.
///
/// The parsed document is only used for validation and lookups. Saving
/// splices the new `nav` block into the original text, so comments, tags such
/// as `!!python/name:` or `!ENV`, and the layout of every other key survive.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    text: String,
    document: Mapping,
}

impl Manifest {
    /// Read the manifest at `path`. Empty documents load as an empty mapping.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
        })?;

        let document = match serde_yaml::from_str::<Value>(&text)? {
            Value::Null => Mapping::new(),
            Value::Mapping(mapping) => mapping,
            _ => return Err(Error::manifest(path, "top level must be a mapping")),
        };

        Ok(Self {
            path: path.to_path_buf(),
            text,
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current value of the `nav` key
    pub fn nav(&self) -> Option<&Value> {
        self.document.get(NAV_KEY)
    }

    /// Look up any top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.document.get(key)
    }

    /// Replace `nav` wholesale, appending the key when it is missing
    pub fn set_nav(&mut self, entries: &[NavEntry]) -> Result<()> {
        let nav = serde_yaml::to_value(entries)?;

        let mut block = Mapping::new();
        block.insert(Value::String(NAV_KEY.to_string()), nav.clone());
        let rendered = serde_yaml::to_string(&block)?;

        self.text = match nav_block_range(&self.text) {
            Some(range) => {
                let mut text = String::with_capacity(self.text.len() + rendered.len());
                text.push_str(&self.text[..range.start]);
                text.push_str(&rendered);
                text.push_str(&self.text[range.end..]);
                text
            }
            None => {
                let mut text = self.text.clone();
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&rendered);
                text
            }
        };
        self.document.insert(Value::String(NAV_KEY.to_string()), nav);
        Ok(())
    }

    /// Write the manifest back to where it was loaded from
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, &self.text)?;
        Ok(())
    }
}

fn nav_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(?:nav|"nav"|'nav')[ \t]*:(?:[ \t]|$)"#).expect("nav key regex is valid")
    })
}

/// Byte range of the top-level `nav` entry: its key line and every line that
/// belongs to its value. Comments and blank lines after the last value line
/// are left to whatever follows.
fn nav_block_range(text: &str) -> Option<Range<usize>> {
    let mut offset = 0;
    let mut start = None;
    let mut end = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let content = line.trim_end_matches(['\n', '\r']);

        if start.is_none() {
            if nav_key_regex().is_match(content) {
                start = Some(line_start);
                end = offset;
            }
            continue;
        }

        let trimmed = content.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indented = content.len() != trimmed.len();
        // block sequences may sit at the key's own column
        let sequence_item = trimmed == "-" || trimmed.starts_with("- ");
        if indented || sequence_item {
            end = offset;
        } else {
            break;
        }
    }

    start.map(|start| start..end)
}
