use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use crate::config::ExtensionConfig;

static CLASS_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:export[ \t]+)?(?:abstract[ \t]+)?class[ \t]+(\w+)(?:[ \t]+extends[ \t]+(\w+))?")
        .expect("class declaration pattern is valid")
});

/// Hand-written code merged into generated classes.
///
/// Blocks are keyed by class name. A class in the extended set has a
/// hand-written subclass, so its generated code is emitted as `<Name>Base`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionBundle {
    classes: IndexMap<String, String>,
    extended: IndexSet<String>,
    preamble: Option<String>,
}

impl ExtensionBundle {
    pub fn new(
        classes: impl IntoIterator<Item = (String, String)>,
        extended: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            classes: classes.into_iter().collect(),
            extended: extended.into_iter().collect(),
            preamble: None,
        }
    }

    /// Split a TypeScript source file into per-class blocks.
    ///
    /// `class Pet extends PetBase` marks `Pet` as extended. Code outside any
    /// class becomes the preamble.
    pub fn from_typescript(source: &str) -> Self {
        let mut bundle = Self::default();
        let mut rest = String::new();
        let mut cursor = 0;

        for captures in CLASS_DECLARATION.captures_iter(source) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if whole.start() < cursor {
                continue;
            }
            let Some(end) = block_end(source, whole.end()) else {
                log::warn!("class '{}' in extension code has no closing brace", name.as_str());
                continue;
            };

            rest.push_str(&source[cursor..whole.start()]);
            let name = name.as_str().to_string();
            if captures.get(2).map(|m| m.as_str()) == Some(format!("{name}Base").as_str()) {
                bundle.extended.insert(name.clone());
            }
            let block = source[whole.start()..end].trim().to_string();
            log::debug!("extension code for class '{}'", name);
            bundle.classes.insert(name, block);
            cursor = end;
        }
        rest.push_str(&source[cursor..]);

        let rest = rest.trim();
        if !rest.is_empty() {
            bundle.preamble = Some(rest.to_string());
        }
        bundle
    }

    /// Combine the configured code file (already read by the caller) with
    /// inline blocks and extended names from the configuration.
    pub fn from_config(config: &ExtensionConfig, code_file: Option<&str>) -> Self {
        let mut bundle = code_file.map(Self::from_typescript).unwrap_or_default();
        for (name, block) in &config.classes {
            bundle.classes.insert(name.clone(), block.clone());
        }
        bundle.extended.extend(config.extended.iter().cloned());
        bundle
    }

    pub fn is_extended(&self, name: &str) -> bool {
        self.extended.contains(name)
    }

    pub fn block(&self, name: &str) -> Option<&str> {
        self.classes.get(name).map(String::as_str)
    }

    pub fn preamble(&self) -> Option<&str> {
        self.preamble.as_deref()
    }

    /// Name the generated class is emitted under.
    pub fn class_name_for(&self, name: &str) -> String {
        if self.is_extended(name) {
            format!("{name}Base")
        } else {
            name.to_string()
        }
    }

    /// Generated code followed by the hand-written block for `name`, if any.
    pub fn append(&self, name: &str, generated: String) -> String {
        let Some(block) = self.block(name) else {
            if self.is_extended(name) {
                log::debug!("extended class '{}' has no extension code", name);
            }
            return generated;
        };
        let separator = if generated.ends_with('\n') { "\n" } else { "\n\n" };
        format!("{generated}{separator}{block}")
    }
}

/// Byte offset just past the brace that closes the first block opened at or
/// after `from`. Skips strings, template literals and comments.
fn block_end(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut depth = 0usize;
    let mut opened = false;
    let mut i = from;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                depth += 1;
                opened = true;
            }
            b'}' if opened => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    None
}
