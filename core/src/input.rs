use std::collections::HashMap;
use anyhow::{anyhow, Result};

/// Free words plus `key:value` pairs, as typed after `kpss add`.
#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub words: Vec<String>,
    pub metadata: HashMap<String, String>,
}

impl ParsedInput {
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut words = Vec::new();
    let mut metadata = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            // Only purely alphabetic keys count; "1:Giriş" stays topic text
            if !key.is_empty() && key.chars().all(char::is_alphabetic) {
                metadata.insert(key.to_lowercase(), value.to_string());
                continue;
            }
        }
        words.push(arg.clone());
    }

    ParsedInput { words, metadata }
}

/// Resolves `key` against `candidates` by exact match first, then by unique
/// prefix (case-insensitive).
pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    let lowered = key.to_lowercase();

    if let Some(exact) = candidates.iter().find(|c| c.to_lowercase() == lowered) {
        return Ok(exact.to_string());
    }

    let matches: Vec<&str> = candidates
        .iter()
        .filter(|c| c.to_lowercase().starts_with(&lowered))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}
