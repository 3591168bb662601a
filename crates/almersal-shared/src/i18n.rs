//! English/Arabic message catalogue.
//!
//! Catalogues are embedded at compile time and flattened into dotted keys
//! (`providers.WU`, `channel.CASH`). A missing key renders as the key itself.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AlmersalError;

const EN_JSON: &str = include_str!("../messages/en.json");
const AR_JSON: &str = include_str!("../messages/ar.json");

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Self::Ar)
    }

    /// Pick the first supported language from an `Accept-Language` header.
    pub fn from_accept_language(header: &str) -> Option<Self> {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .find_map(|tag| {
                let primary = tag.trim().split('-').next().unwrap_or("");
                primary.parse().ok()
            })
    }
}

impl FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ar" => Ok(Self::Ar),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Messages {
    entries: HashMap<String, String>,
}

static EN: OnceLock<Messages> = OnceLock::new();
static AR: OnceLock<Messages> = OnceLock::new();

impl Messages {
    /// Parse a catalogue from JSON.
    pub fn parse(json: &str) -> Result<Self, AlmersalError> {
        let root: Value = serde_json::from_str(json)?;
        let mut entries = HashMap::new();
        flatten("", &root, &mut entries);
        Ok(Self { entries })
    }

    fn slot(locale: Locale) -> (&'static OnceLock<Messages>, &'static str) {
        match locale {
            Locale::En => (&EN, EN_JSON),
            Locale::Ar => (&AR, AR_JSON),
        }
    }

    /// Parse every embedded catalogue. Call once at startup so a broken
    /// catalogue fails the process instead of degrading receipts.
    pub fn preload() -> Result<(), AlmersalError> {
        for locale in [Locale::En, Locale::Ar] {
            let (cell, json) = Self::slot(locale);
            if cell.get().is_none() {
                let _ = cell.set(Self::parse(json)?);
            }
        }
        Ok(())
    }

    /// Embedded catalogue for `locale`, parsed on first use. Without a
    /// successful [`Messages::preload`], a catalogue that fails to parse
    /// renders every label as its key.
    pub fn get(locale: Locale) -> &'static Messages {
        let (cell, json) = Self::slot(locale);
        cell.get_or_init(|| {
            Self::parse(json).unwrap_or_else(|_| Self {
                entries: HashMap::new(),
            })
        })
    }

    /// Translate `key`, falling back to the key itself.
    pub fn t<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(key)
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                flatten(&key, v, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}
