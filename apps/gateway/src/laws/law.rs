//! Law definitions and the law book.
//!
//! A law book is parsed from a declarative YAML or JSON document. Loading is
//! all-or-nothing: a single malformed law rejects the whole document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use validator::Validate;

use super::condition::Condition;
use super::verdict::{Decision, DEFAULT_LAW_ID};
use crate::analysis::AnalysisReport;
use crate::error::{GatewayError, Result};

/// Priority given to laws that do not declare one.
pub const DEFAULT_PRIORITY: i64 = 999;

/// A declarative rule: when `condition` holds, the decision is `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Law {
    pub id: String,
    pub name: String,
    /// Lower number = higher precedence
    pub priority: i64,
    pub condition: Condition,
    pub action: Decision,
    pub description: String,
}

impl Law {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        priority: i64,
        condition: Condition,
        action: Decision,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            priority,
            condition,
            action,
            description: description.into(),
        }
    }
}

/// Law as written in the source document, before validation
#[derive(Debug, Deserialize, Validate)]
struct RawLaw {
    #[validate(length(min = 1))]
    id: String,
    #[validate(length(min = 1))]
    name: String,
    #[serde(default = "default_priority")]
    priority: i64,
    #[serde(default)]
    condition: BTreeMap<String, Value>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    description: String,
}

fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}

impl RawLaw {
    fn into_law(self) -> Result<Law> {
        let location = format!("law '{}'", self.id);

        self.validate()
            .map_err(|e| GatewayError::from(e).within(&location))?;

        let action = self
            .action
            .as_deref()
            .ok_or_else(|| GatewayError::Config("missing action".to_string()).within(&location))?
            .parse::<Decision>()
            .map_err(|e| GatewayError::Config(e).within(&location))?;

        let condition = Condition::parse(&self.condition).map_err(|e| e.within(&location))?;

        Ok(Law {
            id: self.id,
            name: self.name,
            priority: self.priority,
            condition,
            action,
            description: self.description,
        })
    }
}

/// Top-level document structure
#[derive(Debug, Deserialize)]
struct LawFile {
    #[serde(default)]
    laws: Vec<RawLaw>,
}

/// Source format of a law document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LawFormat {
    Yaml,
    Json,
}

impl LawFormat {
    /// `.json` is JSON, everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => LawFormat::Json,
            _ => LawFormat::Yaml,
        }
    }
}

/// An immutable, evaluation-ordered set of laws.
///
/// Laws are sorted by priority ascending; equal priorities keep declaration order.
#[derive(Debug, Clone)]
pub struct LawBook {
    laws: Vec<Law>,
    source: Option<PathBuf>,
    loaded_at: DateTime<Utc>,
}

impl Default for LawBook {
    fn default() -> Self {
        Self::empty()
    }
}

impl LawBook {
    /// A book with no laws: every evaluation falls through to the default.
    pub fn empty() -> Self {
        Self {
            laws: Vec::new(),
            source: None,
            loaded_at: Utc::now(),
        }
    }

    /// Build from already-typed laws (declaration order = slice order).
    pub fn from_laws(laws: Vec<Law>) -> Result<Self> {
        check_ids(&laws)?;
        Ok(Self::ordered(laws))
    }

    /// Parse a document. Fails on the first malformed law.
    pub fn parse(content: &str, format: LawFormat) -> Result<Self> {
        if content.trim().is_empty() {
            warn!("Law document is empty, every request will fall through to DEFAULT");
            return Ok(Self::empty());
        }

        let file: LawFile = match format {
            LawFormat::Yaml => serde_yaml::from_str(content)?,
            LawFormat::Json => serde_json::from_str(content)?,
        };

        let laws = file
            .laws
            .into_iter()
            .map(RawLaw::into_law)
            .collect::<Result<Vec<_>>>()?;

        Self::from_laws(laws)
    }

    /// Read and parse a law file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Config(format!("cannot read law file {}: {}", path.display(), e))
        })?;

        let mut book = Self::parse(&content, LawFormat::from_path(path))
            .map_err(|e| e.within(path.display()))?;
        book.source = Some(path.to_path_buf());

        info!("Loaded {} laws from {}", book.len(), path.display());
        Ok(book)
    }

    fn ordered(mut laws: Vec<Law>) -> Self {
        // sort_by_key is stable
        laws.sort_by_key(|law| law.priority);
        Self {
            laws,
            source: None,
            loaded_at: Utc::now(),
        }
    }

    /// Laws in evaluation order
    pub fn laws(&self) -> &[Law] {
        &self.laws
    }

    /// First law whose condition matches, in evaluation order.
    pub fn first_match(&self, report: &AnalysisReport) -> Option<&Law> {
        self.laws.iter().find(|law| law.condition.matches(report))
    }

    pub fn len(&self) -> usize {
        self.laws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laws.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

fn check_ids(laws: &[Law]) -> Result<()> {
    let mut seen = HashSet::new();
    for law in laws {
        if law.id == DEFAULT_LAW_ID {
            return Err(GatewayError::Config(format!(
                "law id '{}' is reserved for the fallback verdict",
                DEFAULT_LAW_ID
            )));
        }
        if !seen.insert(law.id.as_str()) {
            return Err(GatewayError::Config(format!("duplicate law id '{}'", law.id)));
        }
    }
    Ok(())
}
