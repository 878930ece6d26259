//! Configuration values handed to the builders, the renderer and the generators.
//! No process-wide state: callers construct these and pass them in.
use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;

use crate::di::names;
use crate::model::Annotation;
use crate::types::ClassType;
use crate::value::Value;

/// The self-describing marker every built class declaration carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMarker {
    pub annotation: ClassType,
    pub value: String,
    /// Fixed stamp for reproducible output; `None` means "now".
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for GeneratedMarker {
    fn default() -> Self {
        Self {
            annotation: ClassType::new("javax.annotation.processing", "Generated"),
            value: "tendril".to_string(),
            timestamp: None,
        }
    }
}

impl GeneratedMarker {
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// ISO-8601 timestamp, UTC, millisecond precision.
    pub fn stamp(&self) -> String {
        self.timestamp
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// `@Generated(value = .., date = ..)`
    pub fn annotation(&self) -> Annotation {
        let attributes = IndexMap::from([
            ("value".to_string(), Value::from(self.value.as_str())),
            ("date".to_string(), Value::from(self.stamp())),
        ]);
        Annotation::from_parts(self.annotation.clone(), attributes)
    }
}

/// Packages whose types never need an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPolicy {
    pub implicit_packages: BTreeSet<String>,
}

impl Default for ImportPolicy {
    fn default() -> Self {
        Self { implicit_packages: BTreeSet::from(["java.lang".to_string()]) }
    }
}

impl ImportPolicy {
    pub fn with_implicit(mut self, package: impl Into<String>) -> Self {
        self.implicit_packages.insert(package.into());
        self
    }

    pub fn is_implicit(&self, package: &str) -> bool {
        package.is_empty() || self.implicit_packages.contains(package)
    }
}

/// Lifecycle marker -> recipe base type, in registration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleTable {
    entries: IndexMap<ClassType, ClassType>,
}

impl Default for LifecycleTable {
    fn default() -> Self {
        Self::empty()
            .register(names::SINGLETON.clone(), names::SINGLETON_RECIPE.clone())
            .register(names::FACTORY.clone(), names::FACTORY_RECIPE.clone())
    }
}

impl LifecycleTable {
    pub fn empty() -> Self {
        Self { entries: IndexMap::new() }
    }

    pub fn register(mut self, marker: ClassType, recipe_base: ClassType) -> Self {
        self.entries.insert(marker, recipe_base);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ClassType, &ClassType)> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeConfig {
    pub lifecycles: LifecycleTable,
    /// Annotation types whose `value` names a bean.
    pub qualifiers: Vec<ClassType>,
    /// Add the registry marker so the runtime's own discovery finds the recipe.
    pub annotate_registry: bool,
    pub marker: GeneratedMarker,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self {
            lifecycles: LifecycleTable::default(),
            qualifiers: vec![names::NAMED.clone()],
            annotate_registry: true,
            marker: GeneratedMarker::default(),
        }
    }
}
