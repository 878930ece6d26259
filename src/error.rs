//! Error taxonomy for model construction and annotation processing.
use thiserror::Error;

/// Raised while assembling declarations: illegal names, members a kind forbids,
/// values that do not fit the slot they are placed in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("{0}")]
    IllegalArgument(String),

    /// A construct the declaration kind of `owner` cannot carry.
    #[error("{owner}: {reason}")]
    Definition { owner: String, reason: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("attribute `{attribute}` specified more than once on @{annotation}")]
    DuplicateAttribute { annotation: String, attribute: String },

    #[error("malformed type notation `{notation}`: {reason}")]
    MalformedType { notation: String, reason: String },
}

impl DefinitionError {
    pub(crate) fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalArgument(reason.into())
    }

    pub(crate) fn definition(owner: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Definition { owner: owner.into(), reason: reason.into() }
    }
}

/// Fatal for the current processing round. Every variant names the offending
/// declaration or member by its fully-qualified name.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Unable to use {name} - {reason}")]
    StructuralValidation { name: String, reason: String },

    #[error("{name}: host declares {declared} parameter type(s) but {modeled} parameter(s) were modeled")]
    CardinalityMismatch { name: String, declared: usize, modeled: usize },

    #[error("{}", lifecycle_message(.name, .found))]
    LifecycleConflict { name: String, found: Vec<String> },

    #[error("{name} has multiple qualifiers indicated [{}]", .found.join(", "))]
    QualifierConflict { name: String, found: Vec<String> },

    #[error("{name}: illegal declaration - {source}")]
    IllegalBuilderUse {
        name: String,
        #[source]
        source: DefinitionError,
    },

    #[error("{name}: {reason}")]
    NotApplicable { name: String, reason: String },

    #[error("{name}: failed to load element - {reason}")]
    Load { name: String, reason: String },

    #[error("{name}: failed to write generated source")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProcessingError {
    pub(crate) fn structural(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StructuralValidation { name: name.into(), reason: reason.into() }
    }

    pub(crate) fn not_applicable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotApplicable { name: name.into(), reason: reason.into() }
    }

    pub(crate) fn builder(name: impl Into<String>) -> impl FnOnce(DefinitionError) -> Self {
        let name = name.into();
        move |source| Self::IllegalBuilderUse { name, source }
    }

    /// Fully-qualified name of the declaration the error is about.
    pub fn subject(&self) -> &str {
        match self {
            Self::StructuralValidation { name, .. }
            | Self::CardinalityMismatch { name, .. }
            | Self::LifecycleConflict { name, .. }
            | Self::QualifierConflict { name, .. }
            | Self::IllegalBuilderUse { name, .. }
            | Self::NotApplicable { name, .. }
            | Self::Load { name, .. }
            | Self::Write { name, .. } => name,
        }
    }
}

fn lifecycle_message(name: &str, found: &[String]) -> String {
    if found.is_empty() {
        format!("{name} must have a single life cycle indicated")
    } else {
        format!("{name} has multiple life cycles indicated [{}]", found.join(", "))
    }
}

/// Failure reported by a loader collaborator for a single element.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct LoadError(pub String);

impl From<DefinitionError> for LoadError {
    fn from(err: DefinitionError) -> Self {
        LoadError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_conflict_names_every_marker() {
        let none = ProcessingError::LifecycleConflict { name: "a.B".into(), found: vec![] };
        assert_eq!(none.to_string(), "a.B must have a single life cycle indicated");

        let many = ProcessingError::LifecycleConflict {
            name: "a.B".into(),
            found: vec!["x.Singleton".into(), "x.Factory".into()],
        };
        assert_eq!(many.to_string(), "a.B has multiple life cycles indicated [x.Singleton, x.Factory]");
        assert_eq!(many.subject(), "a.B");
    }
}
