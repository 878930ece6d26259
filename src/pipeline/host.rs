//! What the pipeline needs from the host that discovers annotated elements.
use crate::error::LoadError;
use crate::model::{ClassDecl, Method};
use crate::types::ClassType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Type,
    Method,
    /// Packages, variables, modules... never processed.
    Other,
}

/// Opaque handle to a discovered element.
pub trait Element {
    fn kind(&self) -> ElementKind;

    /// `a.b.C` for types, `a.b.C::method` for methods.
    fn qualified_name(&self) -> String;

    /// Parameter count as the host type system sees it; only meaningful for methods.
    fn parameter_type_count(&self) -> usize;
}

/// One batch of discovered elements.
pub trait RoundEnvironment {
    type Element: Element;

    fn error_raised(&self) -> bool;

    fn processing_over(&self) -> bool;

    fn elements_annotated_with(&self, annotation: &ClassType) -> Vec<Self::Element>;
}

/// Turns host elements into declaration model nodes.
pub trait Loader<E> {
    fn load_type(&self, element: &E) -> Result<ClassDecl, LoadError>;

    /// The enclosing type and the method itself.
    fn load_method(&self, element: &E) -> Result<(ClassType, Method), LoadError>;
}

pub trait Assignability {
    /// `true` if `candidate` is `target` or one of its subtypes.
    fn is_assignable(&self, candidate: &ClassType, target: &ClassType) -> bool;
}
