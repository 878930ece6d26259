//! Bean descriptors: the (type, qualifier) key the runtime looks dependencies up by.
use crate::di::names;
use crate::error::ProcessingError;
use crate::model::{Annotated, Annotation, Typed};
use crate::types::{ClassType, QualifiedNames, TypeNamer, TypeRef};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BeanDescriptor {
    ty: TypeRef,
    qualifier: Option<String>,
}

impl BeanDescriptor {
    pub fn new(ty: TypeRef) -> Self {
        Self { ty, qualifier: None }
    }

    pub fn with_qualifier(mut self, name: impl Into<String>) -> Self {
        self.qualifier = Some(name.into());
        self
    }

    /// Descriptor for a field or parameter. `subject` names the member in errors.
    pub fn for_member<M>(subject: &str, member: &M, qualifiers: &[ClassType]) -> Result<Self, ProcessingError>
    where
        M: Typed + Annotated,
    {
        let descriptor = Self::new(member.ty().clone());
        Ok(match qualifier_of(subject, member.annotations(), qualifiers)? {
            Some(name) => descriptor.with_qualifier(name),
            None => descriptor,
        })
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    /// `new Descriptor<>(Widget.class)` plus a `.setName(..)` continuation line when qualified.
    pub fn code(&self, namer: &dyn TypeNamer) -> String {
        let mut out = format!("new {}<>({}.class)", namer.name_of(&names::DESCRIPTOR), class_literal(&self.ty, namer));
        for line in setup_calls(self.qualifier()) {
            out.push_str("\n            .");
            out.push_str(&line);
        }
        out
    }
}

/// Calls applied to a live descriptor, without receiver or terminator.
pub fn setup_calls(qualifier: Option<&str>) -> Vec<String> {
    qualifier
        .map(|name| format!("setName({})", Value::from(name).code(&QualifiedNames)))
        .into_iter()
        .collect()
}

/// The single qualifier name among `annotations`, if any.
pub fn qualifier_of(
    subject: &str,
    annotations: &[Annotation],
    qualifiers: &[ClassType],
) -> Result<Option<String>, ProcessingError> {
    let found: Vec<&Annotation> = annotations.iter().filter(|a| qualifiers.contains(a.ty())).collect();
    match found.as_slice() {
        [] => Ok(None),
        [one] => match one.value() {
            Some(Value::Str(name)) => Ok(Some(name.clone())),
            _ => Err(ProcessingError::structural(
                subject,
                format!("@{} must carry a string value", one.ty()),
            )),
        },
        many => Err(ProcessingError::QualifierConflict {
            name: subject.to_string(),
            found: many.iter().map(|a| a.code(&QualifiedNames)).collect(),
        }),
    }
}

/// The raw type as written before `.class`.
pub(crate) fn class_literal(ty: &TypeRef, namer: &dyn TypeNamer) -> String {
    match ty {
        TypeRef::Class(c) => namer.name_of(&c.erased()),
        TypeRef::Array(inner) => format!("{}[]", class_literal(inner, namer)),
        other => other.code(namer),
    }
}
