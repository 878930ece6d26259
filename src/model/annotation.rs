use indexmap::IndexMap;

use crate::error::DefinitionError;
use crate::model::{ClassDecl, ClassKind, Typed};
use crate::types::{ClassType, TypeNamer};
use crate::value::Value;

/// An applied annotation: its type plus named attribute values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    ty: ClassType,
    attributes: IndexMap<String, Value>,
}

impl std::hash::Hash for Annotation {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.ty.hash(state);
        let mut attrs: Vec<(&String, &Value)> = self.attributes.iter().collect();
        attrs.sort_by(|a, b| a.0.cmp(b.0));
        for (k, v) in attrs {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl Annotation {
    /// `@Marker`
    pub fn marker(ty: ClassType) -> Self {
        Self { ty, attributes: IndexMap::new() }
    }

    /// `@Single(value)`
    pub fn single(ty: ClassType, value: impl Into<Value>) -> Self {
        let mut attributes = IndexMap::new();
        attributes.insert("value".to_string(), value.into());
        Self { ty, attributes }
    }

    /// Attributes whose names are known to be valid identifiers.
    pub(crate) fn from_parts(ty: ClassType, attributes: IndexMap<String, Value>) -> Self {
        Self { ty, attributes }
    }

    pub fn with_attributes<K, I>(ty: ClassType, attributes: I) -> Result<Self, DefinitionError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut map = IndexMap::new();
        for (name, value) in attributes {
            let name = name.into();
            crate::types::check_identifier(&name)?;
            if map.contains_key(&name) {
                return Err(DefinitionError::DuplicateAttribute {
                    annotation: ty.fully_qualified_name(),
                    attribute: name,
                });
            }
            map.insert(name, value);
        }
        Ok(Self { ty, attributes: map })
    }

    pub fn ty(&self) -> &ClassType {
        &self.ty
    }

    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn value(&self) -> Option<&Value> {
        self.attribute("value")
    }

    pub fn visit_classes<'a>(&'a self, f: &mut dyn FnMut(&'a ClassType)) {
        self.ty.visit_classes(f);
        for v in self.attributes.values() {
            v.visit_classes(f);
        }
    }

    /// Attributes are sorted by name; a lone `value` attribute uses the shorthand form.
    pub fn code(&self, namer: &dyn TypeNamer) -> String {
        let name = format!("@{}", namer.name_of(&self.ty));
        if self.attributes.is_empty() {
            return name;
        }
        if self.attributes.len() == 1 {
            if let Some(v) = self.value() {
                return format!("{name}({})", v.code(namer));
            }
        }
        let mut attrs: Vec<(&String, &Value)> = self.attributes.iter().collect();
        attrs.sort_by(|a, b| a.0.cmp(b.0));
        let parts: Vec<String> = attrs.iter().map(|(k, v)| format!("{k} = {}", v.code(namer))).collect();
        format!("{name}({})", parts.join(", "))
    }

    /// Check the attributes against the annotation type's declaration: every
    /// attribute must be declared, fit the declared return type, and attributes
    /// without a default must be present.
    pub fn validate_against(&self, decl: &ClassDecl) -> Result<(), DefinitionError> {
        if !matches!(decl.kind(), ClassKind::Annotation) || decl.ty().erased() != self.ty.erased() {
            return Err(DefinitionError::definition(
                decl.ty().fully_qualified_name(),
                format!("is not the declaration of @{}", self.ty),
            ));
        }
        for (name, value) in &self.attributes {
            let Some(slot) = decl.methods().iter().find(|m| m.name() == name) else {
                return Err(DefinitionError::illegal(format!("@{} has no attribute `{name}`", self.ty)));
            };
            if !value.is_assignable_to(slot.ty()) {
                return Err(DefinitionError::TypeMismatch {
                    expected: slot.ty().to_string(),
                    found: value.value_type().to_string(),
                });
            }
        }
        for required in decl.methods().iter().filter(|m| m.default_value().is_none()) {
            if !self.attributes.contains_key(required.name()) {
                return Err(DefinitionError::illegal(format!(
                    "@{} is missing required attribute `{}`",
                    self.ty,
                    required.name()
                )));
            }
        }
        Ok(())
    }
}
