use crate::builder::{Owner, Standalone};
use crate::error::DefinitionError;
use crate::model::{Annotation, Field, Modifiers, Visibility};
use crate::types::{check_identifier, TypeRef};
use crate::value::Value;

pub struct FieldBuilder<P> {
    parent: P,
    name: String,
    ty: TypeRef,
    modifiers: Modifiers,
    annotations: Vec<Annotation>,
    value: Option<Value>,
}

impl FieldBuilder<Standalone> {
    pub fn new(ty: impl Into<TypeRef>, name: impl Into<String>) -> Self {
        Self::owned(Standalone, ty.into(), name.into())
    }

    pub fn build(self) -> Result<Field, DefinitionError> {
        self.assemble().map(|(_, f)| f)
    }
}

impl<P> FieldBuilder<P> {
    pub(crate) fn owned(parent: P, ty: TypeRef, name: String) -> Self {
        Self {
            parent,
            name,
            ty,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            value: None,
        }
    }

    pub fn set_visibility(mut self, visibility: Visibility) -> Self {
        self.modifiers.visibility = visibility;
        self
    }

    pub fn set_static(mut self, is_static: bool) -> Self {
        self.modifiers.is_static = is_static;
        self
    }

    pub fn set_final(mut self, is_final: bool) -> Self {
        self.modifiers.is_final = is_final;
        self
    }

    pub fn add_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Initial value; checked against the field type when the field is assembled.
    pub fn set_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    fn assemble(self) -> Result<(P, Field), DefinitionError> {
        check_identifier(&self.name)?;
        if self.ty.is_void() {
            return Err(DefinitionError::illegal(format!("field {} cannot be void", self.name)));
        }
        if let Some(v) = &self.value {
            if !v.is_assignable_to(&self.ty) {
                return Err(DefinitionError::TypeMismatch {
                    expected: self.ty.to_string(),
                    found: v.value_type().to_string(),
                });
            }
        }
        let field = Field {
            name: self.name,
            ty: self.ty,
            modifiers: self.modifiers,
            annotations: self.annotations,
            value: self.value,
        };
        Ok((self.parent, field))
    }
}

impl<P: Owner<Field>> FieldBuilder<P> {
    pub fn finish(self) -> Result<P, DefinitionError> {
        let (mut parent, field) = self.assemble()?;
        parent.adopt(field)?;
        Ok(parent)
    }
}
