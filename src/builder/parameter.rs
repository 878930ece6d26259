use crate::builder::{Owner, Standalone};
use crate::error::DefinitionError;
use crate::model::{Annotation, Parameter};
use crate::types::{check_identifier, TypeRef};

pub struct ParameterBuilder<P> {
    parent: P,
    name: String,
    ty: TypeRef,
    is_final: bool,
    annotations: Vec<Annotation>,
}

impl ParameterBuilder<Standalone> {
    pub fn new(ty: impl Into<TypeRef>, name: impl Into<String>) -> Self {
        Self::owned(Standalone, ty.into(), name.into())
    }

    pub fn build(self) -> Result<Parameter, DefinitionError> {
        self.assemble().map(|(_, p)| p)
    }
}

impl<P> ParameterBuilder<P> {
    pub(crate) fn owned(parent: P, ty: TypeRef, name: String) -> Self {
        Self { parent, name, ty, is_final: false, annotations: Vec::new() }
    }

    pub fn set_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn add_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    fn assemble(self) -> Result<(P, Parameter), DefinitionError> {
        check_identifier(&self.name)?;
        if self.ty.is_void() {
            return Err(DefinitionError::illegal(format!("parameter {} cannot be void", self.name)));
        }
        let param = Parameter {
            name: self.name,
            ty: self.ty,
            is_final: self.is_final,
            annotations: self.annotations,
        };
        Ok((self.parent, param))
    }
}

impl<P: Owner<Parameter>> ParameterBuilder<P> {
    /// Hand the parameter to the owning method or constructor builder.
    pub fn finish(self) -> Result<P, DefinitionError> {
        let (mut parent, param) = self.assemble()?;
        parent.adopt(param)?;
        Ok(parent)
    }
}

/// Shared by method and constructor builders.
pub(crate) fn push_unique(list: &mut Vec<Parameter>, param: Parameter) -> Result<(), DefinitionError> {
    if list.iter().any(|p| p.name == param.name) {
        return Err(DefinitionError::illegal(format!("duplicate parameter {}", param.name)));
    }
    list.push(param);
    Ok(())
}
