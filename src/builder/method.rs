use crate::builder::parameter::push_unique;
use crate::builder::{Owner, ParameterBuilder, Standalone};
use crate::error::DefinitionError;
use crate::model::{Annotation, Method, Modifiers, Parameter, Visibility};
use crate::types::{check_identifier, GenericParam, TypeRef};
use crate::value::Value;

/// Builds a method. Without code the method is abstract; whether that is legal
/// is decided by the owning class builder.
pub struct MethodBuilder<P> {
    parent: P,
    name: String,
    return_type: TypeRef,
    modifiers: Modifiers,
    annotations: Vec<Annotation>,
    generics: Vec<GenericParam>,
    parameters: Vec<Parameter>,
    body: Option<Vec<String>>,
    default_value: Option<Value>,
}

impl MethodBuilder<Standalone> {
    pub fn new(return_type: impl Into<TypeRef>, name: impl Into<String>) -> Self {
        Self::owned(Standalone, return_type.into(), name.into())
    }

    pub fn build(self) -> Result<Method, DefinitionError> {
        self.assemble().map(|(_, m)| m)
    }
}

impl<P> MethodBuilder<P> {
    pub(crate) fn owned(parent: P, return_type: TypeRef, name: String) -> Self {
        Self {
            parent,
            name,
            return_type,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            generics: Vec::new(),
            parameters: Vec::new(),
            body: None,
            default_value: None,
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

    pub fn add_generic(mut self, generic: GenericParam) -> Self {
        self.generics.push(generic);
        self
    }

    pub fn build_parameter(self, ty: impl Into<TypeRef>, name: impl Into<String>) -> ParameterBuilder<Self> {
        ParameterBuilder::owned(self, ty.into(), name.into())
    }

    pub fn add_parameter(mut self, param: Parameter) -> Result<Self, DefinitionError> {
        push_unique(&mut self.parameters, param)?;
        Ok(self)
    }

    /// Append body lines; a line may itself contain newlines.
    pub fn add_code<I>(mut self, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.body.get_or_insert_with(Vec::new).extend(lines.into_iter().map(Into::into));
        self
    }

    /// Give the method a body with no statements.
    pub fn empty_implementation(mut self) -> Self {
        self.body.get_or_insert_with(Vec::new);
        self
    }

    /// Default of an annotation attribute.
    pub fn set_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    fn assemble(self) -> Result<(P, Method), DefinitionError> {
        check_identifier(&self.name)?;
        for g in &self.generics {
            check_identifier(&g.name)?;
        }
        let method = Method {
            name: self.name,
            return_type: self.return_type,
            modifiers: self.modifiers,
            annotations: self.annotations,
            generics: self.generics,
            parameters: self.parameters,
            body: self.body,
            default_value: self.default_value,
        };
        Ok((self.parent, method))
    }
}

impl<P: Owner<Method>> MethodBuilder<P> {
    /// Build the method and hand it to the owning class builder.
    pub fn finish(self) -> Result<P, DefinitionError> {
        let (mut parent, method) = self.assemble()?;
        parent.adopt(method)?;
        Ok(parent)
    }
}

impl<P> Owner<Parameter> for MethodBuilder<P> {
    fn adopt(&mut self, param: Parameter) -> Result<(), DefinitionError> {
        push_unique(&mut self.parameters, param)
    }
}
