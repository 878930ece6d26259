use crate::builder::parameter::push_unique;
use crate::builder::{Owner, ParameterBuilder, Standalone};
use crate::error::DefinitionError;
use crate::model::{Annotation, Constructor, Modifiers, Parameter, Visibility};
use crate::types::TypeRef;

pub struct ConstructorBuilder<P> {
    parent: P,
    visibility: Visibility,
    annotations: Vec<Annotation>,
    parameters: Vec<Parameter>,
    body: Vec<String>,
}

impl ConstructorBuilder<Standalone> {
    pub fn new() -> Self {
        Self::owned(Standalone)
    }

    pub fn build(self) -> Result<Constructor, DefinitionError> {
        Ok(self.assemble().1)
    }
}

impl Default for ConstructorBuilder<Standalone> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ConstructorBuilder<P> {
    pub(crate) fn owned(parent: P) -> Self {
        Self {
            parent,
            visibility: Visibility::default(),
            annotations: Vec::new(),
            parameters: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn set_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn add_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn build_parameter(self, ty: impl Into<TypeRef>, name: impl Into<String>) -> ParameterBuilder<Self> {
        ParameterBuilder::owned(self, ty.into(), name.into())
    }

    pub fn add_parameter(mut self, param: Parameter) -> Result<Self, DefinitionError> {
        push_unique(&mut self.parameters, param)?;
        Ok(self)
    }

    pub fn add_code<I>(mut self, lines: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.body.extend(lines.into_iter().map(Into::into));
        self
    }

    fn assemble(self) -> (P, Constructor) {
        let ctor = Constructor {
            modifiers: Modifiers { visibility: self.visibility, is_static: false, is_final: false },
            annotations: self.annotations,
            parameters: self.parameters,
            body: self.body,
        };
        (self.parent, ctor)
    }
}

impl<P: Owner<Constructor>> ConstructorBuilder<P> {
    pub fn finish(self) -> Result<P, DefinitionError> {
        let (mut parent, ctor) = self.assemble();
        parent.adopt(ctor)?;
        Ok(parent)
    }
}

impl<P> Owner<Parameter> for ConstructorBuilder<P> {
    fn adopt(&mut self, param: Parameter) -> Result<(), DefinitionError> {
        push_unique(&mut self.parameters, param)
    }
}
