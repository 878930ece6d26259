use crate::model::{Annotated, Annotation, Modifiers, Typed};
use crate::types::{ClassType, GenericParam, TypeRef};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) ty: TypeRef,
    pub(crate) is_final: bool,
    pub(crate) annotations: Vec<Annotation>,
}

impl Parameter {
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub(crate) fn visit_classes<'a>(&'a self, f: &mut dyn FnMut(&'a ClassType)) {
        self.ty.visit_classes(f);
        for a in &self.annotations {
            a.visit_classes(f);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) ty: TypeRef,
    pub(crate) modifiers: Modifiers,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) value: Option<Value>,
}

impl Field {
    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub(crate) fn visit_classes<'a>(&'a self, f: &mut dyn FnMut(&'a ClassType)) {
        self.ty.visit_classes(f);
        for a in &self.annotations {
            a.visit_classes(f);
        }
        if let Some(v) = &self.value {
            v.visit_classes(f);
        }
    }
}

/// A method; `body == None` means abstract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub(crate) name: String,
    pub(crate) return_type: TypeRef,
    pub(crate) modifiers: Modifiers,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) generics: Vec<GenericParam>,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) body: Option<Vec<String>>,
    /// Annotation-type attributes only.
    pub(crate) default_value: Option<Value>,
}

impl Method {
    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    pub fn generics(&self) -> &[GenericParam] {
        &self.generics
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn body(&self) -> Option<&[String]> {
        self.body.as_deref()
    }

    pub fn is_abstract(&self) -> bool {
        self.body.is_none()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    pub(crate) fn visit_classes<'a>(&'a self, f: &mut dyn FnMut(&'a ClassType)) {
        self.return_type.visit_classes(f);
        for a in &self.annotations {
            a.visit_classes(f);
        }
        for g in &self.generics {
            g.visit_classes(f);
        }
        for p in &self.parameters {
            p.visit_classes(f);
        }
        if let Some(v) = &self.default_value {
            v.visit_classes(f);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub(crate) modifiers: Modifiers,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) parameters: Vec<Parameter>,
    pub(crate) body: Vec<String>,
}

impl Constructor {
    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    pub(crate) fn visit_classes<'a>(&'a self, f: &mut dyn FnMut(&'a ClassType)) {
        for a in &self.annotations {
            a.visit_classes(f);
        }
        for p in &self.parameters {
            p.visit_classes(f);
        }
    }
}

macro_rules! annotated {
    ($($ty:ty),*) => {$(
        impl Annotated for $ty {
            fn annotations(&self) -> &[Annotation] {
                &self.annotations
            }
        }
    )*};
}

annotated!(Parameter, Field, Method, Constructor);

impl Typed for Parameter {
    fn name(&self) -> &str {
        &self.name
    }

    fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

impl Typed for Field {
    fn name(&self) -> &str {
        &self.name
    }

    fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

impl Typed for Method {
    fn name(&self) -> &str {
        &self.name
    }

    fn ty(&self) -> &TypeRef {
        &self.return_type
    }
}
