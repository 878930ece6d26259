//! Fluent builders for declarations.
//!
//! Member builders are generic over who owns them. A builder created from a
//! [`ClassBuilder`] (or a method/constructor builder) only offers `finish`,
//! which hands the element back to its owner and returns the owner. A builder
//! created on its own is parameterised by [`Standalone`] and only offers `build`.
//! Terminal operations consume the builder, so a builder cannot be reused.
pub mod constructor;
pub mod enumeration;
pub mod field;
pub mod method;
pub mod parameter;

pub use constructor::ConstructorBuilder;
pub use enumeration::EnumerationBuilder;
pub use field::FieldBuilder;
pub use method::MethodBuilder;
pub use parameter::ParameterBuilder;

use crate::config::GeneratedMarker;
use crate::error::DefinitionError;
use crate::model::{
    Annotation, ClassDecl, ClassKind, Constructor, EnumEntry, Field, Method, Modifiers, Visibility,
};
use crate::types::{check_identifier, ClassType, GenericParam, TypeRef};

/// Marker for member builders without an owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Standalone;

/// Receives finished elements from a nested builder.
pub trait Owner<T> {
    fn adopt(&mut self, item: T) -> Result<(), DefinitionError>;
}

#[derive(Debug, Clone)]
pub struct ClassBuilder {
    ty: ClassType,
    kind: ClassKind,
    modifiers: Modifiers,
    annotations: Vec<Annotation>,
    generics: Vec<GenericParam>,
    fields: Vec<Field>,
    constructors: Vec<Constructor>,
    methods: Vec<Method>,
    nested: Vec<ClassDecl>,
    marker: Option<GeneratedMarker>,
}

impl ClassBuilder {
    pub fn for_concrete_class(ty: ClassType) -> Self {
        Self::new(ty, ClassKind::Concrete { parent: None, interfaces: Vec::new() })
    }

    pub fn for_abstract_class(ty: ClassType) -> Self {
        Self::new(ty, ClassKind::Abstract { parent: None, interfaces: Vec::new() })
    }

    pub fn for_interface(ty: ClassType) -> Self {
        Self::new(ty, ClassKind::Interface { extends: Vec::new() })
    }

    pub fn for_enum(ty: ClassType) -> Self {
        Self::new(ty, ClassKind::Enum { interfaces: Vec::new(), entries: Vec::new() })
    }

    pub fn for_annotation(ty: ClassType) -> Self {
        Self::new(ty, ClassKind::Annotation)
    }

    fn new(ty: ClassType, kind: ClassKind) -> Self {
        // type variables applied to the type become its declared parameters
        let generics = ty
            .generics()
            .iter()
            .filter_map(|g| match g {
                TypeRef::Generic(name) => Some(GenericParam::new(name.clone())),
                _ => None,
            })
            .collect();
        Self {
            ty,
            kind,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            generics,
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
            marker: Some(GeneratedMarker::default()),
        }
    }

    fn owner_name(&self) -> String {
        self.ty.fully_qualified_name()
    }

    pub fn kind(&self) -> &ClassKind {
        &self.kind
    }

    pub fn with_marker(mut self, marker: GeneratedMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// For declarations mirrored from existing sources rather than emitted.
    pub fn without_marker(mut self) -> Self {
        self.marker = None;
        self
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

    pub fn extends_class(mut self, parent: ClassType) -> Result<Self, DefinitionError> {
        let owner = self.owner_name();
        match &mut self.kind {
            ClassKind::Concrete { parent: slot, .. } | ClassKind::Abstract { parent: slot, .. } => {
                *slot = Some(parent);
                Ok(self)
            }
            other => Err(DefinitionError::definition(
                owner,
                format!("an {} cannot extend a class", other.label()),
            )),
        }
    }

    /// Like [`extends_class`](Self::extends_class), but also rejects parents that
    /// cannot be extended.
    pub fn extends_declaration(self, parent: &ClassDecl) -> Result<Self, DefinitionError> {
        let extendable = matches!(parent.kind(), ClassKind::Concrete { .. } | ClassKind::Abstract { .. })
            && !parent.modifiers().is_final;
        if !extendable {
            return Err(DefinitionError::definition(
                self.owner_name(),
                format!("cannot extend {} {}", parent.kind().label(), parent.ty()),
            ));
        }
        self.extends_class(parent.ty().clone())
    }

    pub fn implements_interface(mut self, iface: ClassType) -> Result<Self, DefinitionError> {
        let owner = self.owner_name();
        match &mut self.kind {
            ClassKind::Concrete { interfaces, .. }
            | ClassKind::Abstract { interfaces, .. }
            | ClassKind::Enum { interfaces, .. }
            | ClassKind::Interface { extends: interfaces } => {
                interfaces.push(iface);
                Ok(self)
            }
            ClassKind::Annotation => Err(DefinitionError::definition(
                owner,
                "an annotation cannot extend or implement other types",
            )),
        }
    }

    pub fn build_method(self, return_type: impl Into<TypeRef>, name: impl Into<String>) -> MethodBuilder<Self> {
        MethodBuilder::owned(self, return_type.into(), name.into())
    }

    pub fn build_void_method(self, name: impl Into<String>) -> MethodBuilder<Self> {
        self.build_method(TypeRef::Void, name)
    }

    pub fn build_field(self, ty: impl Into<TypeRef>, name: impl Into<String>) -> FieldBuilder<Self> {
        FieldBuilder::owned(self, ty.into(), name.into())
    }

    pub fn build_constructor(self) -> ConstructorBuilder<Self> {
        ConstructorBuilder::owned(self)
    }

    /// Only enums accept the finished entry; any other kind fails on `finish`.
    pub fn build_enumeration(self, name: impl Into<String>) -> EnumerationBuilder<Self> {
        EnumerationBuilder::owned(self, name.into())
    }

    pub fn add_method(mut self, method: Method) -> Result<Self, DefinitionError> {
        self.adopt(method)?;
        Ok(self)
    }

    pub fn add_field(mut self, field: Field) -> Result<Self, DefinitionError> {
        self.adopt(field)?;
        Ok(self)
    }

    pub fn add_constructor(mut self, ctor: Constructor) -> Result<Self, DefinitionError> {
        self.adopt(ctor)?;
        Ok(self)
    }

    pub fn add_enumeration(mut self, entry: EnumEntry) -> Result<Self, DefinitionError> {
        self.adopt(entry)?;
        Ok(self)
    }

    pub fn add_nested(mut self, nested: ClassDecl) -> Self {
        self.nested.push(nested);
        self
    }

    /// Assemble the declaration. Unless disabled, the generated marker is placed
    /// first among the class annotations.
    pub fn build(mut self) -> Result<ClassDecl, DefinitionError> {
        check_identifier(self.ty.simple_name())?;
        if self.modifiers.is_final && !matches!(self.kind, ClassKind::Concrete { .. }) {
            return Err(DefinitionError::illegal(format!(
                "{} {} cannot be final",
                self.kind.label(),
                self.ty
            )));
        }
        if let Some(marker) = &self.marker {
            self.annotations.retain(|a| a.ty() != &marker.annotation);
            self.annotations.insert(0, marker.annotation());
        }
        Ok(ClassDecl {
            ty: self.ty,
            kind: self.kind,
            modifiers: self.modifiers,
            annotations: self.annotations,
            generics: self.generics,
            fields: self.fields,
            constructors: self.constructors,
            methods: self.methods,
            nested: self.nested,
        })
    }
}

impl Owner<Method> for ClassBuilder {
    fn adopt(&mut self, method: Method) -> Result<(), DefinitionError> {
        let abstract_ = method.body.is_none();
        match &self.kind {
            ClassKind::Concrete { .. } | ClassKind::Enum { .. } => {
                if abstract_ {
                    return Err(DefinitionError::definition(
                        self.owner_name(),
                        format!("{} cannot declare abstract method {}", self.kind.label(), method.name),
                    ));
                }
            }
            ClassKind::Abstract { .. } => {
                if abstract_ && method.modifiers.visibility == Visibility::Private {
                    return Err(DefinitionError::illegal("An abstract method cannot be private"));
                }
                if abstract_ && method.modifiers.is_static {
                    return Err(DefinitionError::illegal("An abstract method cannot be static"));
                }
            }
            ClassKind::Interface { .. } => {
                if matches!(method.modifiers.visibility, Visibility::Private | Visibility::Protected) {
                    return Err(DefinitionError::illegal(format!(
                        "interface method {} is implicitly public",
                        method.name
                    )));
                }
                if abstract_ && method.modifiers.is_static {
                    return Err(DefinitionError::illegal("A static interface method needs a body"));
                }
            }
            ClassKind::Annotation => {
                if !method.parameters.is_empty() {
                    return Err(DefinitionError::illegal(format!(
                        "annotation attribute {} cannot take parameters",
                        method.name
                    )));
                }
                if method.return_type.is_void() {
                    return Err(DefinitionError::illegal(format!(
                        "annotation attribute {} must return a value",
                        method.name
                    )));
                }
                if !abstract_ {
                    return Err(DefinitionError::illegal(format!(
                        "annotation attribute {} cannot have a body",
                        method.name
                    )));
                }
            }
        }
        if let Some(default) = &method.default_value {
            if !matches!(self.kind, ClassKind::Annotation) {
                return Err(DefinitionError::definition(
                    self.owner_name(),
                    format!("only annotation attributes take a default value ({})", method.name),
                ));
            }
            if !default.is_assignable_to(&method.return_type) {
                return Err(DefinitionError::TypeMismatch {
                    expected: method.return_type.to_string(),
                    found: default.value_type().to_string(),
                });
            }
        }
        self.methods.push(method);
        Ok(())
    }
}

impl Owner<Field> for ClassBuilder {
    fn adopt(&mut self, mut field: Field) -> Result<(), DefinitionError> {
        if matches!(self.kind, ClassKind::Interface { .. } | ClassKind::Annotation) {
            if matches!(field.modifiers.visibility, Visibility::Private | Visibility::Protected) {
                return Err(DefinitionError::illegal(format!(
                    "{} field {} is implicitly public",
                    self.kind.label(),
                    field.name
                )));
            }
            if field.value.is_none() {
                return Err(DefinitionError::illegal(format!(
                    "{} field {} is a constant and needs a value",
                    self.kind.label(),
                    field.name
                )));
            }
            field.modifiers.is_static = true;
            field.modifiers.is_final = true;
        }
        self.fields.push(field);
        Ok(())
    }
}

impl Owner<Constructor> for ClassBuilder {
    fn adopt(&mut self, ctor: Constructor) -> Result<(), DefinitionError> {
        match self.kind {
            ClassKind::Interface { .. } | ClassKind::Annotation => Err(DefinitionError::definition(
                self.owner_name(),
                format!("an {} cannot declare constructors", self.kind.label()),
            )),
            ClassKind::Enum { .. }
                if matches!(ctor.modifiers.visibility, Visibility::Public | Visibility::Protected) =>
            {
                Err(DefinitionError::illegal("enum constructors cannot be public or protected"))
            }
            _ => {
                self.constructors.push(ctor);
                Ok(())
            }
        }
    }
}

impl Owner<EnumEntry> for ClassBuilder {
    fn adopt(&mut self, entry: EnumEntry) -> Result<(), DefinitionError> {
        let owner = self.owner_name();
        match &mut self.kind {
            ClassKind::Enum { entries, .. } => {
                if entries.iter().any(|e| e.name == entry.name) {
                    return Err(DefinitionError::illegal(format!("duplicate enumeration {}", entry.name)));
                }
                entries.push(entry);
                Ok(())
            }
            _ => Err(DefinitionError::definition(owner, "Only enums can have enumerations")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    fn class(kind: fn(ClassType) -> ClassBuilder) -> ClassBuilder {
        kind(ClassType::new("a", "Subject")).without_marker()
    }

    fn is_illegal(result: Result<ClassBuilder, DefinitionError>) -> bool {
        matches!(result, Err(DefinitionError::IllegalArgument(_)))
    }

    fn is_definition(result: Result<ClassBuilder, DefinitionError>) -> bool {
        matches!(result, Err(DefinitionError::Definition { .. }))
    }

    #[test]
    fn only_abstract_kinds_take_bodiless_methods() {
        for kind in [ClassBuilder::for_concrete_class, ClassBuilder::for_enum] {
            assert!(is_definition(class(kind).build_method(Primitive::Int, "f").finish()));
        }
        assert!(class(ClassBuilder::for_abstract_class).build_method(Primitive::Int, "f").finish().is_ok());
        assert!(class(ClassBuilder::for_interface).build_method(Primitive::Int, "f").finish().is_ok());
    }

    #[test]
    fn abstract_methods_cannot_be_private_or_static() {
        let private = class(ClassBuilder::for_abstract_class)
            .build_method(Primitive::Int, "f")
            .set_visibility(Visibility::Private)
            .finish();
        assert!(is_illegal(private));
        let static_ = class(ClassBuilder::for_abstract_class)
            .build_method(Primitive::Int, "f")
            .set_static(true)
            .finish();
        assert!(is_illegal(static_));
        let bodied = class(ClassBuilder::for_abstract_class)
            .build_method(Primitive::Int, "f")
            .set_visibility(Visibility::Private)
            .set_static(true)
            .add_code(["return 1;"])
            .finish();
        assert!(bodied.is_ok());
    }

    #[test]
    fn interface_methods_are_implicitly_public() {
        for visibility in [Visibility::Private, Visibility::Protected] {
            let result = class(ClassBuilder::for_interface)
                .build_void_method("run")
                .set_visibility(visibility)
                .empty_implementation()
                .finish();
            assert!(is_illegal(result));
        }
        let public = class(ClassBuilder::for_interface)
            .build_void_method("run")
            .set_visibility(Visibility::Public)
            .finish();
        assert!(public.is_ok());
    }

    #[test]
    fn static_interface_methods_need_a_body() {
        let bodiless = class(ClassBuilder::for_interface).build_void_method("run").set_static(true).finish();
        assert!(is_illegal(bodiless));
        let bodied = class(ClassBuilder::for_interface)
            .build_void_method("run")
            .set_static(true)
            .empty_implementation()
            .finish();
        assert!(bodied.is_ok());
    }

    #[test]
    fn annotation_attributes_are_bodiless_nullary_and_typed() {
        let with_param = class(ClassBuilder::for_annotation)
            .build_method(Primitive::Int, "size")
            .build_parameter(Primitive::Int, "x")
            .finish()
            .unwrap()
            .finish();
        assert!(is_illegal(with_param));
        assert!(is_illegal(class(ClassBuilder::for_annotation).build_void_method("size").finish()));
        let with_body = class(ClassBuilder::for_annotation)
            .build_method(Primitive::Int, "size")
            .empty_implementation()
            .finish();
        assert!(is_illegal(with_body));
        assert!(class(ClassBuilder::for_annotation).build_method(Primitive::Int, "size").finish().is_ok());
    }

    #[test]
    fn defaults_belong_to_annotation_attributes() {
        let on_interface = class(ClassBuilder::for_interface)
            .build_method(Primitive::Int, "size")
            .set_default(5)
            .finish();
        assert!(is_definition(on_interface));

        let mismatched = class(ClassBuilder::for_annotation)
            .build_method(Primitive::Int, "size")
            .set_default("five")
            .finish();
        assert!(matches!(mismatched, Err(DefinitionError::TypeMismatch { .. })));

        let decl = class(ClassBuilder::for_annotation)
            .build_method(Primitive::Int, "size")
            .set_default(5)
            .finish()
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(decl.methods().len(), 1);
    }

    #[test]
    fn interface_and_annotation_fields_are_public_constants() {
        for kind in [ClassBuilder::for_interface, ClassBuilder::for_annotation] {
            for visibility in [Visibility::Private, Visibility::Protected] {
                let result = class(kind)
                    .build_field(Primitive::Int, "LIMIT")
                    .set_visibility(visibility)
                    .set_value(3)
                    .finish();
                assert!(is_illegal(result));
            }
            assert!(is_illegal(class(kind).build_field(Primitive::Int, "LIMIT").finish()));

            let decl = class(kind)
                .build_field(Primitive::Int, "LIMIT")
                .set_value(3)
                .finish()
                .unwrap()
                .build()
                .unwrap();
            let modifiers = decl.fields()[0].modifiers();
            assert!(modifiers.is_static && modifiers.is_final);
        }
    }

    #[test]
    fn interfaces_and_annotations_have_no_constructors() {
        for kind in [ClassBuilder::for_interface, ClassBuilder::for_annotation] {
            assert!(is_definition(class(kind).build_constructor().finish()));
        }
    }

    #[test]
    fn enum_constructors_stay_private() {
        for visibility in [Visibility::Public, Visibility::Protected] {
            let result = class(ClassBuilder::for_enum).build_constructor().set_visibility(visibility).finish();
            assert!(is_illegal(result));
        }
        let private = class(ClassBuilder::for_enum).build_constructor().set_visibility(Visibility::Private).finish();
        assert!(private.is_ok());
    }

    #[test]
    fn enumerations_are_unique_and_enum_only() {
        let twice = class(ClassBuilder::for_enum)
            .build_enumeration("RED")
            .finish()
            .unwrap()
            .build_enumeration("RED")
            .finish();
        assert!(is_illegal(twice));
        assert!(is_definition(class(ClassBuilder::for_interface).build_enumeration("RED").finish()));
    }

    #[test]
    fn annotations_neither_extend_nor_implement() {
        let iface = ClassType::new("a", "Api");
        assert!(is_definition(class(ClassBuilder::for_annotation).implements_interface(iface.clone())));
        assert!(is_definition(class(ClassBuilder::for_annotation).extends_class(iface.clone())));
        assert!(is_definition(class(ClassBuilder::for_interface).extends_class(iface.clone())));
        let extended = class(ClassBuilder::for_interface).implements_interface(iface.clone()).unwrap().build().unwrap();
        assert_eq!(extended.kind().interfaces(), [iface]);
    }

    #[test]
    fn only_concrete_classes_can_be_final() {
        for kind in [ClassBuilder::for_abstract_class, ClassBuilder::for_interface, ClassBuilder::for_enum] {
            let err = class(kind).set_final(true).build().unwrap_err();
            assert!(matches!(err, DefinitionError::IllegalArgument(_)));
        }
        assert!(class(ClassBuilder::for_concrete_class).set_final(true).build().is_ok());
    }
}
