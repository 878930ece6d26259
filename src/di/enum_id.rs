//! Qualifier annotations for enums used as bean ids.
//!
//! For `enum Color implements BeanId` annotated `@BeanIdEnum` this emits
//! `@interface ColorId { Color value(); }`, retained at runtime and applicable
//! to types, methods, fields and parameters.
use crate::builder::ClassBuilder;
use crate::config::GeneratedMarker;
use crate::di::names;
use crate::error::ProcessingError;
use crate::model::{Annotation, ClassDecl, Method, Typed, Visibility};
use crate::pipeline::{Assignability, Generated, Generator};
use crate::types::{ClassType, TypeRef};
use crate::value::Value;

#[derive(Debug, Clone, Default)]
pub struct EnumIdGenerator {
    marker: GeneratedMarker,
}

impl EnumIdGenerator {
    pub fn new(marker: GeneratedMarker) -> Self {
        Self { marker }
    }

    pub fn generate(&self, source: &ClassDecl) -> Result<Generated, ProcessingError> {
        let qualifier = source.ty().erased().with_suffix("Id");
        let name = qualifier.fully_qualified_name();
        let targets = ["TYPE", "METHOD", "FIELD", "PARAMETER"]
            .map(|t| Value::enum_constant(names::ELEMENT_TYPE.clone(), t));
        let target = Value::array(targets).map_err(ProcessingError::builder(name.clone()))?;

        let decl = ClassBuilder::for_annotation(qualifier)
            .with_marker(self.marker.clone())
            .set_visibility(Visibility::Public)
            .add_annotation(Annotation::single(
                names::RETENTION.clone(),
                Value::enum_constant(names::RETENTION_POLICY.clone(), "RUNTIME"),
            ))
            .add_annotation(Annotation::single(names::TARGET.clone(), target))
            .add_annotation(Annotation::marker(names::ENUM_QUALIFIER.clone()))
            .build_method(TypeRef::Class(source.ty().erased()), "value")
            .set_visibility(Visibility::Public)
            .finish()
            .and_then(ClassBuilder::build)
            .map_err(ProcessingError::builder(name))?;
        Ok(Generated::new(decl))
    }
}

impl Generator for EnumIdGenerator {
    fn annotation(&self) -> &ClassType {
        &names::BEAN_ID_ENUM
    }

    fn validate_type(&self, decl: &ClassDecl, types: &dyn Assignability) -> Result<(), ProcessingError> {
        let name = decl.ty().fully_qualified_name();
        if !decl.is_enum() {
            return Err(ProcessingError::structural(name, "Must be an enum"));
        }
        if !types.is_assignable(decl.ty(), &names::BEAN_ID) {
            return Err(ProcessingError::structural(
                name,
                format!("Must implement the {} interface", *names::BEAN_ID),
            ));
        }
        Ok(())
    }

    fn process_type(&self, decl: &ClassDecl) -> Result<Option<Generated>, ProcessingError> {
        self.generate(decl).map(Some)
    }

    fn applies_to_methods(&self) -> bool {
        false
    }

    fn process_method(&self, owner: &ClassType, method: &Method) -> Result<Option<Generated>, ProcessingError> {
        Err(ProcessingError::not_applicable(
            format!("{owner}::{}", method.name()),
            format!("{} cannot be applied to any method [{}]", *names::BEAN_ID, method.name()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MethodBuilder;
    use crate::render::render;
    use pretty_assertions::assert_eq;

    struct NoSubtypes;

    impl Assignability for NoSubtypes {
        fn is_assignable(&self, candidate: &ClassType, target: &ClassType) -> bool {
            candidate == target
        }
    }

    fn color(kind: fn(ClassType) -> ClassBuilder) -> ClassDecl {
        kind(ClassType::new("app", "Color")).without_marker().build().unwrap()
    }

    #[test]
    fn rejects_non_enums_first() {
        let err = EnumIdGenerator::default()
            .validate_type(&color(ClassBuilder::for_concrete_class), &NoSubtypes)
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to use app.Color - Must be an enum");
    }

    #[test]
    fn rejects_enums_without_the_capability() {
        let err = EnumIdGenerator::default()
            .validate_type(&color(ClassBuilder::for_enum), &NoSubtypes)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to use app.Color - Must implement the tendril.bean.qualifier.BeanId interface"
        );
    }

    #[test]
    fn methods_are_never_applicable() {
        let method = MethodBuilder::new(TypeRef::Void, "pick").empty_implementation().build().unwrap();
        let err = EnumIdGenerator::default()
            .process_method(&ClassType::new("app", "Picker"), &method)
            .unwrap_err();
        assert!(matches!(err, ProcessingError::NotApplicable { .. }));
        assert_eq!(err.subject(), "app.Picker::pick");
    }

    #[test]
    fn emits_a_runtime_qualifier_annotation() {
        let generated = EnumIdGenerator::new(GeneratedMarker::default())
            .generate(&color(ClassBuilder::for_enum))
            .unwrap();
        let text = render(&generated.declaration);
        let body: Vec<&str> = text.lines().filter(|l| !l.starts_with("@Generated")).collect();
        assert_eq!(
            body.join("\n"),
            "\
package app;

import java.lang.annotation.ElementType;
import java.lang.annotation.Retention;
import java.lang.annotation.RetentionPolicy;
import java.lang.annotation.Target;
import javax.annotation.processing.Generated;
import tendril.bean.qualifier.EnumQualifier;

@Retention(RetentionPolicy.RUNTIME)
@Target({ElementType.TYPE, ElementType.METHOD, ElementType.FIELD, ElementType.PARAMETER})
@EnumQualifier
public @interface ColorId {

    Color value();

}"
        );
    }
}
