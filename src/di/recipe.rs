//! Recipe generation for `@Bean` types.
//!
//! A recipe extends the base class mapped to the bean's lifecycle marker. Its
//! constructor registers one applicator per injected field and one injector per
//! injected method, in declaration order.
use std::collections::BTreeSet;

use crate::builder::ClassBuilder;
use crate::config::{ImportPolicy, RecipeConfig};
use crate::di::descriptor::{self, BeanDescriptor};
use crate::di::names;
use crate::error::ProcessingError;
use crate::model::{Annotated, Annotation, ClassDecl, ClassKind, Field, Method, Typed, Visibility};
use crate::pipeline::{Assignability, Generated, Generator};
use crate::render::ImportScope;
use crate::types::{ClassType, TypeNamer, TypeRef};

#[derive(Debug, Clone, Default)]
pub struct RecipeGenerator {
    config: RecipeConfig,
}

/// State of one generation call.
struct RecipeContext<'a> {
    config: &'a RecipeConfig,
    bean_name: String,
    imports: BTreeSet<ClassType>,
    warnings: Vec<String>,
}

impl RecipeGenerator {
    pub fn new(config: RecipeConfig) -> Self {
        Self { config }
    }

    /// The recipe base for the bean's single lifecycle marker.
    pub fn lifecycle_base(&self, bean: &ClassDecl) -> Result<&ClassType, ProcessingError> {
        let found: Vec<(&ClassType, &ClassType)> = self
            .config
            .lifecycles
            .iter()
            .filter(|(marker, _)| bean.has_annotation(marker))
            .collect();
        match found.as_slice() {
            [(_, base)] => Ok(*base),
            _ => Err(ProcessingError::LifecycleConflict {
                name: bean.ty().fully_qualified_name(),
                found: found.iter().map(|(m, _)| m.fully_qualified_name()).collect(),
            }),
        }
    }

    pub fn generate(&self, bean: &ClassDecl) -> Result<Generated, ProcessingError> {
        let base = self.lifecycle_base(bean)?;
        let mut ctx = RecipeContext {
            config: &self.config,
            bean_name: bean.ty().fully_qualified_name(),
            imports: BTreeSet::new(),
            warnings: Vec::new(),
        };

        let mut registrations = Vec::new();
        for field in bean.fields().iter().filter(|f| f.has_annotation(&names::INJECT)) {
            registrations.push(ctx.applicator(field)?);
        }
        for method in bean.methods().iter().filter(|m| m.has_annotation(&names::INJECT)) {
            registrations.push(ctx.injector(method)?);
        }
        let own_qualifier = descriptor::qualifier_of(&ctx.bean_name, bean.annotations(), &self.config.qualifiers)?;
        let setup: Vec<String> = descriptor::setup_calls(own_qualifier.as_deref())
            .into_iter()
            .map(|call| format!("descriptor.{call};"))
            .collect();

        // Code lines must spell types the way the renderer will: resolve the
        // scope over a bodiless recipe, which references the same types. The
        // spelling does not depend on the import policy, only the import list does.
        let skeleton = self.assemble(bean, base, Vec::new(), Vec::new())?;
        let scope = ImportScope::resolve(&skeleton, &ctx.imports, &ImportPolicy::default());

        let mut ctor_lines = vec![format!("super(engine, {}.class);", scope.name_of(bean.ty()))];
        for registration in &registrations {
            ctor_lines.extend(registration.code(bean.ty(), &scope));
        }
        let declaration = self.assemble(bean, base, ctor_lines, setup)?;

        Ok(Generated { declaration, imports: ctx.imports, warnings: ctx.warnings })
    }

    fn assemble(
        &self,
        bean: &ClassDecl,
        base: &ClassType,
        ctor_lines: Vec<String>,
        setup: Vec<String>,
    ) -> Result<ClassDecl, ProcessingError> {
        let bean_ty = TypeRef::Class(bean.ty().clone());
        let recipe_ty = bean.ty().erased().with_suffix("Recipe");
        let parent = base.clone().with_generics([bean_ty.clone()]);
        let descriptor_ty = names::DESCRIPTOR.clone().with_generics([bean_ty]);

        ClassBuilder::for_concrete_class(recipe_ty.clone())
            .with_marker(self.config.marker.clone())
            .set_visibility(Visibility::Public)
            .extends_class(parent)
            .and_then(|b| {
                b.build_constructor()
                    .set_visibility(Visibility::Public)
                    .build_parameter(names::ENGINE.clone(), "engine")
                    .finish()?
                    .add_code(ctor_lines)
                    .finish()?
                    .build_void_method("setupDescriptor")
                    .add_annotation(Annotation::marker(names::OVERRIDE.clone()))
                    .set_visibility(Visibility::Public)
                    .build_parameter(descriptor_ty, "descriptor")
                    .finish()?
                    .add_code(setup)
                    .empty_implementation()
                    .finish()
            })
            .map(|b| {
                if self.config.annotate_registry {
                    b.add_annotation(Annotation::marker(names::REGISTRY.clone()))
                } else {
                    b
                }
            })
            .and_then(ClassBuilder::build)
            .map_err(ProcessingError::builder(recipe_ty.fully_qualified_name()))
    }
}

/// A validated injection point, rendered once type names are resolved.
enum Registration<'a> {
    Dependency { field: &'a Field, descriptor: BeanDescriptor },
    Injector { method: &'a Method, descriptors: Vec<BeanDescriptor> },
}

impl Registration<'_> {
    fn code(&self, bean: &ClassType, namer: &dyn TypeNamer) -> Vec<String> {
        let bean = namer.name_of(bean);
        match self {
            Registration::Dependency { field, descriptor } => {
                let ty = field.ty().code(namer);
                vec![
                    format!(
                        "registerDependency({}, new {}<{bean}, {ty}>() {{",
                        descriptor.code(namer),
                        namer.name_of(&names::APPLICATOR)
                    ),
                    "    @Override".to_string(),
                    format!("    public void apply({bean} consumer, {ty} bean) {{"),
                    format!("        consumer.{} = bean;", field.name()),
                    "    }".to_string(),
                    "});".to_string(),
                ]
            }
            Registration::Injector { method, descriptors } => {
                let mut lines = vec![
                    format!("registerInjector(new {}<{bean}>() {{", namer.name_of(&names::INJECTOR)),
                    "    @Override".to_string(),
                    format!("    public void inject({bean} consumer, {} engine) {{", namer.name_of(&names::ENGINE)),
                ];
                for (p, descriptor) in method.parameters().iter().zip(descriptors) {
                    lines.push(format!(
                        "        {} {} = engine.getBean({});",
                        p.ty().code(namer),
                        p.name(),
                        descriptor.code(namer)
                    ));
                }
                let args: Vec<&str> = method.parameters().iter().map(|p| p.name()).collect();
                lines.push(format!("        consumer.{}({});", method.name(), args.join(", ")));
                lines.push("    }".to_string());
                lines.push("});".to_string());
                lines
            }
        }
    }
}

impl RecipeContext<'_> {
    fn descriptor_for<M: Typed + Annotated>(
        &mut self,
        subject: &str,
        member: &M,
    ) -> Result<BeanDescriptor, ProcessingError> {
        injectable_type(subject, member.ty())?;
        for c in referenced_classes(member.ty()) {
            self.imports.insert(c);
        }
        self.imports.insert(names::DESCRIPTOR.clone());
        BeanDescriptor::for_member(subject, member, &self.config.qualifiers)
    }

    fn applicator<'f>(&mut self, field: &'f Field) -> Result<Registration<'f>, ProcessingError> {
        let subject = format!("{}.{}", self.bean_name, field.name());
        if field.modifiers().visibility == Visibility::Private {
            return Err(ProcessingError::structural(subject, "an injected field cannot be private"));
        }
        let descriptor = self.descriptor_for(&subject, field)?;
        self.imports.insert(names::APPLICATOR.clone());
        Ok(Registration::Dependency { field, descriptor })
    }

    fn injector<'m>(&mut self, method: &'m Method) -> Result<Registration<'m>, ProcessingError> {
        let subject = format!("{}::{}", self.bean_name, method.name());
        if method.modifiers().visibility == Visibility::Private {
            return Err(ProcessingError::structural(subject, "an injected method cannot be private"));
        }
        if !method.ty().is_void() {
            self.warnings.push(format!("{subject} consumer has a non-void return type"));
        }
        if method.parameters().is_empty() {
            self.warnings.push(format!("{subject} has no parameters, this is a meaningless injection"));
        }
        self.imports.insert(names::INJECTOR.clone());

        let mut descriptors = Vec::new();
        for p in method.parameters() {
            descriptors.push(self.descriptor_for(&format!("{subject}({})", p.name()), p)?);
        }
        Ok(Registration::Injector { method, descriptors })
    }
}

/// Dependencies are looked up by class; primitives and type variables cannot be.
fn injectable_type(subject: &str, ty: &TypeRef) -> Result<(), ProcessingError> {
    match ty {
        TypeRef::Class(_) => Ok(()),
        TypeRef::Array(inner) => injectable_type(subject, inner),
        TypeRef::Primitive(p) => Err(ProcessingError::structural(
            subject,
            format!("primitive type {} cannot be injected", p.keyword()),
        )),
        TypeRef::Generic(name) => Err(ProcessingError::structural(
            subject,
            format!("type variable {name} cannot be injected"),
        )),
        TypeRef::Void => Err(ProcessingError::structural(subject, "void cannot be injected")),
    }
}

fn referenced_classes(ty: &TypeRef) -> Vec<ClassType> {
    let mut out = Vec::new();
    ty.visit_classes(&mut |c| out.push(c.erased()));
    out
}

impl Generator for RecipeGenerator {
    fn annotation(&self) -> &ClassType {
        &names::BEAN
    }

    fn validate_type(&self, decl: &ClassDecl, _types: &dyn Assignability) -> Result<(), ProcessingError> {
        match decl.kind() {
            ClassKind::Concrete { .. } => Ok(()),
            other => Err(ProcessingError::structural(
                decl.ty().fully_qualified_name(),
                format!("a bean must be a concrete class, found {}", other.label()),
            )),
        }
    }

    fn process_type(&self, decl: &ClassDecl) -> Result<Option<Generated>, ProcessingError> {
        self.generate(decl).map(Some)
    }

    // TODO: method-level beans need generated configuration/factory classes
    fn process_method(&self, owner: &ClassType, method: &Method) -> Result<Option<Generated>, ProcessingError> {
        Err(ProcessingError::not_applicable(
            format!("{owner}::{}", method.name()),
            format!("@{} on methods is not supported", names::BEAN.simple_name()),
        ))
    }
}
