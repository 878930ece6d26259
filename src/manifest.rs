//! JSON manifest host.
//!
//! A manifest describes existing declarations and their supertypes. It stands
//! in for a compiler's element discovery: every declaration or method carrying
//! the requested annotation is reported as an element, and declarations are
//! lowered into the model through the builders when the pipeline loads them.
//!
//! ```json
//! {
//!   "supertypes": { "app.Color": ["tendril.bean.qualifier.BeanId"] },
//!   "declarations": [
//!     {
//!       "name": "app.Holder",
//!       "annotations": [{ "type": "tendril.bean.Bean" }, { "type": "tendril.bean.Singleton" }],
//!       "fields": [{ "name": "widget", "type": "app.Widget", "annotations": [{ "type": "tendril.bean.Inject" }] }]
//!     }
//!   ]
//! }
//! ```
use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::builder::{ClassBuilder, EnumerationBuilder, FieldBuilder, MethodBuilder, ParameterBuilder};
use crate::error::{DefinitionError, LoadError};
use crate::model::{Annotation, ClassDecl, EnumEntry, Field, Method, Parameter, Visibility};
use crate::pipeline::{Assignability, Element, ElementKind, Loader, RoundEnvironment};
use crate::types::{ClassType, TypeRef};
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// ERRORS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },

    #[error("declaration {0} appears more than once")]
    Duplicate(String),
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, ManifestError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| ManifestError::Parse {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Extra subtype edges, e.g. for library types with no declaration here.
    #[serde(default)]
    pub supertypes: IndexMap<String, Vec<String>>,
    #[serde(default)]
    pub declarations: Vec<TypeSpec>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KindSpec {
    #[default]
    Class,
    Abstract,
    Interface,
    Enum,
    Annotation,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VisibilitySpec {
    Public,
    Protected,
    #[default]
    Package,
    Private,
}

impl From<VisibilitySpec> for Visibility {
    fn from(v: VisibilitySpec) -> Self {
        match v {
            VisibilitySpec::Public => Visibility::Public,
            VisibilitySpec::Protected => Visibility::Protected,
            VisibilitySpec::Package => Visibility::PackagePrivate,
            VisibilitySpec::Private => Visibility::Private,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
    /// Fully-qualified name.
    pub name: String,
    #[serde(default)]
    pub kind: KindSpec,
    #[serde(default)]
    pub visibility: VisibilitySpec,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    /// Type variables declared by the type.
    #[serde(default)]
    pub generics: Vec<String>,
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<AnnotationSpec>,
    #[serde(default)]
    pub entries: Vec<EntrySpec>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrySpec {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<ValueSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    /// Type notation, e.g. `java.util.List<app.Widget>`.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub visibility: VisibilitySpec,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default)]
    pub annotations: Vec<AnnotationSpec>,
    #[serde(default)]
    pub value: Option<ValueSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodSpec {
    pub name: String,
    #[serde(default = "void")]
    pub returns: String,
    #[serde(default)]
    pub visibility: VisibilitySpec,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub annotations: Vec<AnnotationSpec>,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub body: Option<Vec<String>>,
    #[serde(default)]
    pub default: Option<ValueSpec>,
}

fn void() -> String {
    "void".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, rename = "final")]
    pub is_final: bool,
    #[serde(default)]
    pub annotations: Vec<AnnotationSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotationSpec {
    #[serde(rename = "type")]
    pub ty: String,
    /// Shorthand for the `value` attribute.
    #[serde(default)]
    pub value: Option<ValueSpec>,
    #[serde(default)]
    pub attributes: IndexMap<String, ValueSpec>,
}

/// `{"string": "x"}`, `{"int": 1}`, `{"enum": "a.b.E.CONST"}`, `{"array": [...]}`, ...
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSpec {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Char(char),
    Float(f32),
    Double(f64),
    String(String),
    /// Fully-qualified enum type plus constant, dot separated.
    Enum(String),
    /// Type notation of a class literal.
    Class(String),
    Array(Vec<ValueSpec>),
    Annotation(Box<AnnotationSpec>),
}

// ————————————————————————————————————————————————————————————————————————————
// LOWERING
// ————————————————————————————————————————————————————————————————————————————

impl ValueSpec {
    pub fn lower(&self) -> Result<Value, DefinitionError> {
        Ok(match self {
            ValueSpec::Bool(b) => Value::Bool(*b),
            ValueSpec::Byte(b) => Value::Byte(*b),
            ValueSpec::Short(s) => Value::Short(*s),
            ValueSpec::Int(i) => Value::Int(*i),
            ValueSpec::Long(l) => Value::Long(*l),
            ValueSpec::Char(c) => Value::Char(*c),
            ValueSpec::Float(f) => Value::from(*f),
            ValueSpec::Double(d) => Value::from(*d),
            ValueSpec::String(s) => Value::Str(s.clone()),
            ValueSpec::Enum(path) => {
                let Some((ty, constant)) = path.rsplit_once('.') else {
                    return Err(DefinitionError::illegal(format!("enum constant `{path}` needs its type")));
                };
                Value::enum_constant(ClassType::from_fqn(ty), constant)
            }
            ValueSpec::Class(notation) => Value::class_literal(notation.parse::<TypeRef>()?),
            ValueSpec::Array(items) => {
                let items = items.iter().map(ValueSpec::lower).collect::<Result<Vec<_>, _>>()?;
                Value::array(items)?
            }
            ValueSpec::Annotation(a) => Value::Annotation(Box::new(a.lower()?)),
        })
    }
}

impl AnnotationSpec {
    pub fn lower(&self) -> Result<Annotation, DefinitionError> {
        let ty = ClassType::from_fqn(&self.ty);
        let mut attributes = Vec::new();
        if let Some(v) = &self.value {
            attributes.push(("value".to_string(), v.lower()?));
        }
        for (name, v) in &self.attributes {
            attributes.push((name.clone(), v.lower()?));
        }
        Annotation::with_attributes(ty, attributes)
    }
}

fn lower_annotations(specs: &[AnnotationSpec]) -> Result<Vec<Annotation>, DefinitionError> {
    specs.iter().map(AnnotationSpec::lower).collect()
}

impl ParameterSpec {
    pub fn lower(&self) -> Result<Parameter, DefinitionError> {
        let mut builder = ParameterBuilder::new(self.ty.parse::<TypeRef>()?, &self.name).set_final(self.is_final);
        for a in lower_annotations(&self.annotations)? {
            builder = builder.add_annotation(a);
        }
        builder.build()
    }
}

impl FieldSpec {
    pub fn lower(&self) -> Result<Field, DefinitionError> {
        let mut builder = FieldBuilder::new(self.ty.parse::<TypeRef>()?, &self.name)
            .set_visibility(self.visibility.into())
            .set_static(self.is_static)
            .set_final(self.is_final);
        for a in lower_annotations(&self.annotations)? {
            builder = builder.add_annotation(a);
        }
        if let Some(v) = &self.value {
            builder = builder.set_value(v.lower()?);
        }
        builder.build()
    }
}

impl MethodSpec {
    /// `abstract_by_default`: bodyless methods stay abstract (interfaces,
    /// annotations); elsewhere they get an empty body unless marked abstract.
    pub fn lower(&self, abstract_by_default: bool) -> Result<Method, DefinitionError> {
        let mut builder = MethodBuilder::new(self.returns.parse::<TypeRef>()?, &self.name)
            .set_visibility(self.visibility.into())
            .set_static(self.is_static)
            .set_final(self.is_final);
        for a in lower_annotations(&self.annotations)? {
            builder = builder.add_annotation(a);
        }
        for p in &self.parameters {
            builder = builder.add_parameter(p.lower()?)?;
        }
        match &self.body {
            Some(lines) => builder = builder.add_code(lines.iter().cloned()),
            None if !(self.is_abstract || abstract_by_default) => builder = builder.empty_implementation(),
            None => {}
        }
        if let Some(v) = &self.default {
            builder = builder.set_default(v.lower()?);
        }
        builder.build()
    }
}

impl EntrySpec {
    pub fn lower(&self) -> Result<EnumEntry, DefinitionError> {
        let mut builder = EnumerationBuilder::new(&self.name);
        for a in &self.arguments {
            builder = builder.add_argument(a.lower()?);
        }
        builder.build()
    }
}

impl TypeSpec {
    /// The declared type, its type variables applied.
    pub fn class_type(&self) -> ClassType {
        ClassType::from_fqn(&self.name)
            .with_generics(self.generics.iter().map(|g| TypeRef::Generic(g.clone())))
    }

    pub fn lower(&self) -> Result<ClassDecl, DefinitionError> {
        let ty = self.class_type();
        let mut builder = match self.kind {
            KindSpec::Class => ClassBuilder::for_concrete_class(ty),
            KindSpec::Abstract => ClassBuilder::for_abstract_class(ty),
            KindSpec::Interface => ClassBuilder::for_interface(ty),
            KindSpec::Enum => ClassBuilder::for_enum(ty),
            KindSpec::Annotation => ClassBuilder::for_annotation(ty),
        }
        .without_marker()
        .set_visibility(self.visibility.into())
        .set_static(self.is_static)
        .set_final(self.is_final);

        if let Some(parent) = &self.extends {
            builder = builder.extends_class(class_notation(parent)?)?;
        }
        for iface in &self.implements {
            builder = builder.implements_interface(class_notation(iface)?)?;
        }
        for a in lower_annotations(&self.annotations)? {
            builder = builder.add_annotation(a);
        }
        for e in &self.entries {
            builder = builder.add_enumeration(e.lower()?)?;
        }
        for f in &self.fields {
            builder = builder.add_field(f.lower()?)?;
        }
        let abstract_by_default = matches!(self.kind, KindSpec::Interface | KindSpec::Annotation);
        for m in &self.methods {
            builder = builder.add_method(m.lower(abstract_by_default)?)?;
        }
        builder.build()
    }

    fn has_annotation(annotations: &[AnnotationSpec], fqn: &str) -> bool {
        annotations.iter().any(|a| a.ty == fqn)
    }
}

/// Supertypes are written in type notation but must name classes.
fn class_notation(notation: &str) -> Result<ClassType, DefinitionError> {
    match notation.parse::<TypeRef>()? {
        TypeRef::Class(c) => Ok(c),
        _ => Ok(ClassType::from_fqn(notation)),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// HOST
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestElement {
    kind: ElementKind,
    /// Index into the manifest declarations.
    owner: usize,
    method: Option<usize>,
    name: String,
    parameter_count: usize,
}

impl Element for ManifestElement {
    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn qualified_name(&self) -> String {
        self.name.clone()
    }

    fn parameter_type_count(&self) -> usize {
        self.parameter_count
    }
}

/// Serves one manifest as discovery, loader and assignability collaborator.
#[derive(Debug, Clone, Default)]
pub struct ManifestHost {
    manifest: Manifest,
    source: Option<PathBuf>,
}

impl ManifestHost {
    pub fn new(manifest: Manifest) -> Result<Self, ManifestError> {
        let mut seen = BTreeSet::new();
        for d in &manifest.declarations {
            if !seen.insert(d.name.as_str()) {
                return Err(ManifestError::Duplicate(d.name.clone()));
            }
        }
        Ok(Self { manifest, source: None })
    }

    pub fn from_str(src: &str) -> Result<Self, ManifestError> {
        Self::new(from_str_with_path(src)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .map_err(|source| ManifestError::Io { path: path.to_path_buf(), source })?;
        let mut host = Self::from_str(&src)?;
        host.source = Some(path.to_path_buf());
        Ok(host)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    fn declaration(&self, index: usize) -> Result<&TypeSpec, LoadError> {
        self.manifest
            .declarations
            .get(index)
            .ok_or_else(|| LoadError(format!("no declaration at index {index}")))
    }

    /// Direct supertypes of `fqn`: declared parent and interfaces plus table entries.
    fn direct_supertypes(&self, fqn: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(spec) = self.manifest.declarations.iter().find(|d| d.name == fqn) {
            let erased = |notation: &String| match class_notation(notation) {
                Ok(c) => c.fully_qualified_name(),
                Err(_) => notation.clone(),
            };
            out.extend(spec.extends.iter().map(erased));
            out.extend(spec.implements.iter().map(erased));
        }
        if let Some(extra) = self.manifest.supertypes.get(fqn) {
            out.extend(extra.iter().cloned());
        }
        out
    }
}

impl RoundEnvironment for ManifestHost {
    type Element = ManifestElement;

    fn error_raised(&self) -> bool {
        false
    }

    fn processing_over(&self) -> bool {
        false
    }

    fn elements_annotated_with(&self, annotation: &ClassType) -> Vec<ManifestElement> {
        let fqn = annotation.fully_qualified_name();
        let mut out = Vec::new();
        for (owner, spec) in self.manifest.declarations.iter().enumerate() {
            if TypeSpec::has_annotation(&spec.annotations, &fqn) {
                out.push(ManifestElement {
                    kind: ElementKind::Type,
                    owner,
                    method: None,
                    name: spec.name.clone(),
                    parameter_count: 0,
                });
            }
            for (index, m) in spec.methods.iter().enumerate() {
                if TypeSpec::has_annotation(&m.annotations, &fqn) {
                    out.push(ManifestElement {
                        kind: ElementKind::Method,
                        owner,
                        method: Some(index),
                        name: format!("{}::{}", spec.name, m.name),
                        parameter_count: m.parameters.len(),
                    });
                }
            }
        }
        out
    }
}

impl Loader<ManifestElement> for ManifestHost {
    fn load_type(&self, element: &ManifestElement) -> Result<ClassDecl, LoadError> {
        Ok(self.declaration(element.owner)?.lower()?)
    }

    fn load_method(&self, element: &ManifestElement) -> Result<(ClassType, Method), LoadError> {
        let spec = self.declaration(element.owner)?;
        let method = element
            .method
            .and_then(|i| spec.methods.get(i))
            .ok_or_else(|| LoadError(format!("{} is not a method", element.name)))?;
        let abstract_by_default = matches!(spec.kind, KindSpec::Interface | KindSpec::Annotation);
        Ok((spec.class_type(), method.lower(abstract_by_default)?))
    }
}

impl Assignability for ManifestHost {
    /// Reflexive and transitive over the declared supertypes.
    fn is_assignable(&self, candidate: &ClassType, target: &ClassType) -> bool {
        let target = target.fully_qualified_name();
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([candidate.fully_qualified_name()]);
        while let Some(current) = queue.pop_front() {
            if current == target {
                return true;
            }
            if seen.insert(current.clone()) {
                queue.extend(self.direct_supertypes(&current));
            }
        }
        false
    }
}
