use crate::model::{Annotated, Annotation, Constructor, Field, Method, Modifiers};
use crate::types::{ClassType, GenericParam, TypeNamer};
use crate::value::Value;

/// Declaration kind; each variant carries only what that kind may legally hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassKind {
    Concrete { parent: Option<ClassType>, interfaces: Vec<ClassType> },
    Abstract { parent: Option<ClassType>, interfaces: Vec<ClassType> },
    Interface { extends: Vec<ClassType> },
    Enum { interfaces: Vec<ClassType>, entries: Vec<EnumEntry> },
    Annotation,
}

impl ClassKind {
    pub fn label(&self) -> &'static str {
        match self {
            ClassKind::Concrete { .. } => "class",
            ClassKind::Abstract { .. } => "abstract class",
            ClassKind::Interface { .. } => "interface",
            ClassKind::Enum { .. } => "enum",
            ClassKind::Annotation => "annotation",
        }
    }

    pub fn parent(&self) -> Option<&ClassType> {
        match self {
            ClassKind::Concrete { parent, .. } | ClassKind::Abstract { parent, .. } => parent.as_ref(),
            _ => None,
        }
    }

    /// Implemented interfaces, or the extended ones for an interface.
    pub fn interfaces(&self) -> &[ClassType] {
        match self {
            ClassKind::Concrete { interfaces, .. }
            | ClassKind::Abstract { interfaces, .. }
            | ClassKind::Enum { interfaces, .. } => interfaces,
            ClassKind::Interface { extends } => extends,
            ClassKind::Annotation => &[],
        }
    }

    pub fn entries(&self) -> &[EnumEntry] {
        match self {
            ClassKind::Enum { entries, .. } => entries,
            _ => &[],
        }
    }
}

/// One enumeration constant with its constructor arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub(crate) name: String,
    pub(crate) arguments: Vec<Value>,
}

impl EnumEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn code(&self, namer: &dyn TypeNamer) -> String {
        if self.arguments.is_empty() {
            return self.name.clone();
        }
        let args: Vec<String> = self.arguments.iter().map(|a| a.code(namer)).collect();
        format!("{}({})", self.name, args.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub(crate) ty: ClassType,
    pub(crate) kind: ClassKind,
    pub(crate) modifiers: Modifiers,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) generics: Vec<GenericParam>,
    pub(crate) fields: Vec<Field>,
    pub(crate) constructors: Vec<Constructor>,
    pub(crate) methods: Vec<Method>,
    pub(crate) nested: Vec<ClassDecl>,
}

impl ClassDecl {
    pub fn ty(&self) -> &ClassType {
        &self.ty
    }

    pub fn kind(&self) -> &ClassKind {
        &self.kind
    }

    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    pub fn generics(&self) -> &[GenericParam] {
        &self.generics
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn nested(&self) -> &[ClassDecl] {
        &self.nested
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, ClassKind::Enum { .. })
    }

    /// Every class reference reachable from this declaration's node tree.
    pub fn visit_classes<'a>(&'a self, f: &mut dyn FnMut(&'a ClassType)) {
        if let Some(parent) = self.kind.parent() {
            parent.visit_classes(f);
        }
        for i in self.kind.interfaces() {
            i.visit_classes(f);
        }
        for e in self.kind.entries() {
            for arg in &e.arguments {
                arg.visit_classes(f);
            }
        }
        for a in &self.annotations {
            a.visit_classes(f);
        }
        for g in &self.generics {
            g.visit_classes(f);
        }
        for field in &self.fields {
            field.visit_classes(f);
        }
        for c in &self.constructors {
            c.visit_classes(f);
        }
        for m in &self.methods {
            m.visit_classes(f);
        }
        for n in &self.nested {
            n.visit_classes(f);
        }
    }

    /// Types declared by this node tree: itself and every nested class.
    pub fn declared_types(&self) -> Vec<&ClassType> {
        let mut out = vec![&self.ty];
        for n in &self.nested {
            out.extend(n.declared_types());
        }
        out
    }
}

impl Annotated for ClassDecl {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}
