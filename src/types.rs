//! Type references used by every declaration node.
//!
//! A [`TypeRef`] never owns a declaration; it only names one. Class references
//! compare by fully-qualified name plus generic arguments.
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DefinitionError;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

/// `true` if `name` can be used verbatim as a declaration or member name.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

pub(crate) fn check_identifier(name: &str) -> Result<(), DefinitionError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(DefinitionError::illegal(format!("`{name}` is not a valid identifier")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Boolean,
        Primitive::Byte,
        Primitive::Char,
        Primitive::Short,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }

    /// Widening conversion `self -> target` that needs no cast.
    pub fn widens_to(self, target: Primitive) -> bool {
        use Primitive::*;
        if self == target {
            return true;
        }
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => matches!(target, Double),
            Boolean | Double => false,
        }
    }
}

/// Reference to a class, interface, enum or annotation type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassType {
    package: String,
    name: String,
    generics: Vec<TypeRef>,
}

impl ClassType {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self { package: package.into(), name: name.into(), generics: Vec::new() }
    }

    /// Splits at the last dot: `a.b.C` is package `a.b`, simple name `C`.
    pub fn from_fqn(fqn: &str) -> Self {
        match fqn.rsplit_once('.') {
            Some((package, name)) => Self::new(package, name),
            None => Self::new("", fqn),
        }
    }

    pub fn with_generics(mut self, generics: impl IntoIterator<Item = TypeRef>) -> Self {
        self.generics = generics.into_iter().collect();
        self
    }

    pub fn add_generic(&mut self, generic: TypeRef) {
        self.generics.push(generic);
    }

    /// Sibling type in the same package whose simple name carries `suffix`.
    pub fn with_suffix(&self, suffix: &str) -> Self {
        Self::new(self.package.clone(), format!("{}{suffix}", self.name))
    }

    /// The raw type, generic arguments dropped.
    pub fn erased(&self) -> Self {
        Self::new(self.package.clone(), self.name.clone())
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn simple_name(&self) -> &str {
        &self.name
    }

    pub fn generics(&self) -> &[TypeRef] {
        &self.generics
    }

    pub fn fully_qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }

    pub fn visit_classes<'a>(&'a self, f: &mut dyn FnMut(&'a ClassType)) {
        f(self);
        for g in &self.generics {
            g.visit_classes(f);
        }
    }

    pub fn code(&self, namer: &dyn TypeNamer) -> String {
        let mut out = namer.name_of(self);
        if !self.generics.is_empty() {
            let args: Vec<String> = self.generics.iter().map(|g| g.code(namer)).collect();
            out.push('<');
            out.push_str(&args.join(", "));
            out.push('>');
        }
        out
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fully_qualified_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeRef {
    Primitive(Primitive),
    Void,
    Class(ClassType),
    /// A type variable such as `T`.
    Generic(String),
    Array(Box<TypeRef>),
}

impl TypeRef {
    pub fn class(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeRef::Class(ClassType::new(package, name))
    }

    pub fn array_of(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            TypeRef::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn simple_name(&self) -> String {
        self.code(&SimpleNames)
    }

    pub fn visit_classes<'a>(&'a self, f: &mut dyn FnMut(&'a ClassType)) {
        match self {
            TypeRef::Class(c) => c.visit_classes(f),
            TypeRef::Array(inner) => inner.visit_classes(f),
            TypeRef::Primitive(_) | TypeRef::Void | TypeRef::Generic(_) => {}
        }
    }

    pub fn code(&self, namer: &dyn TypeNamer) -> String {
        match self {
            TypeRef::Primitive(p) => p.keyword().to_string(),
            TypeRef::Void => "void".to_string(),
            TypeRef::Class(c) => c.code(namer),
            TypeRef::Generic(name) => name.clone(),
            TypeRef::Array(inner) => format!("{}[]", inner.code(namer)),
        }
    }
}

impl From<ClassType> for TypeRef {
    fn from(c: ClassType) -> Self {
        TypeRef::Class(c)
    }
}

impl From<Primitive> for TypeRef {
    fn from(p: Primitive) -> Self {
        TypeRef::Primitive(p)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code(&QualifiedNames))
    }
}

/// Compact notation: `int`, `void`, `a.b.C`, `a.b.C<x.Y, T>`, `T`, `int[]`.
/// A bare identifier without a package is read as a type variable.
impl FromStr for TypeRef {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Notation { src: s, pos: 0 };
        let ty = parser.type_ref()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

struct Notation<'a> {
    src: &'a str,
    pos: usize,
}

impl Notation<'_> {
    fn error(&self, reason: &str) -> DefinitionError {
        DefinitionError::MalformedType { notation: self.src.to_string(), reason: reason.to_string() }
    }

    fn skip_ws(&mut self) {
        while self.src[self.pos..].starts_with(' ') {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.src[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn type_ref(&mut self) -> Result<TypeRef, DefinitionError> {
        self.skip_ws();
        let rest = &self.src[self.pos..];
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '.'))
            .unwrap_or(rest.len());
        let name = &rest[..len];
        if name.is_empty() {
            return Err(self.error("expected a type name"));
        }
        if !name.split('.').all(is_identifier) {
            return Err(self.error("invalid identifier"));
        }
        self.pos += len;

        let mut ty = if name == "void" {
            TypeRef::Void
        } else if let Some(p) = Primitive::from_keyword(name) {
            TypeRef::Primitive(p)
        } else if !name.contains('.') && !self.src[self.pos..].trim_start().starts_with('<') {
            TypeRef::Generic(name.to_string())
        } else {
            let mut class = ClassType::from_fqn(name);
            if self.eat("<") {
                loop {
                    class.add_generic(self.type_ref()?);
                    if self.eat(">") {
                        break;
                    }
                    if !self.eat(",") {
                        return Err(self.error("expected `,` or `>`"));
                    }
                }
            }
            TypeRef::Class(class)
        };

        while self.eat("[]") {
            if ty.is_void() {
                return Err(self.error("void cannot be an array element"));
            }
            ty = TypeRef::array_of(ty);
        }
        Ok(ty)
    }
}

/// Declared type parameter, e.g. `T extends Comparable<T>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericParam {
    pub name: String,
    pub bounds: Vec<TypeRef>,
}

impl GenericParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), bounds: Vec::new() }
    }

    pub fn bounded(name: impl Into<String>, bounds: impl IntoIterator<Item = TypeRef>) -> Self {
        Self { name: name.into(), bounds: bounds.into_iter().collect() }
    }

    pub fn visit_classes<'a>(&'a self, f: &mut dyn FnMut(&'a ClassType)) {
        for b in &self.bounds {
            b.visit_classes(f);
        }
    }

    pub fn code(&self, namer: &dyn TypeNamer) -> String {
        if self.bounds.is_empty() {
            return self.name.clone();
        }
        let bounds: Vec<String> = self.bounds.iter().map(|b| b.code(namer)).collect();
        format!("{} extends {}", self.name, bounds.join(" & "))
    }
}

/// `<A, B extends C>` or the empty string.
pub fn generics_code(params: &[GenericParam], namer: &dyn TypeNamer) -> String {
    if params.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = params.iter().map(|p| p.code(namer)).collect();
    format!("<{}>", parts.join(", "))
}

/// Decides how a class reference is spelled in emitted code.
pub trait TypeNamer {
    fn name_of(&self, ty: &ClassType) -> String;
}

/// Always the simple name; callers are responsible for the imports.
pub struct SimpleNames;

impl TypeNamer for SimpleNames {
    fn name_of(&self, ty: &ClassType) -> String {
        ty.simple_name().to_string()
    }
}

/// Always the fully-qualified name.
pub struct QualifiedNames;

impl TypeNamer for QualifiedNames {
    fn name_of(&self, ty: &ClassType) -> String {
        ty.fully_qualified_name()
    }
}
