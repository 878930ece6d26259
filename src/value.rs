//! Literal values for annotation attributes, field initializers and enum entries.
use ordered_float::OrderedFloat;

use crate::error::DefinitionError;
use crate::model::Annotation;
use crate::types::{ClassType, Primitive, TypeNamer, TypeRef};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Char(char),
    Float(OrderedFloat<f32>),
    Double(OrderedFloat<f64>),
    Str(String),
    Enum { ty: ClassType, constant: String },
    /// `X.class`
    Class(TypeRef),
    Annotation(Box<Annotation>),
    Array { element: TypeRef, items: Vec<Value> },
}

fn string_type() -> TypeRef {
    TypeRef::class("java.lang", "String")
}

impl Value {
    pub fn enum_constant(ty: ClassType, constant: impl Into<String>) -> Self {
        Value::Enum { ty, constant: constant.into() }
    }

    pub fn class_literal(ty: impl Into<TypeRef>) -> Self {
        Value::Class(ty.into())
    }

    /// Every item must share the type of the first one.
    pub fn array(items: impl IntoIterator<Item = Value>) -> Result<Self, DefinitionError> {
        let items: Vec<Value> = items.into_iter().collect();
        let Some(first) = items.first() else {
            return Err(DefinitionError::illegal(
                "cannot infer the element type of an empty array, use Value::empty_array",
            ));
        };
        let element = first.value_type();
        if let Some(odd) = items.iter().find(|v| v.value_type() != element) {
            return Err(DefinitionError::TypeMismatch {
                expected: element.to_string(),
                found: odd.value_type().to_string(),
            });
        }
        Ok(Value::Array { element, items })
    }

    pub fn empty_array(element: TypeRef) -> Self {
        Value::Array { element, items: Vec::new() }
    }

    pub fn value_type(&self) -> TypeRef {
        match self {
            Value::Bool(_) => Primitive::Boolean.into(),
            Value::Byte(_) => Primitive::Byte.into(),
            Value::Short(_) => Primitive::Short.into(),
            Value::Int(_) => Primitive::Int.into(),
            Value::Long(_) => Primitive::Long.into(),
            Value::Char(_) => Primitive::Char.into(),
            Value::Float(_) => Primitive::Float.into(),
            Value::Double(_) => Primitive::Double.into(),
            Value::Str(_) => string_type(),
            Value::Enum { ty, .. } => TypeRef::Class(ty.clone()),
            Value::Class(_) => TypeRef::class("java.lang", "Class"),
            Value::Annotation(a) => TypeRef::Class(a.ty().clone()),
            Value::Array { element, .. } => TypeRef::array_of(element.clone()),
        }
    }

    /// Exact match, primitive widening, `Class<...>` for class literals, or a
    /// single element standing in for a one-element array.
    pub fn is_assignable_to(&self, slot: &TypeRef) -> bool {
        let own = self.value_type();
        if &own == slot {
            return true;
        }
        match (&own, slot) {
            (TypeRef::Primitive(from), TypeRef::Primitive(to)) => from.widens_to(*to),
            (TypeRef::Class(from), TypeRef::Class(to)) => {
                from.erased() == to.erased() && matches!(self, Value::Class(_))
            }
            (_, TypeRef::Array(element)) if !matches!(self, Value::Array { .. }) => {
                self.is_assignable_to(element)
            }
            (TypeRef::Array(_), TypeRef::Array(element)) => match self {
                Value::Array { items, .. } => items.iter().all(|i| i.is_assignable_to(element)),
                _ => false,
            },
            _ => false,
        }
    }

    pub fn visit_classes<'a>(&'a self, f: &mut dyn FnMut(&'a ClassType)) {
        match self {
            Value::Enum { ty, .. } => ty.visit_classes(f),
            Value::Class(ty) => ty.visit_classes(f),
            Value::Annotation(a) => a.visit_classes(f),
            Value::Array { element, items } => {
                element.visit_classes(f);
                for item in items {
                    item.visit_classes(f);
                }
            }
            _ => {}
        }
    }

    /// Source-level literal. Pure function of the value and the namer.
    pub fn code(&self, namer: &dyn TypeNamer) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Byte(b) => format!("(byte) {b}"),
            Value::Short(s) => format!("(short) {s}"),
            Value::Int(i) => i.to_string(),
            Value::Long(l) => format!("{l}L"),
            Value::Char(c) => format!("'{}'", escape_char(*c)),
            Value::Float(f) => non_finite("Float", f64::from(f.0)).unwrap_or_else(|| format!("{:?}f", f.0)),
            Value::Double(d) => non_finite("Double", d.0).unwrap_or_else(|| format!("{:?}", d.0)),
            Value::Str(s) => format!("\"{}\"", escape_str(s)),
            Value::Enum { ty, constant } => format!("{}.{constant}", namer.name_of(ty)),
            Value::Class(ty) => format!("{}.class", erased_code(ty, namer)),
            Value::Annotation(a) => a.code(namer),
            Value::Array { items, .. } => {
                let parts: Vec<String> = items.iter().map(|i| i.code(namer)).collect();
                format!("{{{}}}", parts.join(", "))
            }
        }
    }
}

/// NaN and the infinities have no literal; they are spelled as wrapper constants.
fn non_finite(wrapper: &str, v: f64) -> Option<String> {
    if v.is_nan() {
        Some(format!("{wrapper}.NaN"))
    } else if v.is_infinite() {
        let sign = if v > 0.0 { "POSITIVE" } else { "NEGATIVE" };
        Some(format!("{wrapper}.{sign}_INFINITY"))
    } else {
        None
    }
}

fn erased_code(ty: &TypeRef, namer: &dyn TypeNamer) -> String {
    match ty {
        TypeRef::Class(c) => namer.name_of(c),
        TypeRef::Array(inner) => format!("{}[]", erased_code(inner, namer)),
        other => other.code(namer),
    }
}

fn escape_char(c: char) -> String {
    match c {
        '\'' => "\\'".to_string(),
        other => escape_str(&other.to_string()),
    }
}

fn escape_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(OrderedFloat(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(OrderedFloat(v))
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Char(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Annotation> for Value {
    fn from(v: Annotation) -> Self {
        Value::Annotation(Box::new(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SimpleNames;

    #[test]
    fn literals_render_as_source() {
        assert_eq!(Value::from(true).code(&SimpleNames), "true");
        assert_eq!(Value::from(789).code(&SimpleNames), "789");
        assert_eq!(Value::from(5i64).code(&SimpleNames), "5L");
        assert_eq!(Value::from(1.5f32).code(&SimpleNames), "1.5f");
        assert_eq!(Value::from(2.0f64).code(&SimpleNames), "2.0");
        assert_eq!(Value::from(f32::INFINITY).code(&SimpleNames), "Float.POSITIVE_INFINITY");
        assert_eq!(Value::from(f32::NEG_INFINITY).code(&SimpleNames), "Float.NEGATIVE_INFINITY");
        assert_eq!(Value::from(f32::NAN).code(&SimpleNames), "Float.NaN");
        assert_eq!(Value::from(f64::INFINITY).code(&SimpleNames), "Double.POSITIVE_INFINITY");
        assert_eq!(Value::from(f64::NEG_INFINITY).code(&SimpleNames), "Double.NEGATIVE_INFINITY");
        assert_eq!(Value::from(f64::NAN).code(&SimpleNames), "Double.NaN");
        assert_eq!(Value::from('\'').code(&SimpleNames), "'\\''");
        assert_eq!(Value::from("say \"hi\"\n").code(&SimpleNames), "\"say \\\"hi\\\"\\n\"");
    }

    #[test]
    fn enum_and_class_literals_use_the_namer() {
        let policy = ClassType::new("java.lang.annotation", "RetentionPolicy");
        assert_eq!(Value::enum_constant(policy, "RUNTIME").code(&SimpleNames), "RetentionPolicy.RUNTIME");

        let list = ClassType::new("java.util", "List").with_generics([TypeRef::Generic("T".into())]);
        assert_eq!(Value::class_literal(list).code(&SimpleNames), "List.class");
    }

    #[test]
    fn arrays_require_a_common_element_type() {
        let ok = Value::array([Value::from(1), Value::from(2)]).unwrap();
        assert_eq!(ok.code(&SimpleNames), "{1, 2}");
        assert_eq!(ok.value_type(), TypeRef::array_of(Primitive::Int.into()));

        let err = Value::array([Value::from(1), Value::from("two")]).unwrap_err();
        assert!(matches!(err, DefinitionError::TypeMismatch { .. }));
        assert!(Value::array([]).is_err());
    }

    #[test]
    fn assignability_covers_widening_and_array_shorthand() {
        let long: TypeRef = Primitive::Long.into();
        assert!(Value::from(3).is_assignable_to(&long));
        assert!(!Value::from(3i64).is_assignable_to(&Primitive::Int.into()));

        let strings = TypeRef::array_of("java.lang.String".parse().unwrap());
        assert!(Value::from("solo").is_assignable_to(&strings));
        assert!(Value::array([Value::from("a")]).unwrap().is_assignable_to(&strings));

        let class_of_t: TypeRef = "java.lang.Class<T>".parse().unwrap();
        assert!(Value::class_literal(TypeRef::class("a", "B")).is_assignable_to(&class_of_t));
    }
}
