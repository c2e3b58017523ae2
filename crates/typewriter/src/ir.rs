//! Intermediate representation for Go type declarations.
//!
//! The builder lowers scanned Go declarations into this model; every
//! renderer reads it through the [`TypeRegistry`](crate::registry::TypeRegistry).

use serde::Serialize;

/// One declared Go type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageType {
    /// Bare Go identifier (e.g., "User").
    pub name: String,
    /// Go package the declaration lives in.
    pub package: String,
    /// Documentation comment.
    pub docs: Option<String>,
    /// Whether the type is rendered and usable as a field type elsewhere.
    pub exported: bool,
    /// Whether the declaration asked for an exact object type.
    pub strict: bool,
    /// The type's shape.
    pub kind: PackageKind,
}

/// The shape of a declared type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PackageKind {
    /// A struct with fields in declaration order (embedded fields promoted).
    Struct(Vec<Field>),
    /// Any other declared shape (`type ID string`, `type Tags []string`).
    Alias(TypeRef),
}

/// A field of a struct declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    /// Go identifier.
    pub name: String,
    /// Serialized name (from the `json` tag, else the identifier).
    pub output_name: String,
    /// Documentation comment.
    pub docs: Option<String>,
    /// Field type.
    pub ty: TypeRef,
    /// Whether the value may be absent or null.
    pub optional: bool,
    /// Whether the key itself may be missing (`omitempty` and friends).
    pub omit_empty: bool,
    /// Whether the field is excluded from output.
    pub skip: bool,
}

/// The shape of a field's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum TypeRef {
    Primitive(Primitive),

    /// Reference to another registry entry by qualified name.
    Named(String),
    /// A type that no scanned file declares.
    External(String),

    Pointer(Box<TypeRef>),
    Slice(Box<TypeRef>),
    Map {
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },

    /// `interface{}`, `any`, `error`, or an interface literal.
    Interface,
    /// An anonymously included struct, by qualified name.
    Embedded(String),
    /// A keyed record whose key type has no string form.
    Opaque,
}

/// Primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Primitive {
    Int { bits: u8, signed: bool },
    Float { bits: u8 },
    Bool,
    String,
    Byte,
}

impl PackageType {
    pub fn structure(package: &str, name: impl Into<String>, fields: Vec<Field>) -> Self {
        let name = name.into();
        Self {
            exported: is_exported(&name),
            name,
            package: package.to_string(),
            docs: None,
            strict: false,
            kind: PackageKind::Struct(fields),
        }
    }

    pub fn alias(package: &str, name: impl Into<String>, target: TypeRef) -> Self {
        let name = name.into();
        Self {
            exported: is_exported(&name),
            name,
            package: package.to_string(),
            docs: None,
            strict: false,
            kind: PackageKind::Alias(target),
        }
    }

    /// Registry key: `package.Name`.
    pub fn qualified_name(&self) -> String {
        qualify(&self.package, &self.name)
    }

    pub fn fields(&self) -> &[Field] {
        match &self.kind {
            PackageKind::Struct(fields) => fields,
            PackageKind::Alias(_) => &[],
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, PackageKind::Struct(_))
    }

    pub fn with_docs(mut self, docs: impl Into<String>) -> Self {
        self.docs = Some(docs.into());
        self
    }
}

impl Field {
    pub fn required(name: impl Into<String>, ty: TypeRef) -> Self {
        let name = name.into();
        Self {
            output_name: name.clone(),
            name,
            docs: None,
            optional: matches!(ty, TypeRef::Pointer(_)),
            ty,
            omit_empty: false,
            skip: false,
        }
    }

    pub fn omittable(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            optional: true,
            omit_empty: true,
            ..Self::required(name, ty)
        }
    }

    pub fn renamed(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = output_name.into();
        self
    }
}

impl TypeRef {
    pub fn string() -> Self {
        TypeRef::Primitive(Primitive::String)
    }

    pub fn int() -> Self {
        TypeRef::Primitive(Primitive::Int {
            bits: 64,
            signed: true,
        })
    }

    pub fn named(package: &str, name: &str) -> Self {
        TypeRef::Named(qualify(package, name))
    }

    pub fn pointer(inner: TypeRef) -> Self {
        TypeRef::Pointer(Box::new(inner))
    }

    pub fn slice(inner: TypeRef) -> Self {
        TypeRef::Slice(Box::new(inner))
    }

    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// `[]byte`, which Go's JSON encoder writes as a base64 string.
    pub fn is_byte_slice(&self) -> bool {
        matches!(self, TypeRef::Slice(inner) if **inner == TypeRef::Primitive(Primitive::Byte))
    }

    /// Visit every qualified name this type refers to.
    pub fn for_each_named(&self, f: &mut impl FnMut(&str)) {
        match self {
            TypeRef::Named(name) | TypeRef::Embedded(name) => f(name),
            TypeRef::Pointer(inner) | TypeRef::Slice(inner) => inner.for_each_named(f),
            TypeRef::Map { key, value } => {
                key.for_each_named(f);
                value.for_each_named(f);
            }
            TypeRef::Primitive(_) | TypeRef::External(_) | TypeRef::Interface | TypeRef::Opaque => {
            }
        }
    }
}

impl Primitive {
    /// Builtin Go type names.
    pub fn from_go(name: &str) -> Option<Self> {
        let prim = match name {
            "bool" => Primitive::Bool,
            "string" => Primitive::String,
            "byte" | "uint8" => Primitive::Byte,
            "int" => Primitive::Int {
                bits: 64,
                signed: true,
            },
            "int8" => Primitive::Int {
                bits: 8,
                signed: true,
            },
            "int16" => Primitive::Int {
                bits: 16,
                signed: true,
            },
            "int32" | "rune" => Primitive::Int {
                bits: 32,
                signed: true,
            },
            "int64" => Primitive::Int {
                bits: 64,
                signed: true,
            },
            "uint" | "uint64" | "uintptr" => Primitive::Int {
                bits: 64,
                signed: false,
            },
            "uint16" => Primitive::Int {
                bits: 16,
                signed: false,
            },
            "uint32" => Primitive::Int {
                bits: 32,
                signed: false,
            },
            "float32" => Primitive::Float { bits: 32 },
            "float64" => Primitive::Float { bits: 64 },
            _ => return None,
        };
        Some(prim)
    }

    /// Whether Go's JSON encoder accepts this as a map key.
    pub fn is_map_key(self) -> bool {
        matches!(
            self,
            Primitive::String | Primitive::Int { .. } | Primitive::Byte
        )
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Primitive::Int { .. } | Primitive::Byte)
    }
}

/// Go's export rule: the identifier starts with an uppercase letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

pub fn qualify(package: &str, name: &str) -> String {
    format!("{}.{}", package, name)
}

/// The bare name of a qualified `package.Name`.
pub fn bare_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_model_programmatically() {
        let user = PackageType::structure(
            "models",
            "User",
            vec![
                Field::required("ID", TypeRef::int()),
                Field::required("Name", TypeRef::string()).renamed("name"),
                Field::required("Manager", TypeRef::pointer(TypeRef::named("models", "User"))),
            ],
        );

        assert_eq!(user.qualified_name(), "models.User");
        assert!(user.exported);
        assert_eq!(user.fields().len(), 3);
        assert_eq!(user.fields()[1].output_name, "name");
        assert!(user.fields()[2].optional);
        assert!(!user.fields()[2].omit_empty);
    }

    #[test]
    fn export_rule() {
        assert!(is_exported("User"));
        assert!(!is_exported("user"));
        assert!(!is_exported("_User"));
    }

    #[test]
    fn builtin_primitives() {
        assert_eq!(
            Primitive::from_go("uint32"),
            Some(Primitive::Int {
                bits: 32,
                signed: false
            })
        );
        assert_eq!(Primitive::from_go("float64"), Some(Primitive::Float { bits: 64 }));
        assert_eq!(Primitive::from_go("User"), None);
        assert!(!Primitive::Bool.is_map_key());
        assert!(!Primitive::Float { bits: 64 }.is_map_key());
    }

    #[test]
    fn named_references_are_collected() {
        let ty = TypeRef::map(
            TypeRef::string(),
            TypeRef::slice(TypeRef::pointer(TypeRef::named("models", "User"))),
        );
        let mut names = Vec::new();
        ty.for_each_named(&mut |n| names.push(n.to_string()));
        assert_eq!(names, vec!["models.User"]);
        assert_eq!(bare_name("models.User"), "User");
    }
}
