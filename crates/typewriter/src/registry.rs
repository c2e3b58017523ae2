//! Registry of every type declared in one run.

use crate::ir::{PackageKind, PackageType, Primitive, TypeRef};
use indexmap::IndexMap;
use serde::Serialize;

/// All [`PackageType`]s of a run, keyed by qualified name.
///
/// Iteration follows insertion order (file order as scanned, then
/// declaration order), which keeps rendered output deterministic.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TypeRegistry {
    types: IndexMap<String, PackageType>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a type. A re-declaration replaces the earlier entry in place.
    pub fn insert(&mut self, ty: PackageType) -> Option<PackageType> {
        self.types.insert(ty.qualified_name(), ty)
    }

    pub fn get(&self, qualified: &str) -> Option<&PackageType> {
        self.types.get(qualified)
    }

    pub fn contains(&self, qualified: &str) -> bool {
        self.types.contains_key(qualified)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageType> {
        self.types.values()
    }

    /// Types that get rendered.
    pub fn exported(&self) -> impl Iterator<Item = &PackageType> {
        self.types.values().filter(|t| t.exported)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Follow alias declarations until a non-alias shape is reached.
    ///
    /// Stops at struct types (returning the `Named` reference to them) and
    /// at alias cycles.
    pub fn resolve<'a>(&'a self, ty: &'a TypeRef) -> &'a TypeRef {
        let mut current = ty;
        for _ in 0..=self.types.len() {
            let TypeRef::Named(name) = current else {
                return current;
            };
            match self.types.get(name).map(|t| &t.kind) {
                Some(PackageKind::Alias(target)) => current = target,
                _ => return current,
            }
        }
        current
    }

    /// The primitive behind a type, looking through aliases.
    pub fn primitive_of(&self, ty: &TypeRef) -> Option<Primitive> {
        match self.resolve(ty) {
            TypeRef::Primitive(p) => Some(*p),
            _ => None,
        }
    }
}

impl<'a> IntoIterator for &'a TypeRegistry {
    type Item = &'a PackageType;
    type IntoIter = indexmap::map::Values<'a, String, PackageType>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.values()
    }
}
