//! Type model builder.
//!
//! Lowers scanned declarations into [`PackageType`]s. All files of a run are
//! indexed first so that references resolve regardless of which file
//! declares the target.

use crate::diagnostics::{Diagnostics, Warning};
use crate::input::{RawDecl, RawField, RawType, SourceFile, TagValue};
use crate::ir::{Field, PackageKind, PackageType, Primitive, TypeRef, is_exported, qualify};
use crate::registry::TypeRegistry;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Build the registry for a set of scanned files.
pub fn build_registry(files: &[SourceFile], diags: &mut Diagnostics) -> TypeRegistry {
    let mut builder = Builder::new(files, diags);
    builder.build_all();
    tracing::debug!(types = builder.registry.len(), "built type registry");
    builder.registry
}

#[derive(Clone, Copy)]
struct DeclRef<'a> {
    package: &'a str,
    decl: &'a RawDecl,
}

/// Resolution context: the declaration currently being lowered.
struct Scope<'a> {
    package: &'a str,
    type_params: &'a [String],
    /// Qualified name of the owning type, for warnings.
    owner: String,
    /// The declared type that synthesized types are registered after.
    root: String,
    exported: bool,
}

enum Entry {
    Own(Field),
    Promoted { field: Field, from: String },
}

struct Builder<'a, 'd> {
    /// Last declaration wins, first position is kept.
    index: IndexMap<String, DeclRef<'a>>,
    registry: TypeRegistry,
    diags: &'d mut Diagnostics,
    /// Struct field lists already lowered, by qualified name.
    built: HashMap<String, Vec<Field>>,
    /// Structs whose fields are being lowered (embedding cycle guard).
    visiting: HashSet<String>,
    /// Unexported aliases being substituted (alias cycle guard).
    expanding: HashSet<String>,
    /// Synthesized types for anonymous structs, keyed by owner.
    hoisted: IndexMap<String, Vec<PackageType>>,
    /// Qualified names handed out to synthesized types.
    hoisted_names: HashSet<String>,
    /// Struct literals already hoisted, by address in the scanned tree.
    hoisted_sites: HashMap<*const RawType, TypeRef>,
}

impl<'a, 'd> Builder<'a, 'd> {
    fn new(files: &'a [SourceFile], diags: &'d mut Diagnostics) -> Self {
        let mut index = IndexMap::new();
        for file in files {
            for decl in &file.declarations {
                index.insert(
                    qualify(&file.package, &decl.name),
                    DeclRef {
                        package: &file.package,
                        decl,
                    },
                );
            }
        }
        Self {
            index,
            registry: TypeRegistry::new(),
            diags,
            built: HashMap::new(),
            visiting: HashSet::new(),
            expanding: HashSet::new(),
            hoisted: IndexMap::new(),
            hoisted_names: HashSet::new(),
            hoisted_sites: HashMap::new(),
        }
    }

    fn build_all(&mut self) {
        let decls: Vec<(String, DeclRef<'a>)> = self
            .index
            .iter()
            .map(|(key, decl)| (key.clone(), *decl))
            .collect();

        for (key, decl_ref) in decls {
            let package_type = self.build_decl(&key, decl_ref);
            self.registry.insert(package_type);
            if let Some(hoisted) = self.hoisted.shift_remove(&key) {
                for ty in hoisted {
                    self.registry.insert(ty);
                }
            }
        }

        // Hoisted from owners that were never inserted themselves.
        let rest: Vec<PackageType> = self.hoisted.drain(..).flat_map(|(_, v)| v).collect();
        for ty in rest {
            self.registry.insert(ty);
        }

        self.check_duplicate_names();
    }

    /// Renderers emit bare names, so the same name in two packages clashes.
    fn check_duplicate_names(&mut self) {
        let mut packages: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for ty in self.registry.exported() {
            packages.entry(ty.name.as_str()).or_default().push(ty.package.as_str());
        }
        let duplicates: Vec<String> = packages
            .into_iter()
            .filter(|(_, pkgs)| pkgs.len() > 1)
            .map(|(name, _)| name.to_string())
            .collect();
        for name in duplicates {
            self.diags.warn(Warning::DuplicateName { name });
        }
    }

    fn scope(&self, key: &str, decl_ref: DeclRef<'a>) -> Scope<'a> {
        Scope {
            package: decl_ref.package,
            type_params: &decl_ref.decl.type_params,
            owner: key.to_string(),
            root: key.to_string(),
            exported: !decl_ref.decl.private,
        }
    }

    fn build_decl(&mut self, key: &str, decl_ref: DeclRef<'a>) -> PackageType {
        let decl = decl_ref.decl;
        tracing::trace!(decl = key, line = decl.line, "lowering declaration");
        let kind = match &decl.ty {
            RawType::Struct(_) => PackageKind::Struct(self.struct_fields(key).unwrap_or_default()),
            other => {
                let scope = self.scope(key, decl_ref);
                let target = self
                    .resolve(&scope, other, &element_hint(&decl.name))
                    .unwrap_or_else(|| {
                        self.diags.warn(Warning::UnsupportedShape {
                            owner: key.to_string(),
                            detail: "declared shape has no JSON form, using placeholder".into(),
                        });
                        TypeRef::Interface
                    });
                PackageKind::Alias(target)
            }
        };

        PackageType {
            name: decl.name.clone(),
            package: decl_ref.package.to_string(),
            docs: decl.docs.clone(),
            exported: !decl.private,
            strict: decl.strict,
            kind,
        }
    }

    /// Fields of the struct declared as `key`, embedding promoted.
    ///
    /// Returns `None` when `key` is already being lowered (embedding cycle).
    fn struct_fields(&mut self, key: &str) -> Option<Vec<Field>> {
        if let Some(fields) = self.built.get(key) {
            return Some(fields.clone());
        }
        let decl_ref = *self.index.get(key)?;
        let RawType::Struct(raw_fields) = &decl_ref.decl.ty else {
            return None;
        };
        if !self.visiting.insert(key.to_string()) {
            return None;
        }

        let scope = self.scope(key, decl_ref);
        let fields = self.build_fields(&scope, &decl_ref.decl.name, raw_fields);

        self.visiting.remove(key);
        self.built.insert(key.to_string(), fields.clone());
        Some(fields)
    }

    fn build_fields(&mut self, scope: &Scope<'a>, owner_name: &str, raw_fields: &'a [RawField]) -> Vec<Field> {
        let mut entries = Vec::new();
        for raw in raw_fields {
            if raw.is_embedded() {
                self.embed(scope, owner_name, raw, &mut entries);
            } else {
                for name in &raw.names {
                    if let Some(field) = self.build_field(scope, owner_name, name, raw) {
                        entries.push(Entry::Own(field));
                    }
                }
            }
        }

        let own: HashSet<String> = entries
            .iter()
            .filter_map(|e| match e {
                Entry::Own(f) if !f.skip => Some(f.output_name.clone()),
                _ => None,
            })
            .collect();

        let mut promoted_seen = HashSet::new();
        let mut fields = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                Entry::Own(field) => fields.push(field),
                Entry::Promoted { field, from } => {
                    if field.skip {
                        continue;
                    }
                    if own.contains(&field.output_name)
                        || !promoted_seen.insert(field.output_name.clone())
                    {
                        self.diags.warn(Warning::FieldCollision {
                            owner: scope.owner.clone(),
                            field: field.output_name,
                            embedded: from,
                        });
                        continue;
                    }
                    fields.push(field);
                }
            }
        }
        fields
    }

    fn build_field(
        &mut self,
        scope: &Scope<'a>,
        owner_name: &str,
        name: &str,
        raw: &'a RawField,
    ) -> Option<Field> {
        if !is_exported(name) {
            self.skip_warning(scope, name, "unexported field");
            return None;
        }

        let json = raw.tag.value("json").unwrap_or_default();
        let tw = raw.tag.value("tw").unwrap_or_default();
        let output_name = json.name.unwrap_or(name).to_string();

        if json.is_skip() || tw.is_skip() {
            self.skip_warning(scope, name, "tagged `-`");
            return Some(Field {
                name: name.to_string(),
                output_name,
                docs: raw.docs.clone(),
                ty: TypeRef::Interface,
                optional: false,
                omit_empty: false,
                skip: true,
            });
        }

        let hint = format!("{}{}", owner_name, name);
        let Some(mut ty) = self.resolve(scope, &raw.ty, &hint) else {
            self.skip_warning(scope, name, "channel and func types have no JSON form");
            return None;
        };

        if json.has("string") {
            ty = quoted(ty);
        }

        let omit_empty = is_omittable(&json) || tw.has("optional");
        let optional = matches!(ty, TypeRef::Pointer(_)) || omit_empty || tw.has("null");

        Some(Field {
            name: name.to_string(),
            output_name,
            docs: raw.docs.clone(),
            ty,
            optional,
            omit_empty,
            skip: false,
        })
    }

    fn embed(&mut self, scope: &Scope<'a>, owner_name: &str, raw: &'a RawField, entries: &mut Vec<Entry>) {
        let (inner, via_pointer) = match &raw.ty {
            RawType::Pointer(inner) => (inner.as_ref(), true),
            other => (other, false),
        };
        let (key, type_name) = match inner {
            RawType::Ident(name) => (qualify(scope.package, name), name.as_str()),
            RawType::Qualified { package, name } => (qualify(package, name), name.as_str()),
            RawType::Generic { base, .. } => match base.as_ref() {
                RawType::Ident(name) => (qualify(scope.package, name), name.as_str()),
                RawType::Qualified { package, name } => (qualify(package, name), name.as_str()),
                _ => return,
            },
            _ => return,
        };

        let json = raw.tag.value("json").unwrap_or_default();
        let struct_key = self.underlying_struct(&key);
        let is_struct = struct_key.is_some();

        // A tagged embedded struct, or a non-struct, is an ordinary field.
        if json.name.is_some() || json.is_skip() || (!is_struct && self.index.contains_key(&key)) {
            if let Some(field) = self.build_field(scope, owner_name, type_name, raw) {
                entries.push(Entry::Own(field));
            }
            return;
        }

        if !is_struct {
            self.skip_warning(
                scope,
                type_name,
                &format!("embedded type `{}` is not declared in any scanned file", key),
            );
            return;
        }

        let Some(promoted) = struct_key.and_then(|k| self.struct_fields(&k)) else {
            self.skip_warning(scope, type_name, "embedding cycle");
            return;
        };
        for mut field in promoted {
            if via_pointer {
                field.optional = true;
                field.omit_empty = true;
            }
            entries.push(Entry::Promoted {
                field,
                from: type_name.to_string(),
            });
        }
    }

    /// The struct declaration `key` names, following defined types and
    /// aliases (`type Admin Base`, `type Old = Base`).
    fn underlying_struct(&self, key: &str) -> Option<String> {
        let mut key = key.to_string();
        for _ in 0..=self.index.len() {
            let target = self.index.get(&key)?;
            key = match &target.decl.ty {
                RawType::Struct(_) => return Some(key),
                RawType::Ident(name) if Primitive::from_go(name).is_none() => {
                    qualify(target.package, name)
                }
                RawType::Qualified { package, name } => qualify(package, name),
                _ => return None,
            };
        }
        None
    }

    /// Lower a type expression. `None` means the shape cannot be serialized.
    fn resolve(&mut self, scope: &Scope<'a>, raw: &'a RawType, hint: &str) -> Option<TypeRef> {
        let ty = match raw {
            RawType::Ident(name) => self.resolve_ident(scope, name),
            RawType::Qualified { package, name } => {
                let key = qualify(package, name);
                if self.index.contains_key(&key) {
                    self.reference(scope, &key)
                } else {
                    self.unresolved(scope, key)
                }
            }
            RawType::Generic { base, args } => {
                if !args.is_empty() {
                    self.diags.warn(Warning::UnsupportedShape {
                        owner: scope.owner.clone(),
                        detail: "generic type arguments dropped".into(),
                    });
                }
                return self.resolve(scope, base, hint);
            }
            RawType::Pointer(inner) => TypeRef::Pointer(Box::new(self.resolve(scope, inner, hint)?)),
            RawType::Slice(inner) => TypeRef::Slice(Box::new(self.resolve(scope, inner, hint)?)),
            // Only `[]byte` is base64: byte arrays encode as numbers.
            RawType::Array(inner) => match self.resolve(scope, inner, hint)? {
                TypeRef::Primitive(Primitive::Byte) => TypeRef::slice(TypeRef::Primitive(Primitive::Int {
                    bits: 8,
                    signed: false,
                })),
                element => TypeRef::Slice(Box::new(element)),
            },
            RawType::Map { key, value } => {
                let key_ty = self.resolve(scope, key, hint)?;
                let value_ty = self.resolve(scope, value, hint)?;
                if self.is_map_key(scope, key, 0) {
                    TypeRef::Map {
                        key: Box::new(key_ty),
                        value: Box::new(value_ty),
                    }
                } else {
                    self.diags.warn(Warning::UnsupportedShape {
                        owner: scope.owner.clone(),
                        detail: "unsupported map key type, using opaque record".into(),
                    });
                    TypeRef::Opaque
                }
            }
            RawType::Struct(fields) => self.hoist(scope, hint, raw, fields),
            RawType::Interface => TypeRef::Interface,
            RawType::Channel | RawType::Function => return None,
            RawType::Unsupported(kind) => {
                self.diags.warn(Warning::UnsupportedShape {
                    owner: scope.owner.clone(),
                    detail: format!("unsupported type syntax `{}`, using placeholder", kind),
                });
                TypeRef::Interface
            }
        };
        Some(ty)
    }

    fn resolve_ident(&mut self, scope: &Scope<'a>, name: &str) -> TypeRef {
        if scope.type_params.iter().any(|p| p == name) {
            self.diags.warn(Warning::UnsupportedShape {
                owner: scope.owner.clone(),
                detail: format!("type parameter `{}` rendered as placeholder", name),
            });
            return TypeRef::Interface;
        }
        if let Some(prim) = Primitive::from_go(name) {
            return TypeRef::Primitive(prim);
        }
        match name {
            "any" | "error" => return TypeRef::Interface,
            "complex64" | "complex128" => {
                self.diags.warn(Warning::UnsupportedShape {
                    owner: scope.owner.clone(),
                    detail: format!("`{}` has no JSON form, using placeholder", name),
                });
                return TypeRef::Interface;
            }
            _ => {}
        }

        let key = qualify(scope.package, name);
        if self.index.contains_key(&key) {
            self.reference(scope, &key)
        } else {
            self.unresolved(scope, name.to_string())
        }
    }

    /// A reference to a scanned declaration.
    fn reference(&mut self, scope: &Scope<'a>, key: &str) -> TypeRef {
        let Some(target) = self.index.get(key).copied() else {
            return self.unresolved(scope, key.to_string());
        };
        if !target.decl.private {
            return TypeRef::Named(key.to_string());
        }

        // Unexported types are never rendered: substitute non-struct shapes,
        // give up on structs.
        if matches!(target.decl.ty, RawType::Struct(_)) || !self.expanding.insert(key.to_string()) {
            self.diags.warn(Warning::UnresolvedType {
                owner: scope.owner.clone(),
                name: format!("{} (unexported)", key),
            });
            return TypeRef::External(key.to_string());
        }
        let target_scope = self.scope(key, target);
        let resolved = self
            .resolve(&target_scope, &target.decl.ty, &element_hint(&target.decl.name))
            .unwrap_or(TypeRef::Interface);
        self.expanding.remove(key);
        resolved
    }

    fn unresolved(&mut self, scope: &Scope<'a>, name: String) -> TypeRef {
        self.diags.warn(Warning::UnresolvedType {
            owner: scope.owner.clone(),
            name: name.clone(),
        });
        TypeRef::External(name)
    }

    /// Whether Go's JSON encoder can use `raw` as a map key.
    ///
    /// External types are accepted: they may marshal themselves as text.
    fn is_map_key(&self, scope: &Scope<'a>, raw: &RawType, depth: usize) -> bool {
        if depth > self.index.len() {
            return false;
        }
        let key = match raw {
            RawType::Ident(name) => {
                if let Some(prim) = Primitive::from_go(name) {
                    return prim.is_map_key();
                }
                if scope.type_params.iter().any(|p| p == name) {
                    return false;
                }
                qualify(scope.package, name)
            }
            RawType::Qualified { package, name } => qualify(package, name),
            _ => return false,
        };
        match self.index.get(&key) {
            Some(target) => {
                let target_scope = Scope {
                    package: target.package,
                    type_params: &target.decl.type_params,
                    owner: key.clone(),
                    root: key.clone(),
                    exported: !target.decl.private,
                };
                self.is_map_key(&target_scope, &target.decl.ty, depth + 1)
            }
            None => true,
        }
    }

    /// Register an anonymous struct as `<Owner><Field>`, numbered when that
    /// name is taken. Each struct literal is hoisted once.
    fn hoist(
        &mut self,
        scope: &Scope<'a>,
        hint: &str,
        literal: &'a RawType,
        fields: &'a [RawField],
    ) -> TypeRef {
        let site = std::ptr::from_ref(literal);
        if let Some(existing) = self.hoisted_sites.get(&site) {
            return existing.clone();
        }

        let name = self.free_name(scope.package, hint);
        if name != hint {
            self.diags.warn(Warning::UnsupportedShape {
                owner: scope.owner.clone(),
                detail: format!("`{}` is already declared, anonymous struct named `{}`", hint, name),
            });
        }
        let key = qualify(scope.package, &name);
        self.hoisted_names.insert(key.clone());
        self.hoisted_sites.insert(site, TypeRef::Named(key.clone()));

        let inner_scope = Scope {
            package: scope.package,
            type_params: scope.type_params,
            owner: key.clone(),
            root: scope.root.clone(),
            exported: scope.exported,
        };
        let fields = self.build_fields(&inner_scope, &name, fields);
        let ty = PackageType {
            name,
            package: scope.package.to_string(),
            docs: None,
            exported: scope.exported,
            strict: false,
            kind: PackageKind::Struct(fields),
        };
        self.hoisted.entry(scope.root.clone()).or_default().push(ty);
        TypeRef::Named(key)
    }

    /// `base`, or `base` with the first free numeric suffix.
    fn free_name(&self, package: &str, base: &str) -> String {
        let taken = |name: &str| {
            let key = qualify(package, name);
            self.index.contains_key(&key) || self.hoisted_names.contains(&key)
        };
        if !taken(base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}{}", base, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn skip_warning(&mut self, scope: &Scope<'a>, field: &str, reason: &str) {
        self.diags.warn(Warning::SkippedField {
            owner: scope.owner.clone(),
            field: field.to_string(),
            reason: reason.to_string(),
        });
    }
}

/// Name for an anonymous struct inside a non-struct declaration
/// (`type Pairs []struct{...}` hoists `PairsItem`).
fn element_hint(name: &str) -> String {
    format!("{}Item", name)
}

fn is_omittable(json: &TagValue<'_>) -> bool {
    json.has("omitempty") || json.has("omitzero")
}

/// Apply the `json:",string"` option: scalars are encoded inside a string.
fn quoted(ty: TypeRef) -> TypeRef {
    match ty {
        TypeRef::Primitive(_) => TypeRef::string(),
        TypeRef::Pointer(inner) if matches!(*inner, TypeRef::Primitive(_)) => {
            TypeRef::pointer(TypeRef::string())
        }
        other => other,
    }
}
