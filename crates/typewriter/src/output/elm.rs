//! Elm renderer.
//!
//! Elm type aliases cannot refer to themselves, even through `List` or
//! `Maybe`. Records that sit on a reference cycle are emitted as a
//! single-constructor custom type (`type Node = Node { ... }`), which breaks
//! the cycle. A cycle made only of non-record aliases has no Elm form and
//! is a [`RenderError`].

use super::GENERATED_NOTICE;
use super::naming::elm_field_name;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::RenderError;
use crate::ir::{Field, PackageKind, PackageType, Primitive, TypeRef};
use crate::registry::TypeRegistry;
use crate::traits::{RenderOptions, Renderer};
use std::collections::{HashMap, HashSet};

const JSON_VALUE: &str = "Json.Decode.Value";

/// Elm renderer implementing the Renderer trait.
#[derive(Debug, Clone)]
pub struct ElmRenderer {
    module: String,
}

impl ElmRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            module: options.elm_module.clone(),
        }
    }
}

impl Renderer for ElmRenderer {
    fn dialect(&self) -> &'static str {
        "elm"
    }

    fn extension(&self) -> &'static str {
        "elm"
    }

    fn render(
        &self,
        registry: &TypeRegistry,
        diags: &mut Diagnostics,
    ) -> Result<String, RenderError> {
        let wrapped = recursive_records(registry)?;
        super::warn_hidden_references(registry, diags, JSON_VALUE);
        let mut writer = ElmWriter {
            registry,
            diags,
            wrapped,
            body: String::new(),
            uses_dict: false,
            uses_json: false,
        };
        for ty in registry.exported() {
            writer.body.push_str("\n\n");
            writer.write_type(ty);
        }

        let mut output = format!("module {} exposing (..)\n\n-- {}\n", self.module, GENERATED_NOTICE);
        if writer.uses_dict || writer.uses_json {
            output.push('\n');
        }
        if writer.uses_dict {
            output.push_str("import Dict exposing (Dict)\n");
        }
        if writer.uses_json {
            output.push_str("import Json.Decode\n");
        }
        output.push_str(&writer.body);
        Ok(output)
    }
}

/// References from each exported type to other exported types.
fn reference_graph(registry: &TypeRegistry) -> HashMap<String, Vec<String>> {
    let mut graph = HashMap::new();
    for ty in registry.exported() {
        let mut targets = Vec::new();
        let mut visit = |name: &str| {
            if registry.get(name).is_some_and(|t| t.exported) {
                targets.push(name.to_string());
            }
        };
        match &ty.kind {
            PackageKind::Struct(fields) => {
                for field in fields.iter().filter(|f| !f.skip) {
                    field.ty.for_each_named(&mut visit);
                }
            }
            PackageKind::Alias(target) => target.for_each_named(&mut visit),
        }
        graph.insert(ty.qualified_name(), targets);
    }
    graph
}

/// Whether `node` can reach itself through `graph`.
fn on_cycle(graph: &HashMap<String, Vec<String>>, node: &str) -> bool {
    let mut stack: Vec<&str> = graph
        .get(node)
        .map(|next| next.iter().map(String::as_str).collect())
        .unwrap_or_default();
    let mut seen = HashSet::new();
    while let Some(current) = stack.pop() {
        if current == node {
            return true;
        }
        if !seen.insert(current) {
            continue;
        }
        if let Some(next) = graph.get(current) {
            stack.extend(next.iter().map(String::as_str));
        }
    }
    false
}

/// Records that need a constructor wrapper; fails on alias-only cycles.
fn recursive_records(registry: &TypeRegistry) -> Result<HashSet<String>, RenderError> {
    let graph = reference_graph(registry);
    let wrapped: HashSet<String> = registry
        .exported()
        .filter(|t| t.is_struct())
        .map(PackageType::qualified_name)
        .filter(|name| on_cycle(&graph, name))
        .collect();

    // With records wrapped, only edges between aliases can still form a cycle.
    let is_alias = |name: &str| registry.get(name).is_some_and(|t| !t.is_struct());
    let alias_graph: HashMap<String, Vec<String>> = graph
        .iter()
        .filter(|(name, _)| is_alias(name.as_str()))
        .map(|(name, next)| {
            let next = next.iter().filter(|n| is_alias(n.as_str())).cloned().collect();
            (name.clone(), next)
        })
        .collect();
    for ty in registry.exported().filter(|t| !t.is_struct()) {
        if on_cycle(&alias_graph, &ty.qualified_name()) {
            return Err(RenderError::RecursiveAlias {
                dialect: "elm",
                name: ty.name.clone(),
            });
        }
    }
    Ok(wrapped)
}

struct ElmWriter<'r, 'd> {
    registry: &'r TypeRegistry,
    diags: &'d mut Diagnostics,
    wrapped: HashSet<String>,
    body: String,
    uses_dict: bool,
    uses_json: bool,
}

impl ElmWriter<'_, '_> {
    fn write_type(&mut self, ty: &PackageType) {
        if let Some(docs) = ty.docs.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            self.body
                .push_str(&format!("{{-| {}\n-}}\n", docs.replace("-}", "- }")));
        }
        match &ty.kind {
            PackageKind::Struct(fields) => {
                let fields: Vec<&Field> = fields.iter().filter(|f| !f.skip).collect();
                if self.wrapped.contains(&ty.qualified_name()) {
                    self.body
                        .push_str(&format!("type {}\n    = {}\n", ty.name, ty.name));
                    self.write_record(ty, &fields, "        ");
                } else {
                    self.body.push_str(&format!("type alias {} =\n", ty.name));
                    self.write_record(ty, &fields, "    ");
                }
            }
            PackageKind::Alias(target) => {
                let target = self.type_expr(target);
                self.body
                    .push_str(&format!("type alias {} =\n    {}\n", ty.name, target));
            }
        }
    }

    fn write_record(&mut self, owner: &PackageType, fields: &[&Field], indent: &str) {
        if fields.is_empty() {
            self.body.push_str(&format!("{}{{}}\n", indent));
            return;
        }
        let mut used = HashSet::new();
        for (i, field) in fields.iter().enumerate() {
            let lead = if i == 0 { '{' } else { ',' };
            let name = self.record_field_name(owner, field, &mut used);
            let ty = self.field_type(field);
            self.body
                .push_str(&format!("{}{} {} : {}\n", indent, lead, name, ty));
        }
        self.body.push_str(&format!("{}}}\n", indent));
    }

    /// Distinct JSON keys can share an Elm name (`created_at`, `createdAt`);
    /// later ones get a numeric suffix.
    fn record_field_name(
        &mut self,
        owner: &PackageType,
        field: &Field,
        used: &mut HashSet<String>,
    ) -> String {
        let base = elm_field_name(&field.output_name);
        let mut name = base.clone();
        let mut n = 2;
        while used.contains(&name) {
            name = format!("{}{}", base, n);
            n += 1;
        }
        if name != base {
            self.diags.warn(Warning::UnsupportedShape {
                owner: owner.qualified_name(),
                detail: format!(
                    "field `{}` renamed to `{}` in Elm, `{}` is taken",
                    field.output_name, name, base
                ),
            });
        }
        used.insert(name.clone());
        name
    }

    fn field_type(&mut self, field: &Field) -> String {
        let ty = self.type_expr(&field.ty);
        if (field.optional || field.omit_empty) && !matches!(field.ty, TypeRef::Pointer(_)) {
            format!("Maybe {}", argument(ty))
        } else {
            ty
        }
    }

    fn type_expr(&mut self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive(p) => primitive(*p).to_string(),
            TypeRef::Named(name) | TypeRef::Embedded(name) => {
                match self.registry.get(name).filter(|t| t.exported) {
                    Some(target) => target.name.clone(),
                    None => self.json_value(),
                }
            }
            TypeRef::External(_) | TypeRef::Interface | TypeRef::Opaque => self.json_value(),
            TypeRef::Pointer(inner) => {
                let mut inner = inner.as_ref();
                while let TypeRef::Pointer(next) = inner {
                    inner = next;
                }
                format!("Maybe {}", argument(self.type_expr(inner)))
            }
            TypeRef::Slice(_) if ty.is_byte_slice() => "String".to_string(),
            TypeRef::Slice(inner) => format!("List {}", argument(self.type_expr(inner))),
            TypeRef::Map { key, value } => {
                self.uses_dict = true;
                let key = if self
                    .registry
                    .primitive_of(key)
                    .is_some_and(Primitive::is_integer)
                {
                    "Int"
                } else {
                    "String"
                };
                format!("Dict {} {}", key, argument(self.type_expr(value)))
            }
        }
    }

    fn json_value(&mut self) -> String {
        self.uses_json = true;
        JSON_VALUE.to_string()
    }
}

/// Parenthesize a type applied as an argument.
fn argument(ty: String) -> String {
    if ty.contains(' ') {
        format!("({})", ty)
    } else {
        ty
    }
}

fn primitive(p: Primitive) -> &'static str {
    match p {
        Primitive::Int { .. } | Primitive::Byte => "Int",
        Primitive::Float { .. } => "Float",
        Primitive::Bool => "Bool",
        Primitive::String => "String",
    }
}
