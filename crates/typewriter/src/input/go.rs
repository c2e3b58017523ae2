//! Go source scanner.
//!
//! Extracts top-level type declarations from Go files into a syntax-level
//! shape ([`RawDecl`]). Name resolution happens later, in the builder,
//! once every file of the run has been scanned.

use super::tags::StructTag;
use crate::error::ParseError;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser, Tree};

/// Everything the scanner found in one file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Name from the `package` clause.
    pub package: String,
    /// Top-level type declarations, in source order.
    pub declarations: Vec<RawDecl>,
}

/// A top-level `type` declaration.
#[derive(Debug, Clone)]
pub struct RawDecl {
    pub name: String,
    pub docs: Option<String>,
    /// Lowercase name or `//typewriter:private`.
    pub private: bool,
    /// `//typewriter:strict` or `@strict` in the doc comment.
    pub strict: bool,
    /// Names of generic type parameters.
    pub type_params: Vec<String>,
    pub ty: RawType,
    /// 1-based line of the declaration.
    pub line: usize,
}

/// A type expression as written.
#[derive(Debug, Clone, PartialEq)]
pub enum RawType {
    Ident(String),
    Qualified { package: String, name: String },
    Generic { base: Box<RawType>, args: Vec<RawType> },
    Pointer(Box<RawType>),
    Slice(Box<RawType>),
    Array(Box<RawType>),
    Map { key: Box<RawType>, value: Box<RawType> },
    Struct(Vec<RawField>),
    Interface,
    Channel,
    Function,
    Unsupported(String),
}

/// One `field_declaration` of a struct body.
#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    /// Declared names; empty for an embedded field.
    pub names: Vec<String>,
    pub ty: RawType,
    pub tag: StructTag,
    pub docs: Option<String>,
}

impl RawField {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// Scan many files, in parallel.
///
/// Results keep the order of `paths`. A file that fails does not stop the
/// others; its error is returned alongside the successful scans.
pub fn scan_files(paths: &[PathBuf]) -> (Vec<SourceFile>, Vec<ParseError>) {
    let results: Vec<Result<SourceFile, ParseError>> =
        paths.par_iter().map(|path| scan_file(path)).collect();

    let mut files = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(file) => files.push(file),
            Err(e) => errors.push(e),
        }
    }
    (files, errors)
}

/// Read and scan one file.
pub fn scan_file(path: &Path) -> Result<SourceFile, ParseError> {
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    scan_source(path, &source)
}

/// Scan Go source text. `path` is only used for error messages.
pub fn scan_source(path: &Path, source: &str) -> Result<SourceFile, ParseError> {
    let syntax_error = |line: usize, column: usize, message: String| ParseError::Syntax {
        path: path.to_path_buf(),
        line,
        column,
        message,
    };

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| syntax_error(0, 0, format!("tree-sitter init: {}", e)))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| syntax_error(0, 0, "failed to parse Go".into()))?;

    if let Some(bad) = first_error(tree.root_node()) {
        let pos = bad.start_position();
        let message = if bad.is_missing() {
            format!("missing `{}`", bad.kind())
        } else {
            let text = bad.utf8_text(source.as_bytes()).unwrap_or("");
            let snippet: String = text.lines().next().unwrap_or("").chars().take(24).collect();
            format!("syntax error near `{}`", snippet)
        };
        return Err(syntax_error(pos.row + 1, pos.column + 1, message));
    }

    let ctx = ScanContext::new(source);
    let file = ctx.extract_file(path, &tree)?;
    tracing::debug!(
        path = %path.display(),
        package = %file.package,
        types = file.declarations.len(),
        "scanned"
    );
    Ok(file)
}

fn first_error(node: Node) -> Option<Node> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error).or(Some(node))
}

/// Doc comment text plus the directives found in it.
#[derive(Debug, Default)]
struct DocComment {
    text: Option<String>,
    private: bool,
    strict: bool,
}

impl DocComment {
    fn is_empty(&self) -> bool {
        self.text.is_none() && !self.private && !self.strict
    }
}

struct ScanContext<'a> {
    source: &'a str,
}

impl<'a> ScanContext<'a> {
    fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn extract_file(&self, path: &Path, tree: &Tree) -> Result<SourceFile, ParseError> {
        let root = tree.root_node();
        let mut package = None;
        let mut declarations = Vec::new();

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    let mut inner = child.walk();
                    package = child
                        .named_children(&mut inner)
                        .find(|n| n.kind() == "package_identifier")
                        .map(|n| self.node_text(n).to_string());
                }
                "type_declaration" => self.extract_type_declaration(child, &mut declarations),
                _ => {}
            }
        }

        let package = package.ok_or_else(|| ParseError::Syntax {
            path: path.to_path_buf(),
            line: 1,
            column: 1,
            message: "missing package clause".into(),
        })?;

        Ok(SourceFile {
            path: path.to_path_buf(),
            package,
            declarations,
        })
    }

    fn extract_type_declaration(&self, decl: Node, out: &mut Vec<RawDecl>) {
        let mut cursor = decl.walk();
        let specs: Vec<Node> = decl
            .named_children(&mut cursor)
            .filter(|c| matches!(c.kind(), "type_spec" | "type_alias"))
            .collect();
        let single = specs.len() == 1;

        for spec in specs {
            let mut doc = self.doc_comment(spec);
            // `type X struct{}` keeps its comment above the `type` keyword.
            if single && doc.is_empty() {
                doc = self.doc_comment(decl);
            }
            if let Some(raw) = self.extract_spec(spec, doc) {
                out.push(raw);
            }
        }
    }

    fn extract_spec(&self, spec: Node, doc: DocComment) -> Option<RawDecl> {
        let name = self.node_text(spec.child_by_field_name("name")?).to_string();
        let ty = spec
            .child_by_field_name("type")
            .map(|t| self.extract_type(t))
            .unwrap_or(RawType::Unsupported("missing type".into()));

        let mut type_params = Vec::new();
        if let Some(params) = spec.child_by_field_name("type_parameters") {
            let mut cursor = params.walk();
            for param in params.named_children(&mut cursor) {
                let mut inner = param.walk();
                for ident in param.children_by_field_name("name", &mut inner) {
                    type_params.push(self.node_text(ident).to_string());
                }
            }
        }

        Some(RawDecl {
            private: doc.private || !crate::ir::is_exported(&name),
            strict: doc.strict,
            docs: doc.text,
            name,
            type_params,
            ty,
            line: spec.start_position().row + 1,
        })
    }

    fn extract_type(&self, node: Node) -> RawType {
        match node.kind() {
            "type_identifier" => RawType::Ident(self.node_text(node).to_string()),

            "qualified_type" => {
                let package = node
                    .child_by_field_name("package")
                    .map(|n| self.node_text(n))
                    .unwrap_or("");
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.node_text(n))
                    .unwrap_or("");
                RawType::Qualified {
                    package: package.to_string(),
                    name: name.to_string(),
                }
            }

            "generic_type" => {
                let base = node
                    .child_by_field_name("type")
                    .map(|t| self.extract_type(t))
                    .unwrap_or(RawType::Unsupported("generic_type".into()));
                let mut args = Vec::new();
                if let Some(type_args) = node.child_by_field_name("type_arguments") {
                    let mut cursor = type_args.walk();
                    for arg in type_args.named_children(&mut cursor) {
                        if let Some(arg) = self.unwrap_type_elem(arg) {
                            args.push(self.extract_type(arg));
                        }
                    }
                }
                RawType::Generic {
                    base: Box::new(base),
                    args,
                }
            }

            "pointer_type" => self.wrap_inner(node, RawType::Pointer),

            "parenthesized_type" => self
                .first_type_child(node)
                .map(|t| self.extract_type(t))
                .unwrap_or(RawType::Unsupported("parenthesized_type".into())),

            "slice_type" => self.wrap_element(node, RawType::Slice),

            "array_type" | "implicit_length_array_type" => self.wrap_element(node, RawType::Array),

            "map_type" => {
                let key = node.child_by_field_name("key").map(|k| self.extract_type(k));
                let value = node.child_by_field_name("value").map(|v| self.extract_type(v));
                match (key, value) {
                    (Some(key), Some(value)) => RawType::Map {
                        key: Box::new(key),
                        value: Box::new(value),
                    },
                    _ => RawType::Unsupported("map_type".into()),
                }
            }

            "struct_type" => {
                let mut cursor = node.walk();
                let list = node
                    .named_children(&mut cursor)
                    .find(|n| n.kind() == "field_declaration_list");
                RawType::Struct(list.map(|l| self.extract_fields(l)).unwrap_or_default())
            }

            "interface_type" => RawType::Interface,
            "channel_type" => RawType::Channel,
            "function_type" => RawType::Function,

            other => RawType::Unsupported(other.to_string()),
        }
    }

    fn wrap_inner(&self, node: Node, wrap: fn(Box<RawType>) -> RawType) -> RawType {
        match self.first_type_child(node) {
            Some(inner) => wrap(Box::new(self.extract_type(inner))),
            None => RawType::Unsupported(node.kind().to_string()),
        }
    }

    fn wrap_element(&self, node: Node, wrap: fn(Box<RawType>) -> RawType) -> RawType {
        match node.child_by_field_name("element") {
            Some(element) => wrap(Box::new(self.extract_type(element))),
            None => RawType::Unsupported(node.kind().to_string()),
        }
    }

    fn first_type_child<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .find(|n| n.kind() != "comment")
    }

    /// Type arguments may be wrapped in a `type_elem` node.
    fn unwrap_type_elem<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        match node.kind() {
            "comment" => None,
            "type_elem" => self.first_type_child(node),
            _ => Some(node),
        }
    }

    fn extract_fields(&self, list: Node) -> Vec<RawField> {
        let mut fields = Vec::new();
        let mut cursor = list.walk();
        for child in list.named_children(&mut cursor) {
            if child.kind() != "field_declaration" {
                continue;
            }

            let mut name_cursor = child.walk();
            let names: Vec<String> = child
                .children_by_field_name("name", &mut name_cursor)
                .map(|n| self.node_text(n).to_string())
                .collect();

            let Some(type_node) = child.child_by_field_name("type") else {
                continue;
            };
            let mut ty = self.extract_type(type_node);

            // Embedded `*T`: the star is an anonymous sibling of the type.
            if names.is_empty() && self.has_star(child) {
                ty = RawType::Pointer(Box::new(ty));
            }

            let tag = child
                .child_by_field_name("tag")
                .map(|t| StructTag::parse(self.node_text(t)))
                .unwrap_or_default();

            let docs = self
                .doc_comment(child)
                .text
                .or_else(|| self.line_comment(child));

            fields.push(RawField {
                names,
                ty,
                tag,
                docs,
            });
        }
        fields
    }

    fn has_star(&self, field: Node) -> bool {
        let mut cursor = field.walk();
        let found = field
            .children(&mut cursor)
            .any(|c| !c.is_named() && c.kind() == "*");
        found
    }

    /// Comments directly above `node`, with no blank line in between.
    fn doc_comment(&self, node: Node) -> DocComment {
        let mut lines = Vec::new();
        let mut expected_row = node.start_position().row;
        let mut current = node.prev_named_sibling();

        while let Some(comment) = current {
            if comment.kind() != "comment" || comment.end_position().row + 1 != expected_row {
                break;
            }
            // A trailing comment of the previous line belongs to that line.
            if let Some(before) = comment.prev_named_sibling() {
                if before.kind() != "comment"
                    && before.end_position().row == comment.start_position().row
                {
                    break;
                }
            }
            lines.push(self.node_text(comment));
            expected_row = comment.start_position().row;
            current = comment.prev_named_sibling();
        }
        lines.reverse();
        parse_doc_lines(&lines)
    }

    /// A `// comment` on the same line, after the node.
    fn line_comment(&self, node: Node) -> Option<String> {
        let next = node.next_named_sibling()?;
        if next.kind() == "comment" && next.start_position().row == node.end_position().row {
            return parse_doc_lines(&[self.node_text(next)]).text;
        }
        None
    }
}

fn parse_doc_lines(comments: &[&str]) -> DocComment {
    let mut doc = DocComment::default();
    let mut text = Vec::new();

    for comment in comments {
        let body: Vec<&str> = if let Some(line) = comment.strip_prefix("//") {
            vec![line]
        } else {
            comment
                .strip_prefix("/*")
                .and_then(|c| c.strip_suffix("*/"))
                .unwrap_or(comment)
                .lines()
                .map(|l| l.trim().trim_start_matches('*'))
                .collect()
        };

        for line in body {
            let directive = line.trim();
            match directive {
                "typewriter:private" => doc.private = true,
                "typewriter:strict" | "@strict" => doc.strict = true,
                _ if line.starts_with("go:") || line.starts_with("nolint") => {}
                _ => text.push(line.strip_prefix(' ').unwrap_or(line).trim_end()),
            }
        }
    }

    while text.first().is_some_and(|l| l.is_empty()) {
        text.remove(0);
    }
    while text.last().is_some_and(|l| l.is_empty()) {
        text.pop();
    }
    if !text.is_empty() {
        doc.text = Some(text.join("\n"));
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> SourceFile {
        scan_source(Path::new("test.go"), source).unwrap()
    }

    fn fields(decl: &RawDecl) -> &[RawField] {
        match &decl.ty {
            RawType::Struct(fields) => fields,
            other => panic!("expected struct, got {:?}", other),
        }
    }

    #[test]
    fn test_struct() {
        let file = scan(
            r#"
package models

type User struct {
    ID      int    `json:"id"`
    Name    string
    Manager *User
}
"#,
        );
        assert_eq!(file.package, "models");
        assert_eq!(file.declarations.len(), 1);
        let user = &file.declarations[0];
        assert_eq!(user.name, "User");
        assert!(!user.private);
        assert_eq!(user.line, 4);

        let fields = fields(user);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].names, vec!["ID"]);
        assert_eq!(fields[0].ty, RawType::Ident("int".into()));
        assert_eq!(fields[0].tag.get("json"), Some("id"));
        assert_eq!(
            fields[2].ty,
            RawType::Pointer(Box::new(RawType::Ident("User".into())))
        );
    }

    #[test]
    fn test_grouped_declarations_and_aliases() {
        let file = scan(
            r#"
package models

type (
    // UserID identifies a user.
    UserID string
    Tags   []string
    Old    = UserID
    secret struct{}
)
"#,
        );
        let names: Vec<_> = file.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["UserID", "Tags", "Old", "secret"]);
        assert_eq!(
            file.declarations[0].docs.as_deref(),
            Some("UserID identifies a user.")
        );
        assert_eq!(
            file.declarations[1].ty,
            RawType::Slice(Box::new(RawType::Ident("string".into())))
        );
        assert_eq!(file.declarations[2].ty, RawType::Ident("UserID".into()));
        assert!(file.declarations[3].private);
    }

    #[test]
    fn test_embedded_fields() {
        let file = scan(
            r#"
package models

type Admin struct {
    Base
    *Audit
    time.Time
    Level int
}
"#,
        );
        let fields = fields(&file.declarations[0]);
        assert!(fields[0].is_embedded());
        assert_eq!(fields[0].ty, RawType::Ident("Base".into()));
        assert_eq!(
            fields[1].ty,
            RawType::Pointer(Box::new(RawType::Ident("Audit".into())))
        );
        assert_eq!(
            fields[2].ty,
            RawType::Qualified {
                package: "time".into(),
                name: "Time".into()
            }
        );
        assert!(!fields[3].is_embedded());
    }

    #[test]
    fn test_multiple_names_and_shapes() {
        let file = scan(
            r#"
package models

type Shapes struct {
    X, Y    float64
    Lookup  map[string][]*Item
    Fixed   [4]byte
    Any     interface{}
    Notify  chan int
    Handler func() error
}
"#,
        );
        let fields = fields(&file.declarations[0]);
        assert_eq!(fields[0].names, vec!["X", "Y"]);
        assert!(matches!(&fields[1].ty, RawType::Map { key, .. } if **key == RawType::Ident("string".into())));
        assert!(matches!(fields[2].ty, RawType::Array(_)));
        assert_eq!(fields[3].ty, RawType::Interface);
        assert_eq!(fields[4].ty, RawType::Channel);
        assert_eq!(fields[5].ty, RawType::Function);
    }

    #[test]
    fn test_doc_comments_and_directives() {
        let file = scan(
            r#"
package models

// Account is a billing account.
//typewriter:strict
type Account struct {
    // Owner of the account.
    Owner string
    Balance int // in cents
}

//typewriter:private
type Internal struct{}
"#,
        );
        let account = &file.declarations[0];
        assert_eq!(account.docs.as_deref(), Some("Account is a billing account."));
        assert!(account.strict);
        let fields = fields(account);
        assert_eq!(fields[0].docs.as_deref(), Some("Owner of the account."));
        assert_eq!(fields[1].docs.as_deref(), Some("in cents"));

        assert!(file.declarations[1].private);
        assert!(file.declarations[1].docs.is_none());
    }

    #[test]
    fn test_generic_declaration() {
        let file = scan(
            r#"
package models

type Page[T any] struct {
    Items []T
    Next  *Page[T]
}
"#,
        );
        let page = &file.declarations[0];
        assert_eq!(page.type_params, vec!["T"]);
        let fields = fields(page);
        assert!(matches!(
            &fields[1].ty,
            RawType::Pointer(inner) if matches!(inner.as_ref(), RawType::Generic { .. })
        ));
    }

    #[test]
    fn test_syntax_error_reports_position() {
        let err = scan_source(
            Path::new("broken.go"),
            "package models\n\ntype User struct {\n    ID int\n",
        )
        .unwrap_err();
        match err {
            ParseError::Syntax { path, line, .. } => {
                assert_eq!(path, PathBuf::from("broken.go"));
                assert!(line >= 3);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_package_clause() {
        let err = scan_source(Path::new("nopkg.go"), "type A struct{}\n").unwrap_err();
        assert!(err.to_string().contains("missing package clause"));
    }

    #[test]
    fn test_scan_files_collects_errors_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.go");
        let bad = dir.path().join("bad.go");
        let missing = dir.path().join("missing.go");
        std::fs::write(&good, "package m\n\ntype A struct{}\n").unwrap();
        std::fs::write(&bad, "package m\n\ntype B struct {\n").unwrap();

        let (files, errors) = scan_files(&[good.clone(), bad.clone(), missing.clone()]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, good);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path(), bad.as_path());
        assert!(matches!(errors[1], ParseError::Read { .. }));
    }
}
