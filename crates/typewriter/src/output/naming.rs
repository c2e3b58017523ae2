//! Identifier handling shared by the renderers.

use std::borrow::Cow;

/// Whether `name` can be written as a bare JavaScript property key.
pub fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// A TypeScript/Flow property key, quoted when needed.
pub fn property_key(name: &str) -> Cow<'_, str> {
    if is_js_identifier(name) {
        return Cow::Borrowed(name);
    }
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

const ELM_RESERVED: &[&str] = &[
    "if", "then", "else", "case", "of", "let", "in", "type", "module", "where", "import",
    "exposing", "as", "port", "alias", "infix", "effect", "command", "subscription",
];

/// An Elm record field name: lowerCamelCase, never a keyword.
///
/// `ID` becomes `id`, `UserID` becomes `userID`, `HTTPServer` becomes
/// `httpServer`, `created_at` becomes `createdAt`.
pub fn elm_field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .enumerate()
    {
        if i == 0 {
            out.push_str(&lower_leading(segment));
        } else {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }

    if out.is_empty() {
        return "field".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'f');
    }
    if ELM_RESERVED.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

/// Lowercase the leading run of capitals, keeping the start of the next word.
fn lower_leading(segment: &str) -> String {
    let upper = segment
        .chars()
        .take_while(|c| c.is_ascii_uppercase())
        .count();
    let total = segment.chars().count();
    let lower = match upper {
        0 => 0,
        n if n == total => n,
        1 => 1,
        n => {
            let next_is_lower = segment
                .chars()
                .nth(n)
                .is_some_and(|c| c.is_ascii_lowercase());
            if next_is_lower { n - 1 } else { n }
        }
    };
    segment
        .chars()
        .enumerate()
        .map(|(i, c)| if i < lower { c.to_ascii_lowercase() } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_keys() {
        assert_eq!(property_key("name"), "name");
        assert_eq!(property_key("$ref"), "$ref");
        assert_eq!(property_key("created-at"), "\"created-at\"");
        assert_eq!(property_key("2fa"), "\"2fa\"");
        assert_eq!(property_key("-"), "\"-\"");
    }

    #[test]
    fn elm_names() {
        assert_eq!(elm_field_name("ID"), "id");
        assert_eq!(elm_field_name("Name"), "name");
        assert_eq!(elm_field_name("UserID"), "userID");
        assert_eq!(elm_field_name("HTTPServer"), "httpServer");
        assert_eq!(elm_field_name("created_at"), "createdAt");
        assert_eq!(elm_field_name("type"), "type_");
        assert_eq!(elm_field_name("Type"), "type_");
        assert_eq!(elm_field_name("2fa"), "f2fa");
        assert_eq!(elm_field_name("-"), "field");
    }
}
