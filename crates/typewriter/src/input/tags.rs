//! Go struct tag parsing.
//!
//! Follows `reflect.StructTag` conventions: space-separated `key:"value"`
//! pairs, where the value is a Go string literal.

/// A parsed struct tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructTag {
    pairs: Vec<(String, String)>,
}

/// The parts of a `json` (or `json`-shaped) tag value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagValue<'a> {
    /// The whole value as written.
    pub raw: &'a str,
    /// The name part, `None` when empty.
    pub name: Option<&'a str>,
    pub options: Vec<&'a str>,
}

impl StructTag {
    /// Parse the contents of a struct tag literal (delimiters included or not).
    pub fn parse(literal: &str) -> Self {
        let raw = strip_delimiters(literal);
        let mut pairs = Vec::new();
        let mut rest = raw.as_str();

        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            let Some(colon) = rest.find(':') else {
                break;
            };
            let key = &rest[..colon];
            if key.is_empty() || key.contains(|c: char| c == ' ' || c == '"' || c.is_control()) {
                break;
            }
            let after = &rest[colon + 1..];
            if !after.starts_with('"') {
                break;
            }
            let Some((value, consumed)) = read_quoted(after) else {
                break;
            };
            pairs.push((key.to_string(), value));
            rest = &after[consumed..];
        }

        Self { pairs }
    }

    /// The value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The value for `key`, split into name and comma-separated options.
    pub fn value(&self, key: &str) -> Option<TagValue<'_>> {
        let raw = self.get(key)?;
        let mut parts = raw.split(',');
        let name = parts.next().filter(|n| !n.is_empty());
        Some(TagValue {
            raw,
            name,
            options: parts.filter(|o| !o.is_empty()).collect(),
        })
    }
}

impl TagValue<'_> {
    pub fn has(&self, option: &str) -> bool {
        self.options.contains(&option)
    }

    /// Exactly `"-"`: the field is excluded. `"-,"` names a field `-`.
    pub fn is_skip(&self) -> bool {
        self.raw == "-"
    }
}

fn strip_delimiters(literal: &str) -> String {
    if let Some(inner) = literal
        .strip_prefix('`')
        .and_then(|s| s.strip_suffix('`'))
    {
        return inner.to_string();
    }
    if literal.len() >= 2 && literal.starts_with('"') && literal.ends_with('"') {
        if let Some((value, _)) = read_quoted(literal) {
            return value;
        }
    }
    literal.to_string()
}

/// Read a double-quoted Go string starting at `s[0]`.
///
/// Returns the unescaped value and the number of bytes consumed.
fn read_quoted(s: &str) -> Option<(String, usize)> {
    let mut out = String::new();
    let mut chars = s.char_indices();
    chars.next().filter(|(_, c)| *c == '"')?;

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Some((out, i + 1)),
            '\\' => {
                let (_, escaped) = chars.next()?;
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    '\\' => out.push('\\'),
                    '"' => out.push('"'),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
            }
            _ => out.push(c),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_keys() {
        let tag = StructTag::parse(r#"`json:"id,omitempty" db:"user_id" tw:"-"`"#);
        assert_eq!(tag.get("json"), Some("id,omitempty"));
        assert_eq!(tag.get("db"), Some("user_id"));
        assert_eq!(tag.get("tw"), Some("-"));
        assert_eq!(tag.get("xml"), None);
    }

    #[test]
    fn splits_name_and_options() {
        let tag = StructTag::parse(r#"`json:",omitempty,string"`"#);
        let json = tag.value("json").unwrap();
        assert_eq!(json.name, None);
        assert!(json.has("omitempty"));
        assert!(json.has("string"));
        assert!(!json.is_skip());
    }

    #[test]
    fn dash_comma_is_a_name() {
        let tag = StructTag::parse(r#"`json:"-,"`"#);
        let json = tag.value("json").unwrap();
        assert_eq!(json.name, Some("-"));
        assert!(!json.is_skip());

        let tag = StructTag::parse(r#"`json:"-"`"#);
        assert!(tag.value("json").unwrap().is_skip());
    }

    #[test]
    fn interpreted_string_tags() {
        let tag = StructTag::parse(r#""json:\"name\"""#);
        assert_eq!(tag.get("json"), Some("name"));
    }

    #[test]
    fn malformed_tags_stop_parsing() {
        let tag = StructTag::parse(r#"`json:"a" broken db:"b"`"#);
        assert_eq!(tag.get("json"), Some("a"));
        assert_eq!(tag.get("db"), None);
    }
}
