//! Parsing of compartment entries (`"+ name: Type"`, `"- run(a: int): void"`).

use crate::model::Visibility;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub visibility: Visibility,
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub visibility: Visibility,
    pub name: String,
    pub params: Vec<Parameter>,
    /// `None` means no return type was written (void).
    pub return_type: Option<String>,
}

/// Split off the leading visibility symbol and the rest of the entry.
fn split_visibility(entry: &str) -> Option<(Visibility, &str)> {
    let entry = entry.trim();
    let mut chars = entry.chars();
    let visibility = Visibility::from_symbol(chars.next()?)?;
    Some((visibility, chars.as_str().trim()))
}

pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Loose check for a type expression such as `int`, `String[]` or `Map<K, V>`.
pub fn is_type(s: &str) -> bool {
    let s = s.trim();
    let mut depth = 0i32;
    for c in s.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            c if c.is_alphanumeric() || "_$[].,? ".contains(c) => {}
            _ => return false,
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0 && s.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
}

/// Split on commas that are not nested inside `<...>`.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn parse_typed_name(s: &str) -> Option<(String, String)> {
    let (name, ty) = s.split_once(':')?;
    let (name, ty) = (name.trim(), ty.trim());
    (is_identifier(name) && is_type(ty)).then(|| (name.to_string(), ty.to_string()))
}

/// Parse `symbol name ":" type`.
pub fn parse_attribute(entry: &str) -> Option<Attribute> {
    let (visibility, rest) = split_visibility(entry)?;
    let (name, ty) = parse_typed_name(rest)?;
    Some(Attribute {
        visibility,
        name,
        ty,
    })
}

/// Parse `symbol name "(" [param ":" type {"," ...}] ")" [":" type]`.
pub fn parse_operation(entry: &str) -> Option<Operation> {
    let (visibility, rest) = split_visibility(entry)?;
    let open = rest.find('(')?;
    let close = rest.rfind(')')?;
    if close < open {
        return None;
    }
    let name = rest[..open].trim();
    if !is_identifier(name) {
        return None;
    }

    let inner = rest[open + 1..close].trim();
    let params = if inner.is_empty() {
        Vec::new()
    } else {
        split_top_level(inner)
            .into_iter()
            .map(|p| parse_typed_name(p).map(|(name, ty)| Parameter { name, ty }))
            .collect::<Option<Vec<_>>>()?
    };

    let tail = rest[close + 1..].trim();
    let return_type = if tail.is_empty() {
        None
    } else {
        let ty = tail.strip_prefix(':')?.trim();
        if !is_type(ty) {
            return None;
        }
        Some(ty.to_string())
    };

    Some(Operation {
        visibility,
        name: name.to_string(),
        params,
        return_type,
    })
}
