//! Query parameter values and their Cypher literal encoding.
//!
//! FalkorDB's query command has no native parameter binding, so parameters
//! are substituted into the query text as literals. Every value a caller
//! supplies goes through [`Param::encode`] — this is the only place raw
//! strings become query text, which keeps injection safety in one spot.

/// A typed query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Param>),
    Map(Vec<(String, Param)>),
}

impl Param {
    /// Encode the value as a Cypher literal.
    pub fn encode(&self) -> String {
        match self {
            Param::Null => "null".to_string(),
            Param::Bool(b) => b.to_string(),
            Param::Int(n) => n.to_string(),
            Param::Float(f) => f.to_string(),
            Param::Str(s) => format!("'{}'", escape(s)),
            Param::List(items) => {
                let inner: Vec<String> = items.iter().map(Param::encode).collect();
                format!("[{}]", inner.join(", "))
            }
            Param::Map(pairs) => {
                let inner: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.encode()))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
        }
    }
}

/// Escape a string for embedding inside single quotes.
///
/// Backslash goes first so already-escaped characters are not doubled up.
fn escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Str(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::Str(s)
    }
}

impl From<i64> for Param {
    fn from(n: i64) -> Self {
        Param::Int(n)
    }
}

impl From<i32> for Param {
    fn from(n: i32) -> Self {
        Param::Int(n as i64)
    }
}

impl From<u32> for Param {
    fn from(n: u32) -> Self {
        Param::Int(n as i64)
    }
}

impl From<usize> for Param {
    fn from(n: usize) -> Self {
        Param::Int(n as i64)
    }
}

impl From<bool> for Param {
    fn from(b: bool) -> Self {
        Param::Bool(b)
    }
}

impl From<f64> for Param {
    fn from(f: f64) -> Self {
        Param::Float(f)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Param::Null,
        }
    }
}

impl From<Vec<String>> for Param {
    fn from(items: Vec<String>) -> Self {
        Param::List(items.into_iter().map(Param::Str).collect())
    }
}

/// Substitute `$name` placeholders in `template` with encoded parameter
/// values.
///
/// The template is scanned left to right in a single pass: each `$` is
/// matched against the parameter names, longest first so `$path` never
/// clobbers the prefix of `$path_b`, and the encoded literal is emitted
/// directly. Emitted output is never rescanned, so a value that itself
/// contains `$name` text stays inside its literal. A `$` matching no
/// parameter passes through unchanged.
pub fn substitute(template: &str, params: &[(&str, Param)]) -> String {
    let mut ordered: Vec<(&str, &Param)> = params.iter().map(|(n, v)| (*n, v)).collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut composed = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find('$') {
        composed.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        match ordered.iter().find(|(name, _)| after.starts_with(name)) {
            Some((name, value)) => {
                composed.push_str(&value.encode());
                rest = &after[name.len()..];
            }
            None => {
                composed.push('$');
                rest = after;
            }
        }
    }
    composed.push_str(rest);
    composed
}
