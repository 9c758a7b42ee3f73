use regex::Regex;

use crate::data::PathPattern;
use crate::error::{Result, TransferError};

/// Translate a filesystem wildcard expression into an anchored regular
/// expression: `*` matches any run of characters, `?` matches one, and every
/// other character is taken literally.
pub fn wildcard_to_regex(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len() + 8);
    for c in expr.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            c => {
                if regex_metachar(c) {
                    out.push('\\');
                }
                out.push(c);
            }
        }
    }
    out
}

fn regex_metachar(c: char) -> bool {
    matches!(
        c,
        '.' | '+' | '(' | ')' | '[' | ']' | '{' | '}' | '^' | '$' | '|' | '\\'
    )
}

/// Split a wildcard upload expression into the literal directory to walk
/// and the part of the expression that matches paths relative to it.
///
/// The root is the longest prefix ending at a separator that contains no
/// `*`/`?` meta character; an expression with no such prefix is rooted at
/// the current directory.
pub fn split_wildcard_root(expr: &str) -> (String, String) {
    let meta = expr.find(['*', '?']).unwrap_or(expr.len());
    match expr[..meta].rfind('/') {
        Some(sep) => (expr[..sep].to_string(), expr[sep + 1..].to_string()),
        None => (String::new(), expr.to_string()),
    }
}

/// A compiled match expression applied to full relative paths.
#[derive(Debug)]
pub struct CompiledPattern {
    re: Regex,
    recursive: bool,
}

impl CompiledPattern {
    /// Compile the whole expression; used for remote listings where paths
    /// are matched as-is.
    pub fn compile(pattern: &PathPattern) -> Result<Self> {
        Self::compile_expr(&pattern.raw, pattern)
    }

    /// Compile only the post-root part of the expression; used for local
    /// walks where paths are relative to the wildcard root.
    pub fn compile_expr(expr: &str, pattern: &PathPattern) -> Result<Self> {
        let source = if pattern.regex {
            expr.to_string()
        } else {
            wildcard_to_regex(expr)
        };
        let re = Regex::new(&format!("^{source}$"))
            .map_err(|e| TransferError::Pattern(e.to_string()))?;
        Ok(Self {
            re,
            recursive: pattern.recursive,
        })
    }

    /// Match one path relative to the root. Non-recursive patterns only
    /// admit entries directly under the root.
    pub fn matches(&self, rel: &str) -> bool {
        if !self.recursive && rel.contains('/') {
            return false;
        }
        self.re.is_match(rel)
    }
}
