//! Path template compilation.
//!
//! # Responsibilities
//! - Locate `{name}` placeholders in a route template
//! - Pick a matching fragment for each placeholder from its declared type
//! - Produce an anchored matcher whose captures line up with the parameter list
//!
//! # Design Decisions
//! - Full-string match only; `/user/{id}` never matches `/user/1/extra`
//! - Literal template text is escaped, so `.` in a template is a literal dot
//! - Every malformed template is a compile error; routes are never silently dropped

use std::collections::HashSet;

use regex::Regex;
use thiserror::Error;

use crate::routing::params::{ParamDescriptor, ParameterSpec};

/// Reasons a template failed to compile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed placeholder starting at offset {offset}")]
    Unclosed { offset: usize },

    #[error("unexpected '}}' at offset {offset}")]
    UnexpectedClose { offset: usize },

    #[error("empty placeholder at offset {offset}")]
    EmptyName { offset: usize },

    #[error("invalid placeholder name '{0}'")]
    InvalidName(String),

    #[error("placeholder '{0}' appears more than once")]
    DuplicatePlaceholder(String),

    #[error("parameter '{0}' is declared more than once")]
    DuplicateDeclaration(String),

    #[error("placeholder '{0}' has no declared type")]
    UndeclaredPlaceholder(String),

    #[error("required parameter '{0}' does not appear in the template")]
    MissingPlaceholder(String),

    #[error("failed to build matcher: {0}")]
    Pattern(String),
}

#[derive(Debug)]
struct Placeholder<'t> {
    name: &'t str,
    start: usize,
    end: usize,
}

/// A compiled template: anchored matcher plus the ordered parameter list.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    template: String,
    matcher: Regex,
    params: Vec<ParameterSpec>,
}

impl CompiledTemplate {
    /// Compile `template` using the declared parameter types.
    pub fn compile(template: &str, declared: &[ParamDescriptor]) -> Result<Self, TemplateError> {
        let mut seen = HashSet::new();
        for d in declared {
            if !seen.insert(d.name.as_str()) {
                return Err(TemplateError::DuplicateDeclaration(d.name.clone()));
            }
        }

        let placeholders = scan(template)?;

        let mut params = Vec::with_capacity(placeholders.len());
        let mut fragments = Vec::with_capacity(placeholders.len());
        for ph in &placeholders {
            let desc = declared
                .iter()
                .find(|d| d.name == ph.name)
                .ok_or_else(|| TemplateError::UndeclaredPlaceholder(ph.name.to_string()))?;
            fragments.push(desc.ty.fragment());
            params.push(ParameterSpec {
                name: desc.name.clone(),
                ty: desc.ty.clone(),
            });
        }

        if let Some(missing) = declared
            .iter()
            .find(|d| d.required && !placeholders.iter().any(|ph| ph.name == d.name))
        {
            return Err(TemplateError::MissingPlaceholder(missing.name.clone()));
        }

        // Right to left, so offsets of earlier placeholders stay valid.
        let mut pattern = String::new();
        let mut cursor = template.len();
        for (ph, fragment) in placeholders.iter().zip(&fragments).rev() {
            pattern = format!(
                "(?P<{}>{}){}{}",
                ph.name,
                fragment,
                regex::escape(&template[ph.end..cursor]),
                pattern
            );
            cursor = ph.start;
        }
        let pattern = format!("^{}{}$", regex::escape(&template[..cursor]), pattern);

        let matcher = Regex::new(&pattern).map_err(|e| TemplateError::Pattern(e.to_string()))?;

        Ok(Self {
            template: template.to_string(),
            matcher,
            params,
        })
    }

    /// Full-match `path`; on success return the raw captures in parameter order.
    pub fn match_path<'p>(&self, path: &'p str) -> Option<Vec<&'p str>> {
        let caps = self.matcher.captures(path)?;
        self.params
            .iter()
            .map(|p| caps.name(&p.name).map(|m| m.as_str()))
            .collect()
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    pub fn pattern(&self) -> &str {
        self.matcher.as_str()
    }
}

/// Collect placeholders left to right.
fn scan(template: &str) -> Result<Vec<Placeholder<'_>>, TemplateError> {
    let mut found: Vec<Placeholder<'_>> = Vec::new();
    let mut rest = 0;

    while rest < template.len() {
        let tail = &template[rest..];
        let open = tail.find('{').map(|i| i + rest);
        let close = tail.find('}').map(|i| i + rest);

        let start = match (open, close) {
            (None, None) => break,
            (None, Some(c)) => return Err(TemplateError::UnexpectedClose { offset: c }),
            (Some(o), Some(c)) if c < o => return Err(TemplateError::UnexpectedClose { offset: c }),
            (Some(o), _) => o,
        };

        let inner = &template[start + 1..];
        let end = match (inner.find('}'), inner.find('{')) {
            (None, _) => return Err(TemplateError::Unclosed { offset: start }),
            (Some(c), Some(o)) if o < c => return Err(TemplateError::Unclosed { offset: start }),
            (Some(c), _) => start + 1 + c,
        };

        let name = template[start + 1..end].trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyName { offset: start });
        }
        if !is_group_name(name) {
            return Err(TemplateError::InvalidName(name.to_string()));
        }
        if found.iter().any(|p| p.name == name) {
            return Err(TemplateError::DuplicatePlaceholder(name.to_string()));
        }

        found.push(Placeholder {
            name,
            start,
            end: end + 1,
        });
        rest = end + 1;
    }

    Ok(found)
}

fn is_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::params::ParamType;

    fn compile(template: &str, declared: &[(&str, ParamType)]) -> Result<CompiledTemplate, TemplateError> {
        let declared: Vec<ParamDescriptor> = declared
            .iter()
            .map(|(n, t)| ParamDescriptor::new(*n, t.clone()))
            .collect();
        CompiledTemplate::compile(template, &declared)
    }

    #[test]
    fn test_literal_template() {
        let t = compile("/api/status", &[]).unwrap();
        assert_eq!(t.match_path("/api/status"), Some(vec![]));
        assert_eq!(t.match_path("/api/status/"), None);
        assert_eq!(t.match_path("/api/statusx"), None);
        assert_eq!(t.match_path("/x/api/status"), None);
    }

    #[test]
    fn test_integer_placeholder_full_match() {
        let t = compile("/api/user/{id}", &[("id", ParamType::Integer)]).unwrap();
        assert_eq!(t.match_path("/api/user/42"), Some(vec!["42"]));
        assert_eq!(t.match_path("/api/user/abc"), None);
        assert_eq!(t.match_path("/api/user/42/extra"), None);
        assert_eq!(t.match_path("/api/user/"), None);
    }

    #[test]
    fn test_captures_in_template_order() {
        let t = compile(
            "/rooms/{room}/members/{index}/{name}",
            &[
                ("name", ParamType::String),
                ("index", ParamType::Integer),
                ("room", ParamType::BareJid),
            ],
        )
        .unwrap();
        assert_eq!(
            t.match_path("/rooms/lobby@muc.example/members/3/bob"),
            Some(vec!["lobby@muc.example", "3", "bob"])
        );
        let names: Vec<&str> = t.params().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["room", "index", "name"]);
    }

    #[test]
    fn test_jid_captures_resource_suffix() {
        let t = compile("/sessions/{jid}", &[("jid", ParamType::Jid)]).unwrap();
        assert_eq!(t.match_path("/sessions/a@b"), Some(vec!["a@b"]));
        assert_eq!(t.match_path("/sessions/a@b/phone"), Some(vec!["a@b/phone"]));
        assert_eq!(t.match_path("/sessions/a@b/phone/x"), None);

        let t = compile("/users/{jid}/info", &[("jid", ParamType::Jid)]).unwrap();
        assert_eq!(t.match_path("/users/a@b/info"), Some(vec!["a@b"]));
        assert_eq!(t.match_path("/users/a@b/res/info"), Some(vec!["a@b/res"]));
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let t = compile("/files/{name}.json", &[("name", ParamType::String)]).unwrap();
        assert_eq!(t.match_path("/files/report.json"), Some(vec!["report"]));
        assert_eq!(t.match_path("/files/reportxjson"), None);
    }

    #[test]
    fn test_placeholder_name_is_trimmed() {
        let t = compile("/a/{ id }", &[("id", ParamType::Integer)]).unwrap();
        assert_eq!(t.match_path("/a/7"), Some(vec!["7"]));
    }

    #[test]
    fn test_malformed_templates_fail() {
        assert_eq!(
            compile("/a/{id", &[("id", ParamType::Integer)]).unwrap_err(),
            TemplateError::Unclosed { offset: 3 }
        );
        assert_eq!(
            compile("/a/{id/{x}", &[]).unwrap_err(),
            TemplateError::Unclosed { offset: 3 }
        );
        assert_eq!(
            compile("/a/id}", &[]).unwrap_err(),
            TemplateError::UnexpectedClose { offset: 5 }
        );
        assert_eq!(compile("/a/{}", &[]).unwrap_err(), TemplateError::EmptyName { offset: 3 });
        assert_eq!(
            compile("/a/{user-id}", &[]).unwrap_err(),
            TemplateError::InvalidName("user-id".into())
        );
        assert_eq!(
            compile("/a/{id}/{id}", &[("id", ParamType::Integer)]).unwrap_err(),
            TemplateError::DuplicatePlaceholder("id".into())
        );
    }

    #[test]
    fn test_undeclared_and_missing_parameters() {
        assert_eq!(
            compile("/a/{id}", &[]).unwrap_err(),
            TemplateError::UndeclaredPlaceholder("id".into())
        );
        assert_eq!(
            compile("/a", &[("id", ParamType::Integer)]).unwrap_err(),
            TemplateError::MissingPlaceholder("id".into())
        );
        assert_eq!(
            compile("/a/{id}", &[("id", ParamType::Integer), ("id", ParamType::String)]).unwrap_err(),
            TemplateError::DuplicateDeclaration("id".into())
        );

        let optional = vec![ParamDescriptor::optional("page", ParamType::Integer)];
        assert!(CompiledTemplate::compile("/a", &optional).is_ok());
    }
}
