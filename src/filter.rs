use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Artifact, Project, Repository, ResourceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decoration {
    #[default]
    Matches,
    Excludes,
}

impl Decoration {
    fn keep(self, matched: bool) -> bool {
        match self {
            Self::Matches => matched,
            Self::Excludes => !matched,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Pattern over the `<project>/<chart>` repository name.
    Name { pattern: String },
    Tag {
        pattern: String,
        decoration: Decoration,
    },
    /// Matches artifacts that carry every listed label.
    Label {
        labels: Vec<String>,
        decoration: Decoration,
    },
    Resource(ResourceType),
}

impl Filter {
    pub fn name(pattern: impl Into<String>) -> Self {
        Self::Name {
            pattern: pattern.into(),
        }
    }

    pub fn tag(pattern: impl Into<String>) -> Self {
        Self::Tag {
            pattern: pattern.into(),
            decoration: Decoration::Matches,
        }
    }

    pub fn label(labels: Vec<String>) -> Self {
        Self::Label {
            labels,
            decoration: Decoration::Matches,
        }
    }
}

/// Compiles a glob pattern into an anchored regular expression. `*` and `?`
/// stay inside one path segment, `**` crosses segments and `{a,b}` matches
/// either alternative.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    let mut expr = String::from("^");
    let mut chars = pattern.chars().peekable();
    let mut in_group = false;
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                expr.push_str(".*");
            }
            '*' => expr.push_str("[^/]*"),
            '?' => expr.push_str("[^/]"),
            '{' if !in_group => {
                in_group = true;
                expr.push_str("(?:");
            }
            '}' if in_group => {
                in_group = false;
                expr.push(')');
            }
            ',' if in_group => expr.push('|'),
            c => expr.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    expr.push('$');

    Regex::new(&expr).map_err(|source| Error::InvalidFilter {
        pattern: pattern.to_string(),
        source,
    })
}

/// The part of a name pattern before its first `/` outside a `{...}` group.
fn project_segment(pattern: &str) -> Option<&str> {
    let mut depth = 0usize;
    for (i, c) in pattern.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => return Some(&pattern[..i]),
            _ => {}
        }
    }
    None
}

/// Keeps projects that can hold a repository matched by the name filters.
/// Patterns whose project part cannot be separated do not restrict projects.
pub fn filter_projects(projects: Vec<Project>, filters: &[Filter]) -> Result<Vec<Project>> {
    let patterns = filters
        .iter()
        .filter_map(|filter| match filter {
            Filter::Name { pattern } => project_segment(pattern),
            _ => None,
        })
        .map(compile_pattern)
        .collect::<Result<Vec<_>>>()?;

    Ok(projects
        .into_iter()
        .filter(|project| patterns.iter().all(|re| re.is_match(&project.name)))
        .collect())
}

pub fn filter_repositories(
    repositories: Vec<Repository>,
    filters: &[Filter],
) -> Result<Vec<Repository>> {
    let mut patterns = Vec::new();
    for filter in filters {
        match filter {
            Filter::Name { pattern } => patterns.push(compile_pattern(pattern)?),
            Filter::Resource(resource_type) if *resource_type != ResourceType::Chart => {
                return Ok(Vec::new());
            }
            _ => {}
        }
    }

    Ok(repositories
        .into_iter()
        .filter(|repository| patterns.iter().all(|re| re.is_match(&repository.name)))
        .collect())
}

pub fn filter_artifacts(artifacts: Vec<Artifact>, filters: &[Filter]) -> Result<Vec<Artifact>> {
    let mut rules: Vec<Box<dyn Fn(&Artifact) -> bool>> = Vec::new();
    for filter in filters {
        match filter {
            Filter::Tag {
                pattern,
                decoration,
            } => {
                let re = compile_pattern(pattern)?;
                let decoration = *decoration;
                rules.push(Box::new(move |artifact| {
                    decoration.keep(re.is_match(&artifact.tag))
                }));
            }
            Filter::Label {
                labels,
                decoration,
            } => {
                let labels = labels.clone();
                let decoration = *decoration;
                rules.push(Box::new(move |artifact| {
                    let matched = labels.iter().all(|label| artifact.labels.contains(label));
                    decoration.keep(matched)
                }));
            }
            _ => {}
        }
    }

    Ok(artifacts
        .into_iter()
        .filter(|artifact| rules.iter().all(|rule| rule(artifact)))
        .collect())
}
