//! Identifier sanitization.
//!
//! Component names are free-form ("Web API #1"). Each target syntax has its
//! own idea of a legal identifier, described by an [`IdentifierRules`] value.
//! [`sanitize`] is total: it never fails and never returns an empty string.
//!
//! [`NameTable`] allocates identifiers for one document so that distinct
//! source names never collapse onto the same identifier; a collision gets a
//! stable numeric suffix in allocation order.

use std::collections::HashSet;

use xxhash_rust::xxh3::xxh3_64;

use crate::domain::error::DomainError;

/// How letters are cased in the output identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casing {
    /// Lower-case everything.
    Lower,
    /// `web api` → `WebApi`; separators are dropped.
    Pascal,
}

/// Character set and shape of a legal identifier in one target syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierRules {
    /// Name used in collision errors.
    pub name: &'static str,
    /// Replacement for illegal runs of characters. `None` drops them.
    pub separator: Option<char>,
    pub casing: Casing,
    pub min_len: usize,
    pub max_len: usize,
    /// Prepended when the identifier does not start with a letter.
    pub leading_prefix: &'static str,
    /// Returned when nothing legal is left.
    pub fallback: &'static str,
}

impl IdentifierRules {
    /// Terraform resource names: `[a-z0-9_]`, starting with a letter.
    pub const TERRAFORM: Self = Self {
        name: "terraform",
        separator: Some('_'),
        casing: Casing::Lower,
        min_len: 1,
        max_len: 64,
        leading_prefix: "r_",
        fallback: "resource",
    };

    /// Kubernetes object names (RFC 1035 labels): `[a-z0-9-]`, max 63.
    pub const KUBERNETES: Self = Self {
        name: "kubernetes",
        separator: Some('-'),
        casing: Casing::Lower,
        min_len: 1,
        max_len: 63,
        leading_prefix: "svc-",
        fallback: "service",
    };

    /// Compose service names: `[a-z0-9-]`.
    pub const COMPOSE: Self = Self {
        name: "docker-compose",
        separator: Some('-'),
        casing: Casing::Lower,
        min_len: 1,
        max_len: 63,
        leading_prefix: "svc-",
        fallback: "service",
    };

    /// CloudFormation logical IDs and ARM symbolic names: alphanumeric PascalCase.
    pub const LOGICAL_ID: Self = Self {
        name: "logical-id",
        separator: None,
        casing: Casing::Pascal,
        min_len: 1,
        max_len: 255,
        leading_prefix: "Resource",
        fallback: "Resource",
    };

    /// Azure storage account names: `[a-z0-9]`, 3 to 24 characters.
    pub const AZURE_STORAGE: Self = Self {
        name: "azure-storage",
        separator: None,
        casing: Casing::Lower,
        min_len: 3,
        max_len: 24,
        leading_prefix: "",
        fallback: "storage",
    };
}

/// Convert `name` into an identifier legal under `rules`.
pub fn sanitize(name: &str, rules: &IdentifierRules) -> String {
    let mut id = match rules.casing {
        Casing::Pascal => pascal_words(name),
        Casing::Lower => separated_words(name, rules.separator),
    };

    if id.is_empty() {
        return rules.fallback.to_string();
    }

    if !id.starts_with(|c: char| c.is_ascii_alphabetic()) {
        id.insert_str(0, rules.leading_prefix);
    }

    truncate(&mut id, rules.max_len, rules.separator);

    while id.len() < rules.min_len {
        id.push('0');
    }

    id
}

/// Like [`sanitize`], but an identifier that would be cut short ends in a
/// digest of its full form instead, so long names sharing a prefix stay
/// distinct.
pub fn sanitize_digested(name: &str, rules: &IdentifierRules) -> String {
    let unbounded = IdentifierRules {
        max_len: usize::MAX,
        ..*rules
    };
    let full = sanitize(name, &unbounded);
    if full.len() <= rules.max_len {
        return full;
    }

    let digest = format!("{:08x}", xxh3_64(full.as_bytes()) & 0xffff_ffff);
    let joiner = rules.separator.map(String::from).unwrap_or_default();
    let mut stem = full;
    truncate(
        &mut stem,
        rules.max_len.saturating_sub(digest.len() + joiner.len()),
        rules.separator,
    );
    format!("{stem}{joiner}{digest}")
}

fn words(name: &str) -> impl Iterator<Item = &str> {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
}

fn separated_words(name: &str, separator: Option<char>) -> String {
    let joiner = separator.map(String::from).unwrap_or_default();
    words(name)
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(&joiner)
}

fn pascal_words(name: &str) -> String {
    words(name)
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn truncate(id: &mut String, max_len: usize, separator: Option<char>) {
    if id.len() > max_len {
        id.truncate(max_len);
    }
    if let Some(sep) = separator {
        while id.ends_with(sep) {
            id.pop();
        }
    }
}

/// Per-document identifier allocator.
///
/// Allocation order is the component order, so the suffixes are stable for
/// identical inputs.
#[derive(Debug, Clone)]
pub struct NameTable {
    rules: IdentifierRules,
    used: HashSet<String>,
}

impl NameTable {
    pub fn new(rules: IdentifierRules) -> Self {
        Self {
            rules,
            used: HashSet::new(),
        }
    }

    /// Mark identifiers the document already uses for fixed resources.
    pub fn reserve(&mut self, id: impl Into<String>) {
        self.used.insert(id.into());
    }

    /// Sanitize `name` and make it unique within this table.
    pub fn allocate(&mut self, name: &str) -> String {
        self.allocate_with(name, &[])
    }

    /// Like [`allocate`](Self::allocate), but also claims `<id><suffix>` for
    /// every suffix. The returned id is the first candidate for which the id
    /// and all derived keys are still free.
    pub fn allocate_with(&mut self, name: &str, derived: &[&str]) -> String {
        let base = sanitize(name, &self.rules);
        let longest = derived.iter().map(|d| d.len()).max().unwrap_or(0);
        let joiner = self.rules.separator.map(String::from).unwrap_or_default();

        let mut n = 1usize;
        loop {
            let suffix = if n == 1 {
                String::new()
            } else {
                format!("{joiner}{n}")
            };
            let mut stem = base.clone();
            truncate(
                &mut stem,
                self.rules.max_len.saturating_sub(suffix.len() + longest),
                self.rules.separator,
            );
            let candidate = format!("{stem}{suffix}");

            let keys: Vec<String> = std::iter::once(candidate.clone())
                .chain(derived.iter().map(|d| format!("{candidate}{d}")))
                .collect();
            if keys.iter().all(|key| !self.used.contains(key)) {
                self.used.extend(keys);
                return candidate;
            }
            n += 1;
        }
    }

    pub fn rules(&self) -> &IdentifierRules {
        &self.rules
    }
}

/// Post-assembly check that a document's keys are unique.
pub fn ensure_unique<'a>(
    document: &str,
    ids: impl IntoIterator<Item = &'a str>,
) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DomainError::IdentifierCollision {
                identifier: id.to_string(),
                document: document.to_string(),
            });
        }
    }
    Ok(())
}
