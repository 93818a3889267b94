//! Alias tables for package managers and versioning strategies
//!
//! Both tables are fixed. Identifiers missing from a table pass through
//! unchanged so the collaborator lookup can decide whether they are valid.

/// Public package manager names mapped to canonical backend keys
pub const PACKAGE_MANAGER_ALIASES: &[(&str, &str)] = &[
    ("pipenv", "pip"),
    ("poetry", "pip"),
    ("pip-compile", "pip"),
    ("npm", "npm_and_yarn"),
    ("yarn", "npm_and_yarn"),
    ("pnpm", "npm_and_yarn"),
    ("go", "go_modules"),
    ("gomod", "go_modules"),
    ("gitsubmodule", "submodules"),
    ("github-actions", "github_actions"),
    ("mix", "hex"),
    ("dotnet", "nuget"),
];

/// Versioning strategy option names mapped to canonical strategy keys
pub const VERSIONING_STRATEGY_ALIASES: &[(&str, &str)] = &[
    ("auto", "auto"),
    ("lockfile-only", "lockfile_only"),
    ("widen", "widen_ranges"),
    ("increase", "bump_versions"),
    ("increase-if-necessary", "bump_versions_if_necessary"),
];

/// Strategy used when none is given
pub const DEFAULT_VERSIONING_STRATEGY: &str = "auto";

fn lookup(table: &[(&str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(key))
        .map(|(_, canonical)| *canonical)
}

/// Resolve a package manager identifier to its canonical key
pub fn canonical_package_manager(raw: &str) -> String {
    let raw = raw.trim();
    match lookup(PACKAGE_MANAGER_ALIASES, raw) {
        Some(canonical) => canonical.to_string(),
        None => raw.to_string(),
    }
}

/// Resolve a versioning strategy identifier to its canonical key
pub fn canonical_versioning_strategy(raw: Option<&str>) -> String {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return DEFAULT_VERSIONING_STRATEGY.to_string();
    }
    match lookup(VERSIONING_STRATEGY_ALIASES, raw) {
        Some(canonical) => canonical.to_string(),
        None => raw.to_string(),
    }
}
