//! Test specification registry: the static catalog of conformance test cases
//! and named suites.
//!
//! Every pattern string is compiled at load time, so a malformed regex is a
//! fatal configuration error surfaced before any generation call ever happens.
//! Patterns compile with multiline mode on: `^`/`$` anchor per line of
//! generated code, which is what pattern authors expect.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};

use crate::error::HarnessError;
use crate::types::TestCase;

// ============================================================================
// Registered case — a TestCase plus its compiled patterns
// ============================================================================

/// A catalog entry with its patterns already compiled.
#[derive(Debug)]
pub struct RegisteredCase {
    pub case: TestCase,
    pub expected: Vec<Regex>,
    pub forbidden: Vec<Regex>,
}

// ============================================================================
// Registry
// ============================================================================

#[derive(Debug)]
pub struct Registry {
    cases: Vec<RegisteredCase>,
    suites: BTreeMap<String, Vec<String>>,
}

impl Registry {
    /// Load and validate the built-in catalog.
    pub fn load() -> Result<Self, HarnessError> {
        Self::from_catalog(builtin_cases(), builtin_suites())
    }

    /// Compile every pattern and check suite references. Fails fast on the
    /// first malformed pattern, unknown test id, or duplicate id.
    fn from_catalog(
        cases: Vec<TestCase>,
        suites: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, HarnessError> {
        let mut registered = Vec::with_capacity(cases.len());

        for case in cases {
            if registered
                .iter()
                .any(|r: &RegisteredCase| r.case.id == case.id)
            {
                return Err(HarnessError::Configuration(format!(
                    "duplicate test case id '{}'",
                    case.id
                )));
            }
            let expected = compile_patterns(&case.id, "expected", &case.expected_patterns)?;
            let forbidden = compile_patterns(&case.id, "forbidden", &case.forbidden_patterns)?;
            registered.push(RegisteredCase {
                case,
                expected,
                forbidden,
            });
        }

        for (suite, ids) in &suites {
            for id in ids {
                if !registered.iter().any(|r| &r.case.id == id) {
                    return Err(HarnessError::Configuration(format!(
                        "suite '{}' references unknown test case '{}'",
                        suite, id
                    )));
                }
            }
        }

        Ok(Registry {
            cases: registered,
            suites,
        })
    }

    /// Test cases of a named suite, in suite order.
    pub fn suite(&self, name: &str) -> Result<Vec<&RegisteredCase>, HarnessError> {
        let ids = self.suites.get(name).ok_or_else(|| {
            HarnessError::Configuration(format!(
                "unknown suite '{}' (available: {})",
                name,
                self.suites
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })?;
        // Suite references were checked at load, so lookups here cannot fail.
        ids.iter().map(|id| self.test_case(id)).collect()
    }

    /// Look up one test case by id.
    pub fn test_case(&self, id: &str) -> Result<&RegisteredCase, HarnessError> {
        self.cases
            .iter()
            .find(|r| r.case.id == id)
            .ok_or_else(|| HarnessError::Configuration(format!("unknown test case '{}'", id)))
    }

    pub fn suite_names(&self) -> impl Iterator<Item = &str> {
        self.suites.keys().map(String::as_str)
    }
}

fn compile_patterns(
    case_id: &str,
    kind: &str,
    patterns: &[String],
) -> Result<Vec<Regex>, HarnessError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p).multi_line(true).build().map_err(|e| {
                HarnessError::Configuration(format!(
                    "test case '{}': malformed {} pattern '{}': {}",
                    case_id, kind, p, e
                ))
            })
        })
        .collect()
}

// ============================================================================
// Built-in catalog
// ============================================================================

fn case(
    id: &str,
    name: &str,
    language: &str,
    framework: &str,
    prompt: &str,
    expected: &[&str],
    forbidden: &[&str],
    rule_refs: &[&str],
) -> TestCase {
    TestCase {
        id: id.into(),
        name: name.into(),
        language: language.into(),
        framework: framework.into(),
        prompt: prompt.into(),
        expected_patterns: expected.iter().map(|s| s.to_string()).collect(),
        forbidden_patterns: forbidden.iter().map(|s| s.to_string()).collect(),
        rule_refs: rule_refs.iter().map(|s| s.to_string()).collect(),
    }
}

fn builtin_cases() -> Vec<TestCase> {
    vec![
        case(
            "react-functional-component",
            "React functional component with typed props",
            "typescript",
            "react",
            "Create a React component called UserCard that displays a user's \
             name and email. Include loading and error states. Respond with \
             code only, no explanations.",
            &[
                r"interface UserCardProps",
                r"(function UserCard|const UserCard)",
                r"export (default )?(function )?UserCard",
            ],
            &[r"\bany\b", r"class UserCard extends", r"\bvar "],
            &["typescript/react.md", "typescript/general.md"],
        ),
        case(
            "react-hooks-data-fetching",
            "Data fetching with hooks and cleanup",
            "typescript",
            "react",
            "Write a React hook called useUsers that fetches a list of users \
             from /api/users, exposing data, loading, and error. Respond with \
             code only.",
            &[
                r"useState",
                r"useEffect\(",
                r"async ",
                r"\bcatch\b",
            ],
            &[r"componentDidMount", r"\bany\b"],
            &["typescript/react.md", "typescript/general.md"],
        ),
        case(
            "typescript-strict-types",
            "Strict typing without escape hatches",
            "typescript",
            "none",
            "Define TypeScript types and a function to parse a JSON payload \
             describing an order (id, items, total) with full type safety. \
             Respond with code only.",
            &[
                r"(interface|type) \w+",
                r": string",
                r": number",
                r"export ",
            ],
            &[r"\bany\b", r"@ts-ignore", r"as unknown as"],
            &["typescript/general.md"],
        ),
        case(
            "node-api-error-handling",
            "Express route with structured error handling",
            "typescript",
            "express",
            "Write an Express route handler for POST /orders that validates \
             the body and returns proper status codes on failure. Respond \
             with code only.",
            &[
                r"try\s*\{",
                r"\bcatch\b",
                r"status\(\s*(4|5)\d\d\s*\)",
            ],
            &[r"console\.log\("],
            &["typescript/express.md", "typescript/general.md"],
        ),
        case(
            "no-hardcoded-secrets",
            "Configuration from environment, never literals",
            "typescript",
            "node",
            "Write a config module that reads the database URL and API key \
             for a payments service. Respond with code only.",
            &[r"process\.env\."],
            &[r#"(?i)(api[_-]?key|secret|password)\s*[:=]\s*["'][A-Za-z0-9]"#],
            &["typescript/security.md"],
        ),
        case(
            "python-type-hints",
            "Typed Python function signatures",
            "python",
            "none",
            "Write a Python module with a function that groups a list of \
             transactions by account id and returns per-account totals. \
             Respond with code only.",
            &[
                r"def \w+\(.*\) ->",
                r"(from typing import|from __future__ import annotations|list\[|dict\[)",
            ],
            &[r"^\s*except:\s*$", r"eval\("],
            &["python/general.md"],
        ),
        case(
            "python-fastapi-endpoint",
            "FastAPI endpoint with pydantic models",
            "python",
            "fastapi",
            "Create a FastAPI endpoint POST /users that validates the request \
             body with a pydantic model and returns the created user. Respond \
             with code only.",
            &[
                r"@(app|router)\.post",
                r"async def",
                r"BaseModel",
            ],
            &[r"print\(", r"^\s*except:\s*$"],
            &["python/fastapi.md", "python/general.md"],
        ),
        case(
            "react-accessibility",
            "Accessible interactive markup",
            "typescript",
            "react",
            "Create a React modal dialog component with a close button and a \
             title. It must be keyboard accessible. Respond with code only.",
            &[r"aria-", r"<button", r"role="],
            &[r"<div[^>]*onClick"],
            &["typescript/react.md", "typescript/accessibility.md"],
        ),
    ]
}

fn builtin_suites() -> BTreeMap<String, Vec<String>> {
    let mut suites = BTreeMap::new();
    suites.insert(
        "critical".to_string(),
        vec![
            "react-functional-component".to_string(),
            "typescript-strict-types".to_string(),
            "python-type-hints".to_string(),
            "no-hardcoded-secrets".to_string(),
        ],
    );
    suites.insert(
        "react".to_string(),
        vec![
            "react-functional-component".to_string(),
            "react-hooks-data-fetching".to_string(),
            "react-accessibility".to_string(),
        ],
    );
    suites.insert(
        "python".to_string(),
        vec![
            "python-type-hints".to_string(),
            "python-fastapi-endpoint".to_string(),
        ],
    );
    suites.insert(
        "all".to_string(),
        builtin_cases().into_iter().map(|c| c.id).collect(),
    );
    suites
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_loads() {
        let registry = Registry::load().expect("built-in catalog must validate");
        assert!(registry.suite("critical").unwrap().len() >= 4);
        assert!(registry.suite("all").unwrap().len() >= registry.suite("critical").unwrap().len());
    }

    #[test]
    fn unknown_suite_is_configuration_error() {
        let registry = Registry::load().unwrap();
        let err = registry.suite("nope").unwrap_err();
        assert_eq!(err.kind(), "configuration");
        assert!(err.is_fatal());
    }

    #[test]
    fn unknown_test_case_is_configuration_error() {
        let registry = Registry::load().unwrap();
        assert!(registry.test_case("missing-id").is_err());
    }

    #[test]
    fn suite_preserves_catalog_order() {
        let registry = Registry::load().unwrap();
        let ids: Vec<&str> = registry
            .suite("critical")
            .unwrap()
            .iter()
            .map(|r| r.case.id.as_str())
            .collect();
        assert_eq!(
            ids,
            vec![
                "react-functional-component",
                "typescript-strict-types",
                "python-type-hints",
                "no-hardcoded-secrets",
            ]
        );
    }

    #[test]
    fn malformed_pattern_fails_at_load() {
        let cases = vec![case(
            "bad",
            "bad",
            "typescript",
            "none",
            "prompt",
            &["veryvalid", "(unclosed"],
            &[],
            &[],
        )];
        let err = Registry::from_catalog(cases, BTreeMap::new()).unwrap_err();
        assert!(err.to_string().contains("malformed expected pattern"));
        assert!(err.is_fatal());
    }

    #[test]
    fn suite_referencing_unknown_case_fails_at_load() {
        let mut suites = BTreeMap::new();
        suites.insert("broken".to_string(), vec!["ghost".to_string()]);
        let err = Registry::from_catalog(vec![], suites).unwrap_err();
        assert!(err.to_string().contains("unknown test case 'ghost'"));
    }
}
