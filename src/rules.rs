//! Rule content loader: resolves a test case's rule-file references to the
//! instruction text sent as the system prompt.
//!
//! Missing files are non-fatal. Partial instruction context still measures
//! something useful, so the loader warns and proceeds with whatever resolved
//! instead of aborting the test.

use std::path::Path;

/// Preamble prepended to every system prompt, ahead of the rule content.
const SYSTEM_PREAMBLE: &str = "You are a code generator. Follow the coding \
standards below exactly. Output only code unless asked otherwise.";

/// Read each referenced rule file under `rules_dir`, in order, and concatenate
/// into one system prompt.
pub fn load_rule_content(rules_dir: &Path, refs: &[String]) -> String {
    let mut sections = vec![SYSTEM_PREAMBLE.to_string()];

    for rule_ref in refs {
        let path = rules_dir.join(rule_ref);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                sections.push(format!("## {}\n\n{}", rule_ref, content.trim_end()));
            }
            Err(e) => {
                tracing::warn!(
                    rule = %rule_ref,
                    path = %path.display(),
                    "Rule file could not be read, continuing with partial content: {}",
                    e
                );
            }
        }
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenates_in_reference_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "Rule A").unwrap();
        std::fs::write(dir.path().join("b.md"), "Rule B\n").unwrap();

        let content =
            load_rule_content(dir.path(), &["a.md".to_string(), "b.md".to_string()]);
        let a = content.find("Rule A").unwrap();
        let b = content.find("Rule B").unwrap();
        assert!(a < b);
        assert!(content.starts_with(SYSTEM_PREAMBLE));
    }

    #[test]
    fn missing_file_keeps_partial_content() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "Rule A").unwrap();

        let content =
            load_rule_content(dir.path(), &["missing.md".to_string(), "a.md".to_string()]);
        assert!(content.contains("Rule A"));
        assert!(!content.contains("missing.md"));
    }

    #[test]
    fn no_refs_yields_just_the_preamble() {
        let dir = tempfile::tempdir().unwrap();
        let content = load_rule_content(dir.path(), &[]);
        assert_eq!(content, SYSTEM_PREAMBLE);
    }
}
