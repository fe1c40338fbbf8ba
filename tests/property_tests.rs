//! Property-based tests for validated types and profile editing.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;
use tempfile::TempDir;

use mactl::core::types::{EnvVarName, GitConfigKey, PackageName};
use mactl::features::env_var::{parse_line, EnvVarEntry, ProfileFile};

/// Strategy for generating valid environment variable names.
fn valid_env_name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,30}"
}

/// Strategy for values a user might type: anything on one line.
fn single_line_value() -> impl Strategy<Value = String> {
    r"[^\n\r\x00]{0,60}"
}

/// Strategy for unrelated profile lines that must survive edits.
fn other_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("# managed by hand".to_string()),
        Just("eval \"$(/opt/homebrew/bin/brew shellenv)\"".to_string()),
        Just(String::new()),
        "alias [a-z]{1,5}='[a-z ]{0,10}'",
    ]
}

proptest! {
    #[test]
    fn valid_env_names_accepted(name in valid_env_name()) {
        let parsed = EnvVarName::new(name.clone()).unwrap();
        prop_assert_eq!(parsed.as_str(), name.as_str());
    }

    #[test]
    fn env_names_starting_with_digit_rejected(name in "[0-9][A-Za-z0-9_]{0,10}") {
        prop_assert!(EnvVarName::new(name).is_err());
    }

    #[test]
    fn package_names_never_look_like_flags(rest in "[a-z0-9-]{0,20}") {
        let flag = format!("-{rest}");
        prop_assert!(PackageName::new(flag).is_err());
    }

    #[test]
    fn two_part_config_keys_accepted(section in "[a-z][a-z0-9]{0,10}", name in "[a-z][a-z0-9]{0,10}") {
        let key = GitConfigKey::new(format!("{section}.{name}")).unwrap();
        prop_assert_eq!(key.section(), section.as_str());
        prop_assert_eq!(key.name(), name.as_str());
    }

    #[test]
    fn written_line_reads_back_verbatim(name in valid_env_name(), value in single_line_value()) {
        let entry = EnvVarEntry::new(EnvVarName::new(name).unwrap(), value);
        prop_assert_eq!(parse_line(&entry.to_line()), Some(entry));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn overwrite_leaves_exactly_one_entry(
        others in prop::collection::vec(other_line(), 0..6),
        copies in 0usize..4,
        value in single_line_value(),
    ) {
        let dir = TempDir::new().unwrap();
        let profile = ProfileFile::new(dir.path().join(".zprofile"));

        let mut content = String::new();
        for (i, line) in others.iter().enumerate() {
            content.push_str(line);
            content.push('\n');
            if i < copies {
                content.push_str(&format!("export TARGET=old{i}\n"));
            }
        }
        std::fs::write(profile.path(), &content).unwrap();

        let entry = EnvVarEntry::new(EnvVarName::new("TARGET").unwrap(), value.clone());
        profile.add(&entry, true).unwrap();

        let targets: Vec<_> = profile
            .list()
            .unwrap()
            .map(Result::unwrap)
            .filter(|e| e.name.as_str() == "TARGET")
            .collect();
        prop_assert_eq!(targets, vec![entry]);

        let after = std::fs::read_to_string(profile.path()).unwrap();
        for line in &others {
            prop_assert!(after.contains(line.as_str()));
        }
    }

    #[test]
    fn duplicate_without_overwrite_changes_nothing(value in single_line_value()) {
        let dir = TempDir::new().unwrap();
        let profile = ProfileFile::new(dir.path().join(".zprofile"));
        let original = "export TARGET=keep\n";
        std::fs::write(profile.path(), original).unwrap();

        let entry = EnvVarEntry::new(EnvVarName::new("TARGET").unwrap(), value);
        prop_assert!(profile.add(&entry, false).is_err());
        prop_assert_eq!(std::fs::read_to_string(profile.path()).unwrap(), original);
    }
}
