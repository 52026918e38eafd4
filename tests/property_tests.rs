//! Property-based tests for pgprovision
//!
//! These tests verify:
//! - Empty-input defaulting for prompts
//! - Configuration validation accepts/rejects the right names and versions
//! - Secrets never appear in printable commands
//! - Enum string round-trips

use proptest::prelude::*;

use pgprovision::command_traits::CommandArgs;
use pgprovision::commands::apt::AptUpdateArgs;
use pgprovision::commands::psql::CreateRoleArgs;
use pgprovision::config::{validate_identifier, validate_version, ProvisionConfig};
use pgprovision::prompt::resolve_input;
use pgprovision::types::{Mode, PlatformKind};

// =============================================================================
// Prompt defaulting
// =============================================================================

proptest! {
    /// A bare line ending always falls back.
    #[test]
    fn empty_answer_uses_fallback(fallback in "[0-9.]{1,12}", ending in prop_oneof![Just(""), Just("\n"), Just("\r\n")]) {
        prop_assert_eq!(resolve_input(ending, &fallback), fallback);
    }

    /// Any typed answer wins over the fallback, minus its line ending.
    #[test]
    fn typed_answer_is_kept(answer in "[a-zA-Z0-9 !@#$%^&*()]{1,24}", fallback in "[0-9]{6}") {
        let line = format!("{}\n", answer);
        prop_assert_eq!(resolve_input(&line, &fallback), answer);
    }
}

// =============================================================================
// Validation
// =============================================================================

proptest! {
    /// Dotted numeric versions are accepted.
    #[test]
    fn numeric_versions_are_valid(parts in prop::collection::vec(0u32..100, 1..4)) {
        let version = parts.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(".");
        prop_assert!(validate_version(&version).is_ok());
    }

    /// Versions carrying path or shell characters are rejected.
    #[test]
    fn versions_with_separators_are_invalid(prefix in "[0-9]{1,2}", bad in "[/\\\\ ;&|]") {
        let version = format!("{}{}1", prefix, bad);
        prop_assert!(validate_version(&version).is_err());
    }

    /// Unquoted identifiers are accepted.
    #[test]
    fn simple_identifiers_are_valid(name in "[a-z_][a-z0-9_]{0,30}") {
        prop_assert!(validate_identifier("Database name", &name).is_ok());
    }

    /// Anything with a quote, space or semicolon is rejected.
    #[test]
    fn identifiers_with_specials_are_invalid(head in "[a-z]{1,8}", bad in "[\" ;'-]", tail in "[a-z]{0,8}") {
        let name = format!("{}{}{}", head, bad, tail);
        prop_assert!(validate_identifier("Database name", &name).is_err());
    }

    /// A configured database name flows through validation unchanged.
    #[test]
    fn config_with_valid_db_name_validates(name in "[a-z][a-z0-9_]{0,20}") {
        let config = ProvisionConfig { db_name: name, ..Default::default() };
        prop_assert!(config.validate().is_ok());
    }
}

// =============================================================================
// Secret masking
// =============================================================================

proptest! {
    /// Neither the sudo nor the role password shows up in the printable command.
    #[test]
    fn passwords_never_printed(password in "[0-9]{4,16}") {
        let role = CreateRoleArgs {
            role: "alice".to_string(),
            role_password: password.clone(),
            sudo_password: password.clone(),
        };
        let printed = role.to_command().to_string();
        prop_assert!(!printed.contains(&password), "{}", printed);
        prop_assert!(printed.contains("alice"));

        let update = AptUpdateArgs { sudo_password: password.clone() };
        prop_assert!(!update.to_command().to_string().contains(&password));
    }
}

// =============================================================================
// Enum round-trips
// =============================================================================

fn mode_strategy() -> impl Strategy<Value = Mode> {
    prop_oneof![Just(Mode::Setup), Just(Mode::Uninstall), Just(Mode::Test)]
}

fn platform_strategy() -> impl Strategy<Value = PlatformKind> {
    prop_oneof![Just(PlatformKind::Windows), Just(PlatformKind::Debian)]
}

proptest! {
    #[test]
    fn mode_roundtrip(mode in mode_strategy()) {
        let parsed: Mode = mode.to_string().parse().expect("Should parse");
        prop_assert_eq!(mode, parsed);
    }

    #[test]
    fn platform_roundtrip(kind in platform_strategy()) {
        let parsed: PlatformKind = kind.to_string().parse().expect("Should parse");
        prop_assert_eq!(kind, parsed);
    }
}
