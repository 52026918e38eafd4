//! Type-safe arguments for SQL statements run through `psql`.
//!
//! Statements execute as the `postgres` system account:
//! `sudo -S -u postgres psql -X -c <statement>`. The sudo password goes on
//! stdin; psql ignores stdin when `-c` is given, so a cached sudo ticket does
//! not leak the password into the SQL session.

use super::sudo_stdin;
use crate::command_traits::CommandArgs;

/// System account that owns the cluster after `apt-get install postgresql`.
pub const POSTGRES_SYSTEM_USER: &str = "postgres";

/// Quote an SQL identifier (`"name"`).
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote an SQL string literal (`'value'`).
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn psql_args(statement: &str) -> Vec<String> {
    vec![
        "-S".to_string(),
        "-u".to_string(),
        POSTGRES_SYSTEM_USER.to_string(),
        "psql".to_string(),
        "-X".to_string(),
        "-c".to_string(),
        statement.to_string(),
    ]
}

// ============================================================================
// Create role
// ============================================================================

/// `CREATE USER <role> WITH SUPERUSER CREATEDB CREATEROLE PASSWORD '<pw>'`
#[derive(Debug, Clone)]
pub struct CreateRoleArgs {
    pub role: String,
    pub role_password: String,
    pub sudo_password: String,
}

impl CreateRoleArgs {
    pub fn statement(&self) -> String {
        self.statement_with_password(&quote_literal(&self.role_password))
    }

    /// The statement with the password literal replaced by `'***'`.
    pub fn redacted_statement(&self) -> String {
        self.statement_with_password("'***'")
    }

    fn statement_with_password(&self, literal: &str) -> String {
        format!(
            "CREATE USER {} WITH SUPERUSER CREATEDB CREATEROLE PASSWORD {}",
            quote_ident(&self.role),
            literal
        )
    }
}

impl CommandArgs for CreateRoleArgs {
    fn program(&self) -> String {
        "sudo".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        psql_args(&self.statement())
    }

    fn stdin(&self) -> Option<String> {
        Some(sudo_stdin(&self.sudo_password))
    }

    fn secrets(&self) -> Vec<String> {
        vec![self.sudo_password.clone(), self.role_password.clone()]
    }

    /// The statement itself carries the role password.
    fn redacted_cli_args(&self) -> Option<Vec<String>> {
        Some(psql_args(&self.redacted_statement()))
    }
}

// ============================================================================
// Create database
// ============================================================================

/// `CREATE DATABASE <name> WITH OWNER <owner>`
#[derive(Debug, Clone)]
pub struct CreateDatabaseArgs {
    pub name: String,
    pub owner: String,
    pub sudo_password: String,
}

impl CreateDatabaseArgs {
    pub fn statement(&self) -> String {
        format!(
            "CREATE DATABASE {} WITH OWNER {}",
            quote_ident(&self.name),
            quote_ident(&self.owner)
        )
    }
}

impl CommandArgs for CreateDatabaseArgs {
    fn program(&self) -> String {
        "sudo".to_string()
    }

    fn to_cli_args(&self) -> Vec<String> {
        psql_args(&self.statement())
    }

    fn stdin(&self) -> Option<String> {
        Some(sudo_stdin(&self.sudo_password))
    }

    fn secrets(&self) -> Vec<String> {
        vec![self.sudo_password.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_role_statement() {
        let args = CreateRoleArgs {
            role: "alice".to_string(),
            role_password: "123456".to_string(),
            sudo_password: "123456".to_string(),
        };
        assert_eq!(
            args.statement(),
            "CREATE USER \"alice\" WITH SUPERUSER CREATEDB CREATEROLE PASSWORD '123456'"
        );
    }

    #[test]
    fn test_create_role_description_hides_password() {
        let args = CreateRoleArgs {
            role: "alice".to_string(),
            role_password: "s3cret'pw".to_string(),
            sudo_password: "sudo-pw".to_string(),
        };
        let shown = args.to_command().to_string();
        assert!(!shown.contains("s3cret"));
        assert!(!shown.contains("sudo-pw"));
        assert!(shown.contains("CREATE USER"));
    }

    #[test]
    fn test_one_character_password_keeps_command_readable() {
        let args = CreateRoleArgs {
            role: "alice".to_string(),
            role_password: "e".to_string(),
            sudo_password: "e".to_string(),
        };
        assert_eq!(
            args.to_command().to_string(),
            "sudo -S -u postgres psql -X -c \"CREATE USER \\\"alice\\\" WITH SUPERUSER CREATEDB \
             CREATEROLE PASSWORD '***'\" < <stdin redacted>"
        );

        let db = CreateDatabaseArgs {
            name: "test".to_string(),
            owner: "alice".to_string(),
            sudo_password: "e".to_string(),
        };
        let shown = db.to_command().to_string();
        assert!(shown.starts_with("sudo -S -u postgres psql -X -c"), "{}", shown);
        assert!(shown.contains("CREATE DATABASE \\\"test\\\" WITH OWNER \\\"alice\\\""), "{}", shown);
        assert!(!shown.contains("***"), "{}", shown);
    }

    #[test]
    fn test_literal_quotes_are_doubled() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_create_database_runs_as_postgres() {
        let args = CreateDatabaseArgs {
            name: "test".to_string(),
            owner: "alice".to_string(),
            sudo_password: "pw".to_string(),
        };
        let cli = args.to_cli_args();
        assert_eq!(&cli[..4], &["-S", "-u", "postgres", "psql"]);
        assert_eq!(
            cli.last().map(String::as_str),
            Some("CREATE DATABASE \"test\" WITH OWNER \"alice\"")
        );
    }
}
