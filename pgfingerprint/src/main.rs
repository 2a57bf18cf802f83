//! Operator CLI for PostgreSQL fingerprint storage connection settings.
//!
//! Drives the same descriptor a configuration UI would: print defaults,
//! populate and check the credential selection, and run the admin-only
//! connectivity test.
//!
//! # Security Guarantees
//! - Passwords are read from the credentials file only, never from flags
//! - No secret is printed or logged
//! - The connectivity test keeps no connection open after it finishes

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use pgfingerprint_core::{
    ConfigField, ConnectionConfig, PostgresConnectionFactory, PostgresStorageDescriptor, StorageDescriptor,
    ValidationOutcome,
    config::{FieldSpec, field_specs},
    credentials::InMemoryCredentialStore,
    init_logging,
    security::{Capability, GrantTable, PermissionContext, Principal, Scope},
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "pgfingerprint")]
#[command(about = "PostgreSQL fingerprint storage connection tool")]
#[command(version)]
#[command(long_about = "
pgfingerprint - PostgreSQL fingerprint storage connection settings

Inspect the recognized connection fields, list and check credential
selections under a permission context, and test connectivity end-to-end.

SECURITY FEATURES:
- Credential catalog hidden from principals without access
- Passwords never accepted on the command line
- Test connections are closed immediately

EXAMPLES:
  pgfingerprint defaults
  pgfingerprint --credentials-file creds.json credentials list
  pgfingerprint --credentials-file creds.json test --host db.internal --credential-id pg
  pgfingerprint --principal dev --scope project-a --grant extended-read credentials check pg
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub access: AccessArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print recognized fields with their kinds and defaults
    Defaults {
        /// Print a single field by its wire name
        #[arg(long)]
        field: Option<String>,
    },
    /// Work with the credential selection
    Credentials {
        #[command(subcommand)]
        action: CredentialsCommand,
    },
    /// Test connectivity with a configuration
    Test(TestArgs),
}

#[derive(Subcommand)]
pub enum CredentialsCommand {
    /// List credentials the principal may select
    List {
        /// Currently configured credential id
        #[arg(long, default_value = "")]
        current: String,
    },
    /// Check that a selected credential still exists
    Check {
        /// Credential id to check
        id: String,
    },
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// Capability names accepted by `--grant`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrantArg {
    Administer,
    ExtendedRead,
    UseCredentials,
}

impl From<GrantArg> for Capability {
    fn from(grant: GrantArg) -> Self {
        match grant {
            GrantArg::Administer => Capability::Administer,
            GrantArg::ExtendedRead => Capability::ExtendedRead,
            GrantArg::UseCredentials => Capability::UseCredentials,
        }
    }
}

#[derive(Args)]
pub struct AccessArgs {
    /// Acting principal
    #[arg(long, global = true, env = "PGFP_PRINCIPAL", default_value = "admin")]
    pub principal: String,

    /// Object the configuration belongs to; omit for system scope
    #[arg(long, global = true, env = "PGFP_SCOPE")]
    pub scope: Option<String>,

    /// Capabilities held by the principal
    #[arg(
        long = "grant",
        global = true,
        value_enum,
        value_delimiter = ',',
        env = "PGFP_GRANTS",
        default_value = "administer"
    )]
    pub grants: Vec<GrantArg>,

    /// JSON credential catalog
    #[arg(long, global = true, env = "PGFP_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,
}

impl AccessArgs {
    /// Permission context for the acting principal.
    pub fn context(&self) -> PermissionContext {
        let principal = Principal::new(self.principal.clone());
        match &self.scope {
            Some(scope) => PermissionContext::scoped(principal, Scope::new(scope.clone())),
            None => PermissionContext::system(principal),
        }
    }

    /// `Administer` is always granted system-wide; other grants apply to
    /// `--scope` when one is given.
    pub fn grant_table(&self) -> GrantTable {
        self.grants.iter().fold(GrantTable::new(), |table, grant| {
            let principal = Principal::new(self.principal.clone());
            let capability = Capability::from(*grant);
            match (&self.scope, capability) {
                (Some(scope), Capability::ExtendedRead | Capability::UseCredentials) => {
                    table.grant_on(principal, capability, Scope::new(scope.clone()))
                }
                _ => table.grant(principal, capability),
            }
        })
    }

    /// Credential store from `--credentials-file`, empty when absent.
    pub fn store(&self) -> anyhow::Result<InMemoryCredentialStore> {
        match &self.credentials_file {
            Some(path) => InMemoryCredentialStore::from_json_file(path)
                .with_context(|| format!("Failed to load credentials from {}", path.display())),
            None => Ok(InMemoryCredentialStore::new()),
        }
    }
}

#[derive(Args, Default)]
pub struct TestArgs {
    /// JSON config file; flags override its values
    #[arg(long, env = "PGFP_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "PGFP_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "PGFP_PORT")]
    pub port: Option<u16>,

    #[arg(long, env = "PGFP_DATABASE_NAME")]
    pub database_name: Option<String>,

    /// Require TLS (true/false)
    #[arg(long, env = "PGFP_TLS")]
    pub tls: Option<bool>,

    #[arg(long, env = "PGFP_CREDENTIAL_ID")]
    pub credential_id: Option<String>,

    /// Transport timeout in milliseconds, 0 for none
    #[arg(long, env = "PGFP_CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Handshake I/O timeout in milliseconds, 0 for none
    #[arg(long, env = "PGFP_SOCKET_TIMEOUT_MS")]
    pub socket_timeout_ms: Option<u64>,
}

impl TestArgs {
    /// Config file (or defaults) with flag overrides applied.
    pub fn resolve_config(&self) -> anyhow::Result<ConnectionConfig> {
        let mut config = match &self.config {
            Some(path) => ConnectionConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ConnectionConfig::default(),
        };

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(database_name) = &self.database_name {
            config.database_name = database_name.clone();
        }
        if let Some(tls) = self.tls {
            config.use_tls = tls;
        }
        if let Some(credential_id) = &self.credential_id {
            config.credential_id = credential_id.clone();
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout_ms = timeout;
        }
        if let Some(timeout) = self.socket_timeout_ms {
            config.socket_timeout_ms = timeout;
        }

        Ok(config)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultsReport {
    display_name: &'static str,
    fields: Vec<FieldSpec>,
}

/// JSON for `defaults`: every field, or only `field` when given.
fn defaults_json(field: Option<&str>) -> anyhow::Result<String> {
    let json = match field {
        Some(name) => {
            let field = ConfigField::from_name(name)
                .with_context(|| format!("Unknown configuration field '{}'", name))?;
            serde_json::to_string_pretty(&FieldSpec::from(field))?
        }
        None => serde_json::to_string_pretty(&DefaultsReport {
            display_name: PostgresStorageDescriptor::DISPLAY_NAME,
            fields: field_specs(),
        })?,
    };
    Ok(json)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let context = cli.access.context();
    let descriptor = PostgresStorageDescriptor::new(
        Arc::new(cli.access.store()?),
        Arc::new(cli.access.grant_table()),
        Arc::new(PostgresConnectionFactory::new()),
    );
    debug!(
        principal = context.principal.name(),
        scope = context.scope.as_ref().map(Scope::id),
        "Permission context ready"
    );

    match &cli.command {
        Command::Defaults { field } => {
            println!("{}", defaults_json(field.as_deref())?);
            Ok(())
        }
        Command::Credentials {
            action: CredentialsCommand::List { current },
        } => {
            let choices = descriptor.fill_credential_items(&context, current).await;
            println!("{}", serde_json::to_string_pretty(&choices)?);
            Ok(())
        }
        Command::Credentials {
            action: CredentialsCommand::Check { id },
        } => {
            let outcome = descriptor.check_credential_id(&context, id).await;
            report(&outcome, cli.global.quiet)
        }
        Command::Test(args) => {
            let config = args.resolve_config()?;
            let outcome = descriptor.test_connection(&config, &context).await;
            report(&outcome, cli.global.quiet)
        }
    }
}

/// Prints the outcome; failures exit with status 1.
fn report(outcome: &ValidationOutcome, quiet: bool) -> anyhow::Result<()> {
    match outcome {
        ValidationOutcome::Success(_) => {
            if !quiet {
                println!("{}", outcome);
            }
            Ok(())
        }
        ValidationOutcome::Failure(_) => {
            eprintln!("{}", outcome);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;
    use clap::CommandFactory;
    use pgfingerprint_core::PermissionChecker;
    use std::io::Write;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_single_field() {
        let json: serde_json::Value =
            serde_json::from_str(&defaults_json(Some("socketTimeoutMs")).unwrap()).unwrap();
        assert_eq!(json["name"], "socketTimeoutMs");
        assert_eq!(json["kind"], "integer");
        assert_eq!(json["default"], 2000);

        let json: serde_json::Value = serde_json::from_str(&defaults_json(None).unwrap()).unwrap();
        assert_eq!(json["displayName"], "PostgreSQL Fingerprint Storage");
        assert_eq!(json["fields"].as_array().unwrap().len(), ConfigField::ALL.len());
    }

    #[test]
    fn test_defaults_unknown_field_is_error() {
        let err = defaults_json(Some("password")).unwrap_err();
        assert!(err.to_string().contains("Unknown configuration field 'password'"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let file = tempfile_json(r#"{ "host": "from-file", "port": 6000, "useTLS": true }"#);

        let args = TestArgs {
            config: Some(file.path().to_path_buf()),
            port: Some(7000),
            credential_id: Some("pg".to_string()),
            ..Default::default()
        };
        let config = args.resolve_config().unwrap();

        assert_eq!(config.host, "from-file");
        assert_eq!(config.port, 7000);
        assert!(config.use_tls);
        assert_eq!(config.credential_id, "pg");
        assert_eq!(config.database_name, "defaultDB");
    }

    #[test]
    fn test_no_flags_yields_defaults() {
        let config = TestArgs::default().resolve_config().unwrap();
        assert_eq!(config, ConnectionConfig::default());
    }

    #[test]
    fn test_host_from_environment() {
        temp_env::with_var("PGFP_HOST", Some("env-host"), || {
            let cli = Cli::try_parse_from(["pgfingerprint", "test"]).unwrap();
            let Command::Test(args) = cli.command else {
                panic!("expected test command");
            };
            assert_eq!(args.resolve_config().unwrap().host, "env-host");
        });
    }

    #[test]
    fn test_default_grant_is_system_administer() {
        temp_env::with_vars_unset(["PGFP_GRANTS", "PGFP_PRINCIPAL", "PGFP_SCOPE"], || {
            let cli = Cli::try_parse_from(["pgfingerprint", "defaults", "--field", "host"]).unwrap();
            let table = cli.access.grant_table();
            assert!(table.has_permission(&Principal::new("admin"), Capability::Administer, None));
        });
    }

    #[test]
    fn test_scoped_permission_grants() {
        temp_env::with_vars_unset(["PGFP_GRANTS", "PGFP_PRINCIPAL", "PGFP_SCOPE"], || {
            let cli = Cli::try_parse_from([
                "pgfingerprint",
                "--principal",
                "dev",
                "--scope",
                "project-a",
                "--grant",
                "extended-read",
                "credentials",
                "list",
            ])
            .unwrap();

            let context = cli.access.context();
            assert_eq!(context.scope, Some(Scope::new("project-a")));

            let table = cli.access.grant_table();
            let dev = Principal::new("dev");
            let project = Scope::new("project-a");
            assert!(table.has_permission(&dev, Capability::ExtendedRead, Some(&project)));
            assert!(!table.has_permission(&dev, Capability::ExtendedRead, None));
            assert!(!table.has_permission(&dev, Capability::Administer, None));
        });
    }

    fn tempfile_json(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }
}
