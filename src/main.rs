use clap::Parser;
use serde::Serialize;
use sports_cloud_sdk::config::{resolve_api_key, resolve_api_url, resolve_credentials};
use sports_cloud_sdk::{authenticate, ClientConfig, RetryPolicy, SportsCloudClient};
use std::collections::VecDeque;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            // --help and --version are not usage errors
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = tracing_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(), verbose);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// `RUST_LOG` directives (default `warn`), with `--verbose` adding
/// `sports_cloud_sdk=debug` on top
fn tracing_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    let mut directives = rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or("warn")
        .to_string();
    if verbose {
        directives.push_str(",sports_cloud_sdk=debug");
    }
    EnvFilter::builder().parse_lossy(directives)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let credentials = resolve_credentials(cli.consumer_id.as_deref(), cli.shared_secret.as_deref())?;

    if let Commands::Token = cli.command {
        let token = authenticate(&credentials)?;
        println!("{}", token.bearer());
        return Ok(());
    }

    let retry = RetryPolicy::new()
        .with_max_attempts(cli.max_attempts)
        .with_base_delay(Duration::from_millis(cli.base_delay_ms));
    let mut config = ClientConfig::new(resolve_api_url(cli.api.as_deref()))
        .with_timeout(Duration::from_secs(cli.timeout_secs))
        .with_retry(retry);
    if let Some(api_key) = resolve_api_key(cli.api_key.as_deref()) {
        config = config.with_api_key(api_key);
    }
    let mut client = SportsCloudClient::new(credentials, config)?;

    if let Commands::ApiKey = cli.command {
        println!("{}", client.fetch_api_key()?);
        return Ok(());
    }
    client.ensure_api_key()?;

    match cli.command {
        Commands::Token | Commands::ApiKey => {}
        Commands::Accounts => {
            let accounts = client.accounts()?;
            if accounts.is_empty() {
                eprintln!("No accounts found. Contact support to get access to customer accounts.");
            }
            for account in &accounts {
                print_line(account)?;
            }
        }
        Commands::Coaches { account_id } => {
            for coach in client.account_coaches(&account_id)? {
                print_line(&coach)?;
            }
        }
        Commands::Teams { account_id } => {
            for team in client.account_teams(&account_id) {
                print_line(&team?)?;
            }
        }
        Commands::Athletes { account_id } => {
            for athlete in client.account_athletes(&account_id) {
                print_line(&athlete?)?;
            }
        }
        Commands::Measurements {
            account_id,
            athlete_id,
            latest,
        } => match latest {
            Some(limit) => {
                let mut window = VecDeque::new();
                for measurement in client.athlete_measurements(&account_id, athlete_id) {
                    let measurement = measurement?;
                    if limit == 0 {
                        continue;
                    }
                    if window.len() == limit {
                        window.pop_front();
                    }
                    window.push_back(measurement);
                }
                for measurement in &window {
                    print_line(measurement)?;
                }
            }
            None => {
                for measurement in client.athlete_measurements(&account_id, athlete_id) {
                    print_line(&measurement?)?;
                }
            }
        },
        Commands::Results {
            account_id,
            athlete_id,
            measurement_id,
            variables,
        } => {
            let results =
                client.measurement_results(&account_id, athlete_id, measurement_id, &variables)?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }

    Ok(())
}

/// One JSON document per line so list output can be streamed
fn print_line<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_filter_defaults_to_warn() {
        assert_eq!(tracing_filter(None, false).to_string(), "warn");
        assert_eq!(tracing_filter(Some("  "), false).to_string(), "warn");
    }

    #[test]
    fn test_verbose_applies_with_rust_log() {
        let filter = tracing_filter(Some("info"), true).to_string();
        assert!(filter.contains("sports_cloud_sdk=debug"));
        assert!(filter.contains("info"));

        let filter = tracing_filter(Some("hyper=trace"), false).to_string();
        assert!(filter.contains("hyper=trace"));
        assert!(!filter.contains("sports_cloud_sdk"));
    }
}
