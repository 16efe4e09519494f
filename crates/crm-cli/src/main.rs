// ============================================================================
// CRM CLI - Maintenance Commands
// File: crates/crm-cli/src/main.rs
// ============================================================================
//! One-shot runs of the scheduled jobs, welcome emails, spreadsheet import and migrations.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crm_core::domain::NotificationChannel;
use crm_infrastructure::{create_pool, run_migrations, Adapters};
use crm_shared::config::AppConfig;
use crm_shared::telemetry::init_telemetry;

#[derive(Parser, Debug)]
#[command(name = "crm-cli", version, about = "Floral CRM - maintenance commands")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Send birthday reminders for contacts whose birthday falls on the date
    SendBirthdayReminders {
        /// Day to process (YYYY-MM-DD); defaults to today in the configured offset
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Channel to deliver on
        #[arg(long, value_enum, default_value_t = ChannelArg::All)]
        channel: ChannelArg,
    },

    /// Email a password-set link to the user with this address
    SendWelcomeEmail {
        email: String,
    },

    /// Create the "Christmas <year>" gift season if it is missing
    EnsureGiftSeason {
        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Load salespeople, customers and contacts from a CSV spreadsheet
    ImportCrm {
        file: PathBuf,
    },

    /// Apply pending database migrations
    Migrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ChannelArg {
    Email,
    Whatsapp,
    All,
}

impl ChannelArg {
    fn channels(self) -> Vec<NotificationChannel> {
        match self {
            ChannelArg::Email => vec![NotificationChannel::Email],
            ChannelArg::Whatsapp => vec![NotificationChannel::WhatsApp],
            ChannelArg::All => NotificationChannel::ALL.to_vec(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let _guard = init_telemetry("crm-cli", config.app.log_dir.as_deref())?;

    let pool = create_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("Failed to connect to database")?;

    if cli.command == Command::Migrate {
        run_migrations(&pool).await?;
        println!("Migrations applied");
        return Ok(());
    }

    let adapters = Adapters::new(&pool, &config)?;

    match cli.command {
        Command::SendBirthdayReminders { date, channel } => {
            let date = date.unwrap_or_else(|| config.notifications.today());
            info!(%date, ?channel, "Sending birthday reminders");
            let report = adapters
                .birthday_dispatcher(&config)
                .run(date, &channel.channels())
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_success() {
                bail!("{} reminder(s) failed", report.failures.len());
            }
        }
        Command::SendWelcomeEmail { email } => {
            let user = adapters.onboarding_service(&config).send_welcome_to_email(&email).await?;
            println!("Welcome email sent to {} ({})", user.username, user.email);
        }
        Command::EnsureGiftSeason { year } => {
            let year = year.unwrap_or_else(|| config.notifications.today().year());
            let (season, created) = adapters.gift_service().ensure_holiday_season(year).await?;
            if created {
                println!("Created gift season {} ({})", season.name, season.id);
            } else {
                println!("Gift season {} already exists", season.name);
            }
        }
        Command::ImportCrm { file } => {
            let reader = File::open(&file).with_context(|| format!("Cannot open {}", file.display()))?;
            info!(file = %file.display(), "Importing CRM spreadsheet");
            let report = adapters.import_service().import_csv(reader).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_success() {
                bail!("{} row(s) failed to import", report.failures.len());
            }
        }
        Command::Migrate => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_birthday_reminders() {
        let cli = Cli::try_parse_from([
            "crm-cli",
            "send-birthday-reminders",
            "--date",
            "2025-06-15",
            "--channel",
            "whatsapp",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::SendBirthdayReminders {
                date: NaiveDate::from_ymd_opt(2025, 6, 15),
                channel: ChannelArg::Whatsapp,
            }
        );
    }

    #[test]
    fn test_channel_defaults_to_all() {
        let cli = Cli::try_parse_from(["crm-cli", "send-birthday-reminders"]).unwrap();
        match cli.command {
            Command::SendBirthdayReminders { date, channel } => {
                assert_eq!(date, None);
                assert_eq!(channel.channels(), NotificationChannel::ALL.to_vec());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(Cli::try_parse_from(["crm-cli", "send-birthday-reminders", "--date", "15/06/2025"]).is_err());
    }

    #[test]
    fn test_parse_welcome_email() {
        let cli = Cli::try_parse_from(["crm-cli", "send-welcome-email", "ana@example.com"]).unwrap();
        assert_eq!(
            cli.command,
            Command::SendWelcomeEmail {
                email: "ana@example.com".to_string()
            }
        );
    }

    #[test]
    fn test_parse_import_crm() {
        let cli = Cli::try_parse_from(["crm-cli", "import-crm", "data/crm.csv"]).unwrap();
        assert_eq!(
            cli.command,
            Command::ImportCrm {
                file: PathBuf::from("data/crm.csv")
            }
        );
        assert!(Cli::try_parse_from(["crm-cli", "import-crm"]).is_err());
    }
}
