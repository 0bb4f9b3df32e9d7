use clap::Parser;
use laundry_ledger::adapters::prompt::{AssumeYes, StdinPrompt};
use laundry_ledger::domain::ports::ExtractionRequest;
use laundry_ledger::utils::{logger, validation::validate_required_field, validation::Validate};
use laundry_ledger::{
    Cli, Command, DraftEdits, HttpExtractor, LedgerApp, LedgerConfig, LedgerError, LocalStorage,
};
use std::path::Path;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose, cli.log_json);
    tracing::debug!("CLI args: {:?}", cli);

    let config = match LedgerConfig::from_file_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", cli.config.display(), e);
            eprintln!("💡 Make sure the file is valid TOML");
            std::process::exit(e.severity().exit_code().max(1));
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.severity().exit_code().max(1));
    }

    let storage = LocalStorage::new(&config.storage.data_dir);

    if let Err(e) = run(cli.command, config, storage).await {
        tracing::error!(
            "❌ Command failed: {} (Severity: {:?})",
            e,
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = e.severity().exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

async fn run(
    command: Command,
    config: LedgerConfig,
    storage: LocalStorage,
) -> Result<(), LedgerError> {
    let mut stdout = std::io::stdout().lock();

    match command {
        Command::Record(args) => {
            let endpoint =
                validate_required_field("extraction.endpoint", &config.extraction.endpoint)?
                    .clone();
            let mut extractor = HttpExtractor::new(endpoint, config.price_schedule())
                .with_headers(config.extraction.headers.clone());
            if let Some(seconds) = config.extraction.timeout_seconds {
                extractor = extractor.with_timeout(Duration::from_secs(seconds));
            }

            let request = ExtractionRequest {
                service_name: args.service.clone(),
                weight_photo: read_photo(&args.weight_photo)?,
                customer_photo: read_photo(&args.customer_photo)?,
                weight_photo_ref: Some(args.weight_photo.display().to_string()),
                customer_photo_ref: Some(args.customer_photo.display().to_string()),
            };
            let edits = DraftEdits {
                weight: args.weight,
                customer_name: args.customer,
                delivery_address: args.address,
            };

            let mut app = LedgerApp::new(config, storage);
            app.record(&extractor, &request, &edits, args.discard, &mut stdout)
                .await?;
        }
        Command::List => {
            LedgerApp::new(config, storage).list(&mut stdout)?;
        }
        Command::Show { timestamp } => {
            LedgerApp::new(config, storage).show(timestamp, &mut stdout)?;
        }
        Command::Amend {
            timestamp,
            weight,
            customer,
            address,
        } => {
            let edits = DraftEdits {
                weight,
                customer_name: customer,
                delivery_address: address,
            };
            LedgerApp::new(config, storage).amend(timestamp, &edits, &mut stdout)?;
        }
        Command::Delete { timestamps, yes } => {
            let mut app = LedgerApp::new(config, storage);
            if yes {
                app.delete(&timestamps, &mut AssumeYes, &mut stdout)?;
            } else {
                app.delete(&timestamps, &mut StdinPrompt::terminal(), &mut stdout)?;
            }
        }
        Command::Export { out_dir } => {
            let today = chrono::Local::now().date_naive();
            LedgerApp::new(config, storage).export(out_dir.as_deref(), today, &mut stdout)?;
        }
    }

    Ok(())
}

/// A missing photo is the same as leaving the field blank.
fn read_photo(path: &Path) -> Result<Vec<u8>, LedgerError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Photo {} not found", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

