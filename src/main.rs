use clap::Parser;
use std::io::Read;
use tslist::utils::{error::ErrorKind, logger, validation::Validate};
use tslist::{CliConfig, Result, TsError};

fn main() {
    let cli = CliConfig::parse();

    let config = match cli.validate().and_then(|_| cli.to_filter_config()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if config.json_logs() {
        logger::init_json_logger(config.verbose());
    } else {
        logger::init_cli_logger(config.verbose());
    }

    tracing::debug!("filter config: {:?}", config);

    let result = config
        .validate()
        .and_then(|_| config.query())
        .and_then(|query| {
            let input = read_input(cli.input.as_deref())?;
            query.apply(serde_json::from_str(&input)?)
        })
        .and_then(|output| Ok(serde_json::to_string_pretty(&output)?));

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("❌ Filtering failed: {} (kind: {:?})", e, e.kind());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.kind() {
                ErrorKind::Config | ErrorKind::Value => 1,
                ErrorKind::Conversion => 2,
                ErrorKind::Io => 3,
            };
            std::process::exit(exit_code);
        }
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            tracing::debug!("reading input from {}", path);
            std::fs::read_to_string(path).map_err(TsError::Io)
        }
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}
