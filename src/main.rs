use clap::Parser;
use std::path::PathBuf;
use tabq::cli::dispatcher::Dispatcher;
use tabq::cli::main_types::Cli;
use tabq::storage::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    // Resolve the config file once; the credential store re-reads the same
    // path on every rotation.
    let config_path = match cli.config_dir.as_ref() {
        Some(dir) => PathBuf::from(dir).join("config.toml"),
        None => Config::config_file_path()?,
    };

    let config = match Config::load(Some(config_path.clone())) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error loading config: {}", err);
            std::process::exit(1);
        }
    };

    // Determine the profile to use
    let profile_name = cli
        .profile
        .or(config.default_profile.clone())
        .unwrap_or_else(|| "default".to_string());

    if cli.verbose {
        println!("Verbose mode is enabled");
        println!("Using profile: {}", profile_name);
        println!("Using config file: {}", config_path.display());
    }

    let dispatcher = Dispatcher::new(config, config_path, profile_name, cli.verbose);

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.troubleshooting_hint() {
            eprintln!("Hint: {}", hint);
        }
        std::process::exit(1);
    }

    Ok(())
}
