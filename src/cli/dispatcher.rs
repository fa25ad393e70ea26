use crate::api::factory::ClientFactory;
use crate::api::models::DynamicRow;
use crate::cli::main_types::{Commands, ConfigCommands, TableCommands};
use crate::core::services::table_service::TableService;
use crate::error::{AppError, CliError};
use crate::storage::config::Config;
use crate::storage::credentials::CredentialStore;
use std::path::PathBuf;
use std::sync::Arc;

pub struct Dispatcher {
    config: Config,
    config_path: PathBuf,
    profile_name: String,
    verbose: bool,
}

impl Dispatcher {
    pub fn new(config: Config, config_path: PathBuf, profile_name: String, verbose: bool) -> Self {
        Self {
            config,
            config_path,
            profile_name,
            verbose,
        }
    }

    fn log_verbose(&self, msg: &str) {
        if self.verbose {
            println!("Verbose: {}", msg);
        }
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Table { command } => self.handle_table_command(command).await,
            Commands::Config { command } => self.handle_config_command(command),
        }
    }

    async fn handle_table_command(&self, command: TableCommands) -> Result<(), AppError> {
        match command {
            TableCommands::List { name } => {
                self.log_verbose(&format!("Listing rows of table '{}'", name));

                let profile = self.config.get_profile(&self.profile_name)?;
                let credentials = Arc::new(CredentialStore::new(
                    self.config_path.clone(),
                    self.profile_name.clone(),
                ));
                let factory = Arc::new(ClientFactory::new(
                    profile.endpoint.clone(),
                    profile.timeout_seconds,
                    credentials.clone(),
                ));
                let service = TableService::new(credentials, factory);

                let rows = service.get_all::<DynamicRow>(&name).await?;
                self.log_verbose(&format!("Retrieved {} rows", rows.len()));

                let rendered = serde_json::to_string_pretty(&rows)
                    .map_err(|e| CliError::OutputFailed(e.to_string()))?;
                println!("{}", rendered);
                Ok(())
            }
        }
    }

    fn handle_config_command(&self, command: ConfigCommands) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                println!("Config file: {}", self.config_path.display());
                println!(
                    "Default profile: {}",
                    self.config.default_profile.as_deref().unwrap_or("(none)")
                );
                for (name, profile) in &self.config.profiles {
                    println!("[{}]", name);
                    println!("  endpoint = {}", profile.endpoint);
                    println!("  account_name = {}", profile.account_name);
                    println!("  sas_definition = {}", profile.sas_definition);
                    for key in profile.tokens.keys() {
                        println!("  tokens.{} = ********", key);
                    }
                }
                Ok(())
            }
        }
    }
}
