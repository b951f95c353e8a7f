use clap::Subcommand;
use planbot_core::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// List all config values
    List,
    /// Print the config file path
    Path,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::List => {
            let config = Config::load()?;
            let toml = toml::to_string_pretty(&config)?;
            println!("{toml}");
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
