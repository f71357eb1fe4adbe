use clap::Subcommand;
use gateprep_core::Preferences;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a preference value
    Get {
        /// Dot-separated key (e.g. "timer.study_minutes", "exam.date")
        key: String,
    },
    /// Set a preference value
    Set {
        /// Dot-separated key
        key: String,
        /// New value
        value: String,
    },
    /// List all preferences
    List,
    /// Reset preferences to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let prefs = Preferences::load()?;
            match prefs.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut prefs = Preferences::load()?;
            prefs.set(&key, &value)?;
            prefs.save()?;
            tracing::debug!(%key, %value, "preference updated");
            println!("ok");
        }
        ConfigAction::List => {
            let prefs = Preferences::load()?;
            let json = serde_json::to_string_pretty(&prefs)?;
            println!("{json}");
        }
        ConfigAction::Reset => {
            Preferences::default().save()?;
            println!("preferences reset to defaults");
        }
    }
    Ok(())
}
