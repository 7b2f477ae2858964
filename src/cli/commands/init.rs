//! Init and Config commands.

use std::path::Path;

use crate::config::{CONFIG_DIR, CONFIG_FILE, Settings};

/// Run init command - create configuration file.
pub fn run_init(force: bool) {
    let config_path = Path::new(CONFIG_DIR).join(CONFIG_FILE);

    if config_path.exists() && !force {
        eprintln!(
            "Configuration file already exists at: {}",
            config_path.display()
        );
        eprintln!("Use --force to overwrite");
        std::process::exit(1);
    }

    match Settings::init_config_file(Path::new("."), force) {
        Ok(path) => {
            println!("Created configuration file at: {}", path.display());
            println!("Edit this file to set source_dir, target_dir and modes.");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));

    // Never echo the passphrase.
    let mut shown = config.clone();
    if shown.crypto.passphrase.is_some() {
        shown.crypto.passphrase = Some("********".to_string());
    }

    match toml::to_string_pretty(&shown) {
        Ok(toml_str) => println!("{toml_str}"),
        Err(e) => eprintln!("Error displaying config: {e}"),
    }
}
