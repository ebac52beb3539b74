//! Init command implementation

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use marklint_core::{CONFIG_FILE_NAMES, LinterConfig};
use miette::{IntoDiagnostic, Result};
use tracing::info;

pub fn run_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAMES[0]);
    let template = LinterConfig::template();

    if force {
        fs::write(&config_path, template).into_diagnostic()?;
        info!("Created {}", config_path.display());
        return Ok(());
    }

    match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&config_path)
    {
        Ok(mut file) => {
            file.write_all(template.as_bytes()).into_diagnostic()?;
            info!("Created {}", config_path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(miette::miette!(
            "Config file already exists. Use --force to overwrite."
        )),
        Err(e) => Err(e).into_diagnostic(),
    }
}
