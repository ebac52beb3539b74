//! Rules command implementation

use miette::Result;

use super::{builtin_rules, load_config};
use crate::cli::Cli;

pub fn run_rules(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let rules = builtin_rules(&config)?;

    for rule in &rules {
        let descriptor = rule.descriptor();
        let status = match config.resolve(descriptor) {
            Some(resolved) => resolved.severity.to_string(),
            None => "off".to_string(),
        };
        let mode = if descriptor.asynchronous {
            "async"
        } else {
            "sync"
        };

        println!(
            "{} ({}, {}, {}) [{}]",
            descriptor.names.join("/"),
            status,
            descriptor.parser,
            mode,
            descriptor.tags.join(", ")
        );
        println!("    {}", descriptor.description);
        if let Some(ref information) = descriptor.information {
            println!("    {}", information);
        }
    }

    Ok(())
}
