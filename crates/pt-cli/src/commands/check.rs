use std::path::Path;

use colored::Colorize;
use tracing::warn;

pub fn run(file: &Path) -> Result<(), String> {
    let realm = super::load_realm(file)?;
    let dangling = realm.dangling_references();

    if dangling.is_empty() {
        println!("  All references resolve.");
        println!("  {} objects", realm.entity_count());
        return Ok(());
    }

    for reference in &dangling {
        warn!(
            from = %reference.from,
            property = %reference.property,
            target = %reference.target,
            "dangling reference"
        );
        println!(
            "  {} {}.{} -> {}",
            "missing".red(),
            reference.from,
            reference.property,
            reference.target
        );
    }
    Err(format!(
        "{} dangling reference{}",
        dangling.len(),
        if dangling.len() == 1 { "" } else { "s" }
    ))
}
