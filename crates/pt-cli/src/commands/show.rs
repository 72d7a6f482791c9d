use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use pt_core::{Selector, registry};

pub fn run(file: &Path, selector: &str, area: Option<&str>) -> Result<(), String> {
    let realm = super::load_realm(file)?;
    let scope = super::scope(&realm, area)?;

    let handle = Selector::new(selector)
        .resolve(&scope)
        .map_err(|e| pt_core::editor::user_message(&e))?;
    let entity = handle.read();

    println!("  {} [{}]", entity.name().bold(), entity.id.to_string().dimmed());
    if let Some(forms) = entity.display_forms() {
        println!("  {forms}");
    }
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Property", "Kind", "Value"]);
    for (name, value) in entity.properties().iter() {
        let text = registry::global()
            .to_user_text(value)
            .map_err(|e| format!("cannot show {name}: {e}"))?;
        table.add_row(vec![name.to_string(), value.kind().to_string(), text]);
    }
    println!("{table}");

    Ok(())
}
