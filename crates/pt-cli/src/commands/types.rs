use comfy_table::{ContentArrangement, Table};
use pt_core::registry::{self, TypeFamily};

pub fn run() -> Result<(), String> {
    let registry = registry::global();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Type", "Family", "Values"]);
    for entry in registry.entries() {
        let (family, values) = match &entry.family {
            TypeFamily::Enum(family) => ("enum", family.names().join(", ")),
            TypeFamily::Flags(family) => ("flags", family.names().join(" | ")),
            TypeFamily::Custom => ("custom", "—".to_string()),
        };
        table.add_row(vec![entry.name.clone(), family.to_string(), values]);
    }

    println!("{table}");
    println!();
    println!("  {} registered types", registry.len());

    Ok(())
}
