use std::path::Path;

use colored::Colorize;
use pt_core::editor::user_message;
use pt_core::{EditorConfig, IntegerParsing, ObjectDirectory, PropertyEditor, registry};

/// Flags of the `set` command.
pub struct SetOptions {
    pub area: Option<String>,
    pub lenient_integers: bool,
    pub quiet_forms: bool,
    pub dry_run: bool,
}

impl SetOptions {
    fn editor_config(&self) -> EditorConfig {
        let parsing = if self.lenient_integers {
            IntegerParsing::Lenient
        } else {
            IntegerParsing::Strict
        };
        EditorConfig::default()
            .with_integer_parsing(parsing)
            .with_report_display_forms(!self.quiet_forms)
    }
}

pub fn run(file: &Path, args: &str, options: &SetOptions) -> Result<(), String> {
    let realm = super::load_realm(file)?;
    let scope = super::scope(&realm, options.area.as_deref())?;

    let editor = PropertyEditor::with_config(
        registry::global(),
        ObjectDirectory::global(),
        options.editor_config(),
    );
    let outcome = editor
        .execute(&scope, args)
        .map_err(|e| user_message(&e))?;

    for line in outcome.messages() {
        println!("  {line}");
    }

    if options.dry_run {
        println!("  {}", "Dry run: world file left unchanged.".dimmed());
        return Ok(());
    }
    if !realm.modified().is_empty() {
        super::save_realm(&realm, file)?;
    }
    Ok(())
}
