use std::path::Path;

use pt_core::naming::from_camel_case;
use pt_core::{Realm, registry};

pub fn run(file: &Path, format: &str, output: Option<&Path>) -> Result<(), String> {
    let realm = super::load_realm(file)?;

    let content = match format {
        "wire" | "json" => realm
            .to_wire(registry::global())
            .map(|text| text + "\n")
            .map_err(|e| format!("cannot encode world: {e}"))?,
        "text" => export_text(&realm)?,
        _ => {
            return Err(format!("unsupported format: \"{format}\". Use: wire, text"));
        }
    };

    if let Some(path) = output {
        std::fs::write(path, &content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Exported to {}", path.display());
    } else {
        print!("{content}");
    }

    Ok(())
}

/// One block per object, properties in UserText under their typed names.
fn export_text(realm: &Realm) -> Result<String, String> {
    let mut out = String::new();
    for handle in realm.entities() {
        let entity = handle.read();
        out.push_str(&format!("[{}] {}\n", entity.id, entity.name()));
        for (name, value) in entity.properties().iter() {
            let text = registry::global()
                .to_user_text(value)
                .map_err(|e| format!("cannot encode {}.{name}: {e}", entity.id))?;
            out.push_str(&format!("  {}: {text}\n", from_camel_case(name)));
        }
        out.push('\n');
    }
    Ok(out)
}
