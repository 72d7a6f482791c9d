pub mod check;
pub mod export;
pub mod set;
pub mod show;
pub mod types;

use std::path::Path;

use pt_core::{EntityHandle, EntityId, ObjectDirectory, Realm, registry};

/// Load a world file into the process-wide directory.
fn load_realm(path: &Path) -> Result<Realm, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    Realm::from_wire(&text, ObjectDirectory::global(), registry::global())
        .map_err(|e| format!("cannot load {}: {e}", path.display()))
}

/// Write a realm back to its world file.
fn save_realm(realm: &Realm, path: &Path) -> Result<(), String> {
    let text = realm
        .to_wire(registry::global())
        .map_err(|e| format!("cannot encode world: {e}"))?;
    std::fs::write(path, text + "\n")
        .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
    realm.clear_modified();
    Ok(())
}

/// The objects a selector is resolved against: one area's contents, or
/// every object in the realm.
fn scope(realm: &Realm, area: Option<&str>) -> Result<Vec<EntityHandle>, String> {
    match area {
        Some(token) => {
            let id: EntityId = token.parse().map_err(|e: pt_core::PtError| e.to_string())?;
            realm.area_scope(id).map_err(|e| e.to_string())
        }
        None => Ok(realm.entities().cloned().collect()),
    }
}
