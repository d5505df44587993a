use anyhow::Result;

use crate::core::AppConfig;
use crate::roles::RoleCatalog;

/// Print every role in the catalog. Doesn't need an API key.
pub fn run() -> Result<()> {
    let config = AppConfig::from_env().ok();
    let roles_path = match config {
        Some(config) => config.roles_path,
        None => AppConfig::default_roles_path(),
    };
    let catalog = RoleCatalog::open(&roles_path)?;

    if let Some(path) = catalog.path() {
        println!("{} roles in {}", catalog.len(), path.display());
    }
    for role in catalog.list() {
        println!(
            "{:<16} {:<24} {:<28} temp={:.1} max_tokens={}",
            role.key, role.name, role.model_id, role.temperature, role.max_output_tokens
        );
    }
    Ok(())
}
