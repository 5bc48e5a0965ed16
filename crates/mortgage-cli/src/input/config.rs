use mortgage_core::config::MarketDefaults;

use super::file;

/// Load market defaults from a TOML, YAML or JSON file chosen by extension.
///
/// Fields missing from the file keep their built-in values. Without a path the
/// built-in defaults are used as-is.
pub fn load_defaults(path: Option<&str>) -> Result<MarketDefaults, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(MarketDefaults::default());
    };

    let (canonical, contents) = file::read_text(path)?;
    let extension = canonical
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let defaults: MarketDefaults = match extension.as_str() {
        "toml" => toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?,
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?,
        "json" => serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?,
        other => {
            return Err(format!(
                "Unsupported config format '{}' (expected .toml, .yaml, .yml or .json)",
                other
            )
            .into())
        }
    };

    defaults.validate()?;
    tracing::debug!(
        path = %canonical.display(),
        jurisdictions = defaults.jurisdictions.len(),
        "loaded market defaults"
    );
    Ok(defaults)
}
