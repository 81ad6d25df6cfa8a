//! TOML configuration file handling.

use std::path::Path;

use anyhow::Context;
use idp_server::IdpConfig;

/// Loads the configuration file; a missing file yields the defaults.
pub fn load(path: &Path) -> anyhow::Result<IdpConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no configuration file; using defaults");
        return Ok(IdpConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
}

/// Writes the configuration back to disk.
pub fn save(path: &Path, config: &IdpConfig) -> anyhow::Result<()> {
    let content = toml::to_string_pretty(config).context("cannot serialize configuration")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
    }
    std::fs::write(path, content).with_context(|| format!("cannot write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load(Path::new("/nonexistent/idp.toml")).unwrap();
        assert_eq!(config.cookie_name, "idp-sess");
    }

    #[test]
    fn kebab_case_toml_roundtrip() {
        let toml_src = r#"
cookie-name = "my-sess"
server-name = "idp.example:443"
tls-enable = true
temp-cache-duration = 120

[ldap]
addr = "ldap://localhost:389"
search-base = "ou=people,dc=example,dc=com"

[[users]]
name = "alice"

[users.attributes]
role = ["admin"]
"#;
        let config: IdpConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(config.cookie_name, "my-sess");
        assert_eq!(config.server_name, "idp.example:443");
        assert!(config.tls_enable);
        assert_eq!(config.temp_cache_duration, 120);
        assert_eq!(config.ldap.search_base, "ou=people,dc=example,dc=com");
        assert_eq!(config.users.len(), 1);

        let rendered = toml::to_string_pretty(&config).unwrap();
        let reparsed: IdpConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed.cookie_name, "my-sess");
    }
}
