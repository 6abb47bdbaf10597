use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub const ORDER_SCHEMA: &str =
    r#"{"type":"record","name":"Order","fields":[{"name":"amount","type":"int"}]}"#;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

#[allow(dead_code)]
pub fn registry_config(registry_url: &str, schemas: &[&str]) -> String {
    let mut yaml = format!("registry:\n  urls:\n    - \"{}\"\n  retries: 0\n", registry_url);
    if !schemas.is_empty() {
        yaml.push_str("schemas:\n");
        for subject in schemas {
            yaml.push_str(&format!("  - subject: {}\n    version: latest\n", subject));
        }
    }
    yaml
}
