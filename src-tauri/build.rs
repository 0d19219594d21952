use std::{env, fs, path::Path};

const BRIDGE_COMMANDS: &[&str] = &[
    "desktop_bridge_show_context_menu",
    "desktop_bridge_open_external_url",
];

fn check_bundle_version() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let config_path = Path::new(&manifest_dir).join("tauri.conf.json");
    println!("cargo:rerun-if-changed={}", config_path.display());

    let Ok(raw) = fs::read_to_string(&config_path) else {
        return;
    };
    let config: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(config) => config,
        Err(error) => {
            println!(
                "cargo:warning=failed to parse {}: {error}",
                config_path.display()
            );
            return;
        }
    };

    let package_version = env::var("CARGO_PKG_VERSION").unwrap_or_default();
    if let Some(bundle_version) = config.get("version").and_then(|value| value.as_str()) {
        if bundle_version != package_version {
            println!(
                "cargo:warning=tauri.conf.json version {bundle_version} differs from crate version {package_version}; the updater compares against the bundle version"
            );
        }
    }
}

fn main() {
    check_bundle_version();

    let attributes = tauri_build::Attributes::new()
        .app_manifest(tauri_build::AppManifest::new().commands(BRIDGE_COMMANDS));
    if let Err(error) = tauri_build::try_build(attributes) {
        panic!("failed to run tauri build script: {error:#}");
    }
}
