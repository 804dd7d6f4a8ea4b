//! Demonstrates plugin storage shared between two plugins
//!
//! Run with `RUST_LOG=debug` to see the storage diagnostics.

use certmgr_plugin_storage::PluginStorage;
use certmgr_plugins::{Plugin, PluginConfig, logging};
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct RenewalHint {
    domain: String,
    days_before_expiry: u32,
}

struct DemoPlugin {
    name: &'static str,
    config: PluginConfig,
}

impl Plugin for DemoPlugin {
    fn name(&self) -> &str {
        self.name
    }

    fn config(&self) -> &PluginConfig {
        &self.config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init_logging();

    let installed = PluginConfig::for_app("org", "example", "certmgr");
    match installed.config_dir() {
        Some(dir) => println!("An installed host would keep plugin storage in {}", dir.display()),
        None => println!("No platform config directory; plugin storage would be disabled"),
    }

    // the walkthrough itself uses a scratch directory
    let dir = tempfile::tempdir()?;
    let config = PluginConfig::new(dir.path());
    let webroot = DemoPlugin {
        name: "webroot",
        config: config.clone(),
    };
    let dns = DemoPlugin {
        name: "dns-cloud",
        config,
    };

    println!("=== Plugin Storage Example ===\n");

    let mut webroot_storage = PluginStorage::for_plugin(&webroot);
    webroot_storage.put(
        "hint",
        &RenewalHint {
            domain: "example.org".to_string(),
            days_before_expiry: 30,
        },
    )?;
    webroot_storage.save()?;
    println!("1. webroot saved a renewal hint");

    let mut dns_storage = PluginStorage::for_plugin(&dns);
    dns_storage.put("zone_id", &42)?;
    dns_storage.save()?;
    println!("2. dns-cloud saved its zone id");

    println!("3. dns-cloud sees hint: {:?}", dns_storage.fetch("hint")?);

    let mut reopened = PluginStorage::for_plugin(&webroot);
    let hint: Option<RenewalHint> = reopened.fetch_as("hint")?;
    println!("4. webroot reloaded hint: {hint:?}");

    if let Some(path) = reopened.storage_path() {
        println!("\nShared file {}:\n{}", path.display(), std::fs::read_to_string(path)?);
    }

    Ok(())
}
