//! `cardread check`: is OCR usable with the current configuration?
//!
//! Never contacts the service; it only inspects config and environment.

use std::path::Path;

use anyhow::Result;
use cardread_config::{CardreadConfig, collect_referenced_vars, load_raw, redact};

/// Print the credential status and the redacted effective config.
/// Returns whether OCR is configured.
pub async fn run(config: &CardreadConfig, path: &Path) -> Result<bool> {
    println!("\n🔍 Checking OCR configuration...\n");

    let vision = config.vision();
    let configured = vision.credentials().is_some();

    println!("Credentials:");
    report("vision.key (AZURE_VISION_KEY)", vision.key.as_deref());
    report("vision.endpoint (AZURE_VISION_ENDPOINT)", vision.endpoint.as_deref());

    println!("\nConfig file: {}", path.display());
    if path.exists() {
        let referenced = collect_referenced_vars(&load_raw(path).await?);
        if !referenced.is_empty() {
            println!("  references: {}", referenced.join(", "));
        }
    } else {
        println!("  (not found, using environment and defaults)");
    }

    println!("\nEffective config:");
    let redacted = redact(&serde_json::to_value(config)?);
    print!("{}", serde_yaml::to_string(&redacted)?);

    println!();
    if configured {
        println!("✅ Credentials found. Run `cardread extract <image>` to test a real extraction.");
    } else {
        println!("❌ Missing credentials. OCR will be skipped until both are set.");
    }
    Ok(configured)
}

fn report(label: &str, value: Option<&str>) {
    match value {
        Some(v) if !v.trim().is_empty() => println!("  🟢 {label} is set"),
        _ => println!("  🔴 {label} is missing"),
    }
}
