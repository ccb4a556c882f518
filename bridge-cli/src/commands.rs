//! Subcommand implementations

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use sonos_bridge::{
    AccessoryInfo, AccessoryRecord, EqSwitch, JsonFileHost, PassReport, SonosPlatform,
};
use sonos_discovery::SsdpDiscovery;

/// Parse `on`/`off` (and the usual boolean spellings)
pub fn parse_on_off(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(format!("expected on or off, got '{}'", other)),
    }
}

pub async fn discover(platform: &SonosPlatform, window: Duration, json: bool) -> Result<()> {
    let discovery = SsdpDiscovery::new(window).context("Failed to set up SSDP discovery")?;
    let report = platform
        .run_discovery_pass(&discovery)
        .await
        .context("Discovery pass failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&ReportView::from(&report))?);
        return Ok(());
    }

    if report.skipped() {
        println!("Discovery skipped: add \"deviceNames\" or \"devices\" to the configuration.");
        return Ok(());
    }

    for record in &report.registered {
        println!("+ {:<24} {}", record.display_name, record.host());
    }
    for record in &report.updated {
        println!("= {:<24} {}", record.display_name, record.host());
    }
    for device in &report.rejected {
        println!("- {:<24} {} (not configured)", device.display_name, device.host);
    }
    for warning in &report.warnings {
        println!("! {}", warning);
    }

    if report.registered.is_empty() && report.updated.is_empty() {
        warn!("No configured Sonos devices found on the network");
    }
    Ok(())
}

pub fn list(platform: &SonosPlatform, json: bool) -> Result<()> {
    let records = platform.store().records();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No accessories cached yet. Run `sonos-bridge discover` first.");
        return Ok(());
    }

    for record in &records {
        let info = AccessoryInfo::for_record(record);
        println!("{} ({}, {})", record.display_name, info.model, info.serial_number);
        for switch in EqSwitch::ALL {
            let state = if switch.read(&record.control_state) { "on" } else { "off" };
            println!("  {:<20} {}", switch.service_name(), state);
        }
    }
    Ok(())
}

pub async fn set(
    platform: &SonosPlatform,
    host: &JsonFileHost,
    name: &str,
    switch: EqSwitch,
    value: bool,
) -> Result<()> {
    let accessory = platform
        .accessory_by_name(name)
        .ok_or_else(|| anyhow!("No cached accessory named '{}'", name))?;

    let record = accessory
        .set(switch, value)
        .await
        .with_context(|| format!("Failed to set {} on {}", switch, name))?;
    host.save(&record)
        .context("Failed to persist accessory state")?;

    info!("{} on {} is now {}", switch, name, if value { "on" } else { "off" });
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportView<'a> {
    registered: &'a [AccessoryRecord],
    updated: &'a [AccessoryRecord],
    rejected: Vec<&'a str>,
    warnings: Vec<String>,
}

impl<'a> From<&'a PassReport> for ReportView<'a> {
    fn from(report: &'a PassReport) -> Self {
        Self {
            registered: &report.registered,
            updated: &report.updated,
            rejected: report
                .rejected
                .iter()
                .map(|device| device.display_name.as_str())
                .collect(),
            warnings: report.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}
