//! Plain-text traffic summaries

use traffic_core::ExitZoneId;
use traffic_counter::{Totals, TransitionCount, ZoneConfig};

use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::info;

/// Render the per-exit-zone totals followed by the grand total
pub fn format_summary(totals: &Totals, zones: &ZoneConfig) -> String {
    let mut out = String::new();
    for (i, count) in totals.per_exit_zone.iter().enumerate() {
        out.push_str(&format!(
            "Total count for the {} zone: {}\n",
            zones.label(ExitZoneId(i)),
            count
        ));
    }
    out.push_str(&format!(
        "Total sum of counts for all zones: {}\n\n",
        totals.grand_total
    ));
    out
}

/// Render the entry breakdown of every exit zone, one line per credited pair
pub fn format_breakdown(transitions: &[TransitionCount], zones: &ZoneConfig) -> String {
    transitions
        .iter()
        .map(|pair| {
            format!(
                "{} <- {}: {}\n",
                zones.label(pair.exit_zone),
                pair.entry_zone,
                pair.count
            )
        })
        .collect()
}

/// Write the summary file, replacing any previous one
pub fn write_summary(path: &Path, totals: &Totals, zones: &ZoneConfig) -> anyhow::Result<()> {
    let text = format_summary(totals, zones);
    fs::write(path, &text)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;

    info!("Summary written to {}", path.display());
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
