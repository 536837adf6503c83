use anyhow::Result;

use crate::client::Client;
use crate::config::Settings;
use crate::depth::{round2, select_reading, write_depth_file};
use crate::prompt::CredentialPrompt;

/// What a single export run did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportOutcome {
    /// `pressure` was read and `depth` (unrounded) written to the output file.
    Written { pressure: f64, depth: f64 },
    /// A reading was found but was not positive, so the file was left alone.
    Skipped { pressure: f64 },
    /// No channel carried the configured name.
    NotFound,
}

/// Logs in, reads the configured channel's last value and writes the equivalent depth of water.
pub fn export_depth(
    client: &Client,
    settings: &Settings,
    prompt: &mut dyn CredentialPrompt,
) -> Result<ExportOutcome> {
    let token = client.get_session(
        settings.username.clone(),
        settings.password.clone(),
        prompt,
    )?;

    let channels = client.get_channel_list(&token, settings.node_id, settings.show_inactive)?;
    tracing::debug!(node = settings.node_id, count = channels.len(), "channel list");

    let Some(pressure) = select_reading(&channels, &settings.channel)? else {
        tracing::warn!(node = settings.node_id, channel = %settings.channel, "channel not found");
        return Ok(ExportOutcome::NotFound);
    };

    match write_depth_file(pressure, &settings.output)? {
        Some(depth) => {
            tracing::info!(
                pressure,
                depth = round2(depth),
                path = %settings.output.display(),
                "depth written"
            );
            Ok(ExportOutcome::Written { pressure, depth })
        }
        None => {
            tracing::warn!(pressure, "reading not positive, output left unchanged");
            Ok(ExportOutcome::Skipped { pressure })
        }
    }
}
