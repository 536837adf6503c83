use anyhow::Result;
use neonrest::{Client, Overrides, TerminalPrompt, export_depth, load_settings};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(Overrides::default())?;
    let client = Client::new(settings.host.clone())?;
    export_depth(&client, &settings, &mut TerminalPrompt)?;
    Ok(())
}
