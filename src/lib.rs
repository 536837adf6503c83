//! A small Rust client for the Aquarius/NEON REST service.
//!
//! The service is session based: exchange a username and password for a token with
//! [`Client::get_session`], then pass the token to the node, channel and data calls.
//!
//! ## Quick start
//! - Configure the service via environment variables (`NEON_HOST`, `NEON_USERNAME`,
//!   `NEON_PASSWORD`, ...) or a `.neonrc` file (current directory or home directory).
//!   Credentials left out are asked for on the terminal.
//! - Call [`export_depth`] to publish the barometric correction, or use [`Client`] directly.
//!
//! ```no_run
//! use anyhow::Result;
//! use chrono::NaiveDate;
//! use neonrest::{Client, TerminalPrompt};
//!
//! fn main() -> Result<()> {
//!     let client = Client::new("http://restservice-neon1.niwa.co.nz/NeonRESTService.svc")?;
//!     let token = client.get_session(None, None, &mut TerminalPrompt)?;
//!
//!     for channel in client.get_channel_list(&token, 3401, false)? {
//!         println!("{}: {:?}", channel.name, channel.last_value);
//!     }
//!
//!     let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//!     let data = client.get_data(
//!         &token,
//!         1234,
//!         &day.and_hms_opt(0, 0, 0).unwrap(),
//!         &day.and_hms_opt(23, 59, 59).unwrap(),
//!         false,
//!     )?;
//!     println!("{} samples", data.samples.len());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod client;
mod config;
mod depth;
mod export;
mod model;
mod prompt;
mod series;
mod util;

pub use client::{AUTH_HEADER, AuthToken, Client};
pub use config::{
    DEFAULT_CHANNEL, DEFAULT_HOST, DEFAULT_NODE_ID, DEFAULT_OUTPUT, Overrides, Settings,
    load_settings,
};
pub use depth::{
    METRES_WATER_PER_HPA, STANDARD_PRESSURE_HPA, format_depth, pressure_to_depth, round2,
    select_reading, write_depth_file,
};
pub use export::{ExportOutcome, export_depth};
pub use model::{Channel, ChannelData, Node, Sample, TimeSeries};
pub use prompt::{CredentialPrompt, StaticPrompt, TerminalPrompt, resolve_credentials};
pub use series::{DATE_FORMAT, format_time, parse_time};
