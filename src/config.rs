use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "http://restservice-neon1.niwa.co.nz/NeonRESTService.svc";
/// Larundal CWS.
pub const DEFAULT_NODE_ID: u64 = 3401;
pub const DEFAULT_CHANNEL: &str = "Barometric Pressure(AVG)";
pub const DEFAULT_OUTPUT: &str = "/var/www/html/bpcorr.txt";

/// Resolved run configuration. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Service root, e.g. `http://restservice-neon1.niwa.co.nz/NeonRESTService.svc`.
    pub host: String,
    /// Prompted for when absent.
    pub username: Option<String>,
    /// Prompted for (without echo) when absent.
    pub password: Option<String>,
    pub node_id: u64,
    /// Display name of the channel whose last value is exported.
    pub channel: String,
    /// File receiving `<depth>!`.
    pub output: PathBuf,
    pub show_inactive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            username: None,
            password: None,
            node_id: DEFAULT_NODE_ID,
            channel: DEFAULT_CHANNEL.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            show_inactive: false,
        }
    }
}

/// Values set by the caller; anything left `None` falls through to env, rc file, then defaults.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub node_id: Option<u64>,
    pub channel: Option<String>,
    pub output: Option<PathBuf>,
    pub show_inactive: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq)]
struct RcConfig {
    host: Option<String>,
    username: Option<String>,
    password: Option<String>,
    node: Option<String>,
    channel: Option<String>,
    output: Option<String>,
    show_inactive: Option<String>,
}

impl RcConfig {
    fn set(&mut self, key: &str, value: &str) {
        let slot = match key {
            "host" => &mut self.host,
            "username" => &mut self.username,
            "password" => &mut self.password,
            "node" => &mut self.node,
            "channel" => &mut self.channel,
            "output" => &mut self.output,
            "show_inactive" => &mut self.show_inactive,
            _ => return,
        };
        *slot = Some(value.to_string());
    }

    fn is_known(key: &str) -> bool {
        matches!(
            key,
            "host" | "username" | "password" | "node" | "channel" | "output" | "show_inactive"
        )
    }
}

/// Resolves settings from (in order of precedence):
/// - `overrides`
/// - environment variables `NEON_HOST`, `NEON_USERNAME`, `NEON_PASSWORD`, `NEON_NODE_ID`,
///   `NEON_CHANNEL`, `NEON_OUTPUT`, `NEON_SHOW_INACTIVE`
/// - config file from `NEON_RC`, `./.neonrc` or `~/.neonrc`
/// - built-in defaults
pub fn load_settings(overrides: Overrides) -> Result<Settings> {
    let env = |name: &str| std::env::var(name).ok();
    let env_layer = RcConfig {
        host: env("NEON_HOST"),
        username: env("NEON_USERNAME"),
        password: env("NEON_PASSWORD"),
        node: env("NEON_NODE_ID"),
        channel: env("NEON_CHANNEL"),
        output: env("NEON_OUTPUT"),
        show_inactive: env("NEON_SHOW_INACTIVE"),
    };

    let mut file_layer = RcConfig::default();
    for rc_path in rc_candidates() {
        if rc_path.exists() {
            file_layer = read_rc(&rc_path).with_context(|| {
                format!("failed to read configuration file {}", rc_path.display())
            })?;
            tracing::debug!(path = %rc_path.display(), "loaded configuration file");
            break;
        }
    }

    merge(overrides, env_layer, file_layer)
}

fn merge(overrides: Overrides, env: RcConfig, file: RcConfig) -> Result<Settings> {
    let defaults = Settings::default();

    let node_id = match overrides.node_id {
        Some(v) => v,
        None => match pick(env.node, "NEON_NODE_ID", file.node, "node") {
            Some((raw, source)) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("invalid node id '{}' (from {})", raw, source))?,
            None => defaults.node_id,
        },
    };

    let show_inactive = match overrides.show_inactive {
        Some(v) => v,
        None => match pick(
            env.show_inactive,
            "NEON_SHOW_INACTIVE",
            file.show_inactive,
            "show_inactive",
        ) {
            Some((raw, source)) => parse_bool(&raw)
                .with_context(|| format!("invalid show_inactive (from {})", source))?,
            None => defaults.show_inactive,
        },
    };

    Ok(Settings {
        host: overrides
            .host
            .or(env.host)
            .or(file.host)
            .unwrap_or(defaults.host),
        username: overrides.username.or(env.username).or(file.username),
        password: overrides.password.or(env.password).or(file.password),
        node_id,
        channel: overrides
            .channel
            .or(env.channel)
            .or(file.channel)
            .unwrap_or(defaults.channel),
        output: overrides
            .output
            .or(env.output.map(PathBuf::from))
            .or(file.output.map(PathBuf::from))
            .unwrap_or(defaults.output),
        show_inactive,
    })
}

fn pick(
    env: Option<String>,
    env_name: &'static str,
    file: Option<String>,
    file_key: &'static str,
) -> Option<(String, String)> {
    env.map(|v| (v, env_name.to_string()))
        .or_else(|| file.map(|v| (v, format!("config key `{}`", file_key))))
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{}'", other),
    }
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    // A key with an empty value takes its value from the next line.
    let mut pending_key: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pk) = pending_key.take() {
            if !starts_with_key(line) {
                cfg.set(pk, strip_quotes(line));
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v.trim());
            if !RcConfig::is_known(k) {
                continue;
            }
            if v.is_empty() {
                pending_key = Some(k);
            } else {
                cfg.set(k, v);
            }
        }
    }

    cfg
}

// Values such as `http://...` contain colons, so only a known key counts as a new entry.
fn starts_with_key(line: &str) -> bool {
    line.split_once(':')
        .is_some_and(|(k, _)| RcConfig::is_known(k.trim()))
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    ['"', '\'']
        .iter()
        .find_map(|q| s.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(s)
}

fn rc_candidates() -> Vec<PathBuf> {
    // An explicit NEON_RC is the only candidate; otherwise the working directory beats home.
    if let Ok(p) = std::env::var("NEON_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".neonrc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".neonrc"));
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rc_file_parsing() {
        let cfg = parse_rc(
            "# station config\n\
             host: http://example.test/NeonRESTService.svc\n\
             username: 'gauge'\n\
             password:\n\
             \"s3:cret\"\n\
             node: 12\n\
             colour: blue\n",
        );
        assert_eq!(cfg.host.as_deref(), Some("http://example.test/NeonRESTService.svc"));
        assert_eq!(cfg.username.as_deref(), Some("gauge"));
        assert_eq!(cfg.password.as_deref(), Some("s3:cret"));
        assert_eq!(cfg.node.as_deref(), Some("12"));
    }

    #[test]
    fn quotes_are_stripped_only_when_paired() {
        assert_eq!(strip_quotes(" \"a b\" "), "a b");
        assert_eq!(strip_quotes("'x'"), "x");
        assert_eq!(strip_quotes("\"open"), "\"open");
        assert_eq!(strip_quotes("\""), "\"");
        assert_eq!(strip_quotes("plain"), "plain");
    }

    #[test]
    fn empty_value_followed_by_key_stays_unset() {
        let cfg = parse_rc("password:\nnode: 5\n");
        assert_eq!(cfg.password, None);
        assert_eq!(cfg.node.as_deref(), Some("5"));
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let s = merge(Overrides::default(), RcConfig::default(), RcConfig::default()).unwrap();
        assert_eq!(s, Settings::default());
        assert_eq!(s.node_id, 3401);
        assert_eq!(s.channel, "Barometric Pressure(AVG)");
        assert_eq!(s.output, PathBuf::from("/var/www/html/bpcorr.txt"));
        assert!(s.username.is_none() && s.password.is_none());
    }

    #[test]
    fn precedence_is_override_env_file() {
        let env = RcConfig {
            host: Some("http://env".into()),
            node: Some("7".into()),
            ..Default::default()
        };
        let file = RcConfig {
            host: Some("http://file".into()),
            node: Some("8".into()),
            channel: Some("Rainfall".into()),
            show_inactive: Some("yes".into()),
            ..Default::default()
        };
        let overrides = Overrides {
            node_id: Some(9),
            ..Default::default()
        };
        let s = merge(overrides, env, file).unwrap();
        assert_eq!(s.host, "http://env");
        assert_eq!(s.node_id, 9);
        assert_eq!(s.channel, "Rainfall");
        assert!(s.show_inactive);
    }

    #[test]
    fn bad_node_id_names_its_source() {
        let env = RcConfig {
            node: Some("larundal".into()),
            ..Default::default()
        };
        let err = merge(Overrides::default(), env, RcConfig::default()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("NEON_NODE_ID"), "{msg}");
    }
}
