use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_STATIC_ROOT: &str = "crates/apps/web/static";
pub const DEFAULT_WATCH_ROOT: &str = "crates/apps/web/src";
pub const DEFAULT_BUILD_CMD: &str =
    "wasm-pack build crates/apps/web --target web --out-dir static/pkg";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub static_root: PathBuf,
    /// Present only when `SCRATCHPAD_ENV=development`.
    pub dev: Option<DevConfig>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DevConfig {
    pub watch_root: PathBuf,
    pub build_cmd: BuildCommand,
    pub interval: Duration,
}

/// A bundle build command split into program and arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BuildCommand {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl std::fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let raw_addr = lookup("SCRATCHPAD_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = raw_addr
            .parse()
            .map_err(|e| format!("invalid SCRATCHPAD_ADDR {raw_addr:?}: {e}"))?;
        let static_root = lookup("SCRATCHPAD_STATIC_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_ROOT));

        let dev = match lookup("SCRATCHPAD_ENV").as_deref() {
            Some("development") => {
                let raw_cmd =
                    lookup("SCRATCHPAD_BUILD_CMD").unwrap_or_else(|| DEFAULT_BUILD_CMD.to_string());
                let build_cmd = BuildCommand::parse(&raw_cmd)
                    .ok_or_else(|| "SCRATCHPAD_BUILD_CMD is empty".to_string())?;
                Some(DevConfig {
                    watch_root: lookup("SCRATCHPAD_WATCH_ROOT")
                        .map(PathBuf::from)
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_WATCH_ROOT)),
                    build_cmd,
                    interval: Duration::from_millis(lookup_u64(
                        &lookup,
                        "SCRATCHPAD_WATCH_INTERVAL_MS",
                        1000,
                    )),
                })
            }
            _ => None,
        };

        Ok(Self {
            addr,
            static_root,
            dev,
        })
    }
}

fn lookup_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::{BuildCommand, ServerConfig, DEFAULT_BUILD_CMD};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config(pairs: &[(&str, &str)]) -> Result<ServerConfig, String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_serve_on_port_3000_without_dev_mode() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.addr.port(), 3000);
        assert_eq!(cfg.static_root, PathBuf::from("crates/apps/web/static"));
        assert!(cfg.dev.is_none());
    }

    #[test]
    fn development_env_enables_watcher() {
        let cfg = config(&[
            ("SCRATCHPAD_ENV", "development"),
            ("SCRATCHPAD_WATCH_INTERVAL_MS", "250"),
            ("SCRATCHPAD_WATCH_ROOT", "web/src"),
        ])
        .unwrap();
        let dev = cfg.dev.expect("dev config");
        assert_eq!(dev.interval, Duration::from_millis(250));
        assert_eq!(dev.watch_root, PathBuf::from("web/src"));
        assert_eq!(dev.build_cmd.program, "wasm-pack");
        assert_eq!(dev.build_cmd.to_string(), DEFAULT_BUILD_CMD);
    }

    #[test]
    fn other_env_values_do_not_enable_dev_mode() {
        let cfg = config(&[("SCRATCHPAD_ENV", "production")]).unwrap();
        assert!(cfg.dev.is_none());
    }

    #[test]
    fn bad_values() {
        assert!(config(&[("SCRATCHPAD_ADDR", "nope")]).is_err());
        assert!(config(&[("SCRATCHPAD_ENV", "development"), ("SCRATCHPAD_BUILD_CMD", "  ")]).is_err());
        let cfg = config(&[
            ("SCRATCHPAD_ENV", "development"),
            ("SCRATCHPAD_WATCH_INTERVAL_MS", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.dev.unwrap().interval, Duration::from_millis(1000));
    }

    #[test]
    fn parses_build_command() {
        assert_eq!(BuildCommand::parse(""), None);
        assert_eq!(
            BuildCommand::parse("make  bundle"),
            Some(BuildCommand {
                program: "make".to_string(),
                args: vec!["bundle".to_string()],
            })
        );
    }
}
