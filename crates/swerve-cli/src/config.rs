//! Configuration Vault – reads/writes `~/.swervebot/config.toml`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use swerve_autonomy::Alliance;
use swerve_types::DriveError;
use swerve_types::VisionSource;
use swerve_types::config::{AutonomyConfig, EstimatorConfig, LoopConfig, VisionConfig};

/// Alliance the simulated robot plays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AllianceSetting {
    /// No alliance reported by the field; paths are never mirrored.
    #[default]
    None,
    Blue,
    Red,
}

impl AllianceSetting {
    pub fn alliance(self) -> Option<Alliance> {
        match self {
            AllianceSetting::None => None,
            AllianceSetting::Blue => Some(Alliance::Blue),
            AllianceSetting::Red => Some(Alliance::Red),
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "none" => Some(AllianceSetting::None),
            "blue" => Some(AllianceSetting::Blue),
            "red" => Some(AllianceSetting::Red),
            _ => None,
        }
    }
}

impl std::fmt::Display for AllianceSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllianceSetting::None => write!(f, "none"),
            AllianceSetting::Blue => write!(f, "blue"),
            AllianceSetting::Red => write!(f, "red"),
        }
    }
}

/// Persisted robot configuration stored in `~/.swervebot/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub alliance: AllianceSetting,

    /// Camera selection, pipeline and gate thresholds.
    #[serde(default)]
    pub vision: VisionConfig,

    /// Odometry trust used by the pose estimator.
    #[serde(default)]
    pub estimator: EstimatorConfig,

    /// Control-loop period and heading-zero delay.
    #[serde(default, rename = "loop")]
    pub loop_timing: LoopConfig,

    /// Path follower gains, constraints and the planner settings file.
    #[serde(default)]
    pub autonomy: AutonomyConfig,
}

/// Return the path to `~/.swervebot/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".swervebot").join("config.toml")
}

/// Load the config from disk with `SWERVEBOT_*` overrides applied.
/// Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, DriveError> {
    load_from(&config_path(), env_lookup)
}

/// Load the config from a specific path, taking overrides from `lookup`.
pub(crate) fn load_from(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<Config>, DriveError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        DriveError::Config(format!("failed to read config at {}: {}", path.display(), e))
    })?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| DriveError::Config(format!("failed to parse config: {}", e)))?;
    apply_overrides_from(&mut cfg, lookup);
    Ok(Some(cfg))
}

/// Where the values returned by [`load_or_default`] came from.
#[derive(Debug)]
pub enum ConfigOrigin {
    File,
    /// No config file; built-in defaults.
    Defaults,
    /// The config file could not be used; built-in defaults.
    Fallback(DriveError),
}

/// Load the config, falling back to defaults when the file is missing or
/// invalid.  Overrides apply in every case.
pub fn load_or_default() -> (Config, ConfigOrigin) {
    load_or_default_from(&config_path(), env_lookup)
}

pub(crate) fn load_or_default_from(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> (Config, ConfigOrigin) {
    let origin = match load_from(path, &lookup) {
        Ok(Some(cfg)) => return (cfg, ConfigOrigin::File),
        Ok(None) => ConfigOrigin::Defaults,
        Err(e) => ConfigOrigin::Fallback(e),
    };
    let mut cfg = Config::default();
    apply_overrides_from(&mut cfg, lookup);
    (cfg, origin)
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Apply `SWERVEBOT_*` overrides to `cfg`, reading each variable through
/// `lookup` (the process environment outside tests).
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `SWERVEBOT_ALLIANCE` | `alliance` (`none`, `blue`, `red`) |
/// | `SWERVEBOT_VISION_SOURCE` | `vision.source` (`coral`, `reef`) |
/// | `SWERVEBOT_PIPELINE` | `vision.pipeline` |
/// | `SWERVEBOT_PERIOD_MS` | `loop.period_ms` |
/// | `SWERVEBOT_SETTINGS_PATH` | `autonomy.settings_path` |
///
/// Unparseable values are ignored.
pub(crate) fn apply_overrides_from(cfg: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SWERVEBOT_ALLIANCE")
        && let Some(alliance) = AllianceSetting::parse(&v) {
            cfg.alliance = alliance;
        }
    if let Some(v) = lookup("SWERVEBOT_VISION_SOURCE") {
        match v.trim().to_ascii_lowercase().as_str() {
            "coral" => cfg.vision.source = VisionSource::Coral,
            "reef" => cfg.vision.source = VisionSource::Reef,
            _ => {}
        }
    }
    if let Some(v) = lookup("SWERVEBOT_PIPELINE")
        && let Ok(pipeline) = v.trim().parse::<i32>() {
            cfg.vision.pipeline = pipeline;
        }
    if let Some(v) = lookup("SWERVEBOT_PERIOD_MS")
        && let Ok(period) = v.trim().parse::<u64>()
        && period > 0 {
            cfg.loop_timing.period_ms = period;
        }
    if let Some(v) = lookup("SWERVEBOT_SETTINGS_PATH") {
        cfg.autonomy.settings_path = v;
    }
}

/// Save the config to disk, creating `~/.swervebot/` if necessary.
pub fn save(cfg: &Config) -> Result<(), DriveError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), DriveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            DriveError::Config(format!("failed to create config directory: {}", e))
        })?;
        // Owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(|e| {
                DriveError::Config(format!("failed to set config directory permissions: {}", e))
            })?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| DriveError::Serialization(format!("failed to serialize config: {}", e)))?;
    let write_err =
        |e: std::io::Error| DriveError::Config(format!("failed to write config at {}: {}", path.display(), e));
    // Owner read/write (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(write_err)?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(write_err)?;
    Ok(())
}

/// JSON Schema of [`Config`], pretty-printed.
pub fn schema_json() -> Result<String, DriveError> {
    let schema = schemars::schema_for!(Config);
    serde_json::to_string_pretty(&schema)
        .map_err(|e| DriveError::Serialization(format!("failed to render schema: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "config file must have 0o600 permissions");

        let dir_meta = std::fs::metadata(path.parent().unwrap()).expect("dir metadata");
        assert_eq!(dir_meta.permissions().mode() & 0o777, 0o700);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let mut cfg = Config::default();
        cfg.alliance = AllianceSetting::Red;
        cfg.vision.source = VisionSource::Reef;
        cfg.autonomy.translation_kp = 3.5;
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path, no_env).expect("load ok").expect("some");
        assert_eq!(loaded.alliance, AllianceSetting::Red);
        assert_eq!(loaded.vision.source, VisionSource::Reef);
        assert_eq!(loaded.autonomy.translation_kp, 3.5);
        assert_eq!(loaded.loop_timing, LoopConfig::default());
        assert_eq!(loaded.estimator, EstimatorConfig::default());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vision]\npipeline = 3\n\n[loop]\nperiod_ms = 10\n").unwrap();

        let loaded = load_from(&path, no_env).expect("load ok").expect("some");
        assert_eq!(loaded.vision.pipeline, 3);
        assert_eq!(loaded.vision.source, VisionSource::Coral);
        assert_eq!(loaded.loop_timing.period_ms, 10);
        assert_eq!(loaded.autonomy, AutonomyConfig::default());
    }

    #[test]
    fn overrides_win_over_file_values() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vision]\npipeline = 3\n").unwrap();

        let loaded = load_from(&path, vars(&[("SWERVEBOT_PIPELINE", "2")]))
            .expect("load ok")
            .expect("some");
        assert_eq!(loaded.vision.pipeline, 2);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vision\npipeline = ").unwrap();
        assert!(matches!(load_from(&path, no_env), Err(DriveError::Config(_))));
    }

    #[test]
    fn fallback_after_malformed_file_still_applies_overrides() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[vision\npipeline = ").unwrap();

        let (cfg, origin) = load_or_default_from(
            &path,
            vars(&[("SWERVEBOT_PIPELINE", "4"), ("SWERVEBOT_ALLIANCE", "blue")]),
        );
        assert!(matches!(origin, ConfigOrigin::Fallback(DriveError::Config(_))));
        assert_eq!(cfg.vision.pipeline, 4);
        assert_eq!(cfg.alliance, AllianceSetting::Blue);
    }

    #[test]
    fn missing_file_uses_defaults_with_overrides() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let (cfg, origin) = load_or_default_from(&path, vars(&[("SWERVEBOT_VISION_SOURCE", "reef")]));
        assert!(matches!(origin, ConfigOrigin::Defaults));
        assert_eq!(cfg.vision.source, VisionSource::Reef);
        assert_eq!(cfg.autonomy, AutonomyConfig::default());
    }

    #[test]
    fn existing_file_reports_file_origin() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        save_to(&Config::default(), &path).expect("save");

        let (cfg, origin) = load_or_default_from(&path, no_env);
        assert!(matches!(origin, ConfigOrigin::File));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn config_path_points_to_swervebot_dir() {
        let p = config_path_for_home("/home/driver");
        assert!(p.to_string_lossy().contains(".swervebot"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path, no_env).expect("no error").is_none());
    }

    #[test]
    fn override_changes_alliance() {
        let mut cfg = Config::default();
        apply_overrides_from(&mut cfg, vars(&[("SWERVEBOT_ALLIANCE", "Red")]));
        assert_eq!(cfg.alliance, AllianceSetting::Red);
        assert_eq!(cfg.alliance.alliance(), Some(Alliance::Red));
    }

    #[test]
    fn override_changes_vision_source() {
        let mut cfg = Config::default();
        apply_overrides_from(&mut cfg, vars(&[("SWERVEBOT_VISION_SOURCE", "reef")]));
        assert_eq!(cfg.vision.source, VisionSource::Reef);
    }

    #[test]
    fn override_changes_pipeline() {
        let mut cfg = Config::default();
        apply_overrides_from(&mut cfg, vars(&[("SWERVEBOT_PIPELINE", "2")]));
        assert_eq!(cfg.vision.pipeline, 2);
    }

    #[test]
    fn override_ignores_invalid_values() {
        let mut cfg = Config::default();
        apply_overrides_from(
            &mut cfg,
            vars(&[
                ("SWERVEBOT_PERIOD_MS", "fast"),
                ("SWERVEBOT_ALLIANCE", "green"),
                ("SWERVEBOT_VISION_SOURCE", "rear"),
            ]),
        );
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn override_changes_settings_path() {
        let mut cfg = Config::default();
        apply_overrides_from(&mut cfg, vars(&[("SWERVEBOT_SETTINGS_PATH", "/opt/robot/settings.json")]));
        assert_eq!(cfg.autonomy.settings_path, "/opt/robot/settings.json");
    }

    #[test]
    fn schema_names_every_section() {
        let schema = schema_json().expect("schema");
        for section in ["alliance", "vision", "estimator", "loop", "autonomy"] {
            assert!(schema.contains(&format!("\"{section}\"")), "missing {section}");
        }
    }
}
