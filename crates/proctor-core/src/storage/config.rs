//! TOML-based monitoring configuration.
//!
//! Holds every tunable of the monitoring engine:
//! - Sampling cadence and perception timeout
//! - Absence, looking-away and multi-face debounce intervals
//! - Suspicious object classes and their confidence thresholds
//! - Integrity score deductions and floor
//! - Report store location
//!
//! Configuration is stored at `~/.config/proctor/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::perception::normalize_class;

/// Longest accepted interval or timeout: one day.
pub const MAX_INTERVAL_MS: u64 = 24 * 60 * 60 * 1_000;

/// Sampling scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
    /// Upper bound for each perception call before the sample is skipped.
    #[serde(default = "default_perception_timeout_ms")]
    pub perception_timeout_ms: u64,
}

/// Presence (absence) timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceConfig {
    #[serde(default = "default_absence_threshold_ms")]
    pub absence_threshold_ms: u64,
}

/// How many faces the attention axis requires before reading gaze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceRequirement {
    /// Gaze is read only when exactly one face is visible.
    ExactlyOne,
    /// Gaze is read from the first face whenever any face is visible.
    AtLeastOne,
}

/// Attention (looking-away) timer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttentionConfig {
    /// Maximum |nose - eye midpoint| in keypoint units before gaze counts as averted.
    #[serde(default = "default_offset_threshold")]
    pub offset_threshold: f64,
    #[serde(default = "default_attention_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_face_requirement")]
    pub face_requirement: FaceRequirement,
}

/// Multi-face gate policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplicityPolicy {
    /// Raise on every sample with more than one face.
    Immediate,
    /// Raise once more than one face has persisted for `debounce_ms`.
    Debounced,
}

/// Multi-face gate configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplicityConfig {
    #[serde(default = "default_multiplicity_policy")]
    pub policy: MultiplicityPolicy,
    #[serde(default = "default_multiplicity_debounce_ms")]
    pub debounce_ms: u64,
}

/// Suspicious object configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectsConfig {
    #[serde(default = "default_classes")]
    pub classes: Vec<String>,
    #[serde(default = "default_object_threshold")]
    pub default_threshold: f64,
    /// Per-class overrides of `default_threshold`.
    #[serde(default)]
    pub thresholds: BTreeMap<String, f64>,
}

/// Integrity score configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub floor: u32,
    #[serde(default = "default_multiple_faces_deduction")]
    pub multiple_faces: u32,
    #[serde(default = "default_absent_deduction")]
    pub absent: u32,
    #[serde(default = "default_looking_away_deduction")]
    pub looking_away: u32,
    /// Deduction per suspicious object class. Classes not listed deduct nothing.
    #[serde(default = "default_object_deductions")]
    pub objects: BTreeMap<String, u32>,
}

/// Report store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_transport_timeout_ms")]
    pub timeout_ms: u64,
}

/// Monitoring configuration.
///
/// Serialized to/from TOML at `~/.config/proctor/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub presence: PresenceConfig,
    #[serde(default)]
    pub attention: AttentionConfig,
    #[serde(default)]
    pub multiplicity: MultiplicityConfig,
    #[serde(default)]
    pub objects: ObjectsConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub transport: TransportConfig,
}

// Default functions
fn default_period_ms() -> u64 {
    2_000
}
fn default_perception_timeout_ms() -> u64 {
    5_000
}
fn default_absence_threshold_ms() -> u64 {
    10_000
}
fn default_offset_threshold() -> f64 {
    35.0
}
fn default_attention_debounce_ms() -> u64 {
    5_000
}
fn default_face_requirement() -> FaceRequirement {
    FaceRequirement::ExactlyOne
}
fn default_multiplicity_policy() -> MultiplicityPolicy {
    MultiplicityPolicy::Debounced
}
fn default_multiplicity_debounce_ms() -> u64 {
    2_000
}
fn default_classes() -> Vec<String> {
    vec!["cell phone".into(), "book".into()]
}
fn default_object_threshold() -> f64 {
    0.6
}
fn default_multiple_faces_deduction() -> u32 {
    15
}
fn default_absent_deduction() -> u32 {
    10
}
fn default_looking_away_deduction() -> u32 {
    5
}
fn default_object_deductions() -> BTreeMap<String, u32> {
    BTreeMap::from([("cell phone".to_string(), 20), ("book".to_string(), 15)])
}
fn default_base_url() -> String {
    "http://localhost:4000".into()
}
fn default_transport_timeout_ms() -> u64 {
    10_000
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
            perception_timeout_ms: default_perception_timeout_ms(),
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            absence_threshold_ms: default_absence_threshold_ms(),
        }
    }
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            offset_threshold: default_offset_threshold(),
            debounce_ms: default_attention_debounce_ms(),
            face_requirement: default_face_requirement(),
        }
    }
}

impl Default for MultiplicityConfig {
    fn default() -> Self {
        Self {
            policy: default_multiplicity_policy(),
            debounce_ms: default_multiplicity_debounce_ms(),
        }
    }
}

impl Default for ObjectsConfig {
    fn default() -> Self {
        Self {
            classes: default_classes(),
            default_threshold: default_object_threshold(),
            thresholds: BTreeMap::new(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            floor: 0,
            multiple_faces: default_multiple_faces_deduction(),
            absent: default_absent_deduction(),
            looking_away: default_looking_away_deduction(),
            objects: default_object_deductions(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_transport_timeout_ms(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            presence: PresenceConfig::default(),
            attention: AttentionConfig::default(),
            multiplicity: MultiplicityConfig::default(),
            objects: ObjectsConfig::default(),
            scoring: ScoringConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl ObjectsConfig {
    /// Confidence threshold for a class, honoring per-class overrides.
    ///
    /// Overrides are matched on the normalized class name.
    pub fn threshold_for(&self, class: &str) -> f64 {
        let wanted = normalize_class(class);
        self.thresholds
            .iter()
            .find(|(name, _)| normalize_class(name) == wanted)
            .map(|(_, t)| *t)
            .unwrap_or(self.default_threshold)
    }
}

impl MonitorConfig {
    pub fn sampling_period(&self) -> Duration {
        interval(self.sampling.period_ms)
    }

    pub fn absence_threshold(&self) -> Duration {
        interval(self.presence.absence_threshold_ms)
    }

    pub fn attention_debounce(&self) -> Duration {
        interval(self.attention.debounce_ms)
    }

    pub fn multiplicity_debounce(&self) -> Duration {
        interval(self.multiplicity.debounce_ms)
    }

    /// Reject configurations a session cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_interval("sampling.period_ms", self.sampling.period_ms)?;
        check_interval(
            "sampling.perception_timeout_ms",
            self.sampling.perception_timeout_ms,
        )?;
        check_interval(
            "presence.absence_threshold_ms",
            self.presence.absence_threshold_ms,
        )?;
        if !self.attention.offset_threshold.is_finite() || self.attention.offset_threshold < 0.0 {
            return Err(ConfigError::invalid(
                "attention.offset_threshold",
                "must be a finite, non-negative number",
            ));
        }
        check_interval("attention.debounce_ms", self.attention.debounce_ms)?;
        match self.multiplicity.policy {
            MultiplicityPolicy::Debounced => {
                check_interval("multiplicity.debounce_ms", self.multiplicity.debounce_ms)?
            }
            // Unused under the immediate policy, but still kept in range.
            MultiplicityPolicy::Immediate if self.multiplicity.debounce_ms > MAX_INTERVAL_MS => {
                return Err(ConfigError::invalid(
                    "multiplicity.debounce_ms",
                    format!("must not exceed {MAX_INTERVAL_MS}"),
                ));
            }
            MultiplicityPolicy::Immediate => {}
        }
        if self.objects.classes.is_empty() {
            return Err(ConfigError::EmptySuspiciousSet);
        }
        if let Some(blank) = self
            .objects
            .classes
            .iter()
            .find(|c| normalize_class(c).is_empty())
        {
            return Err(ConfigError::invalid(
                "objects.classes",
                format!("'{blank}' is not a usable class name"),
            ));
        }
        check_unit_interval("objects.default_threshold", self.objects.default_threshold)?;
        for (class, threshold) in &self.objects.thresholds {
            check_unit_interval(&format!("objects.thresholds.{class}"), *threshold)?;
        }
        if self.scoring.floor > 100 {
            return Err(ConfigError::invalid("scoring.floor", "must not exceed 100"));
        }
        url::Url::parse(&self.transport.base_url)
            .map_err(|e| ConfigError::invalid("transport.base_url", e.to_string()))?;
        check_interval("transport.timeout_ms", self.transport.timeout_ms)?;
        Ok(())
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| ConfigError::invalid(key, e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    ConfigError::invalid(key, format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(ConfigError::invalid(
                                key,
                                format!("cannot parse '{value}' as number"),
                            ));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value)
                            .map_err(|e| ConfigError::invalid(key, e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/proctor"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults there if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load and parse a specific file. The result is not validated.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// The change is rejected if it leaves the configuration invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting configuration fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: MonitorConfig =
            serde_json::from_value(json).map_err(|e| ConfigError::invalid(key, e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// Millisecond setting as a duration, saturating at [`MAX_INTERVAL_MS`].
fn interval(ms: u64) -> Duration {
    let ms = i64::try_from(ms.min(MAX_INTERVAL_MS)).unwrap_or(i64::MAX);
    Duration::milliseconds(ms)
}

fn check_interval(key: &str, ms: u64) -> Result<(), ConfigError> {
    if ms == 0 {
        Err(ConfigError::invalid(key, "must be positive"))
    } else if ms > MAX_INTERVAL_MS {
        Err(ConfigError::invalid(
            key,
            format!("{ms} exceeds the {MAX_INTERVAL_MS} ms limit"),
        ))
    } else {
        Ok(())
    }
}

fn check_unit_interval(key: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, format!("{value} is outside [0, 1]")))
    }
}
