use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Json, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{FeeError, FeeResult};
use crate::features::{self, FEATURES, FEATURE_COUNT};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    pub fee: FeeModelConfig,
    pub features: FeatureConfig,
    pub infra: InfraConfig,
}

impl AppConfig {
    pub fn validate(&self) -> FeeResult<()> {
        self.fee.validate()?;
        self.infra.validate()?;
        Ok(())
    }
}

/// Calibration of the volatility estimate and the llmad -> fee mapping.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeeModelConfig {
    pub min_fee: f64,
    pub max_fee: f64,
    /// Estimate at which the interpolated curve saturates at `max_fee`.
    pub llmad_max: f64,
    /// Non-adaptive reference fee quotes are compared against.
    pub static_fee: f64,
    /// Fixed scale applied to the weighted feature sum.
    pub calibration_divisor: f64,
    /// Per-slot weights, in feature table order.
    pub weights: [f64; FEATURE_COUNT],
    pub curve: FeeCurve,
}

impl Default for FeeModelConfig {
    fn default() -> Self {
        Self {
            min_fee: 0.0005,
            max_fee: 0.008,
            llmad_max: 0.01,
            // Uniswap's flat 0.30% tier
            static_fee: 0.003,
            calibration_divisor: 10.0,
            weights: features::default_weights(),
            curve: FeeCurve::default(),
        }
    }
}

impl FeeModelConfig {
    pub fn validate(&self) -> FeeResult<()> {
        for (key, value) in [
            ("fee.min_fee", self.min_fee),
            ("fee.max_fee", self.max_fee),
            ("fee.llmad_max", self.llmad_max),
            ("fee.static_fee", self.static_fee),
            ("fee.calibration_divisor", self.calibration_divisor),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(FeeError::Config(format!(
                    "{key} must be finite and >0, got {value}"
                )));
            }
        }
        if self.min_fee > self.max_fee {
            return Err(FeeError::Config(format!(
                "fee.min_fee ({}) must be <= fee.max_fee ({})",
                self.min_fee, self.max_fee
            )));
        }
        for (spec, weight) in FEATURES.iter().zip(self.weights.iter()) {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(FeeError::Config(format!(
                    "fee.weights entry for {:?} must be finite and >=0, got {weight}",
                    spec.name
                )));
            }
        }
        self.curve.validate()
    }
}

/// Mapping from the volatility estimate to a fee.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeCurve {
    /// `min_fee + min(|llmad| / llmad_max, 1) * (max_fee - min_fee)`.
    #[default]
    Interpolated,
    /// `clamp(base_fee + |llmad| * scale, floor, cap)`, the dashboard's original mapping.
    Linear {
        #[serde(default = "default_linear_base_fee")]
        base_fee: f64,
        #[serde(default = "default_linear_scale")]
        scale: f64,
        #[serde(default = "default_linear_floor")]
        floor: f64,
        #[serde(default = "default_linear_cap")]
        cap: f64,
    },
}

fn default_linear_base_fee() -> f64 {
    0.001
}

fn default_linear_scale() -> f64 {
    10.0
}

fn default_linear_floor() -> f64 {
    0.0001
}

fn default_linear_cap() -> f64 {
    0.01
}

impl FeeCurve {
    pub fn linear() -> Self {
        Self::Linear {
            base_fee: default_linear_base_fee(),
            scale: default_linear_scale(),
            floor: default_linear_floor(),
            cap: default_linear_cap(),
        }
    }

    pub fn validate(&self) -> FeeResult<()> {
        let Self::Linear {
            base_fee,
            scale,
            floor,
            cap,
        } = *self
        else {
            return Ok(());
        };

        if ![base_fee, scale, floor, cap].iter().all(|v| v.is_finite()) {
            return Err(FeeError::Config(
                "fee.curve linear parameters must be finite".to_string(),
            ));
        }
        if scale < 0.0 {
            return Err(FeeError::Config(format!(
                "fee.curve.scale must be >=0, got {scale}"
            )));
        }
        if floor < 0.0 || floor > cap {
            return Err(FeeError::Config(format!(
                "fee.curve.floor ({floor}) must be in [0, fee.curve.cap ({cap})]"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FeatureConfig {
    /// Fail with `NonFiniteFeature` instead of returning NaN/inf features.
    pub reject_non_finite: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InfraConfig {
    /// `EnvFilter` directives, e.g. `info` or `warn,fee=debug`.
    pub log_level: String,
    pub log_ansi: bool,
}

impl Default for InfraConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_ansi: false,
        }
    }
}

impl InfraConfig {
    pub fn validate(&self) -> FeeResult<()> {
        if self.log_level.trim().is_empty() {
            return Err(FeeError::Config("infra.log_level must be set".to_string()));
        }
        Ok(())
    }
}

const CONFIG_PATH_ENV: &str = "AMMFEE_CONFIG_PATH";
const ENV_PREFIX: &str = "AMMFEE_";

/// Defaults, then the file named by `AMMFEE_CONFIG_PATH` (if any), then `AMMFEE_*` env vars.
pub fn load_config() -> FeeResult<AppConfig> {
    let path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    load_config_with(path.as_deref())
}

/// Same layering as [`load_config`] with an explicit file in place of the env lookup.
pub fn load_config_with(path: Option<&Path>) -> FeeResult<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
    if let Some(path) = path {
        figment = merge_config_file(figment, path)?;
    }
    load_config_from(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
}

fn merge_config_file(figment: Figment, path: &Path) -> FeeResult<Figment> {
    if !path.is_file() {
        return Err(FeeError::Config(format!(
            "config file {} does not exist",
            path.display()
        )));
    }
    match path.extension().and_then(|s| s.to_str()) {
        Some("toml") => Ok(figment.merge(Toml::file(path))),
        Some("json") => Ok(figment.merge(Json::file(path))),
        other => Err(FeeError::Config(format!(
            "unsupported config file extension {:?} for {} (expected .toml or .json)",
            other.unwrap_or(""),
            path.display()
        ))),
    }
}

fn load_config_from(figment: Figment) -> FeeResult<AppConfig> {
    let cfg: AppConfig = figment
        .extract()
        .map_err(|e| FeeError::Config(e.to_string()))?;
    cfg.validate()?;
    Ok(cfg)
}
