use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Error, Result, Timeframe};

/// Detector knobs. Everything else (weights, caps, session table) is fixed calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Candles left of a pivot that must be strictly lower (highs) / higher (lows).
    pub swing_left: usize,
    /// Candles right of a pivot, same rule.
    pub swing_right: usize,
    /// Minimum fair-value-gap height, in percent of the reference price.
    pub min_gap_pct: f64,
    /// Minimum displacement body as a fraction of the candle's open.
    pub min_displacement: f64,
    /// Half-width of the band (fraction of price) counted as a liquidity test.
    pub sweep_tolerance: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            swing_left: 3,
            swing_right: 3,
            min_gap_pct: 0.05,
            min_displacement: 0.003,
            sweep_tolerance: 0.003,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub initial_balance: f64,
    /// Balance percentage risked per trade (1.0 = 1%).
    pub risk_per_trade_pct: f64,
    /// Bars of the base series folded into one higher-timeframe bar. 0 disables it.
    pub higher_timeframe_factor: usize,
    /// Interval of the replayed series.
    pub timeframe: Timeframe,
}

impl BacktestConfig {
    /// The interval of resampled bars, or `None` when resampling is off or has no listed interval.
    pub fn higher_timeframe(&self) -> Option<Timeframe> {
        if self.higher_timeframe_factor <= 1 {
            return None;
        }
        self.timeframe.scaled(self.higher_timeframe_factor)
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_balance: 10_000.0,
            risk_per_trade_pct: 1.0,
            higher_timeframe_factor: 4,
            timeframe: Timeframe::M15,
        }
    }
}

/// Top-level configuration.
///
/// Example `config/quentrex.toml`:
/// ```toml
/// symbol = "SOLUSDT"
///
/// [analysis]
/// swing_left = 3
/// swing_right = 3
/// min_gap_pct = 0.05
///
/// [backtest]
/// initial_balance = 10000.0
/// risk_per_trade_pct = 1.0
/// timeframe = "15m"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub symbol: String,
    pub analysis: AnalysisConfig,
    pub backtest: BacktestConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: "SOLUSDT".to_string(),
            analysis: AnalysisConfig::default(),
            backtest: BacktestConfig::default(),
        }
    }
}

impl Config {
    /// Load from an optional TOML file, then apply `QX_*` environment overrides.
    /// Loads `.env` if present.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let config = Self::from_toml_str(&content)?;
                info!(path, "Loaded config file");
                config
            }
            None => Self::default(),
        };
        config.apply_overrides(optional_env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject a resampling factor that does not land on a listed timeframe.
    pub fn validate(&self) -> Result<()> {
        let bt = &self.backtest;
        if bt.higher_timeframe_factor > 1 && bt.higher_timeframe().is_none() {
            return Err(Error::Config(format!(
                "higher_timeframe_factor {} on {} bars is not a listed timeframe",
                bt.higher_timeframe_factor, bt.timeframe
            )));
        }
        Ok(())
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(symbol) = lookup("QX_SYMBOL") {
            self.symbol = symbol;
        }
        override_value(&lookup, "QX_SWING_LEFT", &mut self.analysis.swing_left)?;
        override_value(&lookup, "QX_SWING_RIGHT", &mut self.analysis.swing_right)?;
        override_value(&lookup, "QX_MIN_GAP_PCT", &mut self.analysis.min_gap_pct)?;
        override_value(&lookup, "QX_MIN_DISPLACEMENT", &mut self.analysis.min_displacement)?;
        override_value(&lookup, "QX_SWEEP_TOLERANCE", &mut self.analysis.sweep_tolerance)?;
        override_value(&lookup, "QX_INITIAL_BALANCE", &mut self.backtest.initial_balance)?;
        override_value(&lookup, "QX_RISK_PCT", &mut self.backtest.risk_per_trade_pct)?;
        override_value(&lookup, "QX_TIMEFRAME", &mut self.backtest.timeframe)?;
        override_value(&lookup, "QX_HTF_FACTOR", &mut self.backtest.higher_timeframe_factor)?;
        self.validate()
    }
}

fn override_value<F, T>(lookup: &F, key: &str, slot: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(key) {
        *slot = raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{key} has an invalid value: '{raw}'")))?;
    }
    Ok(())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            symbol = "BTCUSDT"

            [analysis]
            swing_left = 5

            [backtest]
            timeframe = "1h"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.symbol, "BTCUSDT");
        assert_eq!(cfg.analysis.swing_left, 5);
        assert_eq!(cfg.analysis.swing_right, 3);
        assert_eq!(cfg.backtest.timeframe, Timeframe::H1);
        assert_eq!(cfg.backtest.initial_balance, 10_000.0);
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [("QX_SWING_RIGHT", "2"), ("QX_RISK_PCT", "0.5")]
            .into_iter()
            .collect();
        let mut cfg = Config::default();
        cfg.apply_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.analysis.swing_right, 2);
        assert_eq!(cfg.backtest.risk_per_trade_pct, 0.5);
    }

    #[test]
    fn bad_override_is_a_config_error() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_overrides(|k| (k == "QX_SWING_LEFT").then(|| "three".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn inexact_higher_timeframe_factor_is_rejected() {
        let err = Config::from_toml_str(
            r#"
            [backtest]
            timeframe = "5m"
            higher_timeframe_factor = 4
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut cfg = Config::default();
        assert_eq!(cfg.backtest.higher_timeframe(), Some(Timeframe::H1));
        let err = cfg
            .apply_overrides(|k| (k == "QX_HTF_FACTOR").then(|| "3".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn factor_of_one_or_zero_disables_resampling() {
        let mut cfg = Config::default();
        for factor in [0, 1] {
            cfg.backtest.higher_timeframe_factor = factor;
            assert!(cfg.validate().is_ok());
            assert_eq!(cfg.backtest.higher_timeframe(), None);
        }
    }
}
