// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TraceviewError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TraceviewError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.trace, raw.timeline, raw.dag))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_trace_section(cfg)?;
    validate_timeline_section(cfg)?;
    validate_dag_section(cfg)?;
    Ok(())
}

fn validate_trace_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.trace.root.trim().is_empty() {
        return Err(TraceviewError::ConfigError(
            "[trace].root must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_timeline_section(cfg: &RawConfigFile) -> Result<()> {
    let t = &cfg.timeline;

    if !(t.width.is_finite() && t.width > 0.0) {
        return Err(TraceviewError::ConfigError(format!(
            "[timeline].width must be > 0 (got {})",
            t.width
        )));
    }
    if !(t.height.is_finite() && t.height > 0.0) {
        return Err(TraceviewError::ConfigError(format!(
            "[timeline].height must be > 0 (got {})",
            t.height
        )));
    }
    if !(t.strip_height.is_finite() && t.strip_height > 0.0) {
        return Err(TraceviewError::ConfigError(format!(
            "[timeline].strip_height must be > 0 (got {})",
            t.strip_height
        )));
    }
    if !(t.disk_height.is_finite() && t.disk_height > 0.0) {
        return Err(TraceviewError::ConfigError(format!(
            "[timeline].disk_height must be > 0 (got {})",
            t.disk_height
        )));
    }
    if !(0.0..1.0).contains(&t.row_padding) {
        return Err(TraceviewError::ConfigError(format!(
            "[timeline].row_padding must be in [0, 1) (got {})",
            t.row_padding
        )));
    }
    if t.max_worker_ticks == 0 {
        return Err(TraceviewError::ConfigError(
            "[timeline].max_worker_ticks must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_dag_section(cfg: &RawConfigFile) -> Result<()> {
    let d = &cfg.dag;
    for (key, value) in [
        ("default_fill", &d.default_fill),
        ("critical_fill", &d.critical_fill),
        ("analyze_fill", &d.analyze_fill),
    ] {
        if value.trim().is_empty() {
            return Err(TraceviewError::ConfigError(format!(
                "[dag].{key} must not be empty"
            )));
        }
    }
    Ok(())
}
