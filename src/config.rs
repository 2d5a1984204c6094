//! Editor configuration parsed from environment variables.

use std::str::FromStr;

pub const DEFAULT_RENDER_SCALE: f64 = 1.5;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but does not parse as the expected type.
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },

    /// A variable parsed but is outside its allowed range.
    #[error("{var} must be positive and finite, got {value}")]
    OutOfRange { var: &'static str, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_FETCH_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub render_scale: f64,
    pub eraser_radius: f64,
    pub pen_color: String,
    pub pen_width: f64,
    pub timeouts: HttpTimeouts,
    pub save_url: Option<String>,
    pub secondary_required: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            render_scale: DEFAULT_RENDER_SCALE,
            eraser_radius: canvas::consts::DEFAULT_ERASER_RADIUS,
            pen_color: canvas::consts::DEFAULT_PEN_COLOR.to_owned(),
            pen_width: canvas::consts::DEFAULT_PEN_WIDTH,
            timeouts: HttpTimeouts::default(),
            save_url: None,
            secondary_required: false,
        }
    }
}

impl EditorConfig {
    /// Build typed editor config from environment variables.
    ///
    /// All optional:
    /// - `SIGNDESK_RENDER_SCALE`: rasterization scale, default 1.5
    /// - `SIGNDESK_ERASER_RADIUS`: document units (unscaled page pixels), default 10
    /// - `SIGNDESK_PEN_COLOR`: CSS color, default `#000000`
    /// - `SIGNDESK_PEN_WIDTH`: document units, default 2
    /// - `SIGNDESK_FETCH_TIMEOUT_SECS`: default 30
    /// - `SIGNDESK_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SIGNDESK_SAVE_URL`: submission endpoint
    /// - `SIGNDESK_SECONDARY_REQUIRED`: `true`/`false`, default false
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a set variable fails to parse or a length is
    /// not positive.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let render_scale = positive("SIGNDESK_RENDER_SCALE", env_parse("SIGNDESK_RENDER_SCALE", defaults.render_scale)?)?;
        let eraser_radius =
            positive("SIGNDESK_ERASER_RADIUS", env_parse("SIGNDESK_ERASER_RADIUS", defaults.eraser_radius)?)?;
        let pen_width = positive("SIGNDESK_PEN_WIDTH", env_parse("SIGNDESK_PEN_WIDTH", defaults.pen_width)?)?;
        let pen_color = std::env::var("SIGNDESK_PEN_COLOR")
            .ok()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(defaults.pen_color);
        let timeouts = HttpTimeouts {
            request_secs: env_parse("SIGNDESK_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?,
            connect_secs: env_parse("SIGNDESK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        let save_url = std::env::var("SIGNDESK_SAVE_URL").ok().filter(|u| !u.trim().is_empty());
        let secondary_required = env_parse("SIGNDESK_SECONDARY_REQUIRED", false)?;

        Ok(Self { render_scale, eraser_radius, pen_color, pen_width, timeouts, save_url, secondary_required })
    }
}

/// Parse `key` if set, otherwise fall back to `default`. A set but malformed
/// value is an error rather than a silent default.
fn env_parse<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::Invalid { var: key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn positive(var: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value > 0.0 { Ok(value) } else { Err(ConfigError::OutOfRange { var, value }) }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
