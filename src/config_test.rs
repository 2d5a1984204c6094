#![allow(clippy::float_cmp)]

use super::*;
use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serializes env mutation across the test threads of this module.
fn env_guard() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

/// # Safety
/// Caller must hold [`env_guard`].
unsafe fn clear_signdesk_env() {
    unsafe {
        std::env::remove_var("SIGNDESK_RENDER_SCALE");
        std::env::remove_var("SIGNDESK_ERASER_RADIUS");
        std::env::remove_var("SIGNDESK_PEN_COLOR");
        std::env::remove_var("SIGNDESK_PEN_WIDTH");
        std::env::remove_var("SIGNDESK_FETCH_TIMEOUT_SECS");
        std::env::remove_var("SIGNDESK_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("SIGNDESK_SAVE_URL");
        std::env::remove_var("SIGNDESK_SECONDARY_REQUIRED");
    }
}

#[test]
fn from_env_defaults() {
    let _env = env_guard();
    unsafe { clear_signdesk_env() };

    let cfg = EditorConfig::from_env().unwrap();
    assert_eq!(cfg, EditorConfig::default());
    assert_eq!(cfg.render_scale, 1.5);
    assert_eq!(cfg.eraser_radius, 10.0);
    assert_eq!(cfg.pen_color, "#000000");
    assert_eq!(cfg.pen_width, 2.0);
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 30, connect_secs: 10 });
    assert!(cfg.save_url.is_none());
    assert!(!cfg.secondary_required);
}

#[test]
fn from_env_parses_overrides() {
    let _env = env_guard();
    unsafe {
        clear_signdesk_env();
        std::env::set_var("SIGNDESK_RENDER_SCALE", "2.25");
        std::env::set_var("SIGNDESK_ERASER_RADIUS", " 4 ");
        std::env::set_var("SIGNDESK_PEN_COLOR", "#1a2b3c");
        std::env::set_var("SIGNDESK_PEN_WIDTH", "3.5");
        std::env::set_var("SIGNDESK_FETCH_TIMEOUT_SECS", "5");
        std::env::set_var("SIGNDESK_CONNECT_TIMEOUT_SECS", "2");
        std::env::set_var("SIGNDESK_SAVE_URL", "https://example.test/save");
        std::env::set_var("SIGNDESK_SECONDARY_REQUIRED", "true");
    }

    let cfg = EditorConfig::from_env().unwrap();
    assert_eq!(cfg.render_scale, 2.25);
    assert_eq!(cfg.eraser_radius, 4.0);
    assert_eq!(cfg.pen_color, "#1a2b3c");
    assert_eq!(cfg.pen_width, 3.5);
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.save_url.as_deref(), Some("https://example.test/save"));
    assert!(cfg.secondary_required);

    unsafe { clear_signdesk_env() };
}

#[test]
fn from_env_rejects_malformed_number() {
    let _env = env_guard();
    unsafe {
        clear_signdesk_env();
        std::env::set_var("SIGNDESK_FETCH_TIMEOUT_SECS", "soon");
    }

    let err = EditorConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("SIGNDESK_FETCH_TIMEOUT_SECS"));

    unsafe { clear_signdesk_env() };
}

#[test]
fn from_env_rejects_non_positive_scale() {
    let _env = env_guard();
    unsafe {
        clear_signdesk_env();
        std::env::set_var("SIGNDESK_RENDER_SCALE", "0");
    }

    let err = EditorConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { var: "SIGNDESK_RENDER_SCALE", .. }));

    unsafe { clear_signdesk_env() };
}

#[test]
fn from_env_rejects_bad_bool() {
    let _env = env_guard();
    unsafe {
        clear_signdesk_env();
        std::env::set_var("SIGNDESK_SECONDARY_REQUIRED", "yes please");
    }

    assert!(matches!(
        EditorConfig::from_env(),
        Err(ConfigError::Invalid { var: "SIGNDESK_SECONDARY_REQUIRED", .. })
    ));

    unsafe { clear_signdesk_env() };
}

#[test]
fn blank_save_url_is_none() {
    let _env = env_guard();
    unsafe {
        clear_signdesk_env();
        std::env::set_var("SIGNDESK_SAVE_URL", "   ");
    }

    assert!(EditorConfig::from_env().unwrap().save_url.is_none());

    unsafe { clear_signdesk_env() };
}
