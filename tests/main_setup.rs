use admin_console::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic, time::Duration};

const CONFIG_VARS: [&str; 5] = [
    "APP_ENV",
    "API_BASE_URL",
    "BIND_ADDR",
    "SESSION_TTL_SECS",
    "HTTP_TIMEOUT_SECS",
];

// --- Setup/Teardown Utilities ---

/// Utility to run a test function and restore environment variables afterward
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    // Save current environment variables
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    // Start every test from a clean slate
    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    // Restore original environment variables
    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    // Re-panic if the test failed
    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    // API_BASE_URL is missing, so production loading must panic
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without API_BASE_URL"
    );
}

#[test]
#[serial]
fn test_app_config_production_hardens_cookies() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("API_BASE_URL", "https://api.store.test/api/");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    // Trailing slash is trimmed
    assert_eq!(config.api_base_url, "https://api.store.test/api");
    assert!(config.secure_cookies());
    assert!(config.cookie_settings().secure);
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    // Local mode should not panic, and should use hardcoded defaults
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://localhost:4000/api");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.session_ttl_secs, 604_800);
    assert_eq!(config.http_timeout(), Duration::from_secs(10));
    assert!(!config.secure_cookies());
}

#[test]
#[serial]
fn test_app_config_overrides_and_bad_numbers() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("BIND_ADDR", "127.0.0.1:8080");
            env::set_var("SESSION_TTL_SECS", "3600");
            env::set_var("HTTP_TIMEOUT_SECS", "soon");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.cookie_settings().ttl, time::Duration::hours(1));
    // Unparsable values fall back to the default
    assert_eq!(config.http_timeout_secs, 10);
}

#[test]
#[serial]
fn test_app_config_rejects_non_positive_durations() {
    for ttl in ["0", "-3600"] {
        let config = run_with_env(|| {
            unsafe {
                env::set_var("SESSION_TTL_SECS", ttl);
                env::set_var("HTTP_TIMEOUT_SECS", "0");
            }
            AppConfig::load()
        });

        // Zero and negative values fall back to the defaults
        assert_eq!(config.session_ttl_secs, 604_800, "SESSION_TTL_SECS={ttl}");
        assert_eq!(config.http_timeout_secs, 10);
    }
}
