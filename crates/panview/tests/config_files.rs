//! Configuration files on disk.

use std::io::Write;

use panview::config::FlagOverrides;
use panview::{ShellConfig, ShellError};

fn file_with(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn toml_file_overrides_sections() {
    let file = file_with(
        ".toml",
        r#"
[gesture]
press_delay_ms = 250

[zoom]
max = 6.0
step = 0.5

[window]
width = 1024.0
height = 600.0

[features]
toolbar = false
tile_cache = false
"#,
    );
    let config = ShellConfig::load(file.path()).unwrap();
    assert_eq!(config.gesture.press_delay_ms, 250);
    assert_eq!(config.to_zoom_config().max_zoom, 6.0);
    assert_eq!(config.to_zoom_config().step, 0.5);
    assert_eq!(config.window_size().width, 1024.0);
    assert!(!config.to_chrome().toolbar);
    assert!(!config.to_web_viewport_config().tile_cache);
    // Untouched sections keep their defaults.
    assert_eq!(config.link, ShellConfig::default().link);
}

#[test]
fn json_file_chosen_by_extension() {
    let file = file_with(".json", r#"{"link": {"confirm_delay_ms": 800}}"#);
    let config = ShellConfig::load(file.path()).unwrap();
    assert_eq!(config.link.confirm_delay_ms, 800);
}

#[test]
fn invalid_values_are_all_reported() {
    let file = file_with(
        ".toml",
        "[zoom]\nmin = 2.0\nmax = 1.0\n\n[home]\ncolumns = 0\n",
    );
    match ShellConfig::load(file.path()) {
        Err(ShellError::InvalidConfig { errors }) => {
            assert_eq!(errors.len(), 2, "{errors:?}");
        }
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn syntax_errors_exit_with_config_code() {
    let file = file_with(".toml", "[zoom\n");
    let err = ShellConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ShellError::Toml(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn unknown_extension_parses_as_toml() {
    let file = file_with(".conf", "[home]\ncolumns = 4\n");
    assert_eq!(ShellConfig::load(file.path()).unwrap().home.columns, 4);
}

#[test]
fn effective_toml_reloads_identically() {
    let mut config = ShellConfig::default();
    config.apply_flags(&FlagOverrides {
        no_toolbar: true,
        show_fps: true,
        ..FlagOverrides::default()
    });
    let file = file_with(".toml", &config.to_toml_string().unwrap());
    assert_eq!(ShellConfig::load(file.path()).unwrap(), config);
}
