use config_model::Settings;
use slide_disc::config::{Configuration, MIN_FADE};
use slide_disc::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[test]
fn parse_kebab_case_config() {
    let yaml = r#"
roots: ["/photos", "/archive/"]
advance-time: 5s
delay-advance-time: 20s
fade-time: 1s
wrap: false
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        cfg.roots,
        vec![PathBuf::from("/photos"), PathBuf::from("/archive/")]
    );
    assert_eq!(cfg.advance_time, Duration::from_secs(5));
    assert_eq!(cfg.delay_advance_time, Duration::from_secs(20));
    assert_eq!(cfg.fade_time, Duration::from_secs(1));
    assert!(!cfg.wrap);
    // Untouched keys keep their defaults.
    assert!(cfg.truncate_video);
    assert_eq!(cfg.long_video_threshold, Duration::from_secs(40));
    assert_eq!(cfg.long_video_limit, Duration::from_secs(30));
    assert!(!cfg.reverse_from_start);
}

#[test]
fn empty_document_is_all_defaults() {
    let cfg: Configuration = serde_yaml::from_str("{}").unwrap();
    assert!(cfg.roots.is_empty());
    assert_eq!(cfg.advance_time, Duration::from_secs(3));
    assert_eq!(cfg.delay_advance_time, Duration::from_secs(15));
    assert_eq!(cfg.fade_time, Duration::from_millis(750));
    assert_eq!(cfg.bookmark_interval, Duration::from_secs(60));
    assert!(cfg.wrap);
    assert!(cfg.settings_dir.is_none());
    let filter = cfg.extension_filter();
    assert!(filter.matches(Path::new("/p/a.JPEG")));
    assert!(filter.matches(Path::new("/p/clip.mov")));
    assert!(!filter.matches(Path::new("/p/a.png")));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = Configuration::from_yaml_str("advance-tiem: 3s\n").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("advance-tiem"));
}

#[test]
fn custom_extensions_build_filter() {
    let yaml = r#"
extensions: ["PNG", ".gif"]
"#;
    let cfg: Configuration = serde_yaml::from_str(yaml).unwrap();
    let cfg = cfg.validated().unwrap();
    let filter = cfg.extension_filter();
    assert_eq!(filter.extensions().collect::<Vec<_>>(), vec![".gif", ".png"]);
    assert!(filter.matches(Path::new("a.Png")));
    assert!(!filter.matches(Path::new("a.jpg")));
}

#[test]
fn validation_rejects_bad_values() {
    let zero_advance: Configuration = serde_yaml::from_str("advance-time: 0s\n").unwrap();
    assert!(zero_advance.validated().is_err());

    let short_delay: Configuration =
        serde_yaml::from_str("advance-time: 10s\ndelay-advance-time: 5s\n").unwrap();
    assert!(short_delay.validated().is_err());

    let blank_ext: Configuration = serde_yaml::from_str("extensions: [\".jpg\", \" \"]\n").unwrap();
    assert!(blank_ext.validated().is_err());

    let zero_interval: Configuration =
        serde_yaml::from_str("bookmark-interval: 0s\n").unwrap();
    assert!(zero_interval.validated().is_err());

    assert!(Configuration::default().validated().is_ok());
}

#[test]
fn load_from_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.yaml");
    std::fs::write(&path, "settings-dir: /var/lib/slides\nreverse-from-start: true\n").unwrap();
    let cfg = Configuration::from_yaml_file(&path).unwrap();
    assert_eq!(cfg.settings_dir, Some(PathBuf::from("/var/lib/slides")));
    assert!(cfg.reverse_from_start);
    assert_eq!(
        cfg.resolved_settings_dir().unwrap(),
        PathBuf::from("/var/lib/slides")
    );

    assert!(Configuration::from_yaml_file(tmp.path().join("missing.yaml")).is_err());
}

#[test]
fn saved_timings_override_configuration() {
    let saved = Settings {
        advance_time_ms: Some(20_000),
        fade_time_ms: Some(100),
        ..Settings::default()
    };
    let cfg = Configuration::default().with_saved(&saved);
    assert_eq!(cfg.advance_time, Duration::from_secs(20));
    // Delay never drops below the advance time.
    assert_eq!(cfg.delay_advance_time, Duration::from_secs(20));
    assert_eq!(cfg.fade_time, Duration::from_millis(100));
    assert!(cfg.fade_time < MIN_FADE);
    assert_eq!(cfg.effective_fade(), None);

    let untouched = Configuration::default().with_saved(&Settings {
        advance_time_ms: Some(0),
        ..Settings::default()
    });
    assert_eq!(untouched.advance_time, Duration::from_secs(3));
    assert_eq!(untouched.effective_fade(), Some(Duration::from_millis(750)));
}
