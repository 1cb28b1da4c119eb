// Checks on the files shipped with the crate: default configs and data.

use std::path::PathBuf;

fn crate_path(rel: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(rel)
}

/// Verify that defaults/league.toml is valid TOML.
#[test]
fn league_toml_is_valid() {
    let content = std::fs::read_to_string(crate_path("defaults/league.toml"))
        .expect("defaults/league.toml should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(parsed.is_ok(), "defaults/league.toml is not valid TOML: {:?}", parsed.err());
}

/// Verify that defaults/draft.toml is valid TOML with nine strategies.
#[test]
fn draft_toml_is_valid() {
    let content = std::fs::read_to_string(crate_path("defaults/draft.toml"))
        .expect("defaults/draft.toml should exist");
    let parsed: toml::Value = toml::from_str(&content).expect("valid TOML");
    let strategies = parsed["ai"]["strategies"].as_array().expect("strategy list");
    assert_eq!(strategies.len(), 9);
}

/// Defaults copied into a fresh directory load through the public API.
#[test]
fn defaults_load_through_config() {
    let tmp = std::env::temp_dir().join("mockdraft_bundled_defaults");
    let _ = std::fs::remove_dir_all(&tmp);
    std::fs::create_dir_all(tmp.join("defaults")).unwrap();
    for name in ["league.toml", "draft.toml"] {
        std::fs::copy(
            crate_path("defaults").join(name),
            tmp.join("defaults").join(name),
        )
        .unwrap();
    }

    let copied = mockdraft::config::ensure_config_files(&tmp).unwrap();
    assert_eq!(copied.len(), 2);
    let config = mockdraft::config::load_config_from(&tmp).unwrap();
    assert_eq!(config.ai.strategies.len(), 9);
    assert_eq!(config.draft_settings().num_teams, 10);

    let _ = std::fs::remove_dir_all(&tmp);
}

#[test]
fn player_csv_has_expected_headers() {
    let mut reader = csv::Reader::from_path(crate_path("data/players.csv")).unwrap();
    let headers = reader.headers().unwrap().clone();
    for required in ["Player_Name", "Position", "VBD_Value"] {
        assert!(headers.iter().any(|h| h == required), "missing {required}");
    }
}
