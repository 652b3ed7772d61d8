//! Tests for loading configuration from disk.

use std::io::Write;
use strictly_arena::{ArenaConfig, ProviderKind};
use strictly_grid::{BoardSize, Difficulty, GameMode};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_from_file_reads_all_tables() {
    let file = write_config(
        r#"
        board_size = 4
        mode = "auto"
        difficulty = "medium"
        show_reasoning = false

        [opponent]
        provider = "heuristic"
        pacing_ms = 0
        timeout_ms = 2000
        seed = 7

        [opponent.llm]
        model = "gemini-2.5-pro"
        "#,
    );

    let config = ArenaConfig::from_file(file.path()).unwrap();

    assert_eq!(*config.board_size(), BoardSize::Four);
    assert_eq!(*config.mode(), GameMode::VsAuto);
    assert_eq!(*config.difficulty(), Difficulty::Medium);
    assert!(!*config.show_reasoning());
    assert_eq!(*config.opponent().provider(), ProviderKind::Heuristic);
    assert_eq!(*config.opponent().pacing_ms(), 0);
    assert_eq!(*config.opponent().timeout_ms(), 2000);
    assert_eq!(*config.opponent().seed(), Some(7));
    assert_eq!(config.opponent().llm().model(), "gemini-2.5-pro");
    assert_eq!(config.opponent().llm().api_key_env(), "GEMINI_API_KEY");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let config = ArenaConfig::load_or_default(Some(path.as_path())).unwrap();

    assert_eq!(config, ArenaConfig::default());
}

#[test]
fn test_malformed_file_is_an_error() {
    let file = write_config("board_size = \"huge\"\n[opponent\n");

    let error = ArenaConfig::load_or_default(Some(file.path())).unwrap_err();

    assert!(error.message.contains("Failed to parse config"));
}

#[test]
fn test_written_config_loads_back() {
    let original = ArenaConfig::from_toml("board_size = 5\nmode = \"human\"\n").unwrap();
    let file = write_config(&original.to_toml().unwrap());

    let loaded = ArenaConfig::from_file(file.path()).unwrap();

    assert_eq!(loaded, original);
}

#[test]
fn test_seeded_config_builds_orchestrator() {
    let file = write_config("[opponent]\nseed = 3\npacing_ms = 10\n");

    let config = ArenaConfig::from_file(file.path()).unwrap();
    let orchestrator = config.build_orchestrator().unwrap();

    assert_eq!(orchestrator.provider_name(), "Heuristic");
}
