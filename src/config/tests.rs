use super::*;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_verity_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("VERITY_EMBEDDING_DIM");
        env::remove_var("VERITY_SIMILARITY_THRESHOLD");
        env::remove_var("VERITY_POSSIBLE_THRESHOLD");
        env::remove_var("VERITY_TOP_K");
        env::remove_var("VERITY_BATCH_SIZE");
        env::remove_var("VERITY_STORAGE_PATH");
        env::remove_var("VERITY_QDRANT_URL");
        env::remove_var("VERITY_COLLECTION");
        env::remove_var("VERITY_EMBEDDING_URL");
        env::remove_var("VERITY_MODEL_ID");
        env::remove_var("VERITY_SCORE_MAPPING");
        env::remove_var("VERITY_QUERY_TIMEOUT_MS");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.embedding_dim, 384);
    assert_eq!(config.similarity_threshold, 0.7);
    assert_eq!(config.possible_threshold, 0.6);
    assert_eq!(config.top_k, 1);
    assert_eq!(config.batch_size, 50);
    assert_eq!(config.storage_path, PathBuf::from("./.data"));
    assert!(config.qdrant_url.is_none());
    assert!(config.embedding_url.is_none());
    assert_eq!(config.collection_name, "verity_entries");
    assert_eq!(config.model_id, "all-MiniLM-L6-v2");
    assert_eq!(config.score_mapping, ScoreMapping::Clamped);
    assert_eq!(config.query_timeout, Duration::from_secs(5));
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_verity_env();

    let config = Config::from_env().expect("should parse with defaults");
    assert_eq!(config.embedding_dim, 384);
    assert!(config.qdrant_config().is_none());
    assert!(config.http_embedder_config().is_none());
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_verity_env();

    let config = with_env_vars(
        &[
            ("VERITY_EMBEDDING_DIM", "768"),
            ("VERITY_SIMILARITY_THRESHOLD", "0.85"),
            ("VERITY_TOP_K", "5"),
            ("VERITY_BATCH_SIZE", "100"),
            ("VERITY_STORAGE_PATH", "/tmp/verity-test"),
            ("VERITY_QDRANT_URL", "http://qdrant:6334"),
            ("VERITY_COLLECTION", "bible"),
            ("VERITY_SCORE_MAPPING", "shifted"),
            ("VERITY_QUERY_TIMEOUT_MS", "250"),
        ],
        Config::from_env,
    )
    .expect("should parse overrides");

    assert_eq!(config.embedding_dim, 768);
    assert_eq!(config.similarity_threshold, 0.85);
    assert_eq!(config.top_k, 5);
    assert_eq!(config.batch_size, 100);
    assert_eq!(config.storage_path, PathBuf::from("/tmp/verity-test"));
    assert_eq!(config.score_mapping, ScoreMapping::Shifted);
    assert_eq!(config.query_timeout, Duration::from_millis(250));

    let qdrant = config.qdrant_config().expect("qdrant configured");
    assert_eq!(qdrant.url, "http://qdrant:6334");
    assert_eq!(qdrant.collection_name, "bible");
    assert_eq!(qdrant.dimension, 768);

    let resolver = config.resolver_config();
    assert_eq!(resolver.threshold, 0.85);
    assert_eq!(resolver.top_k, 5);
}

#[test]
#[serial]
fn test_blank_optional_url_is_unset() {
    clear_verity_env();

    let config = with_env_vars(&[("VERITY_EMBEDDING_URL", "   ")], Config::from_env).unwrap();
    assert!(config.embedding_url.is_none());
}

#[test]
#[serial]
fn test_embedding_url_builds_http_config() {
    clear_verity_env();

    let config = with_env_vars(
        &[
            ("VERITY_EMBEDDING_URL", "http://tei:8080/embed"),
            ("VERITY_MODEL_ID", "bge-small-en"),
        ],
        Config::from_env,
    )
    .unwrap();

    let http = config.http_embedder_config().expect("http configured");
    assert_eq!(http.url, "http://tei:8080/embed");
    assert_eq!(http.model_id, "bge-small-en");
    assert_eq!(http.dimension, 384);
}

#[test]
#[serial]
fn test_invalid_number_is_an_error() {
    clear_verity_env();

    let result = with_env_vars(&[("VERITY_TOP_K", "many")], Config::from_env);
    match result {
        Err(ConfigError::InvalidValue { name, value, .. }) => {
            assert_eq!(name, "VERITY_TOP_K");
            assert_eq!(value, "many");
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_invalid_score_mapping_is_an_error() {
    clear_verity_env();

    let result = with_env_vars(&[("VERITY_SCORE_MAPPING", "cubic")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn test_validate_rejects_bad_values() {
    let config = Config {
        similarity_threshold: 1.2,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

    let config = Config {
        top_k: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        batch_size: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        embedding_dim: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_storage_path_must_be_directory() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let config = Config {
        storage_path: file.path().to_path_buf(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}
