use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    assert!(res.contains("fast-model = \"gemini-2.5-flash\""));
    assert!(res.contains("deep-model = \"gemini-2.5-pro\""));
    assert!(res.contains("# gemini-token = \"\""));
    assert!(res.contains("[possible values: fast, deep-reasoning]"));
    assert!(!res.contains("config-file"));
}

#[test]
fn it_defaults_to_gemini_flash_and_pro() {
    assert_eq!(Config::default(ConfigKey::FastModel), "gemini-2.5-flash");
    assert_eq!(Config::default(ConfigKey::DeepModel), "gemini-2.5-pro");
    assert_eq!(
        Config::default(ConfigKey::GeminiURL),
        "https://generativelanguage.googleapis.com"
    );
    assert!(Config::default(ConfigKey::DataDir).ends_with("kettle"));
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "kettle",
        "chat",
        "-c",
        "./test/fixtures/config.toml",
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "kettle",
        "chat",
        "-c",
        "./test/fixtures/bad-config.toml",
    ])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    return Ok(());
}
