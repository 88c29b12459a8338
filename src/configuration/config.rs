#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::Arg;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    DataDir,
    DeepModel,
    FastModel,
    GeminiToken,
    #[strum(serialize = "gemini-url")]
    GeminiURL,
    Profile,
    Username,
}

fn find_arg(cmd: &Command, key: ConfigKey) -> Option<&Arg> {
    return cmd
        .get_arguments()
        .find(|e| return e.get_long() == Some(key.to_string().as_str()));
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        match key {
            ConfigKey::ConfigFile => {
                return dirs::config_dir()
                    .unwrap_or_default()
                    .join("kettle/config.toml")
                    .to_string_lossy()
                    .to_string();
            }
            ConfigKey::DataDir => {
                return dirs::data_dir()
                    .unwrap_or_default()
                    .join("kettle")
                    .to_string_lossy()
                    .to_string();
            }
            ConfigKey::DeepModel => return "gemini-2.5-pro".to_string(),
            ConfigKey::FastModel => return "gemini-2.5-flash".to_string(),
            ConfigKey::GeminiToken => return "".to_string(),
            ConfigKey::GeminiURL => return "https://generativelanguage.googleapis.com".to_string(),
            ConfigKey::Profile => return "".to_string(),
            ConfigKey::Username => {
                let user = env::var("USER").unwrap_or_default();
                if user.is_empty() {
                    return "User".to_string();
                }

                return user;
            }
        }
    }

    /// Resolves every key from defaults, then the config file, then CLI
    /// arguments and their environment variables, later sources winning.
    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for key in ConfigKey::iter() {
                if let Some(val) = doc.get(&key.to_string()) {
                    // Use clap value parsers to do validation.
                    let possible_values = find_arg(&cmd, key)
                        .map(|arg| {
                            return arg
                                .get_possible_values()
                                .iter()
                                .map(|e| return e.get_name().to_string())
                                .collect::<Vec<String>>();
                        })
                        .unwrap_or_default();

                    if let Some(val_int) = val.as_integer() {
                        Config::set(key, &val_int.to_string());
                    } else if let Some(val_str) = val.as_str() {
                        if val_str.is_empty() {
                            continue;
                        }
                        if !possible_values.is_empty()
                            && !possible_values.contains(&val_str.to_string())
                        {
                            bail!(format!("config.toml has an invalid value for key '{key}': {val_str}\nPossible values are: {}", possible_values.join(", ")));
                        }
                        Config::set(key, val_str);
                    }
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        tracing::debug!(
            username = Config::get(ConfigKey::Username),
            profile = Config::get(ConfigKey::Profile),
            fast_model = Config::get(ConfigKey::FastModel),
            deep_model = Config::get(ConfigKey::DeepModel),
            data_dir = Config::get(ConfigKey::DataDir),
            gemini_url = Config::get(ConfigKey::GeminiURL),
            "config"
        );

        return Ok(());
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                if key == ConfigKey::Username {
                    return Some(
                        "# Your user name displayed above your messages.\n# username = \"\""
                            .to_string(),
                    );
                }

                let arg = find_arg(&cmd, key)?;
                let mut description = arg
                    .get_help()?
                    .to_string()
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                if !arg.get_possible_values().is_empty() {
                    let possible_values = arg
                        .get_possible_values()
                        .iter()
                        .map(|e| return e.get_name())
                        .collect::<Vec<_>>()
                        .join(", ");
                    description = format!("{description} [possible values: {}]", possible_values);
                }

                let mut val = Config::default(key);
                if val.is_empty() {
                    val = format!("# {key} = \"\"");
                } else if val.parse::<i32>().is_ok() {
                    val = format!("{key} = {val}");
                } else {
                    val = format!("{key} = \"{val}\"");
                }

                return Some(format!("# {description}\n{val}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
