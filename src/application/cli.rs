use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use owo_colors::OwoColorize;
use strum::IntoEnumIterator;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::help_text;
use crate::domain::models::ProfileName;
use crate::domain::models::Role;
use crate::domain::services::TranscriptStore;
use crate::infrastructure::storage::file::FileStorage;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

pub fn log_path() -> path::PathBuf {
    let log_dir = env::var("KETTLE_LOG_DIR")
        .map(path::PathBuf::from)
        .unwrap_or_else(|_| return dirs::cache_dir().unwrap_or_default().join("kettle"));

    return log_dir.join("debug.log");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn transcript_store() -> TranscriptStore {
    return TranscriptStore::new(Box::<FileStorage>::default());
}

fn selected_profiles(matches: &ArgMatches) -> Vec<ProfileName> {
    if let Some(profile) = matches
        .get_one::<String>("transcript-profile")
        .and_then(|e| return ProfileName::parse(e))
    {
        return vec![profile];
    }

    return ProfileName::iter().collect();
}

fn print_transcripts(matches: &ArgMatches) {
    let store = transcript_store();
    let username = Config::get(ConfigKey::Username);

    for profile in selected_profiles(matches) {
        println!("{}", format!("{profile}").underline().bold());

        let turns = store.load(profile);
        if turns.is_empty() {
            println!("There is no saved transcript for this profile yet.\n");
            continue;
        }

        for turn in turns {
            let author = match turn.role {
                Role::User => username.to_string(),
                Role::Model => "model".to_string(),
            };
            println!("{}: {}", author.bold(), turn.content);
        }
        println!();
    }
}

fn clear_transcripts(matches: &ArgMatches) -> Result<()> {
    if !matches.get_flag("all") && matches.get_one::<String>("transcript-profile").is_none() {
        subcommand_transcripts_clear().print_long_help()?;
        return Ok(());
    }

    let store = transcript_store();
    for profile in selected_profiles(matches) {
        store.forget(profile);
        println!("Deleted transcript for profile {profile}");
    }

    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Kettle")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Kettle with environment variable RUST_LOG=kettle")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_transcript_profile() -> Arg {
    return Arg::new("transcript-profile")
        .short('p')
        .long("profile")
        .help("Only use the transcript of the given profile.")
        .num_args(1)
        .value_parser(PossibleValuesParser::new(ProfileName::VARIANTS));
}

fn subcommand_transcripts_clear() -> Command {
    return Command::new("clear")
        .about("Delete the saved transcript of one or all profiles.")
        .arg(arg_transcript_profile())
        .arg(
            clap::Arg::new("all")
                .long("all")
                .help("Delete the transcripts of all profiles.")
                .action(ArgAction::SetTrue),
        )
        .group(ArgGroup::new("clear-args").args(["transcript-profile", "all"]));
}

fn subcommand_transcripts() -> Command {
    return Command::new("transcripts")
        .about("Manage saved chat transcripts.")
        .arg_required_else_help(true)
        .subcommand(Command::new("dir").about("Print the directory transcripts are saved to."))
        .subcommand(
            Command::new("show")
                .about("Print saved transcripts.")
                .arg(arg_transcript_profile()),
        )
        .subcommand(subcommand_transcripts_clear());
}

fn arg_profile() -> Arg {
    return Arg::new(ConfigKey::Profile.to_string())
        .short('p')
        .long(ConfigKey::Profile.to_string())
        .env("KETTLE_PROFILE")
        .num_args(1)
        .help("The profile to start chatting with. Defaults to the profile used last.")
        .value_parser(PossibleValuesParser::new(ProfileName::VARIANTS));
}

fn arg_fast_model() -> Arg {
    return Arg::new(ConfigKey::FastModel.to_string())
        .long(ConfigKey::FastModel.to_string())
        .env("KETTLE_FAST_MODEL")
        .num_args(1)
        .help(format!(
            "Gemini model used by the fast profile. [default: {}]",
            Config::default(ConfigKey::FastModel)
        ));
}

fn arg_deep_model() -> Arg {
    return Arg::new(ConfigKey::DeepModel.to_string())
        .long(ConfigKey::DeepModel.to_string())
        .env("KETTLE_DEEP_MODEL")
        .num_args(1)
        .help(format!(
            "Gemini model used by the deep-reasoning profile. [default: {}]",
            Config::default(ConfigKey::DeepModel)
        ));
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start chatting. This is the default command.")
        .arg(arg_profile())
        .arg(arg_fast_model())
        .arg(arg_deep_model());
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:")
                || line.starts_with("HOTKEYS:")
                || line.starts_with("PROFILES:")
            {
                return format!("CHAT {line}").underline().bold().to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("kettle")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .subcommand(subcommand_transcripts())
        .arg(arg_profile())
        .arg(arg_fast_model())
        .arg(arg_deep_model())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("KETTLE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::DataDir.to_string())
                .long(ConfigKey::DataDir.to_string())
                .env("KETTLE_DATA_DIR")
                .num_args(1)
                .help(format!("Directory transcripts and the last used profile are saved to. [default: {}]", Config::default(ConfigKey::DataDir)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiURL.to_string())
                .long(ConfigKey::GeminiURL.to_string())
                .env("KETTLE_GEMINI_URL")
                .num_args(1)
                .help(format!("Gemini API URL. Can be swapped to a compatible proxy. [default: {}]", Config::default(ConfigKey::GeminiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiToken.to_string())
                .long(ConfigKey::GeminiToken.to_string())
                .env("KETTLE_GEMINI_TOKEN")
                .num_args(1)
                .hide_env_values(true)
                .help("Gemini API key.")
                .global(true),
        );
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_path().to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("transcripts", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;

            match subcmd_matches.subcommand() {
                Some(("dir", _)) => {
                    println!("{}", Config::get(ConfigKey::DataDir));
                }
                Some(("show", show_matches)) => {
                    print_transcripts(show_matches);
                }
                Some(("clear", clear_matches)) => {
                    clear_transcripts(clear_matches)?;
                }
                _ => {
                    subcommand_transcripts().print_long_help()?;
                }
            }

            return Ok(false);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
