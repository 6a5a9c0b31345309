use std::path::PathBuf;

pub const USAGE: &str = "\
Usage:
  tracker_app bulk-import <FILE|->   Import the game URLs listed in FILE (one per line, - for stdin)
  tracker_app reprocess-all          Re-scrape every stored game

Options:
  --config <PATH>       RON config file (default: tracker.ron if present)
  --base-url <URL>      Backend API base URL
  --interval-ms <MS>    Delay between status polls
  --log-file            Also write debug logs to ./tracker.log
  -h, --help            Show this help

The TRACKER_TOKEN environment variable, if set, is sent as a bearer token.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    File(PathBuf),
    Stdin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    BulkImport { source: UrlSource },
    ReprocessAll,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub action: Action,
    pub config_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub interval_ms: Option<u64>,
    pub log_file: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CliError {
    #[error("missing command")]
    MissingCommand,
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },
    #[error("unknown argument: {0}")]
    Unknown(String),
    #[error("only one command may be given")]
    DuplicateCommand,
}

pub fn parse_args<I>(args: I) -> Result<CliArgs, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut action = None;
    let mut config_path = None;
    let mut base_url = None;
    let mut interval_ms = None;
    let mut log_file = false;

    while let Some(arg) = args.next() {
        let parsed = match arg.as_str() {
            "-h" | "--help" => Some(Action::Help),
            "bulk-import" => {
                let value = args.next().ok_or(CliError::MissingValue("bulk-import"))?;
                let source = if value == "-" {
                    UrlSource::Stdin
                } else {
                    UrlSource::File(PathBuf::from(value))
                };
                Some(Action::BulkImport { source })
            }
            "reprocess-all" => Some(Action::ReprocessAll),
            "--config" => {
                let value = args.next().ok_or(CliError::MissingValue("--config"))?;
                config_path = Some(PathBuf::from(value));
                None
            }
            "--base-url" => {
                base_url = Some(args.next().ok_or(CliError::MissingValue("--base-url"))?);
                None
            }
            "--interval-ms" => {
                let value = args.next().ok_or(CliError::MissingValue("--interval-ms"))?;
                let parsed = value
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .ok_or(CliError::InvalidValue {
                        flag: "--interval-ms",
                        value,
                    })?;
                interval_ms = Some(parsed);
                None
            }
            "--log-file" => {
                log_file = true;
                None
            }
            _ => return Err(CliError::Unknown(arg)),
        };

        if let Some(next) = parsed {
            action = match (action, next) {
                (_, Action::Help) | (Some(Action::Help), _) => Some(Action::Help),
                (Some(_), _) => return Err(CliError::DuplicateCommand),
                (None, next) => Some(next),
            };
        }
    }

    Ok(CliArgs {
        action: action.ok_or(CliError::MissingCommand)?,
        config_path,
        base_url,
        interval_ms,
        log_file,
    })
}
