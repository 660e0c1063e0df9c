use clap::Parser;
use humstruct::{AnalysisConfig, HumError, HumdrumFile};
use std::io;
use std::path::PathBuf;

fn main() {
    let result = main_result();
    std::process::exit(match result {
        Ok(()) => 0,
        Err(err) => {
            // use Display instead of Debug for user friendly error messages
            log::error!("{err}");
            1
        }
    });
}

pub fn main_result() -> Result<(), AppError> {
    // setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("humstruct=info"))
        .init();

    // args
    let args = CliArgs::parse();
    let file_path = PathBuf::from(args.file_path);
    if !file_path.exists() {
        return Err(AppError::ConfigError(format!(
            "Humdrum file not found {file_path:?}"
        )));
    }

    // optional analysis config
    let config = match args.config.map(PathBuf::from) {
        Some(config_path) => {
            log::info!("Using configuration {config_path:?}");
            AnalysisConfig::read_config(&config_path)?
        }
        None => AnalysisConfig::default(),
    };

    let mut file = HumdrumFile::with_config(config);
    if !file.read_path(&file_path) {
        for error in file.errors().iter().skip(1) {
            log::error!("{error}");
        }
        return Err(file
            .errors()
            .first()
            .cloned()
            .map_or_else(|| AppError::OtherError("analysis failed".to_string()), AppError::from));
    }
    log::info!(
        "Analyzed {file_path:?}: {} lines, {} spines, score duration {}, tpq {}",
        file.line_count(),
        file.spine_count(),
        file.score_duration(),
        file.tpq()
    );

    let stdout = io::stdout();
    file.write_duration_info(&mut stdout.lock())?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Humdrum file to analyze.
    file_path: String,
    /// Optional path to a JSON analysis configuration.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("analysis error: {0}")]
    AnalysisError(String),
    #[error("other error: {0}")]
    OtherError(String),
}

impl From<HumError> for AppError {
    fn from(error: HumError) -> Self {
        match error {
            HumError::ConfigError(s) => Self::ConfigError(s),
            HumError::IoError(s) => Self::OtherError(s),
            other => Self::AnalysisError(other.to_string()),
        }
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::OtherError(error.to_string())
    }
}
