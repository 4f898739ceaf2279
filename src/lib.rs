mod commands;
pub mod config;
pub mod db;
pub mod dialogs;
pub mod error;
pub mod excel;
pub mod loader;
pub mod normalize;
pub mod ocr;
pub mod services;
pub mod store;
pub mod token;
pub mod transport;
pub mod types;

pub use commands::Cli;
pub use error::{ExportError, OcrError, StoreError, TransportError};
pub use ocr::Recognizer;
pub use types::{Credentials, FileItem, FileStatus, NormalizedRecord, SourceFile, TemplateSignature};

use clap::Parser;

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    commands::run(cli)
}
