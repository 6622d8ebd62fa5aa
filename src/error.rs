use std::path::PathBuf;
use thiserror::Error;

use crate::config::BOT_URL;

/// Exit status for generic failures (also used for "nothing to send").
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_MISSING_CREDENTIAL: i32 = 3;
pub const EXIT_SERVER_REJECTED: i32 = 4;

#[derive(Error, Debug)]
pub enum TeleputError {
    #[error("Failed to write key file {}: {source}", .path.display())]
    KeyWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Please run this tool with -k <your_key> argument.\n\
         To get your key, open {} and click \"Start\".",
        BOT_URL
    )]
    MissingCredential,

    #[error("Please specify what do you want to send.")]
    NothingToSend,

    /// The relay answered with something other than 200. Uploads report no
    /// status code, only the body.
    #[error("{}", rejection_message(.status, .body))]
    ServerRejected { status: Option<u16>, body: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

fn rejection_message(status: &Option<u16>, body: &str) -> String {
    match status {
        Some(code) => format!("Error {}: {}", code, body),
        None => format!("Error: {}", body),
    }
}

impl TeleputError {
    pub fn exit_code(&self) -> i32 {
        match self {
            TeleputError::MissingCredential => EXIT_MISSING_CREDENTIAL,
            TeleputError::ServerRejected { .. } => EXIT_SERVER_REJECTED,
            TeleputError::NothingToSend
            | TeleputError::KeyWrite { .. }
            | TeleputError::Io(_)
            | TeleputError::Http(_) => EXIT_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, TeleputError>;
