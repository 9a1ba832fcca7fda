use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Bot is not started yet")]
    NotStarted,
    #[error("Api call {echo} timed out")]
    Timeout { echo: u64 },
    #[error("WebSocket stream has been taken")]
    StreamTaken,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Api call failed with retcode {retcode}: {message}")]
    Failed { retcode: i64, message: String },
    #[error("Api call returned empty data")]
    EmptyData,
    #[error("Invalid response data: {0}")]
    InvalidData(#[from] serde_json::Error),
}
