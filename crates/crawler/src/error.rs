use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Crawler is already running")]
    AlreadyRunning,

    #[error("Invalid crawler configuration: {0}")]
    Configuration(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Processor error: {0}")]
    Processor(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
