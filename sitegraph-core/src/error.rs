use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("cannot derive a hostname from '{0}'")]
    MissingHostname(String),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
