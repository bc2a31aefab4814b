use derive_more::From;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, From)]
pub enum Error {
    CliUsage(String),
    Config(String),
    InvalidDomain(String),
    InvalidOptions(String),

    #[from]
    File(std::io::Error),

    #[from]
    Fmt(std::fmt::Error),

    #[from]
    Json(serde_json::Error),

    #[from]
    Reqwest(reqwest::Error),

    #[from]
    Subscriber(tracing::subscriber::SetGlobalDefaultError),
}

// region:    --- Error Boilerplate

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}

// endregion: --- Error Boilerplate
