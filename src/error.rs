use thiserror::Error;

pub type Result<T, E = DateError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DateError {
    /// A date argument was invalid; `position` is 1-based.
    #[error("Invalid date! You must pass a date on {position} position.")]
    InvalidDate { position: usize },

    /// Raised at the output-formatting boundary. The cause is kept as the source.
    #[error("Error generating result")]
    Generating(#[source] Box<DateError>),

    /// The gap between two dates does not fit in a time value.
    #[error("distance of {0} ms is outside the representable date range")]
    DistanceOutOfRange(f64),

    #[error("unknown time unit `{0}`")]
    UnknownUnit(String),

    #[error("unknown output format `{0}`")]
    UnknownFormat(String),

    #[error("unknown time zone `{0}`")]
    UnknownTimeZone(String),

    #[error("locale data unavailable for `{locale}`: {reason}")]
    LocaleData { locale: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DateError {
    pub(crate) fn generating(cause: DateError) -> Self {
        DateError::Generating(Box::new(cause))
    }
}
