use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RawPdfError {
    #[error("object {from} refers to undefined object {to}")]
    DanglingReference { from: u32, to: u32 },

    #[error("object {0} was reserved but never defined")]
    Undefined(u32),

    #[error("object {0} is already defined")]
    AlreadyDefined(u32),

    #[error("document has no catalog")]
    MissingRoot,

    #[error("'{0}' is not a valid PDF name")]
    InvalidName(String),

    /// The last-resort document could not be built either.
    #[error("minimal PDF could not be produced: {0}")]
    Fatal(String),
}
