/// Errors raised while building a symbol from a message.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("message needs {codewords} data codewords, largest allowed symbol holds {capacity}")]
    MessageTooLong { codewords: usize, capacity: usize },
    #[error("no ECC 200 symbol has {rows}x{cols} modules")]
    UnknownSize { rows: usize, cols: usize },
}

/// Errors raised while reading a sampled symbol.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("module matrix is {rows}x{cols}, symbol expects {expected_rows}x{expected_cols}")]
    MatrixSize {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },
    #[error("too many codeword errors in block {block}")]
    TooManyErrors { block: usize },
    #[error("malformed codeword stream at {position}: {reason}")]
    Malformed {
        position: usize,
        reason: &'static str,
    },
}
