/// Encoder, decoder, tabular detection and compression.
pub mod codec;
/// Loading codec options from files and the environment.
pub mod config;
/// The value tree the codec works on.
pub mod value;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Error types and status codes.
pub use btoon_error::{DecodeError, EncodeError, ErrorExt, StatusCode};
/// Codec entry points.
pub use codec::{
    analyze, compress, decode, decompress, detect_table, encode, DecodeOptions, Decoder,
    EncodeOptions, Encoder, Rejection, Table,
};
/// config
pub use config::Settings;
/// Value model.
pub use value::Value;
