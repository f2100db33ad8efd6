//! Exporter engine: HTML extraction and the conversion pipeline around it.
mod config;
mod convert;
mod decode;
mod extract;
mod persist;
mod profile;
mod visit;

pub use config::{ConfigError, ExporterConfig};
pub use convert::{ConversionOutput, ConvertError, Converter, TranscriptConverter};
pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use extract::{ExtractError, Extractor, TranscriptExtractor};
pub use persist::{ensure_output_dir, write_atomically, PersistError};
pub use profile::SourceProfile;
