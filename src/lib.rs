pub mod config;
pub mod decoder;
pub mod encoding;
pub mod error;
pub mod language;
pub mod lexical;
pub mod logging;
pub mod merge;
pub mod metrics;
pub mod payload;
pub mod pipeline;
pub mod render;
pub mod serde_helpers;
pub mod staple;
pub mod tokens;

pub use encoding::TextPositionEncoding;
pub use error::{HighlightError, Result};
pub use pipeline::{HighlightRequest, Highlighter};
pub use tokens::{AbsoluteToken, TokenLegend};
