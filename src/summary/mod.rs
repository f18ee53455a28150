//! Discovery-to-summary core: deterministic prompt assembly, the
//! single-shot generative call, and strict parsing of the model's
//! freeform output.

pub mod parser;
pub mod pipeline;
pub mod prompt;

pub use parser::{parse_summary, ParseFailure};
pub use pipeline::{SummarizeError, Summarizer};
pub use prompt::{build_prompt, OutputTemplate};
