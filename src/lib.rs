//! Transcript Service - a small HTTP API that turns a YouTube URL into numbered transcript lines
//!
//! The acquisition pipeline tries a structured transcript API first, falls back to the raw
//! timed-text XML endpoint, and keeps successful results in memory for 24 hours.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod server;
pub mod sources;
pub mod transcribe;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractors::{extract_video_id, extract_video_id_strict, VideoIdMode};
pub use sources::{FallbackSource, PrimarySource, TranscriptSegment};
pub use transcribe::{cache::TranscriptCache, TranscriptPipeline};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Message returned when the request carries no video URL
pub const MISSING_INPUT_MESSAGE: &str = "URL do vídeo não fornecida";

/// Manual-recovery guidance returned whenever a transcript cannot be acquired
pub const ACQUISITION_FAILED_MESSAGE: &str = "❌ Não foi possível acessar a legenda automaticamente.\n\n\
🧠 Mesmo que a legenda apareça no vídeo, ela pode estar indisponível para ferramentas externas.\n\n\
🔁 Como alternativa:\n\
1. Acesse https://downsub.com ou https://yttranscript.com\n\
2. Cole o link do vídeo e baixe a legenda.\n\
3. Envie aqui o texto da legenda para continuar o processamento.\n\n\
📌 Isso garante fidelidade mesmo quando a API está limitada.";

/// Failures a caller of the pipeline can observe
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("{}", MISSING_INPUT_MESSAGE)]
    MissingInput,

    #[error("{}", ACQUISITION_FAILED_MESSAGE)]
    AcquisitionFailed,
}

/// Failure reported by a single transcript source
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

/// Error types for configuration and input handling
#[derive(thiserror::Error, Debug)]
pub enum TranscriptorError {
    #[error("Invalid video URL: {0}")]
    InvalidVideoUrl(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
