//! Core pipeline for turning long texts into a single narrated MP3.
//!
//! The library splits input text into bounded chunks, synthesizes each chunk
//! through a remote speech service, and stitches the per-chunk MP3 files into
//! one output file without re-encoding. Callers submit a job through
//! [`pipeline::Narrator`] and consume an ordered event stream; the `matraca`
//! binary is one such caller.

pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod text;
pub mod tts;
pub mod voices;
