//! Audio input: decoding source files into conformant PCM.

pub mod decoder;
