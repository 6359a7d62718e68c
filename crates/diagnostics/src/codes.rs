//! Diagnostic ID constants.
//!
//! Auto-generated from `data/diagnostics.json` at build time. Reader codes
//! are `CMD10xx`, argument parser codes `CMD11xx`, and dispatcher codes
//! `CMD20xx`.

include!(concat!(env!("OUT_DIR"), "/generated_codes.rs"));
