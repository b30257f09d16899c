//! Smart calculator core: free-form German/English math input, mode
//! auto-detection, and mode-aware evaluation and formatting.
//!
//! The evaluation pipeline lives in [`calculator`]; [`functions`],
//! [`history`] and [`settings`] support the CLI shell around it.

pub mod calculator;
pub mod functions;
pub mod history;
pub mod settings;
