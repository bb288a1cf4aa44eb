//! Binary-side wiring: settings merge, input reading, terminal setup and the run loop.

pub(crate) mod config_runtime;
pub(crate) mod input;
pub(crate) mod runtime;
pub(crate) mod terminal;
pub(crate) mod validation;
