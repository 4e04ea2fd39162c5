//! Interceptors: the console layer, the raw-stream writer, and fault
//! capture, plus the structural suppression guard that keeps relay-generated
//! output from being re-captured.

pub mod console;
pub(crate) mod fault;
pub mod stream;
pub mod suppress;

pub use console::ForwardLayer;
pub use stream::{ForwardMakeWriter, ForwardWriter};
