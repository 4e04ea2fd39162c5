//! Argument capture and safe serialization.
//!
//! `CapturedValue` is the crate's representation of a raw log argument;
//! `serialize` renders one as a finite string without ever failing, and
//! `encode` assembles a full `LogEvent` from an argument sequence.

pub mod encode;
pub mod serializer;
pub mod value;

pub use encode::encode;
pub use serializer::{CIRCULAR_MARKER, UNSERIALIZABLE, serialize};
pub use value::{CapturedError, CapturedValue, ValueKind};
