pub mod payload;

pub use payload::{ImagePayload, Provenance};
