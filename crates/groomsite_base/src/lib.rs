/* 📖 # Why have groomsite_base as a core library?
groomsite_base holds the error type, the tracing setup and the platform abstraction layer.
The engine and the binary both build on it, and it depends on neither.
*/

pub mod error;
pub mod pal;
mod pal_tests;
pub mod tracing;

pub use error::{GroomsiteError, GroomsiteResult, ResultExt};
pub use pal::{FilePath, MockPal, Pal, PalHandle, RealPal};
