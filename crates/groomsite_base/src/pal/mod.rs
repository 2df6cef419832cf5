/* 📖 # What is the Platform Abstraction Layer?
The PAL is the only place that touches the disk or opens sockets.
Engine code is written against the `Pal` trait and receives a `PalHandle`,
with `RealPal` in the binary and `MockPal` in tests.
*/

mod file_path;
pub mod http;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle, ReadSeek};
