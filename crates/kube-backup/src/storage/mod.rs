pub mod path;
pub mod writer;

pub use path::{resource_path, GLOBAL_DIR};
pub use writer::TreeWriter;
