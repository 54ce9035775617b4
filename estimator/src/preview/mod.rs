mod directory;
mod traits;

pub use directory::DirectorySink;
pub use traits::{FrameSink, NoopSink, PreviewView, SinkError};
