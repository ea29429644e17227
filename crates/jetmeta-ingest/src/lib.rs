pub mod columnar;
pub mod csv_source;
pub mod discovery;
pub mod error;
pub mod source;

pub use columnar::{Column, RecordBatch};
pub use csv_source::CsvEventSource;
pub use discovery::{FileSet, SampleSet, discover_files};
pub use error::{IngestError, Result};
pub use source::{EventSource, ReadRequest};
