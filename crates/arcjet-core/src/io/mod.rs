pub mod export;
pub mod image_io;
pub mod metadata;
pub mod records;
pub mod source;

pub use export::export_csv;
pub use image_io::{load_frame, save_png};
pub use metadata::{load_metadata, load_or_derive, save_metadata, sidecar_path, VideoMetadata};
pub use records::{append_records, load_records, parse_index_range, records_file_name, save_records};
pub use source::{FrameSource, ImageSequence, MemorySource};
