pub mod plugin;
pub mod youtube;

pub use plugin::{
    Chart, ExtractionError, MetadataError, MetadataProvider, SongSummary, StreamExtractor,
};
