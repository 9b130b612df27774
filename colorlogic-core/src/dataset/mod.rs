//! Reading and writing the line-oriented dataset format.

mod reader;
mod stats;
mod writer;

pub use self::{
    reader::{Dataset, DatasetReader, LayoutHint, LoadedGraph, ReadOptions},
    stats::DatasetStatistics,
    writer::{
        DatasetWriter, NodeFeature, NodeLineMode, write_dataset, write_dataset_to_path,
    },
};
