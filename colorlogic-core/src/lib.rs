//! Colorlogic core library.
//!
//! Generates synthetic datasets of coloured graphs whose nodes are tagged by
//! logical formulas over colours, and reads such datasets back. Each graph
//! moves through four stages: [`TopologyBuilder`] draws the edges,
//! [`StructureAssigner`] attaches positional metadata, [`ColorAssigner`]
//! colours every node, and [`Tagger`] evaluates the formula.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod color;
mod coloring;
mod config;
mod dataset;
mod error;
mod formula;
mod graph;
mod pipeline;
mod structure;
mod topology;

pub use crate::{
    color::Color,
    coloring::{ColorAssigner, ColoringSpec, SplitPolicy, SplitSchedule},
    config::{DatasetConfig, DatasetPlan},
    dataset::{
        Dataset, DatasetReader, DatasetStatistics, DatasetWriter, LayoutHint, LoadedGraph,
        NodeFeature, NodeLineMode, ReadOptions, write_dataset, write_dataset_to_path,
    },
    error::{
        ConfigError, ConfigErrorCode, DatasetError, FormatError, FormatErrorCode,
        GenerationError, GenerationErrorCode, ReadError, Result,
    },
    formula::{
        Condition, Formula, FormulaSet, FormulaSpec, GraphLabelRule, PropertySearch, Tagger,
    },
    graph::{
        Centroid, ColoredGraph, Graph, IndexedGraph, Layout, NodeId, NodeOrdering, RawGraph,
        Structure, StructuredGraph, TaggedGraph,
    },
    pipeline::DatasetGenerator,
    structure::{CentroidSpec, StructureAssigner, StructureSpec},
    topology::{EdgeDensity, GeneratorSpec, NodeRange, RandomModel, TopologyBuilder},
};
