//! Error types for the colorlogic core library.
//!
//! Configuration problems, per-graph generation failures, and dataset format
//! violations are kept in separate enums so callers can tell a bad
//! configuration from an unlucky draw or a corrupt file. Every enum exposes a
//! stable machine-readable code.

use std::{fmt, io};

use thiserror::Error;

use crate::color::Color;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// A configuration that can never produce a valid dataset.
///
/// Raised by [`crate::DatasetConfig::validate`] and the individual spec
/// validators before any graph is generated or any byte is written.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    /// Node-count bounds must be positive and ordered.
    #[error("node range must satisfy 0 < min <= max (got min={min}, max={max})")]
    InvalidNodeRange {
        /// Lower bound supplied by the caller.
        min: usize,
        /// Upper bound supplied by the caller.
        max: usize,
    },
    /// The palette must contain at least one colour.
    #[error("number_colors must be at least 1")]
    ZeroColors,
    /// A colour referenced by the configuration is outside the palette.
    #[error("colour {color} referenced by {context} is outside the palette of {number_colors}")]
    ColorOutOfRange {
        /// The offending colour.
        color: Color,
        /// Size of the configured palette.
        number_colors: usize,
        /// Which parameter referenced the colour.
        context: &'static str,
    },
    /// Split proportions were empty, negative, or did not sum to one.
    #[error("invalid graph split: {reason}")]
    InvalidSplit {
        /// Human-readable explanation.
        reason: String,
    },
    /// Per-split policies did not line up with the split proportions.
    #[error("{policies} split policies were supplied for {splits} splits")]
    SplitPolicyMismatch {
        /// Number of split proportions.
        splits: usize,
        /// Number of per-split colour policies.
        policies: usize,
    },
    /// A split requests more exact colour counts than the smallest graph has nodes.
    #[error("split {split} requests {requested} coloured nodes but graphs may have only {min_nodes}")]
    QuotaExceedsNodes {
        /// Index of the offending split.
        split: usize,
        /// Total of all exact counts requested by the split.
        requested: usize,
        /// Smallest node count the generator may draw.
        min_nodes: usize,
    },
    /// A probability parameter was outside `[0, 1]` or not finite.
    #[error("parameter `{parameter}` must be a probability in [0, 1]")]
    InvalidProbability {
        /// Name of the parameter.
        parameter: &'static str,
    },
    /// A generator, structure, or formula parameter was rejected.
    #[error("parameter `{parameter}` is invalid: {reason}")]
    InvalidParameter {
        /// Name of the parameter.
        parameter: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
    /// A formula name did not resolve to a definition.
    #[error("formula `{name}` is not defined")]
    UnknownFormula {
        /// The unresolved name.
        name: String,
    },
    /// A nested formula refers back to itself.
    #[error("formula nesting is recursive: {chain}")]
    RecursiveFormula {
        /// The reference chain, e.g. `a -> b -> a`.
        chain: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`ConfigError`] variants.
    enum ConfigErrorCode for ConfigError {
        /// Node-count bounds must be positive and ordered.
        InvalidNodeRange => InvalidNodeRange { .. } => "CONFIG_INVALID_NODE_RANGE",
        /// The palette must contain at least one colour.
        ZeroColors => ZeroColors => "CONFIG_ZERO_COLORS",
        /// A colour is outside the palette.
        ColorOutOfRange => ColorOutOfRange { .. } => "CONFIG_COLOR_OUT_OF_RANGE",
        /// Split proportions are malformed.
        InvalidSplit => InvalidSplit { .. } => "CONFIG_INVALID_SPLIT",
        /// Split policies do not match split proportions.
        SplitPolicyMismatch => SplitPolicyMismatch { .. } => "CONFIG_SPLIT_POLICY_MISMATCH",
        /// Exact colour counts exceed the smallest graph.
        QuotaExceedsNodes => QuotaExceedsNodes { .. } => "CONFIG_QUOTA_EXCEEDS_NODES",
        /// A probability is out of range.
        InvalidProbability => InvalidProbability { .. } => "CONFIG_INVALID_PROBABILITY",
        /// A parameter was rejected.
        InvalidParameter => InvalidParameter { .. } => "CONFIG_INVALID_PARAMETER",
        /// A formula name is undefined.
        UnknownFormula => UnknownFormula { .. } => "CONFIG_UNKNOWN_FORMULA",
        /// Formula nesting forms a cycle.
        RecursiveFormula => RecursiveFormula { .. } => "CONFIG_RECURSIVE_FORMULA",
    }
}

/// A valid configuration whose guarantees could not be met for one random draw.
///
/// These failures are deterministic under a fixed seed; the run must be
/// aborted and the configuration adjusted.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GenerationError {
    /// Centroid clusters need more nodes than the graph has.
    #[error("centroid clusters need {requested} nodes but the graph has {available}")]
    CentroidCarveOut {
        /// Nodes claimed by all centroid clusters, hubs included.
        requested: usize,
        /// Nodes in the drawn graph.
        available: usize,
    },
    /// Not enough unpinned nodes remain to honour an exact colour count.
    #[error("colour {color} needs {requested} more nodes but only {available} are free")]
    QuotaUnsatisfiable {
        /// Colour whose count could not be met.
        color: Color,
        /// Remaining nodes that still need this colour.
        requested: usize,
        /// Free nodes left when the colour was placed.
        available: usize,
    },
    /// Structure pinned more nodes to a colour than its exact count allows.
    #[error("{pinned} nodes are pinned to colour {color} but its exact count is {quota}")]
    PinnedExceedsQuota {
        /// The over-pinned colour.
        color: Color,
        /// Nodes pinned by the structure step.
        pinned: usize,
        /// Exact count configured for the split.
        quota: usize,
    },
    /// Every colour has an exact count, yet free nodes remain.
    #[error("{free_nodes} nodes remain but every colour already has an exact count")]
    NoResidualColor {
        /// Nodes left without a colour.
        free_nodes: usize,
    },
    /// The drawn degree sequence cannot be realised as a simple graph.
    #[error("degree sequence with sum {degree_sum} over {nodes} nodes is not graphical")]
    DegreeSequenceNotGraphical {
        /// Number of nodes.
        nodes: usize,
        /// Sum of the drawn degrees.
        degree_sum: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`GenerationError`] variants.
    enum GenerationErrorCode for GenerationError {
        /// Centroid clusters do not fit.
        CentroidCarveOut => CentroidCarveOut { .. } => "GENERATION_CENTROID_CARVE_OUT",
        /// An exact colour count cannot be met.
        QuotaUnsatisfiable => QuotaUnsatisfiable { .. } => "GENERATION_QUOTA_UNSATISFIABLE",
        /// Pinned nodes exceed an exact colour count.
        PinnedExceedsQuota => PinnedExceedsQuota { .. } => "GENERATION_PINNED_EXCEEDS_QUOTA",
        /// No colour is left for the residual fill.
        NoResidualColor => NoResidualColor { .. } => "GENERATION_NO_RESIDUAL_COLOR",
        /// The degree sequence is not graphical.
        DegreeSequenceNotGraphical => DegreeSequenceNotGraphical { .. } => "GENERATION_DEGREE_SEQUENCE",
    }
}

/// A dataset file that does not follow the line-oriented format.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FormatError {
    /// The file ended before the graph-count header.
    #[error("missing graph count header")]
    MissingHeader,
    /// A token that must be a non-negative integer was not.
    #[error("line {line}: expected an integer but found `{token}`")]
    InvalidInteger {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },
    /// A token that must be a real number was not.
    #[error("line {line}: expected a number but found `{token}`")]
    InvalidNumber {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },
    /// A header line did not hold exactly the expected number of tokens.
    #[error("line {line}: expected {expected} tokens but found {actual}")]
    HeaderTokenCount {
        /// 1-based line number.
        line: usize,
        /// Expected token count.
        expected: usize,
        /// Actual token count.
        actual: usize,
    },
    /// A node line's token count matched neither node-line layout.
    #[error("line {line}: node line with {actual} tokens matches no known layout")]
    NodeTokenCount {
        /// 1-based line number.
        line: usize,
        /// Actual token count.
        actual: usize,
    },
    /// A neighbour index points outside the graph.
    #[error("line {line}: neighbour {neighbour} is outside a graph of {node_count} nodes")]
    NeighbourOutOfRange {
        /// 1-based line number.
        line: usize,
        /// The offending index.
        neighbour: usize,
        /// Declared node count of the graph.
        node_count: usize,
    },
    /// A node line lists the node itself as a neighbour.
    #[error("line {line}: node {node} lists itself as a neighbour")]
    SelfLoop {
        /// 1-based line number.
        line: usize,
        /// Index of the node within its graph.
        node: usize,
    },
    /// The file held fewer graph blocks than its header declared.
    #[error("header declares {declared} graphs but only {found} are present")]
    MissingGraphs {
        /// Count from the header line.
        declared: usize,
        /// Complete graph blocks found.
        found: usize,
    },
    /// Non-blank content follows the last declared graph.
    #[error("line {line}: unexpected content after the last declared graph")]
    TrailingContent {
        /// 1-based line number.
        line: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`FormatError`] variants.
    enum FormatErrorCode for FormatError {
        /// Missing graph-count header.
        MissingHeader => MissingHeader => "FORMAT_MISSING_HEADER",
        /// Integer token expected.
        InvalidInteger => InvalidInteger { .. } => "FORMAT_INVALID_INTEGER",
        /// Numeric token expected.
        InvalidNumber => InvalidNumber { .. } => "FORMAT_INVALID_NUMBER",
        /// Header token count mismatch.
        HeaderTokenCount => HeaderTokenCount { .. } => "FORMAT_HEADER_TOKEN_COUNT",
        /// Node line token count mismatch.
        NodeTokenCount => NodeTokenCount { .. } => "FORMAT_NODE_TOKEN_COUNT",
        /// Neighbour index out of range.
        NeighbourOutOfRange => NeighbourOutOfRange { .. } => "FORMAT_NEIGHBOUR_OUT_OF_RANGE",
        /// A node is its own neighbour.
        SelfLoop => SelfLoop { .. } => "FORMAT_SELF_LOOP",
        /// Fewer graphs than declared.
        MissingGraphs => MissingGraphs { .. } => "FORMAT_MISSING_GRAPHS",
        /// Content after the last graph.
        TrailingContent => TrailingContent { .. } => "FORMAT_TRAILING_CONTENT",
    }
}

/// Error produced while loading a dataset file.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The underlying reader failed.
    #[error("failed to read dataset: {0}")]
    Io(#[from] io::Error),
    /// The content violated the format.
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Error produced while generating and writing a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The configuration was rejected before any work started.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A graph could not be generated with the requested guarantees.
    #[error("graph {index} could not be generated: {source}")]
    Generation {
        /// Position of the failing graph in generation order.
        index: usize,
        /// The underlying failure.
        #[source]
        source: GenerationError,
    },
    /// Writing the output failed.
    #[error("failed to write dataset: {0}")]
    Io(#[from] io::Error),
}

/// Convenient alias for results of configuration validation.
pub type Result<T> = core::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(ConfigError::ZeroColors, "CONFIG_ZERO_COLORS")]
    #[case(
        ConfigError::UnknownFormula { name: "f9".into() },
        "CONFIG_UNKNOWN_FORMULA"
    )]
    #[case(
        ConfigError::RecursiveFormula { chain: "a -> a".into() },
        "CONFIG_RECURSIVE_FORMULA"
    )]
    fn config_codes_are_stable(#[case] err: ConfigError, #[case] expected: &str) {
        assert_eq!(err.code().as_str(), expected);
        assert_eq!(err.code().to_string(), expected);
    }

    #[test]
    fn format_errors_report_line_numbers() {
        let err = FormatError::NeighbourOutOfRange {
            line: 4,
            neighbour: 9,
            node_count: 3,
        };
        assert_eq!(err.code(), FormatErrorCode::NeighbourOutOfRange);
        assert!(err.to_string().starts_with("line 4:"));
    }

    #[test]
    fn generation_error_is_wrapped_with_graph_index() {
        let err = DatasetError::Generation {
            index: 7,
            source: GenerationError::NoResidualColor { free_nodes: 2 },
        };
        assert!(err.to_string().contains("graph 7"));
    }
}
