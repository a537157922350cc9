//! Split module - stratified train/test partitioning

mod stratified;

pub use stratified::{SplitError, SplitIndices, StratifiedSplitter, RANDOM_STATE, TEST_SIZE};
