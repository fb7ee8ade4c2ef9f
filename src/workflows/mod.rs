pub mod indexer;
pub mod matcher;
pub mod pipeline;
pub mod renamer;
pub mod sources;
