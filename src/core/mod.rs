pub mod carryover;
pub mod classifier;
pub mod config;
pub mod context;
pub(crate) mod cues;
pub mod persistent;
pub mod pipeline;
pub mod profiles;
pub mod variety;
pub mod vocabulary;
