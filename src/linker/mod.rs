pub mod pattern;
pub mod fragment;
pub mod resolver;
pub mod surgeon;
pub mod classify;
pub mod engine;
pub mod pointer;

pub use classify::{Classification, Classifier, DefaultClassifier};
pub use engine::{Linker, LinkerStats, ProcessReport};
pub use fragment::{Fragment, FragmentIndex};
pub use pattern::{destination_url, find_matches, LinkDescriptor, RefMatch};
pub use pointer::{PointerSurface, SurfaceMetrics};
pub use resolver::{LocalAction, MatchPlan};
pub use surgeon::{Applied, TreeSurgeon};

#[cfg(test)]
mod tests;
