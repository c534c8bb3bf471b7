pub mod segmenter;
pub mod tagger;

pub use segmenter::*;
pub use tagger::*;
