//! Output side of generation: deduplication, sinks and word list files

mod dedup;
mod sink;
pub mod wordlist;

pub use dedup::{dedup_ordered, DedupMode, OrderedDeduplicator};
pub use sink::{Destination, FileSink, MemorySink, SinkOutput, StreamingSink};
pub use wordlist::{remove_duplicates, save_wordlist, sort_by_length, WordList, WordListStats};
