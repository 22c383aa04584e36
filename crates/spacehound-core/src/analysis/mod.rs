/// Analysis over a finished tree — ranked fuzzy search and staleness.

pub mod age;
pub mod fuzzy;
pub mod search;

pub use age::{find_stale_files, stale_files, StaleFile};
pub use fuzzy::{fuzzy_match, FuzzyPattern};
pub use search::{search_tree_bounded, SearchResult};
