//! Stateful search pipeline: freshness guard, fetch cycle, location
//! resolution, match generation and the session tying them together

pub mod fetcher;
pub mod guard;
pub mod location;
pub mod matching;
pub mod session;

pub use fetcher::{FetchStatus, ResultFetcher, VisibleResults};
pub use guard::{FetchToken, SequenceGuard};
pub use location::{LocationOptions, LocationResolution, LocationResolver, LocationSelection, US_STATES};
pub use matching::MatchMaker;
pub use session::{DisplayState, SearchSession};
