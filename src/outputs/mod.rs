//! Output generation for the data files and derived index views.
//!
//! # Submodules
//!
//! - [`json`]: day-partitioned record files (raw batches, processed cases,
//!   news) plus the public "today's news" snapshot
//! - [`indexes`]: the derived views rebuilt from the full case set — day
//!   index, search index, trending, and the today snapshot
//!
//! # Output Structure
//!
//! ```text
//! data/
//! ├── raw/2025-09-01-raw.json        # merged scrape batches, pre-summary
//! ├── cases/2025/09/01.json          # summarized cases by day
//! ├── news/2025/09/01.json           # deduplicated news by day
//! ├── index.json                     # day index
//! ├── search-index.json              # search index
//! └── trending.json                  # last-7-days recency ranking
//!
//! public/data/
//! ├── today.json                     # today's cases (primary UI feed)
//! └── today-news.json                # today's news
//! ```

pub mod indexes;
pub mod json;
