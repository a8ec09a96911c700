//! `rowmatch-engine` — Compares an expected table against an actual table.
//!
//! Columns match by position or by name; rows match in order, in any order,
//! or grouped by key columns. Expected cells may be predicates, which turns
//! unordered row matching into a bounded bipartite search.
//! No IO beyond reading a config file.

pub mod bitset;
pub mod column_matcher;
pub mod config;
pub mod error;
pub mod match_list;
pub mod row_matcher;
pub mod session;
pub mod unordered;
pub mod value_matcher;

pub use bitset::ImmutableBitSet;
pub use config::{ColumnMode, CompareConfig, NameCase, RowMode, DEFAULT_PERMUTATION_LIMIT};
pub use error::{MatchError, Side};
pub use match_list::{AlignedPair, ImmutableMatchList, MatchPair};
pub use session::{compare, Comparison, Outcome};
