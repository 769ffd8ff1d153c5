//! One entity per resource group of the management API.
//!
//! Every method validates its required arguments, composes the URL, and
//! returns an unexecuted [`crate::Request`] carrying the entity's bearer
//! token. None of them touch the network.

mod rules;
mod stats;
mod users;

pub use rules::{RulesEntity, LEGACY_LIST_EXCLUDED_PARAM};
pub use stats::StatsEntity;
pub use users::UsersEntity;

const API_V2: [&str; 2] = ["api", "v2"];
