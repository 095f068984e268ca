//! JSON API and static asset handlers for om-web

pub mod buildinfo;
pub mod exclusions;
pub mod health;
pub mod search;
pub mod ui;

pub use buildinfo::get_build_info;
pub use exclusions::exclusion_lookup;
pub use health::health_routes;
pub use search::{global_search, unknown_endpoint};
pub use ui::serve_site_css;
