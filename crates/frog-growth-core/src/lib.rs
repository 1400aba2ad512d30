pub mod capture_filter;
pub mod checkpoint;
pub mod db;
pub mod error;
pub mod extract;
pub mod frame;
pub mod frog_type;
pub mod join;
pub mod output;
pub mod overrides;
pub mod pipeline;
pub mod population;
pub mod relocation;
pub mod schema;
pub mod types;
