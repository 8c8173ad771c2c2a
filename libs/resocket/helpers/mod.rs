//! Small utilities used next to the socket client

pub mod bind;
pub mod query;

pub use bind::BindRegistry;
pub use query::add_query_param;
