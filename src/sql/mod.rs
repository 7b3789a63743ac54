pub mod builder;
pub mod params;

pub use builder::{delete, insert, select_all, select_by_id, update, QueryBuf, SortDir};
pub use params::PgBindValue;
