//! Range Query Engine
//!
//! - **Parser**: Turn user-supplied bound text into naive date-times
//! - **Executor**: Fetch the matching readings and build results or exports
//!
//! # Examples
//!
//! ```rust,ignore
//! use imulog::query::QueryExecutor;
//!
//! let executor = QueryExecutor::new(engine);
//! let result = executor
//!     .execute(Some("2024-05-01T10:00"), Some("2024-05-01T11:00"))
//!     .await?;
//! println!("{} readings", result.total);
//!
//! let file = executor.export_all().await?;
//! std::fs::write(&file.filename, &file.bytes)?;
//! ```

mod error;
mod executor;
mod parser;

pub use error::{QueryError, QueryResult};
pub use executor::{QueryExecutor, RangeResult};
pub use parser::{parse_bound, parse_range};
