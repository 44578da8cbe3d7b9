//! Immutable, lazily evaluated relations over semi-structured files.
//!
//! A [`Session`] reads CSV or JSON-lines files into a [`Relation`]. Every
//! transformation (`select`, `filter`, `with_column`, ...) returns a new
//! relation sharing its upstream plan; nothing is evaluated until an action
//! (`show`, `collect`, `take`, `count`, `describe`, `corr`) pulls rows
//! through the chain.
//!
//! # Typical Flow
//! ```no_run
//! use rowframe::{Session, expr::{col, lit}};
//!
//! # fn main() -> Result<(), rowframe::FrameError> {
//! let session = Session::new();
//! let flights = session.read().json("data/flight-data/2015-summary.json")?;
//! flights.print_schema();
//! flights
//!     .filter(col("count").gt(lit(3000)))?
//!     .with_column("domestic", col("DEST_COUNTRY_NAME").eq(col("ORIGIN_COUNTRY_NAME")))?
//!     .show(5, true)?;
//! # Ok(())
//! # }
//! ```

mod error;
mod plan;
mod reader;
mod relation;
mod session;
mod show;
mod stats;

pub use error::FrameError;
pub use reader::DataReader;
pub use relation::{Relation, SortKey};
pub use rowframe_arrow as arrow;
pub use rowframe_core as core;
pub use rowframe_expr as expr;
pub use session::{Session, SessionBuilder, SessionConfig};
pub use stats::{ColumnStats, Summary};
