//! Disk-backed key/value store with write-through durability
//!
//! A [`Store`] keeps a mapping of string keys to text, number, or boolean
//! values in memory and rewrites the backing file on every change.
//!
//! # Example
//!
//! ```no_run
//! use keepsake_store::Store;
//!
//! let store = Store::open("settings.json")?;
//! store.set("theme", "dark")?;
//! store.set("retries", 3)?;
//!
//! assert_eq!(store.get_text("theme"), Some("dark".to_string()));
//! assert_eq!(store.get_number("retries"), Some(3.0));
//!
//! store.close()?;
//! # Ok::<(), keepsake_store::Error>(())
//! ```

mod error;
mod file;
mod store;

pub use error::{Error, FileOp, Result};
pub use file::Entries;
pub use keepsake_core::{Normalize, UnsupportedValue, Value};
pub use store::{Store, StoreOptions};
