mod cursor;
mod error;
mod traits;
mod types;

pub use cursor::{Cursor, CursorError};
pub use error::{RepositoryError, Result};
pub use traits::StorageClient;
pub use types::{
    record_str, FlatRecord, Page, PageRequest, QueryPage, QueryRequest, SortCondition, TableIndex,
    WriteRequest,
};
