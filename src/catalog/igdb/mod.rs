mod client;
mod config;
mod error;
mod models;
mod token;

pub use client::IgdbCatalog;
pub use config::IgdbConfig;
pub use error::IgdbError;

use crate::catalog::LookupError;

impl From<IgdbError> for LookupError {
    fn from(err: IgdbError) -> Self {
        LookupError::failed(err.to_string(), err)
    }
}
