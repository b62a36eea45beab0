mod chrome_finder;
mod error;
mod session;

pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use session::{PortalSession, SessionOptions};
