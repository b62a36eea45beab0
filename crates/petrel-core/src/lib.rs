pub mod config;
pub mod error;
pub mod page;
pub mod portal;

pub use config::{ConfigStore, Credentials, Isp};
pub use error::{Error, Result};
pub use page::PortalPage;
pub use portal::PortalConfig;
