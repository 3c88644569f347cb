pub mod session;

pub use session::{BrowserSession, SessionOptions};
