mod dispatch;
mod mailer;
mod service;
mod template;

pub use dispatch::*;
pub use mailer::*;
pub use service::*;
pub use template::*;
