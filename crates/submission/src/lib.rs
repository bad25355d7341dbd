mod email;
mod event;
mod form;
mod resume;
mod text;

pub use email::*;
pub use event::*;
pub use form::*;
pub use resume::*;
pub use text::*;
