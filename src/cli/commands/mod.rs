pub mod convert;
pub mod detect;
pub mod expand;
pub mod status;
pub mod subscribe;

pub use convert::*;
pub use detect::*;
pub use expand::*;
pub use status::*;
pub use subscribe::*;
