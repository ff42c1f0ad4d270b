//! Domain models for stock and sales tracking

mod feed;
mod intake;
mod invoice;
mod pending;
mod sale;
mod stock;
mod user;

pub use feed::*;
pub use intake::*;
pub use invoice::*;
pub use pending::*;
pub use sale::*;
pub use stock::*;
pub use user::*;
