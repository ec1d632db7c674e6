mod rut;
mod text;

pub use rut::{Rut, RutError};
pub use text::{NonEmptyText, TextError};
