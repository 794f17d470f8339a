//! Request gateway: `POST /translate`.

pub mod translate;

pub use translate::translate_handler;
