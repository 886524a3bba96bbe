pub mod giin;

pub use giin::{GIIN_BASE_URL, GiinClient};
