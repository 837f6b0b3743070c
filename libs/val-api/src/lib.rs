pub mod error;
pub mod record;
pub mod symbol;
pub mod transport;
