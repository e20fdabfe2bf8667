pub mod inbound;

pub use inbound::LedgerApi;
