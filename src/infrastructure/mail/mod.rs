//! Mail transports

mod console;
mod http_relay;
mod smtp;

pub use console::ConsoleTransport;
pub use http_relay::HttpMailTransport;
pub use smtp::SmtpMailTransport;
