//! HTTP layer: a single-request transport and a bounded-redirect client on top of it.

mod client;
mod transport;

pub use client::{DEFAULT_MAX_HOPS, HttpClient};
#[cfg(test)]
pub use transport::MockTransport;
pub use transport::{HttpResponse, ReqwestTransport, ResponseBody, Transport};
