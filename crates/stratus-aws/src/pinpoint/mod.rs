//! Amazon Pinpoint

pub mod api;
pub mod event_stream;

pub use api::PinpointApi;
pub use event_stream::EventStream;
