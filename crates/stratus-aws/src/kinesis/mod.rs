//! Amazon Kinesis Data Streams

pub mod api;
pub mod stream_consumer;

pub use api::KinesisApi;
pub use stream_consumer::StreamConsumer;
