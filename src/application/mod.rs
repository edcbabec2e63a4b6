// Application layer - Use cases and stream state
pub mod bulk_service;
pub mod generator;
pub mod live_feed;
pub mod point_source;
pub mod stream_buffer;
pub mod stream_controller;
