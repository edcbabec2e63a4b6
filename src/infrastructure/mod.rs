// Infrastructure layer - External dependencies and adapters
pub mod clock;
pub mod config;
pub mod csv_export;
pub mod event_stream;
pub mod http_response;
