//! Integration tests

mod api_tests;
mod lending_flow;
mod live_server;
