//! Slack MCP server library
//!
//! Exposes Slack workspace operations (channels, messages, users, search)
//! as MCP tools over HTTP. The Slack Web API is reached only through the
//! [`slack::SlackApi`] trait, with separate bot and user token handles.

pub mod cli;
pub mod config;
pub mod logging;
pub mod server;
pub mod slack;
pub mod tools;
