//! slideforge - turn a text summary into a styled PPTX deck
//!
//! A language model drafts the outline, an image model paints the artwork,
//! the deck is assembled in-process and published to Cloudinary.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `planner`: outline prompt and JSON parsing
//! - `services`: image generation, retry, the end-to-end pipeline
//! - `deck`: palettes, layouts and the PPTX writer
//! - `clients`: OpenAI and Cloudinary over HTTP
//! - `api`: HTTP services and middleware
//! - `interfaces`: command-line commands
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: logging and panic handling

pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod deck;
pub mod errors;
pub mod interfaces;
pub mod planner;
pub mod runtime;
pub mod services;
pub mod system;
