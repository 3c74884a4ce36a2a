//! Goku: a Telegram assistant that translates between Arabic and French and
//! answers questions with Gemini.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
