//! GymAiMentor: a personal fitness trainer bot.
//!
//! Single Rust binary. Talks to users via Telegram, keeps each user's
//! profile in a JSON file and asks an LLM for training programs and answers.
//!
//! See `DESIGN.md` for the architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dialogue;
pub mod logging;
pub mod profile;
pub mod providers;
pub mod telegram;
