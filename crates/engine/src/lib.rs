//! claimdesk engine library.
//!
//! HTTP service behind the complaint-handling roleplay game: an LLM plays an
//! angry customer and the player tries to calm them down.
//!
//! ## Structure
//!
//! - `use_cases/` - Claim, turn and hint orchestration, prompts, output repair
//! - `infrastructure/` - Provider adapters (Groq, Gemini), retry wrapper, ports
//! - `api/` - HTTP entry points
//! - `config` - Environment configuration
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
