//! # Inkpad Architecture
//!
//! Inkpad is the **core of a rich-text note editor**: a tree model of the note body,
//! serializers from that tree to plain text, Markdown and RTF, a Markdown-to-markup
//! parser, and a bounded undo/redo history with the policy that decides when to snapshot.
//! It is a library first; the `inkpad` binary is one client of it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, reads/writes files, prints messages    │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, hands out editor sessions     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - export / import / config, returning `Result<CmdResult>`  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (model, markup, convert/, history, capture, session)  │
//! │  - Pure functions and plain state machines                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## The Tree Model
//!
//! Notes are stored as markup strings. Anything that needs structure goes through
//! [`markup::parse`] into a [`model::Document`], an owned tree of [`model::Node`]s.
//! Serializers only read the tree; nothing keeps state between calls.
//!
//! ## Time
//!
//! The history and its capture policy never read a clock. Every event carries an
//! `Instant`, and [`session::EditorSession::tick`] runs whatever timer became due, so the
//! whole editing model is single-threaded and deterministic under test.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Export, import and configuration commands
//! - [`model`]: `Document`, `Element`, `Node`, `Tag`, `Note`
//! - [`markup`]: Markup string ⇄ tree
//! - [`convert`]: Plain text, Markdown and RTF serializers; the Markdown parser
//! - [`history`]: Bounded undo/redo stacks
//! - [`capture`]: When to snapshot, and the debouncer behind it
//! - [`session`]: The editing context tying history, policy and autosave together
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod capture;
pub mod commands;
pub mod config;
pub mod convert;
pub mod error;
pub mod history;
pub mod markup;
pub mod model;
pub mod session;
