//! Passive Tree - Core Library
//!
//! This crate provides the game logic for the passive tree mini-game:
//! - Catalog data (classes, passive node graph, maps, encounter tiers)
//! - Character state and passive allocation
//! - Stat engine (totals + power)
//! - Progression (xp curve, level-ups, skill points)
//! - Combat resolution (batch auto-resolve, interactive grid arena)
//! - Roster persistence over a key-value blob store
//! - Session state object and headless Bevy plugin
//! - Monte-Carlo balance simulation

pub mod balance;
pub mod catalog;
pub mod character;
pub mod combat;
pub mod command;
pub mod config;
pub mod constants;
pub mod logging;
pub mod plugin;
pub mod progression;
pub mod rng;
pub mod session;
pub mod stats;
pub mod storage;
