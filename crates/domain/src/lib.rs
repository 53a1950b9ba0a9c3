//! # webbrick-domain
//!
//! Pure domain model for the webbrick bridge.
//!
//! ## Responsibilities
//! - Foundational types: device identities, platform handles, error conventions, timestamps
//! - Classify raw bus device-type codes into **categories** (light, motion, button, …)
//! - Define **capability channels** (on/off, brightness, motion, temperature)
//! - Define **device records** that own the channels their category grants
//! - Define the **registry** of records keyed by bus identity
//! - Define the **bus event** vocabulary and outward **notifications**
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod category;
pub mod channel;
pub mod event;
pub mod name;
pub mod notification;
pub mod record;
pub mod registry;
