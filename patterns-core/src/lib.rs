//! Core library for the `patterns` CLI.
//!
//! This crate defines:
//! - The observer pattern: a weather service broadcasting to subscriber apps
//! - The strategy pattern: a context delegating to a swappable operation
//! - Demo configuration & the scripted walkthroughs that use it
//!
//! It is used by `patterns-cli`, but the pattern modules have no I/O of their
//! own beyond what subscribers choose to do.

pub mod config;
pub mod demo;
pub mod observer;
pub mod strategy;

pub use config::{Config, ObserverConfig, StrategyConfig};
pub use observer::{NotifyError, Subscriber, SubscriberHandle, WeatherApp, WeatherService};
pub use strategy::{
    Addition, Context, Multiplication, Operation, OperationId, Subtraction, operation_from_id,
};
