// src/lib.rs

//! Course review scraper library
//!
//! Scrapes the registrar's course schedule and reconciles courses,
//! instructors and teaching sessions into the review store.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
