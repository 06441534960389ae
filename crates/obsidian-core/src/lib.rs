#![forbid(unsafe_code)]

//! Core: easing curves, time-based animations and stagger offsets shared by
//! every Obsidian effect.

pub mod animation;
