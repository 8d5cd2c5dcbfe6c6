//! # ergokey types
//!
//! Value types shared by the ergokey key-event core and anything that builds
//! binding tables for it.
//!
//! - [`keycode`] - USB HID keyboard page keycodes
//! - [`modifier`] - The 8-bit HID modifier mask
//! - [`ascii`] - ASCII to HID key/modifier table and its inverse
//! - [`mode`] - The global keyboard mode
//! - [`position`] - Physical key position in the matrix

#![no_std]

pub mod ascii;
pub mod keycode;
pub mod mode;
pub mod modifier;
pub mod position;
