// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in class libraries for graph-shaped assets.

pub mod material;
pub mod animation;
