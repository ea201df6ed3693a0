// SPDX-License-Identifier: MIT

pub mod claims;
pub mod fills;
