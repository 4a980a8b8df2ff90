// Copyright (C) 2024 The nrrd crate authors
//
// This file is part of nrrd.
//
// nrrd is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// nrrd is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with nrrd.  If not, see <http://www.gnu.org/licenses/>.
//! Process-level configuration surface: toggles that change how the header
//! codec parses, threaded explicitly through every call rather than hidden behind global state.

use std::collections::HashMap;

pub use crate::field::SpaceDirectionsShape;
use crate::field::FieldShape;

/// Parser/writer configuration, embedded in [`crate::ReadOptions`] and [`crate::WriteOptions`].
///
/// There is no global or thread-local mirror of these toggles. Two calls with different
/// `Config`s never interfere with each other.
#[derive(Debug, Clone)]
pub struct Config {
    /// When `false` (the default), a repeated standard or custom field name is a fatal
    /// `DuplicateField` error. When `true`, the first occurrence wins and later ones are
    /// logged at `warn!` and discarded.
    pub allow_duplicate_field: bool,

    /// Whether `space directions` is parsed/written as a matrix with NaN-rows for `none`, or as
    /// a vector list with explicit null entries. `measurement frame` uses the same row/`none`
    /// grammar but is always the matrix form; only `space directions` is configurable.
    pub space_directions_shape: SpaceDirectionsShape,

    /// Field names the caller wants recognized beyond the standard registry, each mapped to
    /// the shape its value should be parsed as. Consulted when a field name isn't one of the
    /// standard names in `field::shape_for`.
    pub custom_field_map: HashMap<String, FieldShape>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            allow_duplicate_field: false,
            space_directions_shape: SpaceDirectionsShape::Matrix,
            custom_field_map: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn default_matches_spec() {
        let c = Config::default();
        assert!(!c.allow_duplicate_field);
        assert_eq!(c.space_directions_shape, SpaceDirectionsShape::Matrix);
        assert!(c.custom_field_map.is_empty());
    }
}
