// Copyright 2024 Karl Sundequist Blomdahl <karl.sundequist.blomdahl@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The two coordinate grammars the engine needs to understand: human/GTP
//! (`"Q16"`, `"pass"`) and SGF (`"qd"`, `""` for pass). Internally a point
//! is stored row-major with row `0` at the top; GTP counts rows from the
//! bottom, so parsing and formatting flip the row axis at this boundary.

use crate::point::Point;
use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct CoordParseError {
    pub input: String,
}

impl fmt::Display for CoordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse coordinate: {:?}", self.input)
    }
}

impl std::error::Error for CoordParseError {}

fn gtp_column_to_x(letter: char) -> Option<u8> {
    let letter = letter.to_ascii_uppercase();
    if !letter.is_ascii_uppercase() || letter == 'I' {
        return None;
    }

    let raw = letter as u8 - b'A';
    Some(if letter > 'I' { raw - 1 } else { raw })
}

fn x_to_gtp_column(x: u8) -> char {
    let raw = if x >= 8 { x + 1 } else { x };
    (b'A' + raw) as char
}

/// Parses a human/GTP coordinate such as `"Q16"` or `"pass"`.
pub fn parse_gtp(input: &str, size: u8) -> Result<Point, CoordParseError> {
    let err = || CoordParseError { input: input.to_string() };

    if input.eq_ignore_ascii_case("pass") {
        return Ok(Point::pass(size));
    }
    if input.eq_ignore_ascii_case("resign") {
        return Ok(Point::resign(size));
    }

    let mut chars = input.chars();
    let column = chars.next().ok_or_else(err)?;
    let x = gtp_column_to_x(column).ok_or_else(err)?;

    let row_str: String = chars.collect();
    let row: u32 = row_str.parse().map_err(|_| err())?;
    if row == 0 || row > size as u32 {
        return Err(err());
    }

    // GTP rows count from the bottom; row `size` is our internal y = 0.
    let y = size as u32 - row;
    if x >= size {
        return Err(err());
    }

    Ok(Point::from_xy(x, y as u8, size))
}

/// Formats a point as a human/GTP coordinate.
pub fn format_gtp(point: Point, size: u8) -> String {
    if point.is_pass(size) {
        return "pass".to_string();
    }
    if point.is_resign(size) {
        return "resign".to_string();
    }

    let x = point.x(size);
    let y = point.y(size);
    let row = size as u32 - y as u32;

    format!("{}{}", x_to_gtp_column(x), row)
}

/// Parses an SGF coordinate: two lowercase letters, top-left origin, or
/// the empty string for pass.
pub fn parse_sgf(input: &str, size: u8) -> Result<Point, CoordParseError> {
    let err = || CoordParseError { input: input.to_string() };

    if input.is_empty() {
        return Ok(Point::pass(size));
    }

    let mut chars = input.chars();
    let col = chars.next().ok_or_else(err)?;
    let row = chars.next().ok_or_else(err)?;
    if chars.next().is_some() {
        return Err(err());
    }
    if !col.is_ascii_lowercase() || !row.is_ascii_lowercase() {
        return Err(err());
    }

    let x = (col as u8) - b'a';
    let y = (row as u8) - b'a';
    if x >= size || y >= size {
        return Err(err());
    }

    Ok(Point::from_xy(x, y, size))
}

/// Formats a point as an SGF coordinate.
pub fn format_sgf(point: Point, size: u8) -> String {
    if point.is_pass(size) {
        return String::new();
    }

    let x = point.x(size);
    let y = point.y(size);

    format!("{}{}", (b'a' + x) as char, (b'a' + y) as char)
}
