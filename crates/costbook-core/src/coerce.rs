//! Numeric coercion for loosely-typed cells.
//!
//! Quantity, unit price, and extended amount are each coerced independently
//! with [`coerce`]. Bad input degrades to `None`; nothing here can fail.

use crate::cell::Cell;

/// Convert a cell to a number, or `None` when it is missing or not numeric.
///
/// - `Empty`, NaN, and blank text are missing.
/// - Text is trimmed and parsed with a `.` decimal separator; exponent
///   notation is accepted, thousands separators and decimal commas are not.
/// - Booleans count as `1.0` / `0.0`.
pub fn coerce(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Empty => return None,
        Cell::Number(n) => *n,
        Cell::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
    };

    if value.is_nan() {
        None
    } else {
        Some(value)
    }
}
