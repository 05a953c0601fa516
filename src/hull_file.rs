//! Reader for batch convex hull files.
//!
//! The format is plain ASCII: each data line holds three whitespace
//! separated coordinates of one point, and a line containing only `hull`
//! closes the current group and starts a new one. Blank lines are ignored
//! and empty groups are dropped.

use std::io::BufRead;

use crate::error::ImportError;
use crate::math::Point3;

/// Group separator token.
pub const HULL_SEPARATOR: &str = "hull";

/// Parses every hull group from `reader`.
///
/// # Errors
///
/// Returns [`ImportError::Io`] if reading fails and [`ImportError::Parse`]
/// for a line that is neither a separator nor three finite numbers.
pub fn parse_convex_hulls<R: BufRead>(reader: R) -> Result<Vec<Vec<Point3>>, ImportError> {
    let mut hulls = Vec::new();
    let mut current = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens.as_slice() {
            [] => {}
            [token] if *token == HULL_SEPARATOR => {
                if !current.is_empty() {
                    hulls.push(std::mem::take(&mut current));
                }
            }
            [x, y, z] => current.push(Point3::new(
                coordinate(x, line_no)?,
                coordinate(y, line_no)?,
                coordinate(z, line_no)?,
            )),
            _ => {
                return Err(ImportError::Parse {
                    line: line_no,
                    message: format!("expected `{HULL_SEPARATOR}` or three coordinates, got {line:?}"),
                })
            }
        }
    }

    if !current.is_empty() {
        hulls.push(current);
    }
    Ok(hulls)
}

fn coordinate(token: &str, line: usize) -> Result<f64, ImportError> {
    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(ImportError::Parse {
            line,
            message: format!("coordinate {token} is not finite"),
        }),
        Err(e) => Err(ImportError::Parse {
            line,
            message: format!("invalid coordinate {token:?}: {e}"),
        }),
    }
}
