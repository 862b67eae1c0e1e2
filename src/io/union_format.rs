//! Text format of a merged obstacle polygon with holes.
//!
//! ```text
//! 2            contour count
//! 4            vertex count of contour 0
//!     0 0      one "x y" pair per line
//!     ...
//! 3
//!     ...
//! 0: 1         contour 0 has hole 1
//! ```

use std::path::Path;

use tracing::debug;

use crate::error::{FormatError, Result, VisGraphError};
use crate::math::orientation::approx_eq_d;
use crate::math::{narrow, Point2, Point2D, EPSILON_D};

/// Contours of a polygon union and the hole relation between them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnionPolygon {
    contours: Vec<Vec<Point2D>>,
    holes: Vec<Vec<usize>>,
}

impl UnionPolygon {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a contour and returns its index.
    pub fn push_contour(&mut self, points: Vec<Point2D>) -> usize {
        self.contours.push(points);
        self.holes.push(Vec::new());
        self.contours.len() - 1
    }

    /// Declares contour `hole` a hole of `contour`.
    ///
    /// # Panics
    ///
    /// Panics if either index is not a contour.
    pub fn add_hole(&mut self, contour: usize, hole: usize) {
        assert!(hole < self.contours.len(), "hole {hole} is not a contour");
        self.holes[contour].push(hole);
    }

    #[must_use]
    pub fn contours(&self) -> &[Vec<Point2D>] {
        &self.contours
    }

    #[must_use]
    pub fn holes(&self, contour: usize) -> &[usize] {
        &self.holes[contour]
    }

    /// True if no contour lists `contour` as a hole.
    #[must_use]
    pub fn is_external(&self, contour: usize) -> bool {
        !self.holes.iter().flatten().any(|&hole| hole == contour)
    }

    /// Contours usable as obstacle polygons, narrowed to storage precision.
    /// Contours left with fewer than 3 vertices are skipped.
    #[must_use]
    pub fn obstacles(&self) -> Vec<Vec<Point2>> {
        self.contours
            .iter()
            .filter(|contour| contour.len() >= 3)
            .map(|contour| contour.iter().copied().map(narrow).collect())
            .collect()
    }

    /// Parses the text format.
    ///
    /// Repeated consecutive points, and a last point repeating the first, are
    /// dropped. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] on missing lines, malformed numbers, hole lines
    /// without `:`, or hole lines naming unknown contours.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty());
        let mut next_line =
            |what: &'static str| lines.next().ok_or(FormatError::UnexpectedEof(what));

        let (line, count) = next_line("contour count")?;
        let count: usize = parse_number(line, count)?;
        let mut union = Self::new();
        for _ in 0..count {
            let (line, vertices) = next_line("vertex count")?;
            let vertices: usize = parse_number(line, vertices)?;
            let mut contour: Vec<Point2D> = Vec::with_capacity(vertices);
            for index in 0..vertices {
                let (line, text) = next_line("vertex")?;
                let mut words = text.split_whitespace();
                let (Some(x), Some(y)) = (words.next(), words.next()) else {
                    return Err(parse_error(line, "expected two coordinates"));
                };
                let p = Point2D::new(parse_number(line, x)?, parse_number(line, y)?);
                let repeats = |q: &Point2D| {
                    approx_eq_d(p.x, q.x, EPSILON_D) && approx_eq_d(p.y, q.y, EPSILON_D)
                };
                if contour.last().is_some_and(repeats)
                    || (index + 1 == vertices && contour.first().is_some_and(repeats))
                {
                    continue;
                }
                contour.push(p);
            }
            union.push_contour(contour);
        }

        for (line, text) in lines {
            let Some((contour, holes)) = text.split_once(':') else {
                return Err(FormatError::MissingHoleSeparator { line }.into());
            };
            let contour: usize = parse_number(line, contour.trim())?;
            if contour >= union.contours.len() {
                return Err(FormatError::UnknownContour {
                    line,
                    index: contour,
                }
                .into());
            }
            for hole in holes.split_whitespace() {
                let hole: usize = parse_number(line, hole)?;
                if hole >= union.contours.len() {
                    return Err(FormatError::UnknownContour { line, index: hole }.into());
                }
                union.add_hole(contour, hole);
            }
        }
        debug!(contours = union.contours.len(), "union polygon parsed");
        Ok(union)
    }

    /// Renders the text format read by [`UnionPolygon::parse`].
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut lines = vec![self.contours.len().to_string()];
        for contour in &self.contours {
            lines.push(contour.len().to_string());
            lines.extend(contour.iter().map(|p| format!("\t{} {}", p.x, p.y)));
        }
        for (index, holes) in self.holes.iter().enumerate() {
            if holes.is_empty() {
                continue;
            }
            let list: Vec<String> = holes.iter().map(ToString::to_string).collect();
            lines.push(format!("{index}: {}", list.join(" ")));
        }
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }

    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VisGraphError::Io`] if the file cannot be read, or the
    /// errors of [`UnionPolygon::parse`].
    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// Writes [`UnionPolygon::to_text`] to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VisGraphError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_text())?;
        Ok(())
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> VisGraphError {
    FormatError::Parse {
        line,
        message: message.into(),
    }
    .into()
}

fn parse_number<T>(line: usize, text: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    text.parse()
        .map_err(|err| parse_error(line, format!("{text:?}: {err}")))
}
