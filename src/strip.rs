//! Row-major vertex grids and the triangle indices that tile them.

use std::f32::consts::FRAC_PI_2;

use crate::data_structure::IndexType;
use crate::data_structure::Vertex;
use crate::error::MeshError;
use crate::error::Result;

/// Width profile along a strip.
///
/// Zero outside `[begin, end]`, one on `[rise, fall]`, and a quarter sine in
/// between, so a strip shaped by it narrows to a single point at both ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
  pub begin: f32,
  pub rise: f32,
  pub fall: f32,
  pub end: f32,
}

impl Envelope {
  pub fn new(begin: f32, rise: f32, fall: f32, end: f32) -> Self {
    Envelope {
      begin,
      rise,
      fall,
      end,
    }
  }

  pub fn at(&self, ratio: f32) -> f32 {
    if ratio < self.begin || ratio > self.end {
      return 0.0;
    }

    let r = if ratio < self.rise {
      (self.rise - ratio) / (self.rise - self.begin)
    } else if ratio > self.fall {
      (self.fall - ratio) / (self.fall - self.end)
    } else {
      0.0
    };

    ((1.0 - r) * FRAC_PI_2).sin()
  }
}

/// A sheet of vertices stored row by row.
///
/// Rows may be glued side by side; the shared seam column is then kept once.
#[derive(Clone, Debug, Default)]
pub struct GeometryStrip {
  rows: Vec<Vec<Vertex>>,
}

impl GeometryStrip {
  /// Fails unless every row has the same number of vertices.
  pub fn new(rows: Vec<Vec<Vertex>>) -> Result<Self> {
    let width = rows.first().map_or(0, |row| row.len());
    if let Some(row) = rows.iter().find(|row| row.len() != width) {
      return Err(MeshError::invalid_param(
        "strip row length",
        row.len(),
        "all rows of a strip must have the same length",
      ));
    }
    Ok(GeometryStrip { rows })
  }

  /// A flat `columns` x `rows` grid in the z = 0 plane, `length` long in y.
  ///
  /// Column `c` of row `r` sits at x = `(c / (columns - 1) + x_offset) *
  /// width * envelope(r / (rows - 1))`, so with an envelope the first and
  /// last rows collapse onto the y axis.
  pub fn sheet(
    columns: usize,
    rows: usize,
    width: f32,
    length: f32,
    x_offset: f32,
    envelope: Option<&Envelope>,
  ) -> Self {
    let ratio = |i: usize, n: usize| {
      if n > 1 {
        i as f32 / (n - 1) as f32
      } else {
        0.0
      }
    };

    let rows = (0..rows)
      .map(|row| {
        let dy = ratio(row, rows);
        let scale = envelope.map_or(1.0, |envelope| envelope.at(dy));

        (0..columns)
          .map(|col| {
            let dx = ratio(col, columns);
            Vertex::new((dx + x_offset) * width * scale, dy * length, 0.0)
          })
          .collect()
      })
      .collect();

    GeometryStrip { rows }
  }

  pub fn width(&self) -> usize {
    self.rows.first().map_or(0, |row| row.len())
  }

  pub fn height(&self) -> usize {
    self.rows.len()
  }

  pub fn vertices(&self) -> Vec<Vertex> {
    self.rows.iter().flatten().copied().collect()
  }

  /// Two triangles per grid cell, wound counter-clockwise seen from +z.
  pub fn indices(&self) -> Vec<IndexType> {
    let mut indices = Vec::new();
    let mut row_start = 0;

    for pair in self.rows.windows(2) {
      let columns = pair[0].len() as IndexType;

      for col in 0..columns.saturating_sub(1) {
        let b = row_start + col;
        indices.extend_from_slice(&[b, b + columns + 1, b + columns]);
        indices.extend_from_slice(&[b, b + 1, b + columns + 1]);
      }

      row_start += columns;
    }

    indices
  }

  /// Attaches `other` on the left: each of its rows is moved so its last
  /// vertex lands on this strip's first, and the seam heights are averaged.
  pub fn glue_left(&mut self, mut other: GeometryStrip) -> Result<()> {
    self.check_glue(&other)?;

    for (row, other_row) in self.rows.iter_mut().zip(other.rows.iter_mut()) {
      let (Some(&seam), Some(&other_seam)) = (row.first(), other_row.last())
      else {
        continue;
      };

      translate_xy(other_row, seam - other_seam);
      row[0].z = (seam.z + other_seam.z) / 2.0;

      other_row.pop();
      other_row.append(row);
      std::mem::swap(row, other_row);
    }

    Ok(())
  }

  /// Attaches `other` on the right, mirroring [`GeometryStrip::glue_left`].
  pub fn glue_right(&mut self, mut other: GeometryStrip) -> Result<()> {
    self.check_glue(&other)?;

    for (row, other_row) in self.rows.iter_mut().zip(other.rows.iter_mut()) {
      let (Some(&seam), Some(&other_seam)) = (row.last(), other_row.first())
      else {
        continue;
      };

      translate_xy(other_row, seam - other_seam);
      if let Some(last) = row.last_mut() {
        last.z = (seam.z + other_seam.z) / 2.0;
      }

      row.extend(other_row.drain(1..));
    }

    Ok(())
  }

  fn check_glue(&self, other: &GeometryStrip) -> Result<()> {
    if self.height() != other.height() {
      return Err(MeshError::invalid_param(
        "strip height",
        other.height(),
        "glued strips must have the same number of rows",
      ));
    }
    Ok(())
  }
}

fn translate_xy(row: &mut [Vertex], displacement: Vertex) {
  for vertex in row {
    vertex.x += displacement.x;
    vertex.y += displacement.y;
  }
}
