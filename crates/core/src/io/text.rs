//! Plain-text readers and writers
//!
//! All readers accept either `.` or `,` as the decimal separator and split
//! fields on any whitespace.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::point::{ControlPoint, PrognosisNode};
use crate::surface::ModelSurface;

/// Order in which grid rows appear in a text file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowOrder {
    /// First line is the southern row
    Ascending,
    /// First line is the northern row
    #[default]
    Descending,
}

/// Fill `grid` from a `lon lat value` text file.
///
/// Lines are consumed row by row, west to east, and only the third field is
/// used: coordinates are implied by the grid geometry.
pub fn read_grid_text<P: AsRef<Path>>(path: P, grid: &mut Grid, order: RowOrder) -> Result<()> {
    let file = File::open(path.as_ref())?;
    read_grid_from(BufReader::new(file), grid, order)
}

/// Same as [`read_grid_text`] over any buffered reader
pub fn read_grid_from<R: BufRead>(reader: R, grid: &mut Grid, order: RowOrder) -> Result<()> {
    let (rows, cols) = grid.shape();
    let mut lines = data_lines(reader);
    let mut values = vec![0.0; rows * cols];

    for k in 0..rows {
        let row = match order {
            RowOrder::Ascending => k,
            RowOrder::Descending => rows - 1 - k,
        };
        for col in 0..cols {
            let (line_no, line) = lines.next().transpose()?.ok_or(Error::Parse {
                line: 0,
                reason: format!("file ended before node ({row}, {col})"),
            })?;
            let fields = split_fields(&line);
            let raw = fields.get(2).ok_or(Error::Parse {
                line: line_no,
                reason: "expected at least 3 columns".into(),
            })?;
            values[row * cols + col] = parse_number(raw, line_no)?;
        }
    }

    *grid = Grid::from_vec(*grid.spec(), values)?;
    debug!(rows, cols, "read grid text");
    Ok(())
}

/// Write a grid as `lon\tlat\tvalue`, northern row first
pub fn write_grid_text<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_grid_to(grid, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Same as [`write_grid_text`] over any writer
pub fn write_grid_to<W: Write>(grid: &Grid, writer: &mut W) -> Result<()> {
    let (rows, cols) = grid.shape();
    for row in (0..rows).rev() {
        for col in 0..cols {
            let (lat, lon) = grid.node_to_geo(row, col);
            writeln!(writer, "{:.12}\t{:.12}\t{:.5}", lon, lat, grid.get(row, col)?)?;
        }
    }
    Ok(())
}

/// Write predicted nodes, one per line:
/// `lon lat geometric signal signal_error`
pub fn write_predictions<P: AsRef<Path>>(nodes: &[PrognosisNode], path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_predictions_to(nodes, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_predictions_to<W: Write>(nodes: &[PrognosisNode], writer: &mut W) -> Result<()> {
    for node in nodes {
        writeln!(writer, "{node}")?;
    }
    Ok(())
}

/// One line of a control point file:
/// `id lat lon normal_height geodetic_height normal_error geodetic_error`
#[derive(Debug, Clone, PartialEq)]
pub struct ControlRecord {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub normal_height: f64,
    pub geodetic_height: f64,
    pub normal_error: f64,
    pub geodetic_error: f64,
}

impl ControlRecord {
    /// Bind the record to a model surface
    pub fn into_control_point(self, surface: Arc<dyn ModelSurface>) -> ControlPoint {
        ControlPoint::builder(self.lat, self.lon, surface)
            .normal_height(self.normal_height)
            .geodetic_height(self.geodetic_height)
            .normal_height_error(self.normal_error)
            .geodetic_height_error(self.geodetic_error)
            .build()
    }
}

/// Read control point records from a file. Blank lines and lines starting
/// with `#` are skipped.
pub fn read_control_records<P: AsRef<Path>>(path: P) -> Result<Vec<ControlRecord>> {
    let file = File::open(path.as_ref())?;
    parse_control_records(BufReader::new(file))
}

pub fn parse_control_records<R: BufRead>(reader: R) -> Result<Vec<ControlRecord>> {
    let mut records = Vec::new();
    for item in data_lines(reader) {
        let (line_no, line) = item?;
        let fields = split_fields(&line);
        if fields.len() < 7 {
            return Err(Error::Parse {
                line: line_no,
                reason: format!("expected 7 columns, found {}", fields.len()),
            });
        }
        records.push(ControlRecord {
            id: fields[0].clone(),
            lat: parse_number(&fields[1], line_no)?,
            lon: parse_number(&fields[2], line_no)?,
            normal_height: parse_number(&fields[3], line_no)?,
            geodetic_height: parse_number(&fields[4], line_no)?,
            normal_error: parse_number(&fields[5], line_no)?,
            geodetic_error: parse_number(&fields[6], line_no)?,
        });
    }
    debug!(count = records.len(), "read control records");
    Ok(records)
}

/// Non-empty, non-comment lines with their 1-based line numbers
fn data_lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<(usize, String)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    None
                } else {
                    Some(Ok((idx + 1, trimmed.to_string())))
                }
            }
            Err(e) => Some(Err(Error::from(e))),
        })
}

fn split_fields(line: &str) -> Vec<String> {
    line.replace(',', ".")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn parse_number(raw: &str, line: usize) -> Result<f64> {
    raw.parse::<f64>().map_err(|e| Error::Parse {
        line,
        reason: format!("'{raw}': {e}"),
    })
}
