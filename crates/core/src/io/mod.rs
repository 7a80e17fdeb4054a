//! Reading and writing grids, control points and predictions

mod text;

pub use text::{
    parse_control_records, read_control_records, read_grid_from, read_grid_text,
    write_grid_text, write_grid_to, write_predictions, write_predictions_to, ControlRecord,
    RowOrder,
};
