//! CSV export of ranked predictions

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::error::RaceCardError;
use crate::models::Prediction;

pub const CSV_HEADER: [&str; 8] = [
    "Rank",
    "Horse",
    "Post_Position",
    "Win_Probability",
    "Score",
    "Weight",
    "Recent_Form",
    "Analysis",
];

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn write_row<W: Write, S: AsRef<str>>(w: &mut W, row: &[S]) -> io::Result<()> {
    for (idx, cell) in row.iter().enumerate() {
        if idx > 0 {
            write!(w, ",")?;
        }
        let cell = cell.as_ref();
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

fn prediction_row(p: &Prediction) -> [String; 8] {
    [
        p.rank.to_string(),
        p.name.clone(),
        p.post_position.to_string(),
        format!("{:.1}", p.win_probability),
        format!("{:.1}", p.score),
        p.weight.to_string(),
        p.form_string(),
        p.analysis.clone(),
    ]
}

/// Write header plus one row per prediction
pub fn write_csv<W: Write>(mut writer: W, predictions: &[Prediction]) -> io::Result<()> {
    write_row(&mut writer, &CSV_HEADER)?;
    for prediction in predictions {
        write_row(&mut writer, &prediction_row(prediction))?;
    }
    writer.flush()
}

pub fn to_csv(predictions: &[Prediction]) -> String {
    let mut buf = Vec::new();
    // writing into a Vec cannot fail
    let _ = write_csv(&mut buf, predictions);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Save predictions to a CSV file, replacing any existing file
pub fn save_csv<P: AsRef<Path>>(path: P, predictions: &[Prediction]) -> Result<(), RaceCardError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), predictions)?;
    info!("Saved {} predictions to {:?}", predictions.len(), path);
    Ok(())
}
