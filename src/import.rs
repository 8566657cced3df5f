use std::path::Path;

use anyhow::Context;

use crate::models::StudentRecord;

/// Reads student rows from a CSV export with the header
/// `user_id,name,gpa,cca,attendance,midterm,final_exam` and an optional
/// `performance` label column. Empty cells become `None`; missing metrics
/// are rejected later, per row, by the engine.
pub fn load_csv(csv_path: &Path) -> anyhow::Result<Vec<StudentRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    read_records(&mut reader)
}

fn read_records<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> anyhow::Result<Vec<StudentRecord>> {
    let mut records = Vec::new();
    for (index, result) in reader.deserialize::<StudentRecord>().enumerate() {
        // header is line 1
        let record = result.with_context(|| format!("malformed row on line {}", index + 2))?;
        records.push(record);
    }
    tracing::debug!(rows = records.len(), "loaded student rows");
    Ok(records)
}
