use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use phrase_splicer::Report;

pub fn write_report(path: &Path, report: &Report) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| {
            format!(
                "Failed to create report directory '{}': {err}",
                parent.display()
            )
        })?;
    }

    let file = File::create(path)
        .map_err(|err| format!("Failed to create report '{}': {err}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|err| format!("Failed to serialize report '{}': {err}", path.display()))?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|err| format!("Failed to finish report '{}': {err}", path.display()))
}
