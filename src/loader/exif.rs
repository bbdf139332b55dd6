use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// EXIF Orientation（1〜8）を取得
pub fn extract_orientation(path: &Path) -> Result<u8, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let mut bufreader = BufReader::new(file);
    let exif_reader = exif::Reader::new();
    let exif = exif_reader.read_from_container(&mut bufreader)?;

    let field = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .ok_or("No orientation in EXIF")?;

    match field.value.get_uint(0) {
        Some(v @ 1..=8) => Ok(v as u8),
        _ => Err("Invalid orientation value".into()),
    }
}
