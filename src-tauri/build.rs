use std::env;
use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const ICON_SIZE: u32 = 32;
const ICON_RGBA: [u8; 4] = [0x2b, 0x6c, 0xb0, 0xff];

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());

    ensure_icons(&manifest_dir).expect("failed to prepare shell icons");

    tauri_build::build();
}

fn ensure_icons(manifest_dir: &Path) -> Result<(), Box<dyn Error>> {
    let icon_dir = manifest_dir.join("icons");
    let icon_png = icon_dir.join("icon.png");
    let icon_ico = icon_dir.join("icon.ico");
    println!("cargo:rerun-if-changed={}", icon_png.display());
    println!("cargo:rerun-if-changed={}", icon_ico.display());

    if fs::metadata(&icon_png).is_err() {
        fs::create_dir_all(&icon_dir)?;
        let file = fs::File::create(&icon_png)?;
        write_png(BufWriter::new(file))?;
    }

    if fs::metadata(&icon_ico).is_err() {
        fs::create_dir_all(&icon_dir)?;
        let mut png_bytes = Vec::new();
        write_png(&mut png_bytes)?;
        fs::write(&icon_ico, wrap_png_in_ico(&png_bytes))?;
    }
    Ok(())
}

fn write_png<W: std::io::Write>(writer: W) -> Result<(), Box<dyn Error>> {
    let mut encoder = png::Encoder::new(writer, ICON_SIZE, ICON_SIZE);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    let data: Vec<u8> = ICON_RGBA
        .iter()
        .copied()
        .cycle()
        .take((ICON_SIZE * ICON_SIZE * 4) as usize)
        .collect();
    writer.write_image_data(&data)?;
    Ok(())
}

// Single-entry ICO container holding a PNG payload.
fn wrap_png_in_ico(png_bytes: &[u8]) -> Vec<u8> {
    let mut ico = Vec::with_capacity(22 + png_bytes.len());
    ico.extend_from_slice(&0u16.to_le_bytes());
    ico.extend_from_slice(&1u16.to_le_bytes());
    ico.extend_from_slice(&1u16.to_le_bytes());
    ico.push(ICON_SIZE as u8);
    ico.push(ICON_SIZE as u8);
    ico.push(0);
    ico.push(0);
    ico.extend_from_slice(&1u16.to_le_bytes());
    ico.extend_from_slice(&32u16.to_le_bytes());
    ico.extend_from_slice(&(png_bytes.len() as u32).to_le_bytes());
    ico.extend_from_slice(&22u32.to_le_bytes());
    ico.extend_from_slice(png_bytes);
    ico
}
