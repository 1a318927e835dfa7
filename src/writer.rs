// Rendering of a palette plus its images as one MakeCode TypeScript file.
use std::{fmt, fs, path::Path};

use log::info;

use crate::{
    encode::EncodedAsset,
    error::{AssetError, Result},
    identifier::sanitize_identifier,
    palette::Palette,
};

pub const PALETTE_IDENTIFIER: &str = "shared_Colors";

/// Images sharing one palette, in output order.
pub struct AssetGroup {
    pub palette: Palette,
    pub assets: Vec<EncodedAsset>,
}

impl AssetGroup {
    pub fn new(palette: Palette) -> Self {
        AssetGroup {
            palette,
            assets: vec![],
        }
    }

    pub fn push(&mut self, asset: EncodedAsset) {
        self.assets.push(asset);
    }

    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render()).map_err(|source| AssetError::Io {
            path: path.to_owned(),
            source,
        })?;
        info!("TypeScript asset file created at '{}'", path.display());
        Ok(())
    }
}

impl fmt::Display for AssetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "namespace palettes {{\n    export const {} = color.bufferToPalette(hex`{}`);\n}}\n\n",
            PALETTE_IDENTIFIER,
            self.palette.to_hex()
        )?;
        writeln!(f, "namespace images {{")?;
        for asset in &self.assets {
            write_asset(f, asset)?;
        }
        writeln!(f, "}}")
    }
}

fn write_asset(f: &mut fmt::Formatter<'_>, asset: &EncodedAsset) -> fmt::Result {
    let ident = sanitize_identifier(asset.name());
    write!(
        f,
        "    export const {} = \nimage.ofBuffer(hex`{}`);\n\n",
        ident,
        asset.to_hex()
    )?;
    write!(f, "    //% imghres\n    export const {}_img = img`\n", ident)?;
    for row in asset.literal().lines() {
        writeln!(f, "    {}", row)?;
    }
    write!(f, "`\n\n")
}
