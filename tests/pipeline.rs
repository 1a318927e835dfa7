use std::{fs, path::Path};

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use img2asset::{
    load::{ResizeOptions, ScaleMode},
    palette::{Palette, PaletteSource},
    pipeline::{run, Options},
    AssetError,
};

const TEST_PALETTE: [&str; 16] = [
    "#000000", "#FFFFFF", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF",
    "#808080", "#800000", "#008000", "#000080", "#808000", "#800080", "#008080", "#C0C0C0",
];

fn create_test_images(dir: &Path) {
    RgbImage::from_pixel(64, 48, Rgb([255, 0, 0]))
        .save(dir.join("red_test.png"))
        .unwrap();

    let mut green = RgbaImage::from_pixel(32, 32, Rgba([0, 255, 0, 255]));
    for (i, p) in green.pixels_mut().enumerate() {
        if i % 4 == 0 {
            *p = Rgba([0, 0, 0, 0]);
        }
    }
    green.save(dir.join("green-transparent.png")).unwrap();

    RgbImage::from_fn(16, 16, |x, y| {
        Rgb([(x * 15) as u8, (y * 15) as u8, ((x + y) * 7) as u8])
    })
    .save(dir.join("multicolor.bmp"))
    .unwrap();
}

fn options(inputs: &Path, output: &Path, palette: PaletteSource) -> Options {
    Options {
        inputs: vec![format!("{}/*", inputs.display())],
        output_dir: output.to_owned(),
        resize: ResizeOptions::new(Some(16), Some(16), ScaleMode::Fit),
        palette,
        save_palette: None,
    }
}

#[test]
fn test_multiple_images_shared_palette() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    let out = dir.path().join("out");
    fs::create_dir_all(&images).unwrap();
    create_test_images(&images);

    let summary = run(&options(&images, &out, PaletteSource::Derived)).unwrap();
    assert_eq!(summary.asset_path, out.join("assets.ts"));
    assert_eq!(summary.palette.colors()[0], [0, 0, 0]);
    for name in ["green-transparent", "multicolor", "red_test"] {
        assert!(out.join(format!("{name}.png")).exists());
    }

    let content = fs::read_to_string(&summary.asset_path).unwrap();
    assert!(content.contains("namespace palettes"));
    assert!(content.contains("shared_Colors"));
    assert!(content.contains("namespace images"));
    for ident in ["green_transparent", "multicolor", "red_test"] {
        assert!(content.contains(&format!("export const {ident} = ")));
        assert!(content.contains(&format!("export const {ident}_img = img`")));
    }
    assert!(content.contains("hex`E4101000"));

    // Sorted input order is kept in the output.
    let green = content.find("export const green_transparent =").unwrap();
    let multi = content.find("export const multicolor =").unwrap();
    let red = content.find("export const red_test =").unwrap();
    assert!(green < multi && multi < red);
}

#[test]
fn test_single_image_named_after_input() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    fs::create_dir_all(&images).unwrap();
    create_test_images(&images);

    let mut opts = options(&images, dir.path(), PaletteSource::Derived);
    opts.inputs = vec![images.join("red_test.png").display().to_string()];
    let summary = run(&opts).unwrap();
    assert_eq!(summary.asset_path, dir.path().join("red_test.ts"));
    let content = fs::read_to_string(&summary.asset_path).unwrap();
    // Fit mode pads the 64x48 source out to the full 16x16.
    assert!(content.contains("image.ofBuffer(hex`E4101000"));
}

#[test]
fn test_output_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    fs::create_dir_all(&images).unwrap();
    create_test_images(&images);

    let first = run(&options(&images, &dir.path().join("a"), PaletteSource::Derived)).unwrap();
    let second = run(&options(&images, &dir.path().join("b"), PaletteSource::Derived)).unwrap();
    assert_eq!(
        fs::read(&first.asset_path).unwrap(),
        fs::read(&second.asset_path).unwrap()
    );
}

#[test]
fn test_palette_file_and_save_palette() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    fs::create_dir_all(&images).unwrap();
    create_test_images(&images);

    let palette_path = dir.path().join("palette.json");
    let body = serde_json::json!({ "palette": TEST_PALETTE });
    fs::write(&palette_path, body.to_string()).unwrap();

    let mut opts = options(
        &images,
        &dir.path().join("out"),
        PaletteSource::File(palette_path.clone()),
    );
    opts.save_palette = Some(dir.path().join("saved").join("palette.json"));
    let summary = run(&opts).unwrap();

    let expected = Palette::from_hex_list(&TEST_PALETTE).unwrap();
    assert_eq!(summary.palette, expected);
    assert_eq!(
        Palette::load_json(opts.save_palette.as_ref().unwrap()).unwrap(),
        expected
    );
    let content = fs::read_to_string(&summary.asset_path).unwrap();
    assert!(content.contains(&expected.to_hex()));
}

#[test]
fn test_transparent_image_keeps_zero_for_transparent_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    fs::create_dir_all(&images).unwrap();
    // 1 wide, 3 tall, middle pixel transparent.
    RgbaImage::from_fn(1, 3, |_, y| match y {
        0 => Rgba([250, 0, 0, 255]),
        1 => Rgba([0, 0, 0, 0]),
        _ => Rgba([0, 0, 250, 255]),
    })
    .save(images.join("dot.png"))
    .unwrap();

    let mut opts = options(
        &images,
        dir.path(),
        PaletteSource::HexList(TEST_PALETTE.join(",")),
    );
    opts.resize = ResizeOptions::original_size();
    let summary = run(&opts).unwrap();
    let content = fs::read_to_string(&summary.asset_path).unwrap();
    // Column of three: (red, transparent) then (blue, padding).
    assert!(content.contains("hex`E40103000204`"));
    assert!(content.contains("    2\n    .\n    4\n"));
}

#[test]
fn test_invalid_palette_aborts_before_loading() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let opts = options(
        &dir.path().join("missing"),
        &out,
        PaletteSource::HexList("#ZZZZZZ".to_string()),
    );
    let err = run(&opts).unwrap_err();
    assert!(matches!(err, AssetError::InvalidPaletteFormat { .. }));
    assert!(!out.exists());
}

#[test]
fn test_missing_palette_file() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    fs::create_dir_all(&images).unwrap();
    create_test_images(&images);
    let opts = options(
        &images,
        &dir.path().join("out"),
        PaletteSource::File(dir.path().join("nope.json")),
    );
    let err = run(&opts).unwrap_err();
    assert!(matches!(err, AssetError::PaletteFileNotFound { .. }));
}

#[test]
fn test_no_valid_images() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.png"), b"garbage").unwrap();
    let opts = options(dir.path(), &dir.path().join("out"), PaletteSource::Derived);
    let err = run(&opts).unwrap_err();
    assert!(matches!(err, AssetError::NoValidInputImages));
}

#[test]
fn test_undecodable_input_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    fs::create_dir_all(&images).unwrap();
    create_test_images(&images);
    fs::write(images.join("broken.png"), b"garbage").unwrap();

    let summary = run(&options(&images, &dir.path().join("out"), PaletteSource::Derived)).unwrap();
    assert_eq!(summary.raster_paths.len(), 3);
}

#[test]
fn test_dimension_overflow_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images");
    fs::create_dir_all(&images).unwrap();
    RgbImage::from_pixel(300, 4, Rgb([9, 9, 9]))
        .save(images.join("wide.png"))
        .unwrap();

    let saved_palette = dir.path().join("pal").join("shared.json");
    let mut opts = options(&images, &dir.path().join("out"), PaletteSource::Derived);
    opts.resize = ResizeOptions::original_size();
    opts.save_palette = Some(saved_palette.clone());
    let err = run(&opts).unwrap_err();
    assert!(matches!(
        err,
        AssetError::DimensionOverflow {
            width: 300,
            height: 4,
            ..
        }
    ));
    assert!(!saved_palette.exists());
    assert!(!dir.path().join("out").exists());
}
