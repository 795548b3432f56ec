use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};
use imgconv::{ImageCodec, RasterCodec, TargetFormat, ALLOWED_FORMATS};
use rand::{Rng, SeedableRng};

fn random_png(rng: &mut rand::rngs::StdRng, w: u32, h: u32) -> Vec<u8> {
    let mut img = RgbaImage::new(w, h);
    for px in img.pixels_mut() {
        let [r, g, b]: [u8; 3] = rng.gen();
        px.0 = [r, g, b, rng.gen_range(1..=255)];
    }
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

#[test]
fn roundtrip_every_format() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let sizes = [(1u32, 1u32), (17, 5), (64, 48)];

    for &(w, h) in &sizes {
        let source = random_png(&mut rng, w, h);

        for name in ALLOWED_FORMATS {
            let format = TargetFormat::parse(name).unwrap();
            let out = RasterCodec.convert(&source, format).unwrap();

            assert_eq!(image::guess_format(&out).unwrap(), format.image_format());
            let img = image::load_from_memory_with_format(&out, format.image_format()).unwrap();
            assert_eq!((img.width(), img.height()), (w, h));
        }
    }
}

#[test]
fn lossless_targets_keep_pixels() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    let source = random_png(&mut rng, 31, 19);
    let expected = image::load_from_memory(&source).unwrap().to_rgba8();

    for format in [TargetFormat::Png, TargetFormat::Webp] {
        let out = RasterCodec.convert(&source, format).unwrap();
        let img = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(img, expected, "{format} changed pixel data");
    }
}

#[test]
fn conversion_is_repeatable() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(23);
    let source = random_png(&mut rng, 40, 30);

    for name in ALLOWED_FORMATS {
        let format = TargetFormat::parse(name).unwrap();
        let first = RasterCodec.convert(&source, format).unwrap();
        let second = RasterCodec.convert(&source, format).unwrap();

        let a = image::load_from_memory(&first).unwrap().to_rgba8();
        let b = image::load_from_memory(&second).unwrap().to_rgba8();
        assert_eq!(a, b, "{format} output differs between runs");
    }
}

#[test]
fn jpeg_source_converts_to_png() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(3);
    let png = random_png(&mut rng, 20, 10);
    let jpeg = RasterCodec.convert(&png, TargetFormat::Jpg).unwrap();

    let out = RasterCodec.convert(&jpeg, TargetFormat::Png).unwrap();
    let img = image::load_from_memory_with_format(&out, ImageFormat::Png).unwrap();
    assert_eq!((img.width(), img.height()), (20, 10));
}
