use std::collections::BTreeMap;

use image::{Rgb, Rgba, RgbaImage};
use photo_collage::catalog::{LayoutCatalog, Template};
use photo_collage::geometry::ratios_to_pixel_box;
use photo_collage::style::{Background, Color, RotationRange, StyleCatalog, StyleConfig};
use photo_collage::{
    BuildOptions, CanvasSize, CellRatio, CollageBuilder, Diagnostic, SourceImage, build_collage,
};

fn photo(name: &str, w: u32, h: u32, color: [u8; 3]) -> SourceImage {
    SourceImage::loaded(
        name,
        RgbaImage::from_pixel(w, h, Rgba([color[0], color[1], color[2], 255])),
    )
}

fn six_photos() -> Vec<SourceImage> {
    (0..6)
        .map(|i| photo(&format!("images/{i}.jpg"), 800 + i * 100, 600, [i as u8 * 40, 90, 200]))
        .collect()
}

fn flat_style(border_width_px: u32) -> StyleConfig {
    StyleConfig {
        background: Background::Solid(Color::WHITE),
        gradient: false,
        rotation_range: RotationRange::NONE,
        border_width_px,
        border_color: Color::BLACK,
        shadow: false,
    }
}

fn builder_with(layouts: BTreeMap<usize, Vec<Template>>, style: StyleConfig) -> CollageBuilder {
    let fallback = LayoutCatalog::builtin().fallback().clone();
    let layouts = LayoutCatalog::new(layouts, fallback).expect("valid test catalog");
    let styles = StyleCatalog::builtin()
        .with_overrides(BTreeMap::from([("flat".to_string(), style)]))
        .expect("valid test style");
    CollageBuilder::new(layouts, styles)
}

#[test]
fn modern_six_image_square_build() {
    let canvas = CanvasSize::new(1200, 1200);
    let collage = build_collage(&six_photos(), canvas, "modern", Some(42)).expect("build");

    assert_eq!(collage.template.name, "Split layout");
    assert_eq!(&collage.template, &LayoutCatalog::builtin().templates_for(6)[0]);
    assert!(!collage.fallback);

    assert_eq!(collage.image.dimensions(), (1200, 1200));
    assert!(!collage.image.has_alpha());
    assert_eq!(collage.placed_count(), 6);
    assert!(collage.diagnostics.is_empty());

    assert_eq!(collage.markup.elements.len(), 6);
    for (el, ratio) in collage.markup.elements.iter().zip(&collage.template.cells) {
        let expected = ratios_to_pixel_box(*ratio, canvas, 4);
        assert_eq!(
            (el.left, el.top, el.width, el.height),
            (expected.x, expected.y, expected.w, expected.h)
        );
        assert!((-3.0..=3.0).contains(&el.rotation_deg));
        assert!(el.shadow);
        assert_eq!(el.border.as_ref().map(|b| b.width_px), Some(4));
    }
}

#[test]
fn same_seed_same_template_and_rotations() {
    let canvas = CanvasSize::new(1200, 1200);
    let a = build_collage(&six_photos(), canvas, "scrapbook", Some(7)).unwrap();
    let b = build_collage(&six_photos(), canvas, "scrapbook", Some(7)).unwrap();
    assert_eq!(a.template, b.template);
    assert_eq!(a.placed, b.placed);
    assert_eq!(a.markup, b.markup);
    assert_eq!(a.image.image.as_bytes(), b.image.image.as_bytes());
}

#[test]
fn markup_matches_raster_placements() {
    let collage =
        build_collage(&six_photos(), CanvasSize::new(1920, 1080), "vintage", Some(3)).unwrap();
    assert_eq!(collage.markup.elements.len(), collage.placed.len());
    for (el, placed) in collage.markup.elements.iter().zip(&collage.placed) {
        assert_eq!(el.cell(), placed.cell);
        assert_eq!(el.rotation_deg, placed.rotation_deg);
        assert_eq!(el.index, placed.index);
        assert_eq!(el.source, placed.source_ref);
    }
}

#[test]
fn unlisted_count_uses_fallback_and_reports_unplaced() {
    let builder = builder_with(BTreeMap::new(), flat_style(0));
    let images = vec![
        photo("a", 100, 100, [255, 0, 0]),
        photo("b", 100, 100, [0, 255, 0]),
        photo("c", 100, 100, [0, 0, 255]),
    ];
    let opts = BuildOptions::new(CanvasSize::new(500, 500), "flat").with_seed(1);
    let collage = builder.build(&images, &opts).unwrap();

    assert!(collage.fallback);
    assert_eq!(collage.template.cells.len(), 1);
    assert_eq!(collage.placed_count(), 1);
    assert_eq!(collage.placed[0].source_ref, "a");
    let unplaced: Vec<usize> = collage
        .diagnostics
        .iter()
        .filter_map(|d| match d {
            Diagnostic::Unplaced { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(unplaced, [1, 2]);
    assert_eq!(collage.summary(), "1 of 3 images placed");
}

#[test]
fn border_wider_than_cell_skips_only_that_image() {
    let template = Template::new(
        "Tiny and large",
        "",
        vec![
            CellRatio::new(0.0, 0.0, 0.075, 0.075),
            CellRatio::new(0.4, 0.4, 0.5, 0.5),
        ],
    );
    let builder = builder_with(BTreeMap::from([(2, vec![template])]), flat_style(40));
    let images = vec![photo("tiny", 50, 50, [1, 1, 1]), photo("big", 50, 50, [2, 2, 2])];
    let opts = BuildOptions::new(CanvasSize::new(400, 400), "flat").with_seed(9);
    let collage = builder.build(&images, &opts).expect("build still succeeds");

    assert_eq!(collage.placed_count(), 1);
    assert_eq!(collage.placed[0].source_ref, "big");
    assert!(matches!(
        collage.diagnostics.as_slice(),
        [Diagnostic::DegenerateCell { index: 0, .. }]
    ));
    assert_eq!(collage.markup.elements.len(), 1);
}

#[test]
fn later_cell_covers_earlier_cell_on_overlap() {
    let template = Template::new(
        "Overlap",
        "",
        vec![
            CellRatio::new(0.0, 0.0, 0.6, 0.6),
            CellRatio::new(0.4, 0.4, 0.6, 0.6),
        ],
    );
    let builder = builder_with(BTreeMap::from([(2, vec![template])]), flat_style(0));
    let images = vec![photo("red", 60, 60, [255, 0, 0]), photo("blue", 60, 60, [0, 0, 255])];
    let opts = BuildOptions::new(CanvasSize::new(100, 100), "flat").with_seed(0);
    let collage = builder.build(&images, &opts).unwrap();

    let rgb = collage.image.image.to_rgb8();
    assert_eq!(*rgb.get_pixel(50, 50), Rgb([0, 0, 255]));
    assert_eq!(*rgb.get_pixel(10, 10), Rgb([255, 0, 0]));
    assert_eq!(*rgb.get_pixel(95, 5), Rgb([255, 255, 255]));
}

#[test]
fn transparent_style_keeps_alpha() {
    let mut style = flat_style(0);
    style.background = Background::Transparent;
    let builder = builder_with(BTreeMap::new(), style);
    let opts = BuildOptions::new(CanvasSize::new(200, 100), "flat").with_seed(4);
    let collage = builder.build(&[photo("a", 40, 40, [9, 9, 9])], &opts).unwrap();
    assert!(collage.image.has_alpha());
    let rgba = collage.image.image.to_rgba8();
    assert_eq!(rgba.get_pixel(0, 0)[3], 0);
}
