// reframe-core/tests/geometry_tests.rs
//
// Exhaustive checks of the fit geometry over a grid of source sizes.

use reframe_core::{FitTransform, MediaProfile, Rotation, resolve_fit, resolve_profile};

const SIDES: &[u32] = &[
    2, 16, 90, 144, 240, 320, 360, 480, 576, 607, 640, 720, 853, 1000, 1080, 1081, 1280, 1350,
    1440, 1920, 2160, 2560, 3840, 4096, 7680,
];

fn grid() -> impl Iterator<Item = (u32, u32)> {
    SIDES.iter().flat_map(|&w| SIDES.iter().map(move |&h| (w, h)))
}

#[test]
fn test_padding_fills_canvas_exactly() {
    for (w, h) in grid() {
        let fit = resolve_fit(w, h);
        assert_eq!(fit.scaled_width + fit.pad_left + fit.pad_right, 1080, "{w}x{h}: {fit:?}");
        assert_eq!(fit.scaled_height + fit.pad_top + fit.pad_bottom, 1920, "{w}x{h}: {fit:?}");
    }
}

#[test]
fn test_scaled_dimensions_even_and_positive() {
    for (w, h) in grid() {
        let fit = resolve_fit(w, h);
        assert!(fit.scaled_width >= 2 && fit.scaled_width % 2 == 0, "{w}x{h}: {fit:?}");
        assert!(fit.scaled_height >= 2 && fit.scaled_height % 2 == 0, "{w}x{h}: {fit:?}");
        assert!(fit.scaled_width <= FitTransform::TARGET_WIDTH);
        assert!(fit.scaled_height <= FitTransform::TARGET_HEIGHT);
    }
}

#[test]
fn test_padding_is_balanced_and_one_axis_only() {
    for (w, h) in grid() {
        let fit = resolve_fit(w, h);
        assert!(fit.pad_top.abs_diff(fit.pad_bottom) <= 1, "{w}x{h}: {fit:?}");
        assert!(fit.pad_left.abs_diff(fit.pad_right) <= 1, "{w}x{h}: {fit:?}");
        let vertical = fit.pad_top + fit.pad_bottom > 0;
        let horizontal = fit.pad_left + fit.pad_right > 0;
        assert!(!(vertical && horizontal), "{w}x{h}: {fit:?}");
    }
}

#[test]
fn test_aspect_ratio_preserved() {
    for (w, h) in grid() {
        let fit = resolve_fit(w, h);
        let width_constrained = u64::from(w) * 1920 >= u64::from(h) * 1080;
        let (w, h) = (f64::from(w), f64::from(h));
        if width_constrained {
            assert_eq!(fit.scaled_width, 1080);
            let exact = 1080.0 * h / w;
            if exact >= 2.0 {
                // half-pixel rounding plus at most one pixel for the even step
                assert!((f64::from(fit.scaled_height) - exact).abs() <= 1.5, "{w}x{h}: {fit:?}");
            }
        } else {
            assert_eq!(fit.scaled_height, 1920);
            let exact = 1920.0 * w / h;
            if exact >= 2.0 {
                assert!((f64::from(fit.scaled_width) - exact).abs() <= 1.5, "{w}x{h}: {fit:?}");
            }
        }
    }
}

#[test]
fn test_quarter_turn_equals_swapped_source() {
    for (w, h) in grid() {
        for rotation in [Rotation::Cw90, Rotation::Cw270] {
            let rotated = MediaProfile {
                coded_width: w,
                coded_height: h,
                rotation,
                ..Default::default()
            };
            assert_eq!(resolve_profile(&rotated, None), resolve_fit(h, w), "{w}x{h} {rotation:?}");
        }
        for rotation in [Rotation::None, Rotation::Cw180] {
            let upright = MediaProfile {
                coded_width: w,
                coded_height: h,
                rotation,
                ..Default::default()
            };
            assert_eq!(resolve_profile(&upright, None), resolve_fit(w, h), "{w}x{h} {rotation:?}");
        }
    }
}

#[test]
fn test_manual_rotation_ignores_probed_rotation() {
    let all = [Rotation::None, Rotation::Cw90, Rotation::Cw180, Rotation::Cw270];
    for (w, h) in grid() {
        for probed in all {
            for manual in all {
                let source = MediaProfile {
                    coded_width: w,
                    coded_height: h,
                    rotation: probed,
                    ..Default::default()
                };
                let tagged = MediaProfile {
                    rotation: manual,
                    ..source.clone()
                };
                assert_eq!(
                    resolve_profile(&source, Some(manual)),
                    resolve_profile(&tagged, None),
                    "{w}x{h} probed {probed:?} manual {manual:?}"
                );
            }
        }
    }
}

#[test]
fn test_reference_scenarios() {
    let cases = [
        ((1080, 1080), (1080, 1080, 420, 420, 0, 0)),
        ((1920, 1080), (1080, 608, 656, 656, 0, 0)),
        ((1080, 1350), (1080, 1350, 285, 285, 0, 0)),
        ((1080, 1920), (1080, 1920, 0, 0, 0, 0)),
        ((3840, 2160), (1080, 608, 656, 656, 0, 0)),
    ];
    for ((w, h), expected) in cases {
        let fit = resolve_fit(w, h);
        assert_eq!(
            (
                fit.scaled_width,
                fit.scaled_height,
                fit.pad_top,
                fit.pad_bottom,
                fit.pad_left,
                fit.pad_right
            ),
            expected,
            "{w}x{h}"
        );
    }
}
