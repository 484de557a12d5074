use super::*;

const AVATAR_BOX: Size = CardLayout::STANDARD.avatar_box;

fn contain(w: u32, h: u32) -> Size {
    Size::new(w, h).unwrap().contain_within(AVATAR_BOX)
}

#[test]
fn size_rejects_zero_area() {
    assert!(Size::new(0, 10).is_err());
    assert!(Size::new(10, 0).is_err());
    assert!(Size::new(1, 1).is_ok());
}

#[test]
fn contain_portrait_fills_height() {
    assert_eq!(
        contain(400, 600),
        Size {
            width: 131,
            height: 197
        }
    );
}

#[test]
fn contain_landscape_fills_width() {
    let out = contain(800, 400);
    assert_eq!(out.width, 152);
    assert_eq!(out.height, 76);
}

#[test]
fn contain_upscales_small_images() {
    let out = contain(38, 49);
    assert!(out.width == 152 || out.height == 197);
    assert!(out.width <= 152 && out.height <= 197);
}

#[test]
fn contain_exact_box_is_identity() {
    assert_eq!(contain(152, 197), AVATAR_BOX);
}

#[test]
fn contain_bounds_and_aspect_hold_across_shapes() {
    for w in [1u32, 3, 17, 64, 151, 152, 153, 400, 999, 4000] {
        for h in [1u32, 5, 33, 196, 197, 198, 600, 1234, 5000] {
            let out = contain(w, h);
            assert!(out.width >= 1 && out.width <= 152, "{w}x{h} -> {out:?}");
            assert!(out.height >= 1 && out.height <= 197, "{w}x{h} -> {out:?}");
            assert!(
                out.width == 152 || out.height == 197,
                "{w}x{h} -> {out:?} touches neither side"
            );

            // One pixel of rounding on the short side is the most we allow.
            let scale = (152.0 / f64::from(w)).min(197.0 / f64::from(h));
            let ew = f64::from(w) * scale;
            let eh = f64::from(h) * scale;
            if ew >= 1.0 {
                assert!((f64::from(out.width) - ew).abs() <= 1.0, "{w}x{h} -> {out:?}");
            }
            if eh >= 1.0 {
                assert!((f64::from(out.height) - eh).abs() <= 1.0, "{w}x{h} -> {out:?}");
            }
        }
    }
}

#[test]
fn standard_layout_coordinates() {
    let l = CardLayout::default();
    assert_eq!(l.avatar_at, Offset::new(560, 160));
    assert_eq!(l.registration_at, Offset::new(200, 160));
    assert_eq!(l.name_at, Offset::new(200, 190));
    assert_eq!(l.father_name_at, Offset::new(200, 251));
    assert_eq!(l.phone_at, Offset::new(200, 282));
    assert_eq!(l.barcode_at, Offset::new(30, 370));
}
