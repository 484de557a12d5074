use super::*;

#[test]
fn decode_image_png_dimensions_and_straight_alpha() {
    let img = image::RgbaImage::from_raw(2, 1, vec![100, 50, 200, 128, 1, 2, 3, 255]).unwrap();
    let buf = encode_png(&img).unwrap();

    let decoded = decode_image(&buf).unwrap();
    assert_eq!(decoded.dimensions(), (2, 1));
    assert_eq!(decoded.as_raw(), img.as_raw());
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not a png").is_err());
}

#[test]
fn read_image_reports_path_on_missing_file() {
    let err = read_image(Path::new("/nonexistent/idcard/avatar.png")).unwrap_err();
    assert!(err.to_string().contains("avatar.png"), "{err}");
}
