use std::sync::Arc;

use super::*;
use crate::test_support::block_font;

const START_B: [u8; 11] = [1, 1, 0, 1, 0, 0, 1, 0, 0, 0, 0];
const STOP: [u8; 13] = [1, 1, 0, 0, 0, 1, 1, 1, 0, 1, 0, 1, 1];

#[test]
fn modules_have_code128_framing() {
    let m = Code128Encoder::modules("PFX/SUF/2025/12345").unwrap();
    assert_eq!(&m[..11], &START_B);
    assert_eq!(&m[m.len() - 13..], &STOP);
    // start + 18 data symbols + checksum, then the stop pattern.
    assert_eq!(m.len(), 11 * (18 + 2) + 13);
}

#[test]
fn modules_reject_unencodable_payloads() {
    for bad in ["", "naïve", "tab\there"] {
        let err = Code128Encoder::modules(bad).unwrap_err();
        assert_eq!(err.stage(), Some(CompositionStage::Barcode), "{bad:?}");
    }
}

#[test]
fn raster_without_label_matches_module_pattern() {
    let opts = BarcodeOptions {
        module_width: 3,
        bar_height: 10,
        quiet_zone_modules: 4,
        ..BarcodeOptions::default()
    };
    let raster = Code128Encoder::new().encode("AB12", &opts).unwrap();

    let total = raster.modules.len() as u32 + 8;
    assert_eq!(raster.image.dimensions(), (total * 3, 10));
    assert_eq!(raster.payload, "AB12");
    assert_eq!(raster.symbology, Symbology::Code128);

    // Quiet zone stays background.
    assert_eq!(raster.image.get_pixel(0, 0).0, opts.background);
    for (i, m) in raster.modules.iter().enumerate() {
        let x = (4 + i as u32) * 3 + 1;
        let expected = if *m == 1 {
            opts.foreground
        } else {
            opts.background
        };
        assert_eq!(raster.image.get_pixel(x, 5).0, expected, "module {i}");
    }
}

#[test]
fn label_font_adds_a_text_line_under_the_bars() {
    let font = Arc::new(block_font());
    let opts = BarcodeOptions::default();
    let plain = Code128Encoder::new().encode("12345", &opts).unwrap();
    let labelled = Code128Encoder::new()
        .with_label_font(font.clone())
        .encode("12345", &opts)
        .unwrap();

    assert_eq!(plain.image.height(), opts.bar_height);
    assert_eq!(
        labelled.image.height(),
        opts.bar_height + opts.text_gap + font.line_height()
    );
    assert_eq!(plain.image.width(), labelled.image.width());

    // Something was printed in the text band, around the centre.
    let band_top = opts.bar_height + opts.text_gap;
    let cx = labelled.image.width() / 2;
    let printed = (band_top..labelled.image.height())
        .any(|y| labelled.image.get_pixel(cx, y).0[3] == 255);
    assert!(printed);

    let hidden = BarcodeOptions {
        human_readable: false,
        ..opts
    };
    let unlabelled = Code128Encoder::new()
        .with_label_font(font)
        .encode("12345", &hidden)
        .unwrap();
    assert_eq!(unlabelled.image.height(), opts.bar_height);
}

#[test]
fn zero_sized_modules_are_rejected() {
    let opts = BarcodeOptions {
        module_width: 0,
        ..BarcodeOptions::default()
    };
    assert!(Code128Encoder::new().encode("1", &opts).is_err());
}
