use std::sync::Arc;

use image::{RgbaImage, imageops::FilterType};

use crate::{
    assets::{avatar::Avatar, font::BitmapFont, store::AssetStore},
    barcode::{BarcodeEncoder, BarcodeOptions, BarcodeRaster},
    fields::CardFields,
    foundation::{
        core::{CardLayout, Size},
        error::{CardError, CardResult, CompositionStage},
    },
    render::{composite::blit_over, text::draw_text},
};

/// Scale `img` uniformly so it fits inside `bounds` without cropping.
pub fn contain(img: &RgbaImage, bounds: Size) -> CardResult<RgbaImage> {
    let src = Size::new(img.width(), img.height())
        .map_err(|e| CardError::composition(CompositionStage::Avatar, e.to_string()))?;
    let target = src.contain_within(bounds);
    if target == src {
        return Ok(img.clone());
    }
    Ok(image::imageops::resize(
        img,
        target.width,
        target.height,
        FilterType::Triangle,
    ))
}

/// Composes cards on the fixed template layout.
#[derive(Clone)]
pub struct Compositor {
    layout: CardLayout,
    encoder: Arc<dyn BarcodeEncoder>,
    barcode: BarcodeOptions,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("layout", &self.layout)
            .field("barcode", &self.barcode)
            .finish_non_exhaustive()
    }
}

impl Compositor {
    /// Compositor on [`CardLayout::STANDARD`] with default barcode options.
    pub fn new(encoder: Arc<dyn BarcodeEncoder>) -> Self {
        Self {
            layout: CardLayout::STANDARD,
            encoder,
            barcode: BarcodeOptions::default(),
        }
    }

    /// Override barcode rendering options.
    pub fn with_barcode_options(mut self, opts: BarcodeOptions) -> Self {
        self.barcode = opts;
        self
    }

    /// Layout in use.
    pub fn layout(&self) -> &CardLayout {
        &self.layout
    }

    /// Encode the barcode for `fields` and compose the full card.
    #[tracing::instrument(skip_all, fields(registration = fields.registration_number()))]
    pub fn compose_card(
        &self,
        assets: &AssetStore,
        avatar: &Avatar,
        fields: &CardFields,
    ) -> CardResult<RgbaImage> {
        let barcode = self
            .encoder
            .encode(fields.registration_number(), &self.barcode)
            .map_err(|e| match e {
                e @ CardError::Composition { .. } => e,
                other => CardError::composition(CompositionStage::Barcode, other.to_string()),
            })?;
        if barcode.payload != fields.registration_number() {
            return Err(CardError::composition(
                CompositionStage::Barcode,
                format!(
                    "encoder returned payload {:?}, expected {:?}",
                    barcode.payload,
                    fields.registration_number()
                ),
            ));
        }
        self.compose(assets.template(), assets.font(), avatar, fields, &barcode)
    }

    /// Compose a card from already prepared parts.
    ///
    /// `template` and `font` are only read; drawing happens on a private copy
    /// that is returned.
    pub fn compose(
        &self,
        template: &RgbaImage,
        font: &BitmapFont,
        avatar: &Avatar,
        fields: &CardFields,
        barcode: &BarcodeRaster,
    ) -> CardResult<RgbaImage> {
        let l = &self.layout;
        let photo = contain(&avatar.image, l.avatar_box)?;

        let mut card = template.clone();
        blit_over(&mut card, &photo, l.avatar_at);

        for (at, text) in [
            (l.registration_at, fields.registration_number()),
            (l.name_at, fields.name()),
            (l.father_name_at, fields.father_name()),
            (l.phone_at, fields.phone()),
        ] {
            draw_text(&mut card, font, at, text)?;
        }

        blit_over(&mut card, &barcode.image, l.barcode_at);

        tracing::debug!(
            avatar = %avatar.source.display(),
            photo_width = photo.width(),
            photo_height = photo.height(),
            "card composed"
        );
        Ok(card)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
