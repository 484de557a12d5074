//! On-demand identity card compositing with short-lived PNG output.
//!
//! A card is a fixed background template with four pieces drawn onto a private
//! copy of it: an avatar photo scaled to fit its box, four lines of bitmap-font
//! text, and a Code 128 barcode of the registration number.
//!
//! # Pipeline overview
//!
//! 1. **Fields**: a [`FieldSource`] produces name, father's name, phone and registration number.
//! 2. **Avatar**: [`AvatarLoader`] picks and decodes a photo from the pool directory.
//! 3. **Compose**: [`Compositor`] draws everything onto a clone of the template.
//! 4. **Persist**: [`OutputStore`] publishes the PNG as `id_card_<id>.png` without clobbering.
//! 5. **Expire**: [`RetentionTask`] periodically deletes artifacts older than the TTL.
//!
//! Template and font are loaded once into an immutable [`AssetStore`] before the
//! HTTP router from [`create_router`] starts serving.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod api;
mod assets;
mod barcode;
mod fields;
mod foundation;
mod output;
mod render;
mod service;

pub use api::handlers::{BANNER, result_page};
pub use api::routes::create_router;
pub use api::{ApiError, AppState};
pub use assets::avatar::{Avatar, AvatarLoader};
pub use assets::decode::{decode_image, encode_png, read_image};
pub use assets::font::{BitmapFont, FontDescriptor, Glyph};
pub use assets::store::{AssetSources, AssetStore, normalize_rel_path};
pub use barcode::{BarcodeEncoder, BarcodeOptions, BarcodeRaster, Code128Encoder, Symbology};
pub use fields::{
    CardFields, FieldSource, FixedFieldSource, RandomFieldSource, RegistrationNumber, SERIAL_MAX,
    SERIAL_MIN,
};
pub use foundation::core::{CardLayout, Offset, Size};
pub use foundation::error::{CardError, CardResult, CompositionStage};
pub use output::retention::{RetentionPolicy, RetentionTask, sweep_once};
pub use output::store::{ArtifactId, OutputStore, SweepReport};
pub use render::composite::{SrcRect, blit_over, blit_rect_over, over};
pub use render::compositor::{Compositor, contain};
pub use render::text::{draw_text, draw_text_centered};
pub use service::{CardGenerationService, ServiceConfig, SweepMode};

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
