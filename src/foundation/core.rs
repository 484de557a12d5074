use crate::foundation::error::{CardError, CardResult};

/// Pixel offset from the template origin (top-left).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    /// Horizontal offset in pixels.
    pub x: u32,
    /// Vertical offset in pixels.
    pub y: u32,
}

impl Offset {
    /// Construct an offset.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Width/height pair in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Construct a size, rejecting zero-area values.
    pub fn new(width: u32, height: u32) -> CardResult<Self> {
        if width == 0 || height == 0 {
            return Err(CardError::validation(format!(
                "size must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Largest size with the aspect ratio of `self` that fits inside `bounds`.
    ///
    /// The scale is uniform; each side is rounded and clamped to `[1, bound]`.
    pub fn contain_within(self, bounds: Size) -> Size {
        let sx = f64::from(bounds.width) / f64::from(self.width);
        let sy = f64::from(bounds.height) / f64::from(self.height);
        let scale = sx.min(sy);

        let fit = |side: u32, bound: u32| -> u32 {
            let v = (f64::from(side) * scale).round();
            (v as u32).clamp(1, bound)
        };

        Size {
            width: fit(self.width, bounds.width),
            height: fit(self.height, bounds.height),
        }
    }
}

/// Fixed coordinate set of the card template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardLayout {
    /// Box the avatar is contained within.
    pub avatar_box: Size,
    /// Top-left of the avatar.
    pub avatar_at: Offset,
    /// Registration number line.
    pub registration_at: Offset,
    /// Holder name line.
    pub name_at: Offset,
    /// Father's name line.
    pub father_name_at: Offset,
    /// Phone number line.
    pub phone_at: Offset,
    /// Top-left of the barcode.
    pub barcode_at: Offset,
}

impl CardLayout {
    /// The one supported template layout.
    pub const STANDARD: CardLayout = CardLayout {
        avatar_box: Size {
            width: 152,
            height: 197,
        },
        avatar_at: Offset::new(560, 160),
        registration_at: Offset::new(200, 160),
        name_at: Offset::new(200, 190),
        father_name_at: Offset::new(200, 251),
        phone_at: Offset::new(200, 282),
        barcode_at: Offset::new(30, 370),
    };
}

impl Default for CardLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
