//! RGBA colors for tile tints and color overlay layers.

/// An RGBA colour packed into a `u32` (0xRRGGBBAA).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgba(pub u32);

/// One of the four channels of an [`Rgba`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    Red,
    Green,
    Blue,
    Alpha,
}

impl Channel {
    #[inline]
    const fn shift(self) -> u32 {
        match self {
            Channel::Red => 24,
            Channel::Green => 16,
            Channel::Blue => 8,
            Channel::Alpha => 0,
        }
    }
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self(0);
    /// Opaque white, the neutral tint.
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::from_rgb(0, 0, 0);

    /// Construct from individual RGBA components.
    #[inline]
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Construct an opaque colour from RGB components.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgba(r, g, b, 255)
    }

    /// Red component.
    #[inline]
    pub const fn r(self) -> u8 {
        self.channel(Channel::Red)
    }

    /// Green component.
    #[inline]
    pub const fn g(self) -> u8 {
        self.channel(Channel::Green)
    }

    /// Blue component.
    #[inline]
    pub const fn b(self) -> u8 {
        self.channel(Channel::Blue)
    }

    /// Alpha component.
    #[inline]
    pub const fn a(self) -> u8 {
        self.channel(Channel::Alpha)
    }

    /// Read a single channel.
    #[inline]
    pub const fn channel(self, c: Channel) -> u8 {
        ((self.0 >> c.shift()) & 0xFF) as u8
    }

    /// Return a copy with one channel replaced.
    #[inline]
    pub const fn with_channel(self, c: Channel, v: u8) -> Self {
        let mask = !(0xFFu32 << c.shift());
        Self((self.0 & mask) | ((v as u32) << c.shift()))
    }

    /// Return a copy with the alpha channel replaced.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        self.with_channel(Channel::Alpha, a)
    }

    /// Channel-wise linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgba::from_rgba(
            mix(self.r(), other.r()),
            mix(self.g(), other.g()),
            mix(self.b(), other.b()),
            mix(self.a(), other.a()),
        )
    }
}
