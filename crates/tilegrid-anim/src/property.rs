//! Animatable properties and the [`Animatable`] trait.
//!
//! Properties form a closed set resolved by name when an animation starts,
//! which keeps the scheduler type-safe while still accepting string names
//! from a scripting or data layer.

use std::fmt;
use std::str::FromStr;

use tilegrid_core::{Channel, Error, Rgba};

/// A numeric property an animation can drive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Property {
    X,
    Y,
    Width,
    Height,
    Scale,
    Opacity,
    /// One channel of the target's color, in `0..=255`.
    Color(Channel),
}

impl Property {
    pub const ALL: [Property; 10] = [
        Property::X,
        Property::Y,
        Property::Width,
        Property::Height,
        Property::Scale,
        Property::Opacity,
        Property::Color(Channel::Red),
        Property::Color(Channel::Green),
        Property::Color(Channel::Blue),
        Property::Color(Channel::Alpha),
    ];

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::Width => "w",
            Property::Height => "h",
            Property::Scale => "scale",
            Property::Opacity => "opacity",
            Property::Color(Channel::Red) => "r",
            Property::Color(Channel::Green) => "g",
            Property::Color(Channel::Blue) => "b",
            Property::Color(Channel::Alpha) => "a",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Property {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let p = match s.to_ascii_lowercase().as_str() {
            "x" => Property::X,
            "y" => Property::Y,
            "w" | "width" => Property::Width,
            "h" | "height" => Property::Height,
            "scale" | "zoom" => Property::Scale,
            "opacity" => Property::Opacity,
            "r" | "red" => Property::Color(Channel::Red),
            "g" | "green" => Property::Color(Channel::Green),
            "b" | "blue" => Property::Color(Channel::Blue),
            "a" | "alpha" => Property::Color(Channel::Alpha),
            _ => return Err(Error::invalid(format!("unknown property `{s}`"))),
        };
        Ok(p)
    }
}

/// An object whose numeric properties can be animated.
pub trait Animatable {
    /// Current value of `property`, or `None` if the object does not
    /// expose it.
    fn get(&self, property: Property) -> Option<f32>;

    /// Write `value` to `property`. Unsupported properties are ignored.
    fn set(&mut self, property: Property, value: f32);

    /// Whether `value` is a legal final value for `property`. Animations
    /// towards a rejected value are refused when they start.
    fn accepts(&self, property: Property, value: f32) -> bool {
        let _ = (property, value);
        true
    }
}

/// Read a color channel as an animation value.
pub fn channel_value(color: Rgba, channel: Channel) -> f32 {
    color.channel(channel) as f32
}

/// Write an animation value into a color channel, rounding and clamping.
pub fn with_channel_value(color: Rgba, channel: Channel, value: f32) -> Rgba {
    color.with_channel(channel, value.round().clamp(0.0, 255.0) as u8)
}

/// A generic drawable: position, size, scale, opacity and color.
///
/// Stands in for sprites, captions and frames owned by a rendering layer.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Visual {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
    pub opacity: f32,
    pub color: Rgba,
}

impl Default for Visual {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            scale: 1.0,
            opacity: 1.0,
            color: Rgba::WHITE,
        }
    }
}

impl Visual {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }
}

impl Animatable for Visual {
    fn get(&self, property: Property) -> Option<f32> {
        Some(match property {
            Property::X => self.x,
            Property::Y => self.y,
            Property::Width => self.width,
            Property::Height => self.height,
            Property::Scale => self.scale,
            Property::Opacity => self.opacity,
            Property::Color(c) => channel_value(self.color, c),
        })
    }

    fn set(&mut self, property: Property, value: f32) {
        match property {
            Property::X => self.x = value,
            Property::Y => self.y = value,
            Property::Width => self.width = value,
            Property::Height => self.height = value,
            Property::Scale => self.scale = value,
            Property::Opacity => self.opacity = value,
            Property::Color(c) => self.color = with_channel_value(self.color, c, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for p in Property::ALL {
            assert_eq!(p.name().parse::<Property>().unwrap(), p);
        }
        assert_eq!("Width".parse::<Property>().unwrap(), Property::Width);
        assert!("rotation".parse::<Property>().is_err());
    }

    #[test]
    fn visual_exposes_every_property() {
        let mut v = Visual::default();
        for p in Property::ALL {
            assert!(v.get(p).is_some(), "{p}");
        }
        v.set(Property::Color(Channel::Green), 300.0);
        assert_eq!(v.color.g(), 255);
        v.set(Property::Color(Channel::Alpha), 127.6);
        assert_eq!(v.color.a(), 128);
        v.set(Property::X, 4.5);
        assert_eq!(v.get(Property::X), Some(4.5));
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn visual_round_trip() {
        let mut v = Visual::at(2.0, -1.5);
        v.set(Property::Color(Channel::Blue), 40.0);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(serde_json::from_str::<Visual>(&json).unwrap(), v);
    }
}
