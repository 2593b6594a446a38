// Copyright (c) 2026 The bundle-attachments developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Texture formats and the capability metadata the validator needs about them.
//!
//! A format is identified by a [`Format`] value. Its WebGPU identifier string (`"r8unorm"`,
//! `"depth24plus-stencil8"`, ...) round-trips through [`Format::name`] and [`str::parse`].
//!
//! # Format capabilities
//!
//! The validator does not reason about formats directly. It asks a [`FormatLookup`] for the
//! [`FormatInfo`] of each format, which reports:
//!
//! - the *aspects* of the format: color, depth, stencil, or depth and stencil combined;
//! - whether the format can be used as a color attachment;
//! - for color-renderable formats, the *render target pixel byte cost* and the *render target
//!   component alignment*. These two numbers drive the bytes-per-sample budget check.
//!
//! A lookup that has no entry for a format treats it as unknown, and any request mentioning it
//! is rejected. [`FormatTable::webgpu_core`] gives the table for the core WebGPU formats. A
//! device that reports its own capabilities can build a [`FormatTable`] from an iterator
//! instead.
//!
//! # Depth/stencil formats
//!
//! Some formats have only a depth or stencil aspect, while others combine both. Only combined
//! formats constrain the read-only flags of a depth-stencil attachment, because for a single
//! aspect format the flag of the missing aspect has nothing to apply to.

use foldhash::HashMap;
use std::{
    error::Error,
    fmt::{Display, Error as FmtError, Formatter},
};

formats! {
    /// A texture format that may appear in an attachment slot.
    Format;

    R8Unorm = "r8unorm",
    R8Snorm = "r8snorm",
    R8Uint = "r8uint",
    R8Sint = "r8sint",

    R16Uint = "r16uint",
    R16Sint = "r16sint",
    R16Float = "r16float",
    Rg8Unorm = "rg8unorm",
    Rg8Snorm = "rg8snorm",
    Rg8Uint = "rg8uint",
    Rg8Sint = "rg8sint",

    R32Uint = "r32uint",
    R32Sint = "r32sint",
    R32Float = "r32float",
    Rg16Uint = "rg16uint",
    Rg16Sint = "rg16sint",
    Rg16Float = "rg16float",
    Rgba8Unorm = "rgba8unorm",
    Rgba8UnormSrgb = "rgba8unorm-srgb",
    Rgba8Snorm = "rgba8snorm",
    Rgba8Uint = "rgba8uint",
    Rgba8Sint = "rgba8sint",
    Bgra8Unorm = "bgra8unorm",
    Bgra8UnormSrgb = "bgra8unorm-srgb",
    Rgb9e5Ufloat = "rgb9e5ufloat",
    Rgb10a2Uint = "rgb10a2uint",
    Rgb10a2Unorm = "rgb10a2unorm",
    Rg11b10Ufloat = "rg11b10ufloat",

    Rg32Uint = "rg32uint",
    Rg32Sint = "rg32sint",
    Rg32Float = "rg32float",
    Rgba16Uint = "rgba16uint",
    Rgba16Sint = "rgba16sint",
    Rgba16Float = "rgba16float",

    Rgba32Uint = "rgba32uint",
    Rgba32Sint = "rgba32sint",
    Rgba32Float = "rgba32float",

    /// Stencil only.
    Stencil8 = "stencil8",
    /// Depth only.
    Depth16Unorm = "depth16unorm",
    /// Depth only, with at least 24 bits of precision.
    Depth24Plus = "depth24plus",
    /// Combined depth and stencil.
    Depth24PlusStencil8 = "depth24plus-stencil8",
    /// Depth only.
    Depth32Float = "depth32float",
    /// Combined depth and stencil.
    Depth32FloatStencil8 = "depth32float-stencil8",

    Bc1RgbaUnorm = "bc1-rgba-unorm",
    Bc1RgbaUnormSrgb = "bc1-rgba-unorm-srgb",
    Bc7RgbaUnorm = "bc7-rgba-unorm",
    Etc2Rgb8Unorm = "etc2-rgb8unorm",
    Astc4x4Unorm = "astc-4x4-unorm",
}

format_bitflags! {
    /// The aspects of a format.
    FormatAspects(u8);

    /// The format stores color data.
    COLOR = 1 << 0,

    /// The format stores depth data.
    DEPTH = 1 << 1,

    /// The format stores stencil data.
    STENCIL = 1 << 2,
}

impl Format {
    /// The largest number that can be returned by [`Self::target_pixel_byte_cost`].
    pub const MAX_TARGET_PIXEL_BYTE_COST: u32 = 16;

    /// Returns the aspects of the format.
    pub const fn aspects(self) -> FormatAspects {
        match self {
            Self::Stencil8 => FormatAspects::STENCIL,
            Self::Depth16Unorm | Self::Depth24Plus | Self::Depth32Float => FormatAspects::DEPTH,
            Self::Depth24PlusStencil8 | Self::Depth32FloatStencil8 => {
                FormatAspects::DEPTH.union(FormatAspects::STENCIL)
            }
            _ => FormatAspects::COLOR,
        }
    }

    /// Returns whether the format can be used as a color attachment.
    #[inline]
    pub const fn is_color_renderable(self) -> bool {
        self.target_pixel_byte_cost().is_some()
    }

    /// Returns the number of bytes one sample of the format occupies in a color attachment, or
    /// `None` if the format is not color-renderable.
    ///
    /// `rgba8unorm`, `rgba8unorm-srgb`, `bgra8unorm` and `bgra8unorm-srgb` store 4 bytes per
    /// texel but cost 8 bytes per sample as a render target.
    pub const fn target_pixel_byte_cost(self) -> Option<u32> {
        match self {
            Self::R8Unorm | Self::R8Uint | Self::R8Sint => Some(1),
            Self::Rg8Unorm
            | Self::Rg8Uint
            | Self::Rg8Sint
            | Self::R16Uint
            | Self::R16Sint
            | Self::R16Float => Some(2),
            Self::Rgba8Uint
            | Self::Rgba8Sint
            | Self::Rg16Uint
            | Self::Rg16Sint
            | Self::Rg16Float
            | Self::R32Uint
            | Self::R32Sint
            | Self::R32Float => Some(4),
            Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Bgra8Unorm
            | Self::Bgra8UnormSrgb
            | Self::Rgba16Uint
            | Self::Rgba16Sint
            | Self::Rgba16Float
            | Self::Rg32Uint
            | Self::Rg32Sint
            | Self::Rg32Float
            | Self::Rgb10a2Uint
            | Self::Rgb10a2Unorm => Some(8),
            Self::Rgba32Uint | Self::Rgba32Sint | Self::Rgba32Float => Some(16),
            Self::R8Snorm
            | Self::Rg8Snorm
            | Self::Rgba8Snorm
            | Self::Rgb9e5Ufloat
            | Self::Rg11b10Ufloat
            | Self::Stencil8
            | Self::Depth16Unorm
            | Self::Depth24Plus
            | Self::Depth24PlusStencil8
            | Self::Depth32Float
            | Self::Depth32FloatStencil8
            | Self::Bc1RgbaUnorm
            | Self::Bc1RgbaUnormSrgb
            | Self::Bc7RgbaUnorm
            | Self::Etc2Rgb8Unorm
            | Self::Astc4x4Unorm => None,
        }
    }

    /// Returns the alignment, in bytes, that the first byte of the format must have within a
    /// sample of the color attachments, or `None` if the format is not color-renderable.
    pub const fn target_component_alignment(self) -> Option<u32> {
        match self {
            Self::R8Unorm
            | Self::R8Uint
            | Self::R8Sint
            | Self::Rg8Unorm
            | Self::Rg8Uint
            | Self::Rg8Sint
            | Self::Rgba8Unorm
            | Self::Rgba8UnormSrgb
            | Self::Rgba8Uint
            | Self::Rgba8Sint
            | Self::Bgra8Unorm
            | Self::Bgra8UnormSrgb => Some(1),
            Self::R16Uint
            | Self::R16Sint
            | Self::R16Float
            | Self::Rg16Uint
            | Self::Rg16Sint
            | Self::Rg16Float
            | Self::Rgba16Uint
            | Self::Rgba16Sint
            | Self::Rgba16Float => Some(2),
            Self::R32Uint
            | Self::R32Sint
            | Self::R32Float
            | Self::Rg32Uint
            | Self::Rg32Sint
            | Self::Rg32Float
            | Self::Rgba32Uint
            | Self::Rgba32Sint
            | Self::Rgba32Float
            | Self::Rgb10a2Uint
            | Self::Rgb10a2Unorm => Some(4),
            Self::R8Snorm
            | Self::Rg8Snorm
            | Self::Rgba8Snorm
            | Self::Rgb9e5Ufloat
            | Self::Rg11b10Ufloat
            | Self::Stencil8
            | Self::Depth16Unorm
            | Self::Depth24Plus
            | Self::Depth24PlusStencil8
            | Self::Depth32Float
            | Self::Depth32FloatStencil8
            | Self::Bc1RgbaUnorm
            | Self::Bc1RgbaUnormSrgb
            | Self::Bc7RgbaUnorm
            | Self::Etc2Rgb8Unorm
            | Self::Astc4x4Unorm => None,
        }
    }

    /// Returns the capability record of the format as defined by core WebGPU.
    pub const fn info(self) -> FormatInfo {
        match (
            self.target_pixel_byte_cost(),
            self.target_component_alignment(),
        ) {
            (Some(byte_cost), Some(component_alignment)) => {
                FormatInfo::color(byte_cost, component_alignment)
            }
            _ => FormatInfo::not_color_renderable(self.aspects()),
        }
    }
}

/// The byte cost and alignment of a color-renderable format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorTargetCost {
    /// Number of bytes one sample occupies.
    pub byte_cost: u32,

    /// Required alignment of the first byte. A power of two that divides `byte_cost`.
    pub component_alignment: u32,
}

/// The capabilities of a single format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatInfo {
    aspects: FormatAspects,
    color_target: Option<ColorTargetCost>,
}

impl FormatInfo {
    /// A color-renderable format with the given byte cost and alignment.
    #[inline]
    pub const fn color(byte_cost: u32, component_alignment: u32) -> Self {
        Self {
            aspects: FormatAspects::COLOR,
            color_target: Some(ColorTargetCost {
                byte_cost,
                component_alignment,
            }),
        }
    }

    /// A format with the given aspects that can't be used as a color attachment.
    #[inline]
    pub const fn not_color_renderable(aspects: FormatAspects) -> Self {
        Self {
            aspects,
            color_target: None,
        }
    }

    #[inline]
    pub const fn aspects(&self) -> FormatAspects {
        self.aspects
    }

    #[inline]
    pub const fn is_color_renderable(&self) -> bool {
        self.color_target.is_some()
    }

    /// Returns the byte cost and alignment, if the format is color-renderable.
    #[inline]
    pub const fn color_target(&self) -> Option<ColorTargetCost> {
        self.color_target
    }

    #[inline]
    pub const fn has_depth(&self) -> bool {
        self.aspects.intersects(FormatAspects::DEPTH)
    }

    #[inline]
    pub const fn has_stencil(&self) -> bool {
        self.aspects.intersects(FormatAspects::STENCIL)
    }

    /// Returns whether the format has both a depth and a stencil aspect.
    #[inline]
    pub const fn is_combined_depth_stencil(&self) -> bool {
        self.aspects
            .contains(FormatAspects::DEPTH.union(FormatAspects::STENCIL))
    }
}

/// A source of per-format capability metadata.
///
/// Implementations must be deterministic: the same format always yields the same answer.
pub trait FormatLookup {
    /// Returns the capabilities of `format`, or `None` if the format is not recognized.
    fn format_info(&self, format: Format) -> Option<&FormatInfo>;

    /// Returns the capabilities of `format`, or an error if the format is not recognized.
    #[inline]
    fn lookup(&self, format: Format) -> Result<&FormatInfo, UnknownFormat> {
        self.format_info(format).ok_or(UnknownFormat { format })
    }
}

impl<T> FormatLookup for &T
where
    T: FormatLookup + ?Sized,
{
    #[inline]
    fn format_info(&self, format: Format) -> Option<&FormatInfo> {
        (**self).format_info(format)
    }
}

impl<T> FormatLookup for std::sync::Arc<T>
where
    T: FormatLookup + ?Sized,
{
    #[inline]
    fn format_info(&self, format: Format) -> Option<&FormatInfo> {
        (**self).format_info(format)
    }
}

/// An immutable-after-construction map from formats to their capabilities.
#[derive(Clone, Debug, Default)]
pub struct FormatTable {
    infos: HashMap<Format, FormatInfo>,
}

impl FormatTable {
    /// Returns an empty table, in which every format is unknown.
    #[inline]
    pub fn new() -> Self {
        Self {
            infos: HashMap::default(),
        }
    }

    /// Returns a table holding every format of [`Format::ALL`] with its core WebGPU
    /// capabilities.
    pub fn webgpu_core() -> Self {
        Format::ALL
            .iter()
            .map(|&format| (format, format.info()))
            .collect()
    }

    /// Adds or replaces the entry for `format`.
    #[inline]
    pub fn insert(&mut self, format: Format, info: FormatInfo) -> Option<FormatInfo> {
        self.infos.insert(format, info)
    }

    /// Returns the table with the entry for `format` removed.
    #[inline]
    pub fn without(mut self, format: Format) -> Self {
        self.infos.remove(&format);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.infos.len()
    }

    #[inline]
    pub fn contains(&self, format: Format) -> bool {
        self.infos.contains_key(&format)
    }

    /// Iterates over the entries of the table, in no particular order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Format, &FormatInfo)> {
        self.infos.iter().map(|(&format, info)| (format, info))
    }
}

impl FromIterator<(Format, FormatInfo)> for FormatTable {
    fn from_iter<I: IntoIterator<Item = (Format, FormatInfo)>>(iter: I) -> Self {
        Self {
            infos: iter.into_iter().collect(),
        }
    }
}

impl FormatLookup for FormatTable {
    #[inline]
    fn format_info(&self, format: Format) -> Option<&FormatInfo> {
        self.infos.get(&format)
    }
}

/// A format was not found in the format lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownFormat {
    pub format: Format,
}

impl Error for UnknownFormat {}

impl Display for UnknownFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "the format `{}` is not recognized", self.format)
    }
}

/// A string was not the identifier of any known format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseFormatError {
    pub name: String,
}

impl Error for ParseFormatError {}

impl Display for ParseFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        write!(f, "`{}` is not the name of a known format", self.name)
    }
}
