// Copyright (c) 2026 The bundle-attachments developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

/// The device limits that constrain the attachments of a render bundle encoder.
///
/// The values are reported by the device and stay the same for the lifetime of a validation
/// call. The default value holds the limits every WebGPU device is guaranteed to support.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Limits {
    /// The maximum number of color attachment slots, including unused slots.
    ///
    /// The default value is `8`.
    pub max_color_attachments: u32,

    /// The maximum number of bytes one sample may occupy across all color attachments, once
    /// each attachment has been placed at its required alignment.
    ///
    /// The default value is `32`.
    pub max_color_attachment_bytes_per_sample: u32,
}

impl Limits {
    /// Returns the limits every WebGPU device is guaranteed to support.
    #[inline]
    pub const fn webgpu_defaults() -> Self {
        Self {
            max_color_attachments: 8,
            max_color_attachment_bytes_per_sample: 32,
        }
    }

    /// Returns whether every limit of `self` is at least as permissive as the same limit of
    /// `other`.
    #[inline]
    pub const fn satisfies(&self, other: &Limits) -> bool {
        self.max_color_attachments >= other.max_color_attachments
            && self.max_color_attachment_bytes_per_sample
                >= other.max_color_attachment_bytes_per_sample
    }
}

impl Default for Limits {
    #[inline]
    fn default() -> Self {
        Self::webgpu_defaults()
    }
}
