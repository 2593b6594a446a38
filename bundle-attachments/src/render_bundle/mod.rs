// Copyright (c) 2026 The bundle-attachments developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Admission checks for creating a render bundle encoder.
//!
//! A render bundle is recorded against a fixed attachment layout: the formats of its color
//! attachments, the format of its depth-stencil attachment, whether the depth and stencil
//! aspects are read-only and the sample count. Before an encoder is created, that layout is
//! described with an [`AttachmentStateRequest`] and passed to [`validate`], together with the
//! [`Limits`] of the device and a [`FormatLookup`] that knows the formats the device supports.
//!
//! Validation happens in three steps, and the first failure is returned:
//!
//! 1. Every format named by the request must be known to the lookup.
//! 2. The color attachments must fit the device limits, see [`check_count_and_budget`].
//! 3. Every format must be legal for its slot and the flags must be consistent, see
//!    [`check_legality`].
//!
//! Validation is a pure function of its inputs. It can run on any number of threads at once
//! with a shared lookup.

pub use self::{
    budget::{check_count_and_budget, color_attachment_bytes_per_sample, CountAndBudgetError},
    legality::{check_legality, LegalityError, SUPPORTED_SAMPLE_COUNTS},
};
use crate::{
    format::{Format, FormatLookup, FormatTable, UnknownFormat},
    Limits,
};
use smallvec::SmallVec;
use std::{
    error::Error,
    fmt::{Display, Error as FmtError, Formatter},
    sync::Arc,
};
use tracing::{debug, trace};

mod budget;
mod legality;

/// The attachment layout a render bundle encoder is requested for.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct AttachmentStateRequest {
    /// The formats of the color attachments, in slot order.
    ///
    /// If an element is `None`, the slot is not used.
    ///
    /// The default value is empty.
    pub color_formats: SmallVec<[Option<Format>; 8]>,

    /// The format of the depth-stencil attachment.
    ///
    /// If set to `None`, no depth-stencil attachment is used.
    ///
    /// The default value is `None`.
    pub depth_stencil_format: Option<Format>,

    /// Whether the recorded commands leave the depth aspect untouched.
    ///
    /// Ignored if `depth_stencil_format` is `None`.
    ///
    /// The default value is `false`.
    pub depth_read_only: bool,

    /// Whether the recorded commands leave the stencil aspect untouched.
    ///
    /// Ignored if `depth_stencil_format` is `None`.
    ///
    /// The default value is `false`.
    pub stencil_read_only: bool,

    /// The number of samples of every attachment.
    ///
    /// The default value is `1`.
    pub sample_count: u32,
}

impl Default for AttachmentStateRequest {
    #[inline]
    fn default() -> Self {
        Self {
            color_formats: SmallVec::new(),
            depth_stencil_format: None,
            depth_read_only: false,
            stencil_read_only: false,
            sample_count: 1,
        }
    }
}

impl AttachmentStateRequest {
    /// Returns a request with the given color attachments, all slots used.
    #[inline]
    pub fn color(formats: impl IntoIterator<Item = Format>) -> Self {
        Self {
            color_formats: formats.into_iter().map(Some).collect(),
            ..Default::default()
        }
    }

    /// Sets the depth-stencil attachment and its read-only flags.
    #[inline]
    pub fn with_depth_stencil(
        mut self,
        format: Format,
        depth_read_only: bool,
        stencil_read_only: bool,
    ) -> Self {
        self.depth_stencil_format = Some(format);
        self.depth_read_only = depth_read_only;
        self.stencil_read_only = stencil_read_only;
        self
    }

    #[inline]
    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    /// Returns every format named by the request: the used color slots, then the depth-stencil
    /// attachment.
    #[inline]
    pub fn formats(&self) -> impl Iterator<Item = Format> + '_ {
        self.color_formats
            .iter()
            .flatten()
            .chain(self.depth_stencil_format.as_ref())
            .copied()
    }
}

/// Checks whether a render bundle encoder can be created for `request`.
pub fn validate<L>(
    request: &AttachmentStateRequest,
    limits: &Limits,
    lookup: &L,
) -> Result<(), AttachmentStateError>
where
    L: FormatLookup + ?Sized,
{
    match validate_inner(request, limits, lookup) {
        Ok(bytes_per_sample) => {
            trace!(
                color_attachment_count = request.color_formats.len(),
                bytes_per_sample,
                "accepted render bundle attachment state"
            );

            Ok(())
        }
        Err(err) => {
            debug!(
                error = %err,
                color_attachment_count = request.color_formats.len(),
                depth_stencil_format = ?request.depth_stencil_format,
                "rejected render bundle attachment state"
            );

            Err(err)
        }
    }
}

fn validate_inner<L>(
    request: &AttachmentStateRequest,
    limits: &Limits,
    lookup: &L,
) -> Result<u64, AttachmentStateError>
where
    L: FormatLookup + ?Sized,
{
    for format in request.formats() {
        lookup.lookup(format)?;
    }

    let bytes_per_sample = budget::count_and_budget(&request.color_formats, limits, lookup)?;
    check_legality(request, lookup)?;

    Ok(bytes_per_sample)
}

/// The device side of render bundle encoder creation: the formats the device knows about and
/// its limits.
///
/// Cloning is cheap, and the format table is shared between clones.
#[derive(Clone, Debug)]
pub struct AttachmentValidator {
    formats: Arc<FormatTable>,
    limits: Limits,
}

impl AttachmentValidator {
    #[inline]
    pub fn new(formats: Arc<FormatTable>, limits: Limits) -> Self {
        Self { formats, limits }
    }

    #[inline]
    pub fn formats(&self) -> &Arc<FormatTable> {
        &self.formats
    }

    #[inline]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Checks whether a render bundle encoder can be created for `request` on this device.
    #[inline]
    pub fn validate_render_bundle_encoder(
        &self,
        request: &AttachmentStateRequest,
    ) -> Result<(), AttachmentStateError> {
        validate(request, &self.limits, self.formats.as_ref())
    }
}

impl Default for AttachmentValidator {
    /// Returns a validator for the core WebGPU formats and the default limits.
    #[inline]
    fn default() -> Self {
        Self::new(Arc::new(FormatTable::webgpu_core()), Limits::default())
    }
}

/// Error that can happen when validating the attachments of a render bundle encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttachmentStateError {
    /// A format named by the request is not in the format lookup.
    UnknownFormat { format: Format },

    /// The `max_color_attachments` limit has been exceeded.
    TooManyColorAttachments {
        color_attachment_count: usize,
        max: u32,
    },

    /// The `max_color_attachment_bytes_per_sample` limit has been exceeded.
    ColorAttachmentBytesPerSampleExceeded { bytes_per_sample: u64, max: u32 },

    /// A color attachment has a format that has no byte cost, because it can't be rendered to.
    FormatNotColorRenderable {
        attachment_index: u32,
        format: Format,
    },

    /// A color attachment has a format that can't be used as a color attachment.
    InvalidColorFormat {
        attachment_index: u32,
        format: Format,
    },

    /// The depth-stencil attachment has a format with neither a depth nor a stencil aspect.
    InvalidDepthStencilFormat { format: Format },

    /// There is no depth-stencil attachment and no color attachment is used.
    MissingAttachments,

    /// The depth-stencil format has both aspects, but only one of them was marked read-only.
    InconsistentReadOnlyFlags {
        format: Format,
        depth_read_only: bool,
        stencil_read_only: bool,
    },

    /// The sample count is not one of [`SUPPORTED_SAMPLE_COUNTS`].
    InvalidSampleCount { sample_count: u32 },
}

impl Error for AttachmentStateError {}

impl Display for AttachmentStateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::UnknownFormat { format } => write!(
                f,
                "the format `{}` is not recognized",
                format,
            ),
            Self::TooManyColorAttachments {
                color_attachment_count,
                max,
            } => write!(
                f,
                "{} color attachments were requested, but the `max_color_attachments` limit is {}",
                color_attachment_count, max,
            ),
            Self::ColorAttachmentBytesPerSampleExceeded {
                bytes_per_sample,
                max,
            } => write!(
                f,
                "the color attachments take up {} bytes per sample, but the \
                `max_color_attachment_bytes_per_sample` limit is {}",
                bytes_per_sample, max,
            ),
            Self::FormatNotColorRenderable {
                attachment_index,
                format,
            } => write!(
                f,
                "color attachment {} has the format `{}`, which has no render target byte cost",
                attachment_index, format,
            ),
            Self::InvalidColorFormat {
                attachment_index,
                format,
            } => write!(
                f,
                "color attachment {} has the format `{}`, which is not color-renderable",
                attachment_index, format,
            ),
            Self::InvalidDepthStencilFormat { format } => write!(
                f,
                "the depth-stencil attachment has the format `{}`, which has neither a depth nor \
                a stencil aspect",
                format,
            ),
            Self::MissingAttachments => write!(
                f,
                "no color attachment is used and there is no depth-stencil attachment",
            ),
            Self::InconsistentReadOnlyFlags {
                format,
                depth_read_only,
                stencil_read_only,
            } => write!(
                f,
                "the depth-stencil format `{}` has both aspects, but `depth_read_only` ({}) and \
                `stencil_read_only` ({}) differ",
                format, depth_read_only, stencil_read_only,
            ),
            Self::InvalidSampleCount { sample_count } => write!(
                f,
                "the sample count {} is not supported, it must be 1 or 4",
                sample_count,
            ),
        }
    }
}

impl From<UnknownFormat> for AttachmentStateError {
    #[inline]
    fn from(err: UnknownFormat) -> Self {
        Self::UnknownFormat { format: err.format }
    }
}

impl From<CountAndBudgetError> for AttachmentStateError {
    fn from(err: CountAndBudgetError) -> Self {
        match err {
            CountAndBudgetError::UnknownFormat { format } => Self::UnknownFormat { format },
            CountAndBudgetError::TooManyColorAttachments {
                color_attachment_count,
                max,
            } => Self::TooManyColorAttachments {
                color_attachment_count,
                max,
            },
            CountAndBudgetError::ColorAttachmentBytesPerSampleExceeded {
                bytes_per_sample,
                max,
            } => Self::ColorAttachmentBytesPerSampleExceeded {
                bytes_per_sample,
                max,
            },
            CountAndBudgetError::FormatNotColorRenderable {
                attachment_index,
                format,
            } => Self::FormatNotColorRenderable {
                attachment_index,
                format,
            },
        }
    }
}

impl From<LegalityError> for AttachmentStateError {
    fn from(err: LegalityError) -> Self {
        match err {
            LegalityError::UnknownFormat { format } => Self::UnknownFormat { format },
            LegalityError::InvalidColorFormat {
                attachment_index,
                format,
            } => Self::InvalidColorFormat {
                attachment_index,
                format,
            },
            LegalityError::InvalidDepthStencilFormat { format } => {
                Self::InvalidDepthStencilFormat { format }
            }
            LegalityError::MissingAttachments => Self::MissingAttachments,
            LegalityError::InconsistentReadOnlyFlags {
                format,
                depth_read_only,
                stencil_read_only,
            } => Self::InconsistentReadOnlyFlags {
                format,
                depth_read_only,
                stencil_read_only,
            },
            LegalityError::InvalidSampleCount { sample_count } => {
                Self::InvalidSampleCount { sample_count }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        color_attachment_bytes_per_sample, validate, AttachmentStateError,
        AttachmentStateRequest, AttachmentValidator,
    };
    use crate::{
        format::{Format, FormatTable},
        Limits,
    };
    use proptest::prelude::*;
    use std::{sync::Arc, thread};

    fn renderable_formats() -> Vec<Format> {
        Format::ALL
            .iter()
            .copied()
            .filter(|format| format.is_color_renderable())
            .collect()
    }

    fn combined_depth_stencil_formats() -> Vec<Format> {
        Format::ALL
            .iter()
            .copied()
            .filter(|format| format.info().is_combined_depth_stencil())
            .collect()
    }

    fn unlimited_bytes(max_color_attachments: u32) -> Limits {
        Limits {
            max_color_attachments,
            max_color_attachment_bytes_per_sample: u32::MAX,
        }
    }

    #[test]
    fn aligned_budget_example() {
        let validator = AttachmentValidator::default();

        let request = AttachmentStateRequest {
            color_formats: color_formats![R8Unorm, R32Float, Rgba8Unorm, Rgba32Float, R8Unorm],
            ..Default::default()
        };
        assert_eq!(
            validator.validate_render_bundle_encoder(&request),
            Err(AttachmentStateError::ColorAttachmentBytesPerSampleExceeded {
                bytes_per_sample: 33,
                max: 32,
            }),
        );

        let request = AttachmentStateRequest {
            color_formats: color_formats![R32Float, Rgba8Unorm, Rgba32Float, R8Unorm, R8Unorm],
            ..Default::default()
        };
        assert_eq!(validator.validate_render_bundle_encoder(&request), Ok(()));
    }

    #[test]
    fn unaligned_budget() {
        let validator = AttachmentValidator::default();

        // 4 * 8 = 32 bytes fits, 5 * 8 = 40 doesn't.
        let request = AttachmentStateRequest::color([Format::Rgba8Unorm; 4]);
        assert_eq!(validator.validate_render_bundle_encoder(&request), Ok(()));

        let request = AttachmentStateRequest::color([Format::Rgba8Unorm; 5]);
        assert!(matches!(
            validator.validate_render_bundle_encoder(&request),
            Err(AttachmentStateError::ColorAttachmentBytesPerSampleExceeded {
                bytes_per_sample: 40,
                ..
            }),
        ));
    }

    #[test]
    fn depth_stencil_only() {
        let validator = AttachmentValidator::default();

        assert_eq!(
            validator.validate_render_bundle_encoder(&AttachmentStateRequest::default()),
            Err(AttachmentStateError::MissingAttachments),
        );

        let request = AttachmentStateRequest::default().with_depth_stencil(
            Format::Depth24Plus,
            true,
            false,
        );
        assert_eq!(validator.validate_render_bundle_encoder(&request), Ok(()));
    }

    #[test]
    fn unknown_format_checked_first() {
        let formats = FormatTable::webgpu_core().without(Format::Depth24PlusStencil8);
        let validator = AttachmentValidator::new(
            Arc::new(formats),
            Limits {
                max_color_attachments: 1,
                ..Default::default()
            },
        );

        // Too many color attachments as well, but the unknown format wins.
        let request = AttachmentStateRequest::color([Format::R8Unorm, Format::R8Unorm])
            .with_depth_stencil(Format::Depth24PlusStencil8, false, false);
        assert_eq!(
            validator.validate_render_bundle_encoder(&request),
            Err(AttachmentStateError::UnknownFormat {
                format: Format::Depth24PlusStencil8,
            }),
        );
    }

    #[test]
    fn not_color_renderable_reported_by_budget() {
        let validator = AttachmentValidator::default();
        let request = AttachmentStateRequest::color([Format::Rgba8Unorm, Format::Depth16Unorm]);

        assert_eq!(
            validator.validate_render_bundle_encoder(&request),
            Err(AttachmentStateError::FormatNotColorRenderable {
                attachment_index: 1,
                format: Format::Depth16Unorm,
            }),
        );
    }

    #[test]
    fn color_format_in_depth_stencil_slot() {
        let validator = AttachmentValidator::default();

        let request = AttachmentStateRequest::color([Format::Rgba8Unorm]).with_depth_stencil(
            Format::Rgba8Unorm,
            false,
            false,
        );
        assert_eq!(
            validator.validate_render_bundle_encoder(&request),
            Err(AttachmentStateError::InvalidDepthStencilFormat {
                format: Format::Rgba8Unorm,
            }),
        );
    }

    #[test]
    fn sample_count() {
        let validator = AttachmentValidator::default();
        let request = AttachmentStateRequest::color([Format::Bgra8Unorm]);

        assert_eq!(
            validator.validate_render_bundle_encoder(&request.clone().with_sample_count(4)),
            Ok(()),
        );
        assert_eq!(
            validator.validate_render_bundle_encoder(&request.with_sample_count(2)),
            Err(AttachmentStateError::InvalidSampleCount { sample_count: 2 }),
        );
    }

    #[test]
    fn shared_between_threads() {
        let validator = AttachmentValidator::default();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let validator = validator.clone();
                thread::spawn(move || {
                    let request = AttachmentStateRequest::color([Format::Rgba16Float; 4])
                        .with_sample_count(if i % 2 == 0 { 1 } else { 4 });
                    validator.validate_render_bundle_encoder(&request)
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(()));
        }
    }

    #[test]
    fn error_display() {
        assert_eq!(
            AttachmentStateError::MissingAttachments.to_string(),
            "no color attachment is used and there is no depth-stencil attachment",
        );
        assert_eq!(
            AttachmentStateError::UnknownFormat {
                format: Format::Rgba8UnormSrgb
            }
            .to_string(),
            "the format `rgba8unorm-srgb` is not recognized",
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn request_from_config() {
        let request: AttachmentStateRequest = serde_json::from_str(
            r#"{
                "colorFormats": ["rgba8unorm", null, "r32float"],
                "depthStencilFormat": "depth24plus-stencil8",
                "depthReadOnly": true,
                "stencilReadOnly": true
            }"#,
        )
        .unwrap();

        assert_eq!(
            request,
            AttachmentStateRequest {
                color_formats: color_formats![Rgba8Unorm, _, R32Float],
                ..Default::default()
            }
            .with_depth_stencil(Format::Depth24PlusStencil8, true, true),
        );
        assert_eq!(request.sample_count, 1);
    }

    proptest! {
        #[test]
        fn count_limit_boundary(
            max_color_attachments in 0u32..=16,
            format in prop::sample::select(renderable_formats())
        ) {
            let lookup = FormatTable::webgpu_core();
            let limits = unlimited_bytes(max_color_attachments);

            let at_limit = AttachmentStateRequest::color(
                std::iter::repeat(format).take(max_color_attachments as usize),
            );
            let result = validate(&at_limit, &limits, &lookup);
            prop_assert!(
                !matches!(result, Err(AttachmentStateError::TooManyColorAttachments { .. })),
                "{:?}",
                result
            );

            let over_limit = AttachmentStateRequest::color(
                std::iter::repeat(format).take(max_color_attachments as usize + 1),
            );
            prop_assert_eq!(
                validate(&over_limit, &limits, &lookup),
                Err(AttachmentStateError::TooManyColorAttachments {
                    color_attachment_count: max_color_attachments as usize + 1,
                    max: max_color_attachments,
                })
            );
        }

        #[test]
        fn repeated_format_has_no_padding(
            format in prop::sample::select(renderable_formats()),
            count in 0usize..=32
        ) {
            let lookup = FormatTable::webgpu_core();
            let byte_cost = u64::from(format.target_pixel_byte_cost().unwrap());
            let formats: Vec<_> = std::iter::repeat(Some(format)).take(count).collect();

            prop_assert_eq!(
                color_attachment_bytes_per_sample(&formats, &lookup),
                Ok(byte_cost * count as u64)
            );
        }

        #[test]
        fn given_order_is_charged(
            formats in prop::collection::vec(prop::sample::select(renderable_formats()), 0..=8)
        ) {
            let lookup = FormatTable::webgpu_core();

            let mut sorted = formats.clone();
            sorted.sort_by_key(|format| {
                std::cmp::Reverse(format.target_component_alignment().unwrap())
            });

            let packed: u64 = formats
                .iter()
                .map(|format| u64::from(format.target_pixel_byte_cost().unwrap()))
                .sum();
            let given = color_attachment_bytes_per_sample(
                &formats.iter().copied().map(Some).collect::<Vec<_>>(),
                &lookup,
            )
            .unwrap();
            let reordered = color_attachment_bytes_per_sample(
                &sorted.iter().copied().map(Some).collect::<Vec<_>>(),
                &lookup,
            )
            .unwrap();

            prop_assert_eq!(reordered, packed);
            prop_assert!(given >= packed);

            // With a budget of exactly the packed size, the sorted order always passes and the
            // given order passes only if it needs no padding.
            let limits = Limits {
                max_color_attachments: 8,
                max_color_attachment_bytes_per_sample: packed as u32,
            };
            if !sorted.is_empty() {
                prop_assert_eq!(
                    validate(&AttachmentStateRequest::color(sorted), &limits, &lookup),
                    Ok(())
                );
                prop_assert_eq!(
                    validate(&AttachmentStateRequest::color(formats), &limits, &lookup).is_ok(),
                    given == packed
                );
            }
        }

        #[test]
        fn combined_read_only_flags(
            format in prop::sample::select(combined_depth_stencil_formats()),
            color in prop::option::of(prop::sample::select(renderable_formats())),
            depth_read_only in any::<bool>(),
            stencil_read_only in any::<bool>()
        ) {
            let lookup = FormatTable::webgpu_core();
            let request = AttachmentStateRequest::color(color)
                .with_depth_stencil(format, depth_read_only, stencil_read_only);
            let result = validate(&request, &Limits::default(), &lookup);

            if depth_read_only == stencil_read_only {
                prop_assert_eq!(result, Ok(()));
            } else {
                prop_assert_eq!(
                    result,
                    Err(AttachmentStateError::InconsistentReadOnlyFlags {
                        format,
                        depth_read_only,
                        stencil_read_only,
                    })
                );
            }
        }

        #[test]
        fn read_only_flags_ignored_without_depth_stencil(
            format in prop::sample::select(renderable_formats()),
            depth_read_only in any::<bool>(),
            stencil_read_only in any::<bool>()
        ) {
            let lookup = FormatTable::webgpu_core();
            let request = AttachmentStateRequest {
                depth_read_only,
                stencil_read_only,
                ..AttachmentStateRequest::color([format])
            };

            prop_assert_eq!(validate(&request, &Limits::default(), &lookup), Ok(()));
        }

        #[test]
        fn validation_is_idempotent(
            color_formats in prop::collection::vec(
                prop::option::of(prop::sample::select(Format::ALL)),
                0..=10,
            ),
            depth_stencil_format in prop::option::of(prop::sample::select(Format::ALL)),
            depth_read_only in any::<bool>(),
            stencil_read_only in any::<bool>(),
            sample_count in prop::sample::select(vec![0u32, 1, 2, 4, 8])
        ) {
            let lookup = FormatTable::webgpu_core();
            let request = AttachmentStateRequest {
                color_formats: color_formats.into_iter().collect(),
                depth_stencil_format,
                depth_read_only,
                stencil_read_only,
                sample_count,
            };

            let first = validate(&request, &Limits::default(), &lookup);
            let second = validate(&request, &Limits::default(), &lookup);
            prop_assert_eq!(first, second);
        }
    }
}
