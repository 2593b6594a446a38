// Copyright (c) 2026 The bundle-attachments developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

use super::AttachmentStateRequest;
use crate::format::{Format, FormatLookup, UnknownFormat};
use std::{
    error::Error,
    fmt::{Display, Error as FmtError, Formatter},
};

/// Sample counts a render bundle encoder can be created with.
pub const SUPPORTED_SAMPLE_COUNTS: [u32; 2] = [1, 4];

/// Checks that every attachment format of `request` fits its slot, and that the depth-stencil
/// read-only flags and the sample count are consistent.
pub fn check_legality<L>(
    request: &AttachmentStateRequest,
    lookup: &L,
) -> Result<(), LegalityError>
where
    L: FormatLookup + ?Sized,
{
    let &AttachmentStateRequest {
        ref color_formats,
        depth_stencil_format,
        depth_read_only,
        stencil_read_only,
        sample_count,
    } = request;

    for (attachment_index, format) in color_formats
        .iter()
        .enumerate()
        .filter_map(|(index, format)| format.map(|format| (index, format)))
    {
        let attachment_index = attachment_index as u32;

        if !lookup.lookup(format)?.is_color_renderable() {
            return Err(LegalityError::InvalidColorFormat {
                attachment_index,
                format,
            });
        }
    }

    if let Some(format) = depth_stencil_format {
        let info = lookup.lookup(format)?;

        if !(info.has_depth() || info.has_stencil()) {
            return Err(LegalityError::InvalidDepthStencilFormat { format });
        }

        // Only matters when both aspects exist; otherwise the flag of the missing aspect is
        // ignored.
        if info.is_combined_depth_stencil() && depth_read_only != stencil_read_only {
            return Err(LegalityError::InconsistentReadOnlyFlags {
                format,
                depth_read_only,
                stencil_read_only,
            });
        }
    } else if color_formats.iter().all(Option::is_none) {
        return Err(LegalityError::MissingAttachments);
    }

    if !SUPPORTED_SAMPLE_COUNTS.contains(&sample_count) {
        return Err(LegalityError::InvalidSampleCount { sample_count });
    }

    Ok(())
}

/// Error that can happen when checking the formats and flags of the attachments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LegalityError {
    /// An attachment format is not in the format lookup.
    UnknownFormat { format: Format },

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

impl Error for LegalityError {}

impl Display for LegalityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::UnknownFormat { format } => {
                write!(f, "the attachment format `{}` is not recognized", format)
            }
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

impl From<UnknownFormat> for LegalityError {
    #[inline]
    fn from(err: UnknownFormat) -> Self {
        Self::UnknownFormat { format: err.format }
    }
}
