// Copyright (c) 2026 The bundle-attachments developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! The color attachment count and bytes-per-sample budget.
//!
//! One sample of every color attachment is laid out in memory in attachment order. Each
//! attachment starts at the next multiple of its component alignment, so a small attachment
//! followed by a more strictly aligned one leaves padding behind it. That padding counts toward
//! the budget. Reordering the attachments can remove it, but that is up to the caller: the
//! order given is the order that gets charged.

use crate::{
    format::{ColorTargetCost, Format, FormatLookup, UnknownFormat},
    Limits,
};
use std::{
    error::Error,
    fmt::{Display, Error as FmtError, Formatter},
};

/// Checks the number of color attachments and their aligned bytes per sample against `limits`.
///
/// `None` entries are unused slots. They count toward
/// [`max_color_attachments`](Limits::max_color_attachments) but take up no bytes.
pub fn check_count_and_budget<L>(
    color_formats: &[Option<Format>],
    limits: &Limits,
    lookup: &L,
) -> Result<(), CountAndBudgetError>
where
    L: FormatLookup + ?Sized,
{
    count_and_budget(color_formats, limits, lookup).map(|_| ())
}

/// Same as [`check_count_and_budget`], but returns the bytes per sample on success.
pub(crate) fn count_and_budget<L>(
    color_formats: &[Option<Format>],
    limits: &Limits,
    lookup: &L,
) -> Result<u64, CountAndBudgetError>
where
    L: FormatLookup + ?Sized,
{
    let &Limits {
        max_color_attachments,
        max_color_attachment_bytes_per_sample,
    } = limits;

    if color_formats.len() > max_color_attachments as usize {
        return Err(CountAndBudgetError::TooManyColorAttachments {
            color_attachment_count: color_formats.len(),
            max: max_color_attachments,
        });
    }

    let bytes_per_sample = color_attachment_bytes_per_sample(color_formats, lookup)?;

    if bytes_per_sample > u64::from(max_color_attachment_bytes_per_sample) {
        return Err(CountAndBudgetError::ColorAttachmentBytesPerSampleExceeded {
            bytes_per_sample,
            max: max_color_attachment_bytes_per_sample,
        });
    }

    Ok(bytes_per_sample)
}

/// Returns the number of bytes one sample occupies across `color_formats`, including the
/// padding needed to align each attachment, in the order given.
pub fn color_attachment_bytes_per_sample<L>(
    color_formats: &[Option<Format>],
    lookup: &L,
) -> Result<u64, CountAndBudgetError>
where
    L: FormatLookup + ?Sized,
{
    let mut offset: u64 = 0;

    for (attachment_index, format) in color_formats
        .iter()
        .enumerate()
        .filter_map(|(index, format)| format.map(|format| (index, format)))
    {
        let attachment_index = attachment_index as u32;

        let ColorTargetCost {
            byte_cost,
            component_alignment,
        } = lookup.lookup(format)?.color_target().ok_or(
            CountAndBudgetError::FormatNotColorRenderable {
                attachment_index,
                format,
            },
        )?;

        offset = offset.next_multiple_of(u64::from(component_alignment.max(1)));
        offset += u64::from(byte_cost);
    }

    Ok(offset)
}

/// Error that can happen when checking the color attachment count and bytes per sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CountAndBudgetError {
    /// A color attachment format is not in the format lookup.
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
}

impl Error for CountAndBudgetError {}

impl Display for CountAndBudgetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self {
            Self::UnknownFormat { format } => {
                write!(f, "the color attachment format `{}` is not recognized", format)
            }
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
        }
    }
}

impl From<UnknownFormat> for CountAndBudgetError {
    #[inline]
    fn from(err: UnknownFormat) -> Self {
        Self::UnknownFormat { format: err.format }
    }
}
