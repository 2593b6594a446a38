// Copyright (c) 2026 The bundle-attachments developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Attachment-state validation for render bundle encoders.
//!
//! A render bundle is a pre-recorded sequence of draw commands that can be replayed inside any
//! render pass with a matching attachment layout. The layout is fixed when the render bundle
//! encoder is created, and this crate decides whether a requested layout may be used on a
//! device.
//!
//! # Brief summary
//!
//! - A [`Format`](crate::format::Format) identifies a texture format. A
//!   [`FormatLookup`](crate::format::FormatLookup), usually a
//!   [`FormatTable`](crate::format::FormatTable), reports what each format can do on the
//!   device.
//!
//! - [`Limits`] holds the device limits that apply to attachments: how many color attachments
//!   there may be, and how many bytes one sample of all of them may take up.
//!
//! - An [`AttachmentStateRequest`](crate::render_bundle::AttachmentStateRequest) describes the
//!   layout a render bundle encoder is requested for.
//!
//! - [`validate`](crate::render_bundle::validate) checks a request, or
//!   [`AttachmentValidator`](crate::render_bundle::AttachmentValidator) bundles a shared format
//!   table with the limits of a device and does the same.
//!
//! Validation never changes any state. An invalid request is an ordinary outcome, reported as
//! an [`AttachmentStateError`](crate::render_bundle::AttachmentStateError).
//!
//! ```
//! use bundle_attachments::{
//!     format::Format,
//!     render_bundle::{AttachmentStateError, AttachmentStateRequest, AttachmentValidator},
//! };
//!
//! let validator = AttachmentValidator::default();
//!
//! let request = AttachmentStateRequest::color([Format::Bgra8Unorm])
//!     .with_depth_stencil(Format::Depth24PlusStencil8, true, true);
//! assert!(validator.validate_render_bundle_encoder(&request).is_ok());
//!
//! let request = AttachmentStateRequest::default();
//! assert_eq!(
//!     validator.validate_render_bundle_encoder(&request),
//!     Err(AttachmentStateError::MissingAttachments),
//! );
//! ```
//!
//! # Cargo features
//!
//! - `serde`: implements `Serialize` and `Deserialize` for formats, format capabilities,
//!   limits and requests, using the WebGPU spelling of names, so that they can be read from
//!   configuration files.

pub use crate::{
    limits::Limits,
    render_bundle::{validate, AttachmentStateError, AttachmentStateRequest, AttachmentValidator},
};

#[macro_use]
mod macros;
pub mod format;
mod limits;
pub mod render_bundle;
