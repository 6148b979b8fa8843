//! User-visible messages emitted by cart operations.
//!
//! Rendering belongs to the host UI; the session only decides which message
//! goes out and hands it to a `ToastSink`.

use std::borrow::Cow;

use crate::types::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: Cow<'static, str>,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Message shown after `operation` succeeds. Updates and reads are silent.
    pub fn succeeded(operation: Operation) -> Option<Self> {
        match operation {
            Operation::Add => Some(Self::new(ToastKind::Success, "Product added to cart!")),
            Operation::Remove => Some(Self::new(ToastKind::Info, "Product removed from cart")),
            Operation::Update | Operation::Fetch => None,
        }
    }

    /// Message shown after `operation` fails. Reads fail silently.
    pub fn failed(operation: Operation) -> Option<Self> {
        let message = match operation {
            Operation::Add => "Failed to add product to cart",
            Operation::Remove => "Failed to remove product from cart",
            Operation::Update => "Failed to update cart",
            Operation::Fetch => return None,
        };
        Some(Self::new(ToastKind::Error, message))
    }
}

/// Receives toasts for display.
pub trait ToastSink {
    fn show(&self, toast: Toast);
}

/// Discards every toast.
impl ToastSink for () {
    fn show(&self, _toast: Toast) {}
}

impl<F: Fn(Toast)> ToastSink for F {
    fn show(&self, toast: Toast) {
        self(toast)
    }
}
