// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for board-agnostic debug output.
//!
//! Usage
//! -----
//!
//! ```rust,ignore
//! debug!("Yes the code gets here with value {}", i);
//! debug_verbose!("got here"); // Includes message count, file, and line.
//! ```
//!
//! Output goes through a [`DebugWriter`] the board registers with
//! [`set_debug_writer`]. Until a writer is registered all debug output is
//! discarded, so capsules can log unconditionally.
//!
//! The sink is called synchronously. Boards whose output device is slow must
//! buffer inside their [`IoWrite`] implementation; code on the pulse timing
//! path does not log at all.

use core::fmt::{self, Write};
use core::ptr;
use core::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

/// Byte sink for debug output.
pub trait IoWrite {
    /// Write as much of `buf` as possible and return how many bytes were
    /// accepted.
    fn write(&self, buf: &[u8]) -> usize;
}

/// Formats debug messages into an [`IoWrite`] sink.
pub struct DebugWriter {
    sink: &'static dyn IoWrite,
    count: AtomicUsize,
    dropped: AtomicUsize,
}

impl DebugWriter {
    pub const fn new(sink: &'static dyn IoWrite) -> DebugWriter {
        DebugWriter {
            sink,
            count: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
        }
    }

    /// Number of messages written so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }

    /// Number of bytes the sink refused.
    pub fn dropped_bytes(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    fn write_line(&self, args: fmt::Arguments, file_line: Option<&(&'static str, u32)>) {
        let count = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        let mut line = LineWriter(self);
        if let Some((file, line_number)) = file_line {
            let _ = write!(line, "SERVO_DEBUG {}: {}:{}: ", count, file, line_number);
        }
        let _ = line.write_fmt(args);
        let _ = line.write_str("\r\n");
    }
}

struct LineWriter<'a>(&'a DebugWriter);

impl Write for LineWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let written = self.0.sink.write(bytes);
        if written < bytes.len() {
            self.0
                .dropped
                .fetch_add(bytes.len() - written, Ordering::Relaxed);
        }
        Ok(())
    }
}

static DEBUG_WRITER: AtomicPtr<DebugWriter> = AtomicPtr::new(ptr::null_mut());

/// Register the writer used by `debug!` and `debug_verbose!`.
pub fn set_debug_writer(writer: &'static DebugWriter) {
    DEBUG_WRITER.store(
        writer as *const DebugWriter as *mut DebugWriter,
        Ordering::Release,
    );
}

/// The registered writer, if any.
pub fn debug_writer() -> Option<&'static DebugWriter> {
    let writer = DEBUG_WRITER.load(Ordering::Acquire);
    // Safety: the pointer is either null or was stored by `set_debug_writer`
    // from a `&'static DebugWriter`, and it is never written through.
    unsafe { writer.as_ref() }
}

pub fn debug_println(args: fmt::Arguments) {
    if let Some(writer) = debug_writer() {
        writer.write_line(args, None);
    }
}

pub fn debug_verbose_println(args: fmt::Arguments, file_line: &(&'static str, u32)) {
    if let Some(writer) = debug_writer() {
        writer.write_line(args, Some(file_line));
    }
}

/// In-kernel `println()` debugging.
#[macro_export]
macro_rules! debug {
    () => ({
        // Allow an empty debug!() to print the location when hit
        debug!("")
    });
    ($($arg:tt)+) => ({
        $crate::debug::debug_println(format_args!($($arg)+))
    });
}

/// In-kernel `println()` debugging that includes the message count, file,
/// and line.
#[macro_export]
macro_rules! debug_verbose {
    () => ({
        debug_verbose!("")
    });
    ($($arg:tt)+) => ({
        $crate::debug::debug_verbose_println(
            format_args!($($arg)+),
            {
                static _FILE_LINE: (&'static str, u32) = (file!(), line!());
                &_FILE_LINE
            },
        )
    });
}
