// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

use std::io::Write;

use kernel::debug::IoWrite;

/// Writer is used by kernel::debug to print to the host's standard output.
pub struct Writer;

/// Global static for debug writer
pub static WRITER: Writer = Writer;

impl IoWrite for Writer {
    fn write(&self, buf: &[u8]) -> usize {
        let mut stdout = std::io::stdout().lock();
        match stdout.write_all(buf) {
            Ok(()) => buf.len(),
            Err(_) => 0,
        }
    }
}
