// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Support for statically initializing objects in memory.

/// Allocates a static buffer for a value of type `$T`, moves `$e` into it and
/// returns a `&'static mut` reference to it.
///
/// Each use of the macro owns exactly one buffer. Because the buffer is a
/// static item, `$T` cannot name generic parameters of the enclosing
/// function.
///
/// # Safety
///
/// The buffer is written without a lock. The code containing a given use of
/// the macro must run at most once; running it again overwrites the first
/// value without dropping it while references to it may still be live.
#[macro_export]
macro_rules! static_init {
    ($T:ty, $e:expr $(,)?) => {{
        let buf = $crate::static_buf!($T);
        buf.write($e)
    }};
}

/// Allocates a static buffer for a value of type `$T` without initializing
/// it, and returns it as a `&'static mut MaybeUninit<$T>`.
///
/// The same safety requirements as [`static_init!`] apply.
#[macro_export]
macro_rules! static_buf {
    ($T:ty $(,)?) => {{
        static mut BUF: core::mem::MaybeUninit<$T> = core::mem::MaybeUninit::uninit();
        &mut *core::ptr::addr_of_mut!(BUF)
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn initialized_value_lives_in_its_own_buffer() {
        fn make(value: u32) -> &'static mut u32 {
            unsafe { static_init!(u32, value) }
        }
        let first: &'static mut u32 = make(7);
        assert_eq!(*first, 7);
        *first += 1;
        assert_eq!(*first, 8);

        let other: &'static u64 = unsafe { static_init!(u64, 11) };
        assert_eq!(*other, 11);
    }
}
