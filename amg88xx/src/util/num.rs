// SPDX-License-Identifier: Apache-2.0
// Copyright © 2021 Will Ross

use core::cmp;
use core::fmt::Debug;
use core::ops;

/// A trait for numbers that can be converted into a number used in the [`calculations`] module.
///
/// This is a blend of [`num_traits::NumCast`] in that the conversions to *not* need to be precise,
/// and [`From`] in that the conversions are infallible. Another reason for this trait (and its
/// choice in naming) is to be easier to use than `T::from(value)`, which needs to be disambiguated
/// each time because of the previously mentioned traits.
///
/// [`calculations`]: crate::calculations
pub trait Coerce<T> {
    /// Convert
    fn coerce(value: T) -> Self;
}

impl<T> Coerce<T> for T {
    fn coerce(value: T) -> Self {
        value
    }
}

/// Implement [`Coerce`] for the given type using `as` to cast primitives.
macro_rules! impl_coerce {
    (as $dest:ty, $source:ty) => {
        impl Coerce<$source> for $dest {
            fn coerce(value: $source) -> Self {
                value as $dest
            }
        }
    };
    (as $dest:ty, $($source:ty),+) => {
        $(impl_coerce!(as $dest, $source);)+
    };
}
impl_coerce!(as f32, i16, u16, f64);
impl_coerce!(as f64, i16, u16, f32);

/// The floating point types temperatures can be calculated in.
pub trait Num:
    Copy
    + Debug
    + cmp::PartialEq
    + cmp::PartialOrd
    + num_traits::NumOps
    + ops::Neg<Output = Self>
    + Coerce<i16>
    + Coerce<u16>
{
    /// Positive zero.
    const ZERO: Self;

    /// The number 20.0.
    const TWENTY: Self;

    /// Degrees Celsius per LSB of a pixel (and of the interrupt levels), 0.25 ℃.
    const PIXEL_RESOLUTION: Self;

    /// Degrees Celsius per LSB of the thermistor, 0.0625 ℃.
    const THERMISTOR_RESOLUTION: Self;

    /// A wrapper around [`Coerce`] to allow using a turbofish to disambiguate types.
    fn coerce_from<T>(value: T) -> Self
    where
        Self: Coerce<T>,
    {
        <Self as Coerce<T>>::coerce(value)
    }

    /// Truncate towards zero, saturating at the bounds of `i32` (and mapping NaN to 0).
    fn truncate(self) -> i32;
}

/// Implements [`Num`] for the given builtin float type.
macro_rules! impl_num {
    ($typ:ty) => {
        impl Num for $typ {
            const ZERO: Self = 0.0;

            const TWENTY: Self = 20.0;

            const PIXEL_RESOLUTION: Self = 0.25;

            const THERMISTOR_RESOLUTION: Self = 0.0625;

            fn truncate(self) -> i32 {
                // Float to int `as` casts truncate and saturate.
                self as i32
            }
        }
    };
}
impl_num!(f32);
impl_num!(f64);
