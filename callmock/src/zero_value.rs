// vim: tw=80
//! Zero values returned by mocks with [`Strictness::ZeroValue`].
//!
//! [`Strictness::ZeroValue`]: crate::Strictness::ZeroValue

use std::{
    collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque},
    hash::BuildHasher,
    marker::PhantomData,
    rc::Rc,
    sync::Arc
};

/// A type's "nothing configured" value: `0`, `false`, an empty string or
/// collection, `None`, or `Ok` of the inner zero value.
pub trait ZeroValue {
    fn zero_value() -> Self;
}

macro_rules! zero_value_default {
    ($($t:ty),* $(,)?) => {
        $(
            impl ZeroValue for $t {
                fn zero_value() -> Self {
                    <$t>::default()
                }
            }
        )*
    }
}

zero_value_default!(
    (), bool, char, String,
    i8, i16, i32, i64, i128, isize,
    u8, u16, u32, u64, u128, usize,
    f32, f64,
);

impl<T> ZeroValue for Vec<T> {
    fn zero_value() -> Self {
        Vec::new()
    }
}

impl<T> ZeroValue for VecDeque<T> {
    fn zero_value() -> Self {
        VecDeque::new()
    }
}

impl<T> ZeroValue for Option<T> {
    fn zero_value() -> Self {
        None
    }
}

impl<K, V> ZeroValue for BTreeMap<K, V> {
    fn zero_value() -> Self {
        BTreeMap::new()
    }
}

impl<T> ZeroValue for BTreeSet<T> {
    fn zero_value() -> Self {
        BTreeSet::new()
    }
}

impl<K, V, S: BuildHasher + Default> ZeroValue for HashMap<K, V, S> {
    fn zero_value() -> Self {
        HashMap::default()
    }
}

impl<T, S: BuildHasher + Default> ZeroValue for HashSet<T, S> {
    fn zero_value() -> Self {
        HashSet::default()
    }
}

impl<T: ZeroValue> ZeroValue for Box<T> {
    fn zero_value() -> Self {
        Box::new(T::zero_value())
    }
}

impl<T: ZeroValue> ZeroValue for Arc<T> {
    fn zero_value() -> Self {
        Arc::new(T::zero_value())
    }
}

impl<T: ZeroValue> ZeroValue for Rc<T> {
    fn zero_value() -> Self {
        Rc::new(T::zero_value())
    }
}

/// A `Result` is zero when it succeeded with a zero value.
impl<T: ZeroValue, E> ZeroValue for Result<T, E> {
    fn zero_value() -> Self {
        Ok(T::zero_value())
    }
}

impl<T: ZeroValue, const N: usize> ZeroValue for [T; N] {
    fn zero_value() -> Self {
        std::array::from_fn(|_| T::zero_value())
    }
}

macro_rules! zero_value_tuple {
    ($($t:ident),+) => {
        impl<$($t: ZeroValue),+> ZeroValue for ($($t,)+) {
            fn zero_value() -> Self {
                ($($t::zero_value(),)+)
            }
        }
    }
}

zero_value_tuple!(A);
zero_value_tuple!(A, B);
zero_value_tuple!(A, B, C);
zero_value_tuple!(A, B, C, D);
zero_value_tuple!(A, B, C, D, E);
zero_value_tuple!(A, B, C, D, E, F);

/// Produces a method's zero value, if its output type has one.
///
/// Generated code calls `(&ZeroReturner::<O>::new()).return_zero()` with both
/// [`ReturnZero`] and [`NoZeroValue`] in scope.  Method resolution prefers
/// `ReturnZero`, which only applies when `O: ZeroValue`.
#[doc(hidden)]
pub struct ZeroReturner<O>(PhantomData<fn() -> O>);

impl<O> ZeroReturner<O> {
    pub fn new() -> Self {
        ZeroReturner(PhantomData)
    }
}

impl<O> Default for ZeroReturner<O> {
    fn default() -> Self {
        ZeroReturner::new()
    }
}

#[doc(hidden)]
pub trait ReturnZero<O> {
    fn return_zero(&self) -> Option<O>;
}

impl<O: ZeroValue> ReturnZero<O> for ZeroReturner<O> {
    fn return_zero(&self) -> Option<O> {
        Some(O::zero_value())
    }
}

#[doc(hidden)]
pub trait NoZeroValue<O> {
    fn return_zero(&self) -> Option<O>;
}

impl<O> NoZeroValue<O> for &ZeroReturner<O> {
    fn return_zero(&self) -> Option<O> {
        None
    }
}

#[cfg(test)]
mod t {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct NoZero(u32);

    #[test]
    fn primitives() {
        assert_eq!(0u64, u64::zero_value());
        assert_eq!(0.0f64, f64::zero_value());
        assert!(!bool::zero_value());
        assert_eq!('\0', char::zero_value());
        assert_eq!(String::new(), String::zero_value());
    }

    #[test]
    fn containers() {
        assert!(Vec::<u8>::zero_value().is_empty());
        assert!(HashMap::<u32, u32>::zero_value().is_empty());
        assert_eq!(None, Option::<NoZero>::zero_value());
        assert_eq!([0u8; 4], <[u8; 4]>::zero_value());
        assert_eq!((0u8, String::new()), <(u8, String)>::zero_value());
    }

    #[test]
    fn result_is_ok() {
        assert_eq!(Ok(Vec::new()), Result::<Vec<u8>, NoZero>::zero_value());
        assert_eq!(Ok(()), Result::<(), String>::zero_value());
    }

    #[test]
    fn returner_with_zero() {
        assert_eq!(Some(0u32), (&ZeroReturner::<u32>::new()).return_zero());
    }

    #[test]
    fn returner_without_zero() {
        assert_eq!(None, (&ZeroReturner::<NoZero>::new()).return_zero());
    }
}
