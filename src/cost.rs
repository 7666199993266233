/// The cost of traversing edges in a search space.
///
/// Costs must form a total order and support saturating addition so path
/// costs never wrap around. `max_value()` is reserved as the "unreachable"
/// marker.
pub trait Cost:
    Copy
    + std::fmt::Debug
    + std::fmt::Display
    + PartialEq
    + core::cmp::Eq
    + PartialOrd
    + Ord
    + num_traits::SaturatingAdd
    + num_traits::bounds::UpperBounded
    + num_traits::Zero
    + num_traits::One
    + std::ops::Add<Self, Output = Self>
    + std::ops::Sub<Self, Output = Self>
    + std::ops::AddAssign
{
    #[inline(always)]
    fn valid(&self) -> bool {
        *self != num_traits::bounds::UpperBounded::max_value()
    }
}

impl Cost for u8 {}
impl Cost for u16 {}
impl Cost for u32 {}
impl Cost for u64 {}
impl Cost for usize {}

#[cfg(test)]
mod tests {
    use super::*;

    use num_traits::SaturatingAdd;
    use num_traits::Zero;

    #[test]
    fn max_is_invalid() {
        assert!(0u32.valid());
        assert!(!u32::MAX.valid());
        assert!(!u8::MAX.valid());
    }

    #[test]
    fn saturates() {
        let c: u16 = u16::MAX - 1;
        let sum = SaturatingAdd::saturating_add(&c, &5);
        assert_eq!(sum, u16::MAX);
        assert!(!sum.valid());
        assert!(u64::zero().valid());
    }
}
