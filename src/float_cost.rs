use std::cmp::Eq;
use std::fmt::Debug;

use derive_more::Display;
use num_traits::One;
use num_traits::SaturatingAdd;
use num_traits::Zero;
use num_traits::bounds::UpperBounded;
use ordered_float::FloatCore;
use ordered_float::OrderedFloat;

use crate::cost::Cost;

/// A real-valued `Cost`.
///
/// Backed by `OrderedFloat` so it's totally ordered. Infinity doubles as the
/// "unreachable" marker, so saturating addition is plain addition.
#[derive(Copy, Clone, Default, Debug, Display)]
#[repr(transparent)]
#[display("${_0}")]
pub struct FloatCost<F: FloatCore>(pub OrderedFloat<F>);

pub type F64Cost = FloatCost<f64>;

impl<F> Cost for FloatCost<F>
where
    FloatCost<F>: Debug + std::ops::AddAssign + Ord + Eq + UpperBounded,
    F: FloatCore + std::fmt::Display,
{
}

impl<F> FloatCost<F>
where
    F: FloatCore,
{
    pub fn new(f: F) -> Self {
        Self(OrderedFloat(f))
    }

    #[inline(always)]
    pub fn get(&self) -> F {
        self.0.0
    }

    #[inline(always)]
    pub fn infinity() -> Self {
        Self(OrderedFloat::infinity())
    }
}

impl<F: FloatCore> From<F> for FloatCost<F> {
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

/// Forwards a binary operator to `OrderedFloat`.
macro_rules! forward_binop {
    ($op:ident, $method:ident) => {
        impl<F> std::ops::$op for FloatCost<F>
        where
            OrderedFloat<F>: std::ops::$op<Output = OrderedFloat<F>>,
            F: FloatCore,
        {
            type Output = Self;
            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                Self(std::ops::$op::$method(self.0, rhs.0))
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);

impl<F> std::ops::AddAssign for FloatCost<F>
where
    OrderedFloat<F>: std::ops::AddAssign,
    F: FloatCore,
{
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}
impl<F> SaturatingAdd for FloatCost<F>
where
    OrderedFloat<F>: std::ops::Add<OrderedFloat<F>, Output = OrderedFloat<F>>,
    F: FloatCore,
{
    /// Overflowing yields infinity already.
    fn saturating_add(&self, rhs: &Self) -> Self {
        *self + *rhs
    }
}

impl<F> Zero for FloatCost<F>
where
    F: FloatCore,
{
    #[inline(always)]
    fn is_zero(&self) -> bool {
        self.0 == OrderedFloat::zero()
    }
    #[inline(always)]
    fn zero() -> Self {
        Self(OrderedFloat::zero())
    }
}
impl<F> One for FloatCost<F>
where
    F: FloatCore,
{
    #[inline(always)]
    fn one() -> Self {
        Self(OrderedFloat::one())
    }
}
impl<F> UpperBounded for FloatCost<F>
where
    F: FloatCore,
{
    fn max_value() -> Self {
        Self::infinity()
    }
}

impl<F> PartialOrd for FloatCost<F>
where
    F: FloatCore,
{
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.0.cmp(&other.0))
    }
}
impl<F> Ord for FloatCost<F>
where
    OrderedFloat<F>: Ord,
    F: FloatCore,
{
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}
impl<F> PartialEq for FloatCost<F>
where
    F: FloatCore,
{
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}
impl<F> Eq for FloatCost<F> where F: FloatCore {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_valid() {
        assert!(F64Cost::zero().is_zero());
        assert!(F64Cost::zero().valid());
        assert!(!F64Cost::infinity().valid());
    }

    #[test]
    fn accumulates() {
        let mut f = FloatCost::new(0.5f32);
        f += FloatCost::new(1.0f32);
        assert_eq!(f.get(), 1.5f32);
        assert!(f < FloatCost::new(2.0f32));
        f += FloatCost::infinity();
        assert!(f == FloatCost::max_value());
    }

    #[test]
    fn is_a_cost() {
        fn unit<C: Cost>() -> C {
            C::one()
        }
        assert_eq!(unit::<F64Cost>(), F64Cost::new(1.0));
        assert_eq!(F64Cost::new(1.5) * F64Cost::new(2.0), F64Cost::new(3.0));
    }

    #[test]
    fn displays_with_sigil() {
        assert_eq!(F64Cost::new(2.5).to_string(), "$2.5");
    }
}
