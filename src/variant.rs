//! Tagged unions over a closed set of alternative types
//!
//! `VariantN<..>` holds exactly one value of one of its `N` alternatives. The
//! held alternative can be accessed
//!
//!  - by type ([`Variant2::get`], [`Variant2::holds_alternative`]), which
//!    requires the alternatives to be `'static`;
//!  - by index ([`Variant2::get_at`]) through [`Alternative`]; or
//!  - by a [`Visitor`] that handles every alternative and produces the same
//!    output type for all of them.
//!
//! # Examples
//!
//! ```
//! use rbkit::variant::{visit, Variant2, Visitor};
//!
//! struct Double;
//!
//! impl Visitor<i32> for Double {
//!     type Output = f64;
//!     fn visit(&mut self, x: &i32) -> f64 {
//!         f64::from(*x) * 2.0
//!     }
//! }
//!
//! impl Visitor<f32> for Double {
//!     type Output = f64;
//!     fn visit(&mut self, x: &f32) -> f64 {
//!         f64::from(*x) * 2.0
//!     }
//! }
//!
//! let mut v = Variant2::<i32, f32>::new_at::<0>(3);
//! assert_eq!(v.index(), 0);
//! assert_eq!(v.get::<i32>(), Ok(&3));
//! assert!(v.get::<f32>().is_err());
//! assert_eq!(visit(Double, &v), 6.0);
//!
//! v = Variant2::V1(0.25);
//! assert_eq!(v.visit(Double), 0.5);
//! ```
use core::any::{Any, TypeId};

#[cfg(test)]
mod tests;

/// Indicates that a variant was accessed as an alternative it doesn't hold.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[cfg_attr(
    feature = "std",
    error("bad variant access: alternative {held} is held")
)]
pub struct BadVariantAccess {
    /// The index of the alternative held at the time of access.
    pub held: usize,
}

/// Index-based access to the `I`-th alternative of a variant.
pub trait Alternative<const I: usize>: Sized {
    /// The type of the alternative.
    type Type;

    fn from_alternative(value: Self::Type) -> Self;

    /// Get the alternative if it's the one currently held.
    fn alternative(&self) -> Option<&Self::Type>;

    /// Ditto, mutably.
    fn alternative_mut(&mut self) -> Option<&mut Self::Type>;
}

/// A function object that can be applied to a `T`.
///
/// A visitor for a variant implements this trait for every alternative with
/// the same `Output`.
pub trait Visitor<T: ?Sized> {
    type Output;

    fn visit(&mut self, value: &T) -> Self::Output;
}

/// Like [`Visitor`], but receives the value mutably.
pub trait VisitorMut<T: ?Sized> {
    type Output;

    fn visit_mut(&mut self, value: &mut T) -> Self::Output;
}

/// Something that a `V` can visit.
pub trait Visitable<V> {
    type Output;

    fn accept(&self, visitor: V) -> Self::Output;
}

/// Apply `visitor` to the alternative held by `variant`.
#[inline]
pub fn visit<T: Visitable<V> + ?Sized, V>(visitor: V, variant: &T) -> T::Output {
    variant.accept(visitor)
}

macro_rules! define_variant {
	(
		$( #[$meta:meta] )*
		pub enum $ident:ident $gens:tt {
			$( $idx:literal => $variant:ident($ty:ident) ),+ $(,)?
		}
	) => {
		$( #[$meta] )*
		#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
		pub enum $ident<$( $ty ),+> {
			$( $variant($ty) ),+
		}

		impl<$( $ty ),+> $ident<$( $ty ),+> {
			/// The number of alternatives.
			pub const ARITY: usize = [$( $idx ),+].len();

			/// Get the index of the held alternative.
			#[inline]
			pub fn index(&self) -> usize {
				match self {
					$( Self::$variant(_) => $idx, )+
				}
			}

			/// Construct the variant holding the `I`-th alternative.
			#[inline]
			pub fn new_at<const I: usize>(value: <Self as Alternative<I>>::Type) -> Self
			where
				Self: Alternative<I>,
			{
				<Self as Alternative<I>>::from_alternative(value)
			}

			/// Get the `I`-th alternative.
			#[inline]
			pub fn get_at<const I: usize>(
				&self,
			) -> Result<&<Self as Alternative<I>>::Type, BadVariantAccess>
			where
				Self: Alternative<I>,
			{
				let held = self.index();
				<Self as Alternative<I>>::alternative(self).ok_or(BadVariantAccess { held })
			}

			#[inline]
			pub fn get_at_mut<const I: usize>(
				&mut self,
			) -> Result<&mut <Self as Alternative<I>>::Type, BadVariantAccess>
			where
				Self: Alternative<I>,
			{
				let held = self.index();
				<Self as Alternative<I>>::alternative_mut(self).ok_or(BadVariantAccess { held })
			}

			/// Get the `I`-th alternative if it's held.
			#[inline]
			pub fn get_if_at<const I: usize>(&self) -> Option<&<Self as Alternative<I>>::Type>
			where
				Self: Alternative<I>,
			{
				<Self as Alternative<I>>::alternative(self)
			}

			#[inline]
			pub fn get_if_at_mut<const I: usize>(
				&mut self,
			) -> Option<&mut <Self as Alternative<I>>::Type>
			where
				Self: Alternative<I>,
			{
				<Self as Alternative<I>>::alternative_mut(self)
			}

			/// Apply `visitor` to the held alternative.
			#[inline]
			pub fn visit<V, R>(&self, mut visitor: V) -> R
			where
				$( V: Visitor<$ty, Output = R>, )+
			{
				match self {
					$( Self::$variant(x) => Visitor::<$ty>::visit(&mut visitor, x), )+
				}
			}

			#[inline]
			pub fn visit_mut<V, R>(&mut self, mut visitor: V) -> R
			where
				$( V: VisitorMut<$ty, Output = R>, )+
			{
				match self {
					$( Self::$variant(x) => VisitorMut::<$ty>::visit_mut(&mut visitor, x), )+
				}
			}
		}

		/// # Type-based Access
		///
		/// When more than one alternative has the requested type, these
		/// methods match any of them.
		impl<$( $ty: 'static ),+> $ident<$( $ty ),+> {
			/// Return `true` if the held alternative is of type `U`.
			#[inline]
			pub fn holds_alternative<U: 'static>(&self) -> bool {
				match self {
					$( Self::$variant(_) => TypeId::of::<$ty>() == TypeId::of::<U>(), )+
				}
			}

			/// Get the held value as `U`.
			#[inline]
			pub fn get<U: 'static>(&self) -> Result<&U, BadVariantAccess> {
				let held = self.index();
				self.get_if().ok_or(BadVariantAccess { held })
			}

			#[inline]
			pub fn get_mut<U: 'static>(&mut self) -> Result<&mut U, BadVariantAccess> {
				let held = self.index();
				self.get_if_mut().ok_or(BadVariantAccess { held })
			}

			/// Get the held value as `U` if it is a `U`.
			#[inline]
			pub fn get_if<U: 'static>(&self) -> Option<&U> {
				match self {
					$( Self::$variant(x) => (x as &dyn Any).downcast_ref(), )+
				}
			}

			#[inline]
			pub fn get_if_mut<U: 'static>(&mut self) -> Option<&mut U> {
				match self {
					$( Self::$variant(x) => (x as &mut dyn Any).downcast_mut(), )+
				}
			}
		}

		impl<V, R, $( $ty ),+> Visitable<V> for $ident<$( $ty ),+>
		where
			$( V: Visitor<$ty, Output = R>, )+
		{
			type Output = R;

			#[inline]
			fn accept(&self, visitor: V) -> R {
				self.visit(visitor)
			}
		}

		$( define_variant!(@alternative $ident $gens $idx $variant $ty); )+
	};

	(@alternative $ident:ident [$( $gen:ident ),+] $idx:literal $variant:ident $ty:ident) => {
		impl<$( $gen ),+> Alternative<$idx> for $ident<$( $gen ),+> {
			type Type = $ty;

			#[inline]
			fn from_alternative(value: $ty) -> Self {
				Self::$variant(value)
			}

			#[inline]
			fn alternative(&self) -> Option<&$ty> {
				match self {
					Self::$variant(x) => Some(x),
					_ => None,
				}
			}

			#[inline]
			fn alternative_mut(&mut self) -> Option<&mut $ty> {
				match self {
					Self::$variant(x) => Some(x),
					_ => None,
				}
			}
		}
	};
}

define_variant! {
    /// A tagged union of two alternatives.
    pub enum Variant2 [A, B] {
        0 => V0(A),
        1 => V1(B),
    }
}

define_variant! {
    /// A tagged union of three alternatives.
    pub enum Variant3 [A, B, C] {
        0 => V0(A),
        1 => V1(B),
        2 => V2(C),
    }
}

define_variant! {
    /// A tagged union of four alternatives.
    pub enum Variant4 [A, B, C, D] {
        0 => V0(A),
        1 => V1(B),
        2 => V2(C),
        3 => V3(D),
    }
}
