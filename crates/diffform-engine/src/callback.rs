//! Cloneable event-handler wrapper

use std::fmt;
use std::rc::Rc;

/// A cloneable, reference-counted event handler
///
/// Clones share the same closure, so a handler can be attached to several
/// places and compared by identity with [`Callback::ptr_eq`].
///
/// # Examples
///
/// ```
/// use diffform_engine::Callback;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let hits = Rc::new(Cell::new(0));
/// let on_blur = Callback::new({
///     let hits = hits.clone();
///     move |()| hits.set(hits.get() + 1)
/// });
/// on_blur.call(());
/// on_blur.clone().call(());
/// assert_eq!(hits.get(), 2);
/// ```
pub struct Callback<Args = (), Ret = ()> {
	inner: Rc<dyn Fn(Args) -> Ret>,
}

impl<Args, Ret> Callback<Args, Ret> {
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(Args) -> Ret + 'static,
	{
		Self { inner: Rc::new(f) }
	}

	pub fn call(&self, args: Args) -> Ret {
		(self.inner)(args)
	}

	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.inner, &other.inner)
	}
}

impl<Args, Ret> Clone for Callback<Args, Ret> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<Args, Ret> fmt::Debug for Callback<Args, Ret> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Callback")
			.field("inner", &"<function>")
			.finish()
	}
}
