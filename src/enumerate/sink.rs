//! Consumers of enumerated rays.

use crate::polyhedral::RayVec;

/// Receives each extremal ray as it is produced.
///
/// Called synchronously from the enumerating thread; implementations must
/// not re-enter the enumerator.
pub trait RaySink {
    /// Take ownership of one extremal ray.
    fn accept(&mut self, ray: RayVec);
}

impl RaySink for Vec<RayVec> {
    fn accept(&mut self, ray: RayVec) {
        self.push(ray);
    }
}

impl<S: RaySink + ?Sized> RaySink for &mut S {
    fn accept(&mut self, ray: RayVec) {
        (**self).accept(ray);
    }
}

impl<S: RaySink + ?Sized> RaySink for Box<S> {
    fn accept(&mut self, ray: RayVec) {
        (**self).accept(ray);
    }
}

/// Adapts a closure into a [`RaySink`].
///
/// ```
/// use rayenum::enumerate::{FnSink, RaySink};
/// use rayenum::polyhedral::RayVec;
///
/// let mut count = 0;
/// let mut sink = FnSink(|_ray: RayVec| count += 1);
/// sink.accept(RayVec::from_i64s(&[1, 0]));
/// drop(sink);
/// assert_eq!(count, 1);
/// ```
pub struct FnSink<F>(pub F);

impl<F: FnMut(RayVec)> RaySink for FnSink<F> {
    fn accept(&mut self, ray: RayVec) {
        (self.0)(ray);
    }
}
