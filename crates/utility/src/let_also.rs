/// Kotlin style scope functions, used to keep method chains flowing.
pub trait LetAlso: Sized {
    /// Passes the owned value into `f` and returns its result.
    fn let_owned<R, F: FnOnce(Self) -> R>(self, f: F) -> R {
        f(self)
    }

    /// Runs `f` on a reference of the value and returns the value.
    fn also<F: FnOnce(&Self)>(self, f: F) -> Self {
        f(&self);
        self
    }
}

impl<T> LetAlso for T {}
