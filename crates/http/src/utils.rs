//! Internal helper macros.

/// Early-returns with `$error` when `$predicate` does not hold.
///
/// Like `assert!`, but produces an `Err` instead of panicking; used for the
/// validation checks in the codec layer.
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
