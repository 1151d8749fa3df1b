/// Precondition check for the packers and kernels.
///
/// Expands to `assert!` when debug assertions are on or the `checked` feature
/// is enabled, and to nothing otherwise.
macro_rules! gebp_assert {
    ($($arg:tt)*) => {
        if cfg!(any(debug_assertions, feature = "checked")) {
            assert!($($arg)*);
        }
    };
}
